use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

use crate::type_checker::types::Type;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashSet<&'static str> = {
        let mut set = HashSet::new();
        set.insert("class");
        set.insert("function");
        set.insert("return");
        set.insert("if");
        set.insert("elseif");
        set.insert("else");
        set.insert("while");
        set.insert("for");
        set.insert("var");
        set.insert("true");
        set.insert("false");
        set.insert("null");
        set
    };
    static ref INTEGER_LITERAL: Regex = Regex::new("^-?[0-9]+$").unwrap();
    static ref DOUBLE_LITERAL: Regex = Regex::new("^-?([0-9]+\\.[0-9]*|\\.[0-9]+)$").unwrap();
    static ref NUMERIC_SHAPE: Regex = Regex::new("^-?[0-9.]*[0-9][0-9.]*$").unwrap();
}

/// Characters that always form a one-character token of their own.
pub const STANDALONE: [char; 13] = [
    '(', ')', '[', ']', '{', '}', ';', ':', ',', ' ', '\t', '\n', '\r',
];

/// Single-character operators that `=` may extend into a compound operator.
pub const COMPOUND_PREFIXES: [char; 9] = ['+', '-', '*', '/', '=', '%', '!', '<', '>'];

pub fn is_standalone(c: char) -> bool {
    STANDALONE.contains(&c)
}

pub fn is_operator_char(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '*' | '/' | '%' | '=' | '!' | '<' | '>' | '&' | '|' | '.'
    )
}

/// Whitespace and comments reach the parser as tokens and are skipped there.
pub fn is_trivia(token: &str) -> bool {
    token.starts_with(' ')
        || token.starts_with('\t')
        || token.starts_with('\n')
        || token.starts_with('\r')
        || token.starts_with("//")
        || token.starts_with("/*")
}

/// The shape of a literal token, decided by the token text alone.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralKind {
    Integer(i32),
    Double,
    Boolean(bool),
    Null,
    String(String),
}

impl LiteralKind {
    pub fn get_type(&self) -> Type {
        match self {
            LiteralKind::Integer(_) => Type::I32,
            LiteralKind::Double => Type::F64,
            LiteralKind::Boolean(_) => Type::BOOL,
            LiteralKind::Null => Type::NULL,
            LiteralKind::String(_) => Type::STRING,
        }
    }
}

/// Classifies `token` as a literal.
///
/// Returns `Ok(None)` for anything that is not literal-shaped and
/// `Err(token)` for numbers that cannot be read (extra decimal points or
/// integers outside the `i32` range).
pub fn classify_literal(token: &str) -> Result<Option<LiteralKind>, String> {
    match token {
        "true" => return Ok(Some(LiteralKind::Boolean(true))),
        "false" => return Ok(Some(LiteralKind::Boolean(false))),
        "null" => return Ok(Some(LiteralKind::Null)),
        _ => {}
    }

    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        return Ok(Some(LiteralKind::String(
            token[1..token.len() - 1].to_string(),
        )));
    }

    if INTEGER_LITERAL.is_match(token) {
        return match token.parse::<i32>() {
            Ok(value) => Ok(Some(LiteralKind::Integer(value))),
            Err(_) => Err(token.to_string()),
        };
    }

    if DOUBLE_LITERAL.is_match(token) {
        return Ok(Some(LiteralKind::Double));
    }

    if NUMERIC_SHAPE.is_match(token) {
        return Err(token.to_string());
    }

    Ok(None)
}

pub fn is_numeric_literal(token: &str) -> bool {
    INTEGER_LITERAL.is_match(token) || DOUBLE_LITERAL.is_match(token)
}
