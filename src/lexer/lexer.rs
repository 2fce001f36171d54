use std::rc::Rc;

use crate::{errors::errors::Error, Position, MK_ERROR};

use super::tokens::{is_operator_char, is_standalone, COMPOUND_PREFIXES};

/// Answers whether a lexeme names a type that is visible right now.
///
/// The tokenizer needs this to decide whether `&` is a reference suffix.
pub trait TypeNames {
    fn is_type_name(&self, name: &str) -> bool;
}

/// Stateful scanner handing out one lexeme at a time.
///
/// Tokens are plain strings; whitespace and comments are returned as tokens
/// too. `push_back` is the only lookahead mechanism and may be used any
/// number of times in a row.
#[derive(Clone)]
pub struct Tokenizer {
    source: Vec<char>,
    pos: usize,
    pushed_back: Vec<String>,
    line: u32,
    file: Rc<String>,
}

impl Tokenizer {
    pub fn new(source: &str, file: Option<String>) -> Tokenizer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("shell"))
        };

        Tokenizer {
            source: source.chars().collect(),
            pos: 0,
            pushed_back: vec![],
            line: 1,
            file: file_name,
        }
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn get_position(&self) -> Position {
        Position(self.line, Rc::clone(&self.file))
    }

    pub fn at_eof(&self) -> bool {
        self.pushed_back.is_empty() && self.pos >= self.source.len()
    }

    /// Makes `token` the next thing returned by `next`.
    pub fn push_back(&mut self, token: String) {
        self.line -= newlines(&token);
        self.pushed_back.push(token);
    }

    /// Returns the next lexeme, or an empty string at end of input.
    pub fn next(&mut self, types: &dyn TypeNames) -> Result<String, Error> {
        if let Some(token) = self.pushed_back.pop() {
            self.line += newlines(&token);
            return Ok(token);
        }

        self.scan(types)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn unget(&mut self) {
        self.pos -= 1;
        if self.source[self.pos] == '\n' {
            self.line -= 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn scan(&mut self, types: &dyn TypeNames) -> Result<String, Error> {
        let mut token = String::new();
        let mut in_number = false;

        while let Some(c) = self.advance() {
            if in_number {
                if c.is_ascii_digit() {
                    token.push(c);
                    continue;
                }
                if c == '.' {
                    token.push(c);
                    if token.matches('.').count() > 1 {
                        return Err(MK_ERROR!(
                            self.get_position(),
                            MalformedNumber { token: token }
                        ));
                    }
                    continue;
                }
                self.unget();
                return Ok(token);
            }

            match c {
                '"' => {
                    if token.is_empty() {
                        return self.scan_string();
                    }
                    self.unget();
                    return Ok(token);
                }
                c if is_standalone(c) => {
                    if token.is_empty() {
                        return Ok(c.to_string());
                    }
                    self.unget();
                    return Ok(token);
                }
                '/' if token.is_empty() && self.peek() == Some('/') => {
                    return Ok(self.scan_line_comment());
                }
                '/' if token.is_empty() && self.peek() == Some('*') => {
                    return self.scan_block_comment();
                }
                '0'..='9' => {
                    if token.is_empty() {
                        in_number = true;
                        token.push(c);
                    } else if starts_with_operator(&token) {
                        self.unget();
                        return Ok(token);
                    } else {
                        token.push(c);
                    }
                }
                '.' => {
                    if token.is_empty() {
                        return Ok(String::from("."));
                    }
                    self.unget();
                    return Ok(token);
                }
                '|' => {
                    if !token.is_empty() {
                        self.unget();
                        return Ok(token);
                    }
                    if self.peek() == Some('|') {
                        self.advance();
                        return Ok(String::from("||"));
                    }
                    // A lone pipe has no meaning; the parser rejects it.
                    return Ok(String::from("|"));
                }
                '&' => {
                    if !token.is_empty() {
                        if types.is_type_name(&token) {
                            token.push('&');
                            return Ok(token);
                        }
                        self.unget();
                        return Ok(token);
                    }
                    if self.peek() == Some('&') {
                        self.advance();
                        return Ok(String::from("&&"));
                    }
                    return Ok(String::from("&"));
                }
                '=' => {
                    if token.is_empty() {
                        token.push(c);
                        continue;
                    }
                    if is_compound_prefix(&token) {
                        token.push(c);
                        if (token == "==" || token == "!=") && self.peek() == Some('=') {
                            self.advance();
                            token.push('=');
                        }
                        return Ok(token);
                    }
                    self.unget();
                    return Ok(token);
                }
                '+' | '-' => {
                    if token.is_empty() {
                        token.push(c);
                        if c == '-' && self.peek().is_some_and(|next| next.is_ascii_digit()) {
                            in_number = true;
                        }
                        continue;
                    }
                    if token.len() == 1 && token.starts_with(c) {
                        token.push(c);
                        return Ok(token);
                    }
                    self.unget();
                    return Ok(token);
                }
                '*' | '/' | '%' | '!' | '<' | '>' => {
                    if token.is_empty() {
                        token.push(c);
                        continue;
                    }
                    self.unget();
                    return Ok(token);
                }
                _ => {
                    if starts_with_operator(&token) {
                        self.unget();
                        return Ok(token);
                    }
                    token.push(c);
                }
            }
        }

        Ok(token)
    }

    fn scan_string(&mut self) -> Result<String, Error> {
        let mut token = String::from("\"");

        loop {
            let c = match self.advance() {
                Some(c) => c,
                None => return Err(MK_ERROR!(self.get_position(), UnterminatedString)),
            };

            match c {
                '\\' => {
                    let escaped = match self.advance() {
                        Some(escaped) => escaped,
                        None => return Err(MK_ERROR!(self.get_position(), UnterminatedString)),
                    };
                    match escaped {
                        'n' => token.push('\n'),
                        't' => token.push('\t'),
                        'r' => token.push('\r'),
                        '0' => token.push('\0'),
                        _ => token.push(escaped),
                    }
                }
                '"' => {
                    token.push(c);
                    return Ok(token);
                }
                _ => token.push(c),
            }
        }
    }

    fn scan_line_comment(&mut self) -> String {
        let mut token = String::from("/");

        while let Some(c) = self.advance() {
            token.push(c);
            if c == '\n' {
                break;
            }
        }

        token
    }

    fn scan_block_comment(&mut self) -> Result<String, Error> {
        let mut token = String::from("/");
        // Consume the opening `*` so that `/*/` does not close itself.
        if let Some(star) = self.advance() {
            token.push(star);
        }

        while let Some(c) = self.advance() {
            token.push(c);
            if c == '*' && self.peek() == Some('/') {
                self.advance();
                token.push('/');
                return Ok(token);
            }
        }

        Err(MK_ERROR!(self.get_position(), UnterminatedComment))
    }
}

fn newlines(token: &str) -> u32 {
    token.matches('\n').count() as u32
}

fn starts_with_operator(token: &str) -> bool {
    token.chars().next().is_some_and(is_operator_char)
}

fn is_compound_prefix(token: &str) -> bool {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => COMPOUND_PREFIXES.contains(&c),
        _ => false,
    }
}
