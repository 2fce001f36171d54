use log::trace;

use crate::{
    ast::expressions::{Expression, Item, Lowered, Operand, Value},
    compiler::expr::{reduce, reduce_owned},
    errors::errors::Error,
    lexer::tokens::{classify_literal, is_numeric_literal, LiteralKind},
    type_checker::types::Type,
    MK_ERROR,
};

use super::{
    lookups::{BinaryOperator, BINARY_LOOKUP, UNARY_LOOKUP},
    parser::Parser,
    stmt::parse_function,
};

/// The tokens an expression was read from, and the validated sequence.
#[derive(Debug, Clone)]
pub struct ParsedExpression {
    pub text: String,
    pub expression: Expression,
}

fn is_terminator(token: &str) -> bool {
    matches!(token, ";" | "," | ")" | "}" | "]")
}

/// Reads tokens until the expression is complete: a terminator, an
/// unmatched closing bracket, or a token that cannot extend a finished
/// operand. The stopping token is pushed back.
///
/// An empty expression is not an error here; see
/// `parse_required_expression`.
pub fn parse_expression(parser: &mut Parser) -> Result<ParsedExpression, Error> {
    let mut text: Vec<String> = vec![];
    let mut items = vec![];
    let mut previous_operand = false;
    let mut pending_unary = false;
    let mut after_member = false;

    loop {
        let token = parser.next_token()?;
        if token.is_empty() {
            break;
        }
        if is_terminator(&token) {
            parser.push_back(token);
            break;
        }

        if previous_operand {
            if token == "(" {
                let callee = match items.pop() {
                    Some(Item::Operand(callee)) => callee,
                    _ => return Err(MK_ERROR!(parser.get_position(), ExpectedExpression)),
                };
                items.push(Item::Operand(parse_call(parser, callee)?));
                text.push(String::from("(...)"));
                continue;
            }

            if let Some(operator) = BINARY_LOOKUP.get(token.as_str()) {
                after_member = *operator == BinaryOperator::Member;
                items.push(Item::Binary(*operator));
                previous_operand = false;
            } else if token.starts_with('-') && is_numeric_literal(&token) {
                // `a -1` reads as a subtraction.
                parser.push_back(token[1..].to_string());
                items.push(Item::Binary(BinaryOperator::Subtract));
                previous_operand = false;
                text.push(String::from("-"));
                continue;
            } else {
                parser.push_back(token);
                break;
            }

            text.push(token);
            continue;
        }

        if let (false, Some(operator)) = (is_numeric_literal(&token), UNARY_LOOKUP.get(token.as_str())) {
            if pending_unary {
                return Err(MK_ERROR!(
                    parser.get_position(),
                    UnexpectedTokenDetailed {
                        token: token,
                        message: String::from("a unary operator cannot follow another")
                    }
                ));
            }
            items.push(Item::Unary(*operator));
            pending_unary = true;
            text.push(token);
            continue;
        }

        if BINARY_LOOKUP.contains_key(token.as_str()) {
            let message = if pending_unary {
                "a binary operator cannot follow a unary one"
            } else {
                "a binary operator needs a left operand"
            };
            return Err(MK_ERROR!(
                parser.get_position(),
                UnexpectedTokenDetailed {
                    token: token,
                    message: String::from(message)
                }
            ));
        }

        let operand = if after_member {
            after_member = false;
            Operand::Member(token.clone())
        } else {
            parse_operand(parser, &token)?
        };
        items.push(Item::Operand(operand));
        previous_operand = true;
        pending_unary = false;
        text.push(token);
    }

    if !items.is_empty() && !previous_operand {
        return Err(MK_ERROR!(parser.get_position(), ExpectedExpression));
    }

    let text = text.join(" ");
    trace!("parsed expression `{}`", text);

    Ok(ParsedExpression {
        text,
        expression: Expression { items },
    })
}

/// `parse_expression` for places where an expression must follow.
pub fn parse_required_expression(parser: &mut Parser) -> Result<ParsedExpression, Error> {
    let parsed = parse_expression(parser)?;
    if parsed.expression.is_empty() {
        return Err(MK_ERROR!(parser.get_position(), ExpectedExpression));
    }

    Ok(parsed)
}

fn literal_operand(kind: LiteralKind, token: &str) -> Operand {
    let ty = kind.get_type();
    let ir = match kind {
        LiteralKind::Integer(value) => format!("sint:{}", value),
        LiteralKind::Double => match token.parse::<f64>() {
            Ok(value) => format!("dbl:{:?}", value),
            Err(_) => format!("dbl:{}", token),
        },
        LiteralKind::Boolean(value) => format!("sint:{}", value as i32),
        LiteralKind::Null => String::from("sint:null"),
        LiteralKind::String(text) if text.is_empty() => String::from("str:null"),
        LiteralKind::String(text) => format!(
            "str:{}",
            text.bytes()
                .map(|byte| byte.to_string())
                .collect::<Vec<_>>()
                .join(",")
        ),
    };

    Operand::Literal { ir, ty }
}

fn parse_operand(parser: &mut Parser, token: &str) -> Result<Operand, Error> {
    match token {
        "(" => return parse_sub_expression(parser),
        "function" => {
            let info = parse_function(parser, false)?;
            return Ok(Operand::Function {
                label: info.label,
                ty: info.ty,
            });
        }
        _ => {}
    }

    match classify_literal(token) {
        Ok(Some(kind)) => return Ok(literal_operand(kind, token)),
        Err(token) => {
            return Err(MK_ERROR!(
                parser.get_position(),
                MalformedNumber { token: token }
            ))
        }
        Ok(None) => {}
    }

    if let Some(binding) = parser.scopes.is_variable(token) {
        return Ok(Operand::Variable(binding.clone()));
    }

    let looks_like_name = token.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && token.chars().all(|c| c.is_ascii_alphanumeric());
    if looks_like_name && parser.scopes.is_basic_type(token).is_none() {
        return Err(MK_ERROR!(
            parser.get_position(),
            UnknownIdentifier {
                identifier: token.to_string()
            }
        ));
    }

    Err(MK_ERROR!(
        parser.get_position(),
        UnexpectedToken {
            token: token.to_string()
        }
    ))
}

/// Parses `( expr )` after its opening bracket and lowers it on the spot so
/// that its type is known while the enclosing expression is still being read.
fn parse_sub_expression(parser: &mut Parser) -> Result<Operand, Error> {
    let (code, (result, effects)) = parser.capture(|parser| {
        let parsed = parse_required_expression(parser)?;
        let effects = parsed.expression.has_effects();
        Ok((reduce(parser, parsed.expression)?, effects))
    })?;

    let closing = parser.next_token()?;
    if closing != ")" {
        return Err(MK_ERROR!(
            parser.get_position(),
            UnbalancedGrouping {
                token: String::from("(")
            }
        ));
    }

    Ok(Operand::SubExpression(Lowered {
        code,
        result,
        effects,
    }))
}

/// Parses the argument list of a call whose callee has been read already,
/// checking arity and argument types against the callee's signature.
fn parse_call(parser: &mut Parser, callee: Operand) -> Result<Operand, Error> {
    let callee_type = callee.get_type().unwrap_or(Type::VOID);
    let function = match callee_type.as_function() {
        Some(function) => function.clone(),
        None => {
            return Err(MK_ERROR!(
                parser.get_position(),
                NotCallable {
                    type_: callee_type.to_string()
                }
            ))
        }
    };

    let (code, result) = parser.capture(|parser| {
        let callee = callee.fetch_value(parser)?;
        let label = match callee.source_storage() {
            Some(storage) => storage.to_string(),
            None => callee.ir.clone(),
        };

        let expected = function.parameters.len();
        let mut arguments: Vec<String> = vec![];

        let first = parser.next_token()?;
        let mut closed = first == ")";
        if !closed {
            parser.push_back(first);
        }

        while !closed {
            let index = arguments.len();
            let parsed = parse_required_expression(parser)?;

            let parameter = match function.parameters.get(index) {
                Some(parameter) => parameter.clone(),
                None => {
                    return Err(MK_ERROR!(
                        parser.get_position(),
                        ArgumentCount {
                            index: expected + 1,
                            expected: expected,
                            received: index + 1
                        }
                    ))
                }
            };

            let argument = pass_argument(parser, parsed, &parameter, index + 1)?;
            arguments.push(argument.ir);

            let separator = parser.next_token()?;
            match separator.as_str() {
                "," => {}
                ")" => closed = true,
                "" => {
                    return Err(MK_ERROR!(
                        parser.get_position(),
                        UnexpectedEof {
                            expected: String::from("`)`")
                        }
                    ))
                }
                _ => {
                    return Err(MK_ERROR!(
                        parser.get_position(),
                        UnbalancedGrouping {
                            token: String::from("(")
                        }
                    ))
                }
            }
        }

        if arguments.len() < expected {
            return Err(MK_ERROR!(
                parser.get_position(),
                ArgumentCount {
                    index: arguments.len() + 1,
                    expected: expected,
                    received: arguments.len()
                }
            ));
        }

        let arguments = if arguments.is_empty() {
            String::from("null")
        } else {
            arguments.join("/")
        };
        parser
            .compiler
            .emit(format!("cfunc {} {}", label, arguments));

        if function.return_type.is_void() {
            return Ok(Value::immediate(String::from("sint:null"), Type::VOID));
        }

        let return_type = function.return_type.strip().clone();
        let result = parser.compiler.declare_temp(&return_type);
        parser
            .compiler
            .emit(format!("cvar {}_ret {}", label, result));

        Ok(Value::temporary(result, return_type))
    })?;

    Ok(Operand::Call(Lowered {
        code,
        result,
        effects: true,
    }))
}

/// Lowers one argument. Reference parameters take a named variable of the
/// same value type; value parameters take an owned copy converted
/// implicitly.
fn pass_argument(
    parser: &mut Parser,
    parsed: ParsedExpression,
    parameter: &Type,
    index: usize,
) -> Result<Value, Error> {
    let mismatch = |parser: &Parser, received: &Type| {
        MK_ERROR!(
            parser.get_position(),
            ArgumentType {
                index: index,
                expected: parameter.to_string(),
                received: received.to_string()
            }
        )
    };

    if parameter.is_reference() {
        let value = reduce(parser, parsed.expression)?;
        if value.is_named() && value.ty.strip() == parameter.strip() {
            return Ok(value);
        }
        return Err(mismatch(parser, &value.ty));
    }

    let value = reduce_owned(parser, parsed.expression)?;
    let received = value.ty.clone();
    match parser.compiler.convert(value, parameter, false) {
        Some(value) => Ok(value),
        None => Err(mismatch(parser, &received)),
    }
}
