use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_internal_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::MalformedNumber { .. } => "MalformedNumber",
            ErrorImpl::UnterminatedString => "UnterminatedString",
            ErrorImpl::UnterminatedComment => "UnterminatedComment",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::UnexpectedEof { .. } => "UnexpectedEof",
            ErrorImpl::ExpectedExpression => "ExpectedExpression",
            ErrorImpl::UnbalancedGrouping { .. } => "UnbalancedGrouping",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::UnknownIdentifier { .. } => "UnknownIdentifier",
            ErrorImpl::InvalidName { .. } => "InvalidName",
            ErrorImpl::ArgumentCount { .. } => "ArgumentCount",
            ErrorImpl::ArgumentType { .. } => "ArgumentType",
            ErrorImpl::NotCallable { .. } => "NotCallable",
            ErrorImpl::NotAssignable { .. } => "NotAssignable",
            ErrorImpl::IncompatibleOperands { .. } => "IncompatibleOperands",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::ReferenceComparison { .. } => "ReferenceComparison",
            ErrorImpl::NestedRebind { .. } => "NestedRebind",
            ErrorImpl::ReturnOutsideFunction => "ReturnOutsideFunction",
            ErrorImpl::MissingReturn { .. } => "MissingReturn",
            ErrorImpl::ExpectedExplicitValue => "ExpectedExplicitValue",
            ErrorImpl::NotImplemented { .. } => "NotImplemented",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::MalformedNumber { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, a number may contain at most one decimal point",
                token
            )),
            ErrorImpl::UnterminatedString => ErrorTip::None,
            ErrorImpl::UnterminatedComment => {
                ErrorTip::Suggestion(String::from("Block comment is missing its closing `*/`"))
            }
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::UnexpectedEof { expected } => {
                ErrorTip::Suggestion(format!("Input ended while expecting {}", expected))
            }
            ErrorImpl::ExpectedExpression => ErrorTip::None,
            ErrorImpl::UnbalancedGrouping { token } => {
                ErrorTip::Suggestion(format!("`{}` has no matching partner", token))
            }
            ErrorImpl::UnknownType { type_ } => {
                ErrorTip::Suggestion(format!("Unknown type `{}` found", type_))
            }
            ErrorImpl::UnknownIdentifier { identifier } => {
                ErrorTip::Suggestion(format!("`{}` is not declared in this scope", identifier))
            }
            ErrorImpl::InvalidName { name } => ErrorTip::Suggestion(format!(
                "`{}` is already a type or variable, or is not alphanumeric",
                name
            )),
            ErrorImpl::ArgumentCount {
                index,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "Argument {}: expected {} arguments, received {}",
                index, expected, received
            )),
            ErrorImpl::ArgumentType {
                index,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "Argument {}: expected argument type `{}`, received `{}`",
                index, expected, received
            )),
            ErrorImpl::NotCallable { type_ } => {
                ErrorTip::Suggestion(format!("Values of type `{}` cannot be called", type_))
            }
            ErrorImpl::NotAssignable { target } => {
                ErrorTip::Suggestion(format!("`{}` has no storage to assign to", target))
            }
            ErrorImpl::IncompatibleOperands {
                operator,
                left,
                right,
            } => ErrorTip::Suggestion(format!(
                "`{}` cannot combine `{}` and `{}`",
                operator, left, right
            )),
            ErrorImpl::TypeMatchError { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::ReferenceComparison { operator } => ErrorTip::Suggestion(format!(
                "`{}` compares named reference variables only",
                operator
            )),
            ErrorImpl::NestedRebind { name } => ErrorTip::Suggestion(format!(
                "`{}` can only be rebound in the block that declares it",
                name
            )),
            ErrorImpl::ReturnOutsideFunction => ErrorTip::None,
            ErrorImpl::MissingReturn { function } => {
                ErrorTip::Suggestion(format!("Function `{}` never returns a value", function))
            }
            ErrorImpl::ExpectedExplicitValue => ErrorTip::Suggestion(String::from(
                "Expected explicit value when no type is given",
            )),
            ErrorImpl::NotImplemented { feature } => ErrorTip::Suggestion(format!(
                "{} is recognised but not supported yet",
                feature
            )),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (line {})", self.internal_error, self.position.0)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("malformed number: {token:?}")]
    MalformedNumber { token: String },
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated block comment")]
    UnterminatedComment,
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },
    #[error("expected an expression")]
    ExpectedExpression,
    #[error("unbalanced grouping symbol {token:?}")]
    UnbalancedGrouping { token: String },
    #[error("unknown type {type_} found")]
    UnknownType { type_: String },
    #[error("unknown identifier {identifier:?}")]
    UnknownIdentifier { identifier: String },
    #[error("invalid name {name:?}")]
    InvalidName { name: String },
    #[error("argument {index}: expected {expected} arguments, received {received}")]
    ArgumentCount {
        index: usize,
        expected: usize,
        received: usize,
    },
    #[error("argument {index}: expected {expected:?}, received {received:?}")]
    ArgumentType {
        index: usize,
        expected: String,
        received: String,
    },
    #[error("value of type {type_:?} is not callable")]
    NotCallable { type_: String },
    #[error("cannot assign to non-addressable {target:?}")]
    NotAssignable { target: String },
    #[error("incompatible operands for {operator:?}: {left:?} and {right:?}")]
    IncompatibleOperands {
        operator: String,
        left: String,
        right: String,
    },
    #[error("types do not match: expected {expected:?}, received {received:?}")]
    TypeMatchError { expected: String, received: String },
    #[error("{operator:?} requires named reference variables")]
    ReferenceComparison { operator: String },
    #[error("{name:?} is rebound outside the block that declares it")]
    NestedRebind { name: String },
    #[error("return outside of a function")]
    ReturnOutsideFunction,
    #[error("function {function:?} is missing a return")]
    MissingReturn { function: String },
    #[error("expected explicit value when no type is given")]
    ExpectedExplicitValue,
    #[error("not implemented: {feature}")]
    NotImplemented { feature: String },
}
