//! Unit tests for error handling.

use crate::errors::errors::{Error, ErrorImpl, ErrorTip};
use crate::Position;
use std::rc::Rc;

fn at_line(line: u32) -> Position {
    Position(line, Rc::new("test.mc".to_string()))
}

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::MalformedNumber {
            token: "3.5.".to_string(),
        },
        at_line(3),
    );

    assert_eq!(error.get_error_name(), "MalformedNumber");
    assert_eq!(error.get_position().0, 3);
}

#[test]
fn test_unexpected_token_error() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "}".to_string(),
        },
        at_line(1),
    );

    assert_eq!(error.get_error_name(), "UnexpectedToken");
    match error.get_tip() {
        ErrorTip::Suggestion(tip) => assert!(tip.contains("`}`")),
        _ => panic!("Expected suggestion tip"),
    }
}

#[test]
fn test_argument_errors_name_the_index() {
    let error = Error::new(
        ErrorImpl::ArgumentCount {
            index: 1,
            expected: 1,
            received: 0,
        },
        at_line(1),
    );
    assert!(error.get_tip().to_string().starts_with("Argument 1:"));

    let error = Error::new(
        ErrorImpl::ArgumentType {
            index: 2,
            expected: "i32".to_string(),
            received: "string".to_string(),
        },
        at_line(1),
    );
    assert_eq!(error.get_error_name(), "ArgumentType");
    assert!(error.to_string().contains("argument 2"));
}

#[test]
fn test_display_includes_line() {
    let error = Error::new(ErrorImpl::ReturnOutsideFunction, at_line(12));
    assert_eq!(error.to_string(), "return outside of a function (line 12)");
}

#[test]
fn test_error_tip_none() {
    let error = Error::new(ErrorImpl::ExpectedExpression, at_line(0));
    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_error_tip_display() {
    let tip = ErrorTip::Suggestion("Try this instead".to_string());
    assert_eq!(tip.to_string(), "Try this instead");

    let tip = ErrorTip::None;
    assert_eq!(tip.to_string(), "");
}

#[test]
fn test_incompatible_operands_error() {
    let error = Error::new(
        ErrorImpl::IncompatibleOperands {
            operator: "+".to_string(),
            left: "i32".to_string(),
            right: "string".to_string(),
        },
        at_line(4),
    );

    assert_eq!(error.get_error_name(), "IncompatibleOperands");
    assert_eq!(
        error.get_tip().to_string(),
        "`+` cannot combine `i32` and `string`"
    );
}

#[test]
fn test_nested_rebind_error() {
    let error = Error::new(
        ErrorImpl::NestedRebind {
            name: "r".to_string(),
        },
        at_line(2),
    );

    assert_eq!(error.get_error_name(), "NestedRebind");
    assert_eq!(
        error.get_tip().to_string(),
        "`r` can only be rebound in the block that declares it"
    );
}
