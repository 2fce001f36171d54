//! Utility macros for the compiler.
//!
//! - `MK_ERROR!` - Creates an `Error` anchored at a source position
//!
//! Every fatal condition in the front end goes through this macro so the
//! construction of `ErrorImpl` variants stays uniform.

/// Creates an `Error` from an `ErrorImpl` variant and a position.
///
/// # Example
///
/// ```ignore
/// return Err(MK_ERROR!(parser.get_position(), UnexpectedToken { token: token.clone() }));
/// return Err(MK_ERROR!(parser.get_position(), ExpectedExpression));
/// ```
#[macro_export]
macro_rules! MK_ERROR {
    ($position:expr, $variant:ident) => {
        $crate::errors::errors::Error::new(
            $crate::errors::errors::ErrorImpl::$variant,
            $position,
        )
    };
    ($position:expr, $variant:ident { $($field:ident : $value:expr),* $(,)? }) => {
        $crate::errors::errors::Error::new(
            $crate::errors::errors::ErrorImpl::$variant { $($field: $value),* },
            $position,
        )
    };
}
