//! Code generation module.
//!
//! Lowers parsed expressions and statements into line-based IR text for an
//! external assembler. It handles:
//!
//! - Numeric promotion and explicit conversions
//! - Reference rebinding versus value copies on assignment
//! - Comparison, logical and arithmetic instruction selection
//! - Function regions, returns and control-flow jumps

pub mod compiler;
pub mod expr;
pub mod stmt;
