//! Parser module: statement dispatch and expression parsing.
//!
//! Parsing and code generation happen in a single pass. The statement
//! driver reads one statement at a time and lowers it immediately; the
//! expression parser validates an operator/operand sequence token by token
//! and hands it to the shunting-yard pass for reordering.
//!
//! - `parser`: the compilation session and the top-level loop
//! - `stmt`: declarations, functions, classes and control flow
//! - `expr`: expressions, calls and sub-expressions
//! - `lookups`: operator tables with priorities and associativity
//! - `shunting_yard`: infix to postfix reordering

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod shunting_yard;
pub mod stmt;
