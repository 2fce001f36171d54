//! Lexical analysis module for the compiler.
//!
//! This module contains the tokenizer that hands the parser one lexeme at a
//! time. It handles:
//!
//! - Context-sensitive splitting of operators, numbers and identifiers
//! - String literals with escapes, line and block comments
//! - Reference-type suffixes, which depend on the type names in scope
//! - Unlimited single-token push-back and line tracking for diagnostics

pub mod lexer;
pub mod tokens;
