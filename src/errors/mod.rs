//! Error types and error handling for the compiler.
//!
//! Every failure in the front end is fatal: the first error raised by the
//! tokenizer, parser or code generator aborts the compilation. This module
//! defines:
//!
//! - The error structure carrying the source line it was raised on
//! - Specific error variants for lexical, syntactic and semantic failures
//! - Helpful suggestions attached to each variant

pub mod errors;

#[cfg(test)]
mod tests;
