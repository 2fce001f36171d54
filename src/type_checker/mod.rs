//! Symbol, scope and type tables.
//!
//! This module holds everything the front end knows about names:
//!
//! - The type system with its conversion rules
//! - The scope stack classifying identifiers as types or variables
//! - Structural validation of function type names
//!
//! Types and variables share one namespace across the visible scope chain.

pub mod scope;
pub mod types;
