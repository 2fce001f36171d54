#![allow(clippy::module_inception)]

use std::rc::Rc;

use crate::errors::errors::{Error, ErrorTip};

pub mod ast;
pub mod compiler;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod type_checker;

extern crate regex;

/// A source location: 1-based line and file name.
#[derive(Debug, Clone, PartialEq)]
pub struct Position(pub u32, pub Rc<String>);

/// Returns the text of a 1-based `line` in `source`, without its newline.
pub fn get_line(source: &str, line: u32) -> Option<&str> {
    if line == 0 {
        return None;
    }

    source
        .split('\n')
        .nth(line as usize - 1)
        .map(|text| text.trim_end_matches('\r'))
}


pub fn display_error(error: &Error, source: &str, file: &str) {
    /*
        Error: UnknownIdentifier (`y` is not declared in this scope)
        -> main.mc
           |
        20 | i32 x = y;
           |
    */

    let line = error.get_position().0;
    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    if let ErrorTip::None = error.get_tip() {
        println!("Error: {}", error.get_error_name());
    } else {
        println!("Error: {} ({})", error.get_error_name(), error.get_tip());
    }
    println!("-> {}", file);
    println!("{:>padding$}", "|");

    if let Some(text) = get_line(source, line) {
        println!("{} | {}", line_string, text.trim());
    }

    println!("{:>padding$} {}", "|", error);
}
