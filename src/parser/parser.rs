//! The compilation session.
//!
//! One `Parser` owns everything a compilation touches: the tokenizer, the
//! scope stack, the block-task stack and the IR emitter. Every parsing and
//! lowering function takes it as `&mut Parser`; there is no global state.

use std::rc::Rc;

use log::{debug, trace};

use crate::{
    compiler::compiler::Compiler,
    errors::errors::Error,
    lexer::{lexer::Tokenizer, tokens::is_trivia},
    type_checker::{
        scope::{Scope, ScopeStack},
        types::ClassType,
    },
    Position, MK_ERROR,
};

use super::stmt::parse_statement;

/// What kind of body the innermost `{ ... }` holds.
#[derive(Debug, Clone)]
pub enum Task {
    Code,
    Class(Rc<ClassType>),
}

pub struct Parser {
    tokenizer: Tokenizer,
    pub scopes: ScopeStack,
    tasks: Vec<Task>,
    pub compiler: Compiler,
}

impl Parser {
    pub fn new(source: &str, file: &str) -> Self {
        Parser {
            tokenizer: Tokenizer::new(source, Some(file.to_string())),
            scopes: ScopeStack::new(),
            tasks: vec![Task::Code],
            compiler: Compiler::new(),
        }
    }

    pub fn get_position(&self) -> Position {
        self.tokenizer.get_position()
    }

    /// Returns the next significant token, or an empty string at end of input.
    pub fn next_token(&mut self) -> Result<String, Error> {
        loop {
            let token = self.tokenizer.next(&self.scopes)?;
            if !is_trivia(&token) {
                trace!("token {:?} (line {})", token, self.tokenizer.line());
                return Ok(token);
            }
        }
    }

    pub fn push_back(&mut self, token: String) {
        if !token.is_empty() {
            self.tokenizer.push_back(token);
        }
    }

    /// Consumes `expected` or fails on whatever came instead.
    pub fn expect(&mut self, expected: &str) -> Result<(), Error> {
        let token = self.next_token()?;
        if token == expected {
            return Ok(());
        }

        Err(match token.as_str() {
            "" => MK_ERROR!(
                self.get_position(),
                UnexpectedEof {
                    expected: format!("`{}`", expected)
                }
            ),
            ")" | "]" | "}" if expected != ")" && expected != "]" && expected != "}" => {
                MK_ERROR!(self.get_position(), UnbalancedGrouping { token: token.clone() })
            }
            _ => MK_ERROR!(
                self.get_position(),
                UnexpectedTokenDetailed {
                    token: token.clone(),
                    message: format!("expected `{}`", expected)
                }
            ),
        })
    }

    pub fn current_task(&self) -> &Task {
        // The bottom task is never popped.
        &self.tasks[self.tasks.len() - 1]
    }

    /// Runs `f` with IR emission redirected into a fresh buffer and returns
    /// the captured lines alongside the result.
    pub fn capture<T>(
        &mut self,
        f: impl FnOnce(&mut Parser) -> Result<T, Error>,
    ) -> Result<(Vec<String>, T), Error> {
        let saved = std::mem::take(&mut self.compiler.output);
        let result = f(self);
        let captured = std::mem::replace(&mut self.compiler.output, saved);

        Ok((captured, result?))
    }

    /// Runs `f` inside a new scope and task; both are popped again whether
    /// or not `f` succeeds.
    pub fn with_scope<T>(
        &mut self,
        scope: Scope,
        task: Task,
        f: impl FnOnce(&mut Parser) -> Result<T, Error>,
    ) -> Result<T, Error> {
        debug!(
            "enter {:?} scope at depth {}",
            scope.kind,
            self.scopes.depth() + 1
        );
        self.scopes.push(scope);
        self.tasks.push(task);

        let result = f(self);

        self.tasks.pop();
        if let Some(scope) = self.scopes.pop() {
            debug!(
                "leave {:?} scope with {} variable(s)",
                scope.kind,
                scope.variables.len()
            );
        }

        result
    }
}

/// Parses statements until end of input, emitting IR as it goes.
pub fn parse_program(parser: &mut Parser) -> Result<(), Error> {
    loop {
        let token = parser.next_token()?;
        if token.is_empty() {
            return Ok(());
        }
        if token == "}" {
            return Err(MK_ERROR!(
                parser.get_position(),
                UnbalancedGrouping { token: token }
            ));
        }

        parser.push_back(token);
        parse_statement(parser)?;
    }
}
