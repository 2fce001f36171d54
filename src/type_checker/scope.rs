use std::collections::HashMap;

use crate::lexer::{lexer::TypeNames, tokens::RESERVED_LOOKUP};

use super::types::{Primitive, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Main,
    Function,
    If,
    Else,
    While,
    For,
    Class,
}

/// A visible variable: the source name, where it lives and what it holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub storage: String,
    pub ty: Type,
}

/// Return bookkeeping for the function a scope belongs to.
#[derive(Debug, Clone)]
pub struct FunctionFrame {
    pub label: String,
    pub return_type: Type,
    pub returned: bool,
}

impl FunctionFrame {
    pub fn return_required(&self) -> bool {
        !self.return_type.is_void()
    }
}

#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub types: HashMap<String, Type>,
    pub variables: HashMap<String, Binding>,
    pub function: Option<FunctionFrame>,
}

impl Scope {
    pub fn new(kind: ScopeKind) -> Self {
        Scope {
            kind,
            types: HashMap::new(),
            variables: HashMap::new(),
            function: None,
        }
    }

    pub fn for_function(frame: FunctionFrame) -> Self {
        Scope {
            function: Some(frame),
            ..Scope::new(ScopeKind::Function)
        }
    }
}

/// Nested visibility frames, innermost last.
#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    /// Creates the stack with the main scope and the primitive types in it.
    pub fn new() -> Self {
        let mut main = Scope::new(ScopeKind::Main);
        for (name, primitive) in [
            ("i32", Primitive::I32),
            ("f64", Primitive::F64),
            ("bool", Primitive::Bool),
            ("string", Primitive::String),
            ("void", Primitive::Void),
        ] {
            main.types
                .insert(String::from(name), Type::Primitive(primitive));
        }

        ScopeStack { scopes: vec![main] }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn push(&mut self, scope: Scope) {
        self.scopes.push(scope);
    }

    pub fn pop(&mut self) -> Option<Scope> {
        // The main scope lives as long as the stack.
        if self.scopes.len() > 1 {
            self.scopes.pop()
        } else {
            None
        }
    }

    pub fn current_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    /// Resolves a plain or `&`-suffixed type name, innermost scope first.
    pub fn is_basic_type(&self, name: &str) -> Option<Type> {
        if let Some(base) = name.strip_suffix('&') {
            let base = self.lookup_type(base)?;
            return if base.can_be_referenced() {
                Some(base.reference())
            } else {
                None
            };
        }

        self.lookup_type(name)
    }

    fn lookup_type(&self, name: &str) -> Option<Type> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.types.get(name))
            .cloned()
    }

    /// Resolves a type name including structural function types such as
    /// `i32(f64,bool&)`.
    ///
    /// `Ok(None)` means the name is not a type at all; `Err` carries the
    /// sub-type that made a function type malformed.
    pub fn is_type(&self, name: &str) -> Result<Option<Type>, String> {
        let open = match name.find('(') {
            Some(open) => open,
            None => return Ok(self.is_basic_type(name)),
        };

        let close = match name.rfind(')') {
            Some(close) if close == name.len() - 1 && close > open => close,
            _ => return Err(name.to_string()),
        };

        let return_name = &name[..open];
        // Functions return values only.
        let return_type = self
            .is_basic_type(return_name)
            .filter(|ty| !ty.is_reference())
            .ok_or_else(|| return_name.to_string())?;

        let inner = &name[open + 1..close];
        if inner.contains('(') || inner.contains(')') {
            return Err(inner.to_string());
        }

        let mut parameters = vec![];
        if !inner.is_empty() {
            for parameter_name in inner.split(',') {
                let parameter_name = parameter_name.trim();
                let valid_shape = parameter_name
                    .trim_end_matches('&')
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric());
                let parameter = match self.is_basic_type(parameter_name) {
                    Some(parameter) if valid_shape && !parameter.is_void() => parameter,
                    _ => return Err(parameter_name.to_string()),
                };
                parameters.push(parameter);
            }
        }

        Ok(Some(Type::function(return_type, parameters)))
    }

    pub fn is_variable(&self, name: &str) -> Option<&Binding> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.variables.get(name))
    }

    /// A new name must be unused in the visible chain, start with a letter
    /// and be alphanumeric throughout.
    pub fn is_legal_name(&self, name: &str) -> bool {
        let mut chars = name.chars();
        let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());

        starts_with_letter
            && chars.all(|c| c.is_ascii_alphanumeric())
            && !RESERVED_LOOKUP.contains(name)
            && self.lookup_type(name).is_none()
            && self.is_variable(name).is_none()
    }

    pub fn declare_type(&mut self, name: String, ty: Type) {
        self.current_mut().types.insert(name, ty);
    }

    pub fn declare_variable(&mut self, binding: Binding) {
        self.current_mut()
            .variables
            .insert(binding.name.clone(), binding);
    }

    /// Depth of the innermost scope declaring the variable `name`, counted
    /// like `depth`.
    pub fn declared_at(&self, name: &str) -> Option<usize> {
        self.scopes
            .iter()
            .rposition(|scope| scope.variables.contains_key(name))
            .map(|index| index + 1)
    }

    /// Points the innermost binding called `name` at different storage.
    pub fn rebind(&mut self, name: &str, storage: String) -> bool {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(binding) = scope.variables.get_mut(name) {
                binding.storage = storage;
                return true;
            }
        }

        false
    }

    /// The frame of the innermost enclosing function, if any.
    pub fn function_frame(&self) -> Option<&FunctionFrame> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.function.as_ref())
    }

    pub fn function_frame_mut(&mut self) -> Option<&mut FunctionFrame> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.function.as_mut())
    }
}

impl TypeNames for ScopeStack {
    fn is_type_name(&self, name: &str) -> bool {
        self.is_basic_type(name).is_some()
    }
}
