use crate::{
    parser::lookups::{BinaryOperator, UnaryOperator},
    type_checker::{scope::Binding, types::Type},
};

/// Where a lowered value lives once its code has run.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    /// Storage reachable through a source-level name. `declared` is the
    /// binding's type, which tells references apart from plain variables.
    Named {
        name: String,
        storage: String,
        declared: Type,
    },
    Temporary(String),
    Immediate,
    /// Entry label of a function region.
    Label(String),
}

/// The result of lowering an operand: an IR value operand plus its type.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub ir: String,
    pub ty: Type,
    pub location: Location,
}

impl Value {
    pub fn immediate(ir: String, ty: Type) -> Self {
        Value {
            ir,
            ty,
            location: Location::Immediate,
        }
    }

    pub fn temporary(name: String, ty: Type) -> Self {
        Value {
            ir: format!("sym:{}", name),
            ty,
            location: Location::Temporary(name),
        }
    }

    pub fn named(binding: &Binding) -> Self {
        Value {
            ir: format!("sym:{}", binding.storage),
            ty: binding.ty.clone(),
            location: Location::Named {
                name: binding.name.clone(),
                storage: binding.storage.clone(),
                declared: binding.ty.clone(),
            },
        }
    }

    pub fn label(label: String, ty: Type) -> Self {
        Value {
            ir: label.clone(),
            ty,
            location: Location::Label(label),
        }
    }

    /// The same location seen through a different type.
    pub fn retyped(self, ty: Type) -> Self {
        Value { ty, ..self }
    }

    pub fn is_named(&self) -> bool {
        matches!(self.location, Location::Named { .. })
    }

    /// Storage the value can be copied out of with `cvar`.
    pub fn source_storage(&self) -> Option<&str> {
        match &self.location {
            Location::Named { storage, .. } => Some(storage),
            Location::Temporary(name) => Some(name),
            Location::Immediate | Location::Label(_) => None,
        }
    }
}

/// Code captured while parsing, replayed where the operand is used.
#[derive(Debug, Clone, PartialEq)]
pub struct Lowered {
    pub code: Vec<String>,
    pub result: Value,
    /// Whether the code may write to named storage.
    pub effects: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Variable(Binding),
    Literal {
        ir: String,
        ty: Type,
    },
    /// A function literal or a named function's entry label.
    Function {
        label: String,
        ty: Type,
    },
    Call(Lowered),
    SubExpression(Lowered),
    /// The unvalidated right-hand side of a member access.
    Member(String),
    Unary {
        operator: UnaryOperator,
        operand: Box<Operand>,
    },
    /// An intermediate result whose code has already been emitted.
    Resolved(Value),
}

impl Operand {
    /// Whether lowering the operand may change a variable that another
    /// operand of the same expression reads.
    pub fn has_effects(&self) -> bool {
        match self {
            Operand::Call(_) => true,
            Operand::SubExpression(lowered) => lowered.effects,
            Operand::Unary { operator, operand } => {
                operator.writes_operand() || operand.has_effects()
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Operand(Operand),
    Unary(UnaryOperator),
    Binary(BinaryOperator),
}

/// A validated operator/operand sequence, in source order until the
/// shunting-yard pass reorders it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Expression {
    pub items: Vec<Item>,
}

impl Expression {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_effects(&self) -> bool {
        self.items.iter().any(|item| match item {
            Item::Operand(operand) => operand.has_effects(),
            Item::Unary(operator) => operator.writes_operand(),
            Item::Binary(operator) => operator.writes_left(),
        })
    }
}
