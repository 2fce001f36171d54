use crate::type_checker::types::Type;

use super::expressions::Expression;

/// Signature and generated names of one function region.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionInfo {
    pub return_type: Type,
    pub parameters: Vec<Type>,
    pub ty: Type,
    pub label: String,
}

impl FunctionInfo {
    pub fn new(return_type: Type, parameters: Vec<Type>, label: String) -> Self {
        FunctionInfo {
            ty: Type::function(return_type.clone(), parameters.clone()),
            return_type,
            parameters,
            label,
        }
    }

    pub fn return_slot(&self) -> String {
        format!("{}_ret", self.label)
    }

    pub fn exit_label(&self) -> String {
        format!("{}_end", self.label)
    }

    pub fn parameter_storage(&self, index: usize) -> String {
        format!("{}_p{}", self.label, index)
    }

    /// The `dfunc` header line.
    pub fn header(&self) -> String {
        if self.parameters.is_empty() {
            return format!("dfunc {} null", self.label);
        }

        let parameters = self
            .parameters
            .iter()
            .enumerate()
            .map(|(index, parameter)| {
                format!("{}:{}", self.parameter_storage(index), parameter.ir_kind())
            })
            .collect::<Vec<_>>()
            .join("/");

        format!("dfunc {} {}", self.label, parameters)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableAssignment {
    /// `None` for `var` declarations, inferred from the initializer.
    pub ty: Option<Type>,
    pub name: String,
    pub storage: String,
    pub value: Option<Expression>,
}
