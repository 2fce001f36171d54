//! Type system definitions.
//!
//! Types are a closed sum: primitives, a reference variant of another type,
//! structurally compared function signatures and user classes. Classes
//! compare by identity, everything else structurally.

use std::{cell::RefCell, fmt::Display, rc::Rc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    I32,
    F64,
    Bool,
    String,
    Void,
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Primitive(Primitive),
    Reference(Box<Type>),
    Function(Rc<FunctionType>),
    Class(Rc<ClassType>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub return_type: Type,
    pub parameters: Vec<Type>,
}

/// A user class. Only the name and member declarations are recorded.
#[derive(Debug)]
pub struct ClassType {
    pub name: String,
    pub fields: RefCell<Vec<(String, Type)>>,
}

impl PartialEq for ClassType {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl ClassType {
    pub fn new(name: String) -> Self {
        ClassType {
            name,
            fields: RefCell::new(vec![]),
        }
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.borrow().iter().any(|(field, _)| field == name)
    }
}

/// How a value of one type becomes a value of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    Identity,
    IntToDouble,
    DoubleToInt,
    BoolToInt,
    BoolToDouble,
}

impl Type {
    pub const I32: Type = Type::Primitive(Primitive::I32);
    pub const F64: Type = Type::Primitive(Primitive::F64);
    pub const BOOL: Type = Type::Primitive(Primitive::Bool);
    pub const STRING: Type = Type::Primitive(Primitive::String);
    pub const VOID: Type = Type::Primitive(Primitive::Void);
    pub const NULL: Type = Type::Primitive(Primitive::Null);

    pub fn function(return_type: Type, parameters: Vec<Type>) -> Type {
        Type::Function(Rc::new(FunctionType {
            return_type,
            parameters,
        }))
    }

    /// The reference variant of this type. References of references collapse.
    pub fn reference(&self) -> Type {
        match self {
            Type::Reference(_) => self.clone(),
            _ => Type::Reference(Box::new(self.clone())),
        }
    }

    /// The value type behind a reference, or the type itself.
    pub fn strip(&self) -> &Type {
        match self {
            Type::Reference(inner) => inner,
            _ => self,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Type::Reference(_))
    }

    pub fn is_void(&self) -> bool {
        *self == Type::VOID
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.strip(), Type::Primitive(Primitive::I32 | Primitive::F64))
    }

    /// Types a reference may point at.
    pub fn can_be_referenced(&self) -> bool {
        match self {
            Type::Primitive(primitive) => {
                !matches!(primitive, Primitive::Void | Primitive::Null)
            }
            Type::Reference(_) | Type::Function(_) => false,
            Type::Class(_) => true,
        }
    }

    /// The value tag the assembler uses for storage of this type.
    pub fn ir_kind(&self) -> &'static str {
        match self {
            Type::Primitive(Primitive::F64) => "dbl",
            Type::Primitive(Primitive::String) => "str",
            Type::Primitive(_) => "sint",
            Type::Reference(_) | Type::Function(_) | Type::Class(_) => "sym",
        }
    }

    /// The immediate a fresh slot of this type is declared with.
    pub fn zero_value(&self) -> String {
        match self.strip() {
            Type::Primitive(Primitive::F64) => String::from("dbl:0"),
            Type::Primitive(Primitive::String) => String::from("str:null"),
            Type::Primitive(Primitive::I32 | Primitive::Bool) => String::from("sint:0"),
            _ => String::from("sint:null"),
        }
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match self.strip() {
            Type::Function(function) => Some(function),
            _ => None,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Primitive(primitive) => write!(
                f,
                "{}",
                match primitive {
                    Primitive::I32 => "i32",
                    Primitive::F64 => "f64",
                    Primitive::Bool => "bool",
                    Primitive::String => "string",
                    Primitive::Void => "void",
                    Primitive::Null => "null",
                }
            ),
            Type::Reference(inner) => write!(f, "{}&", inner),
            Type::Function(function) => {
                write!(f, "{}(", function.return_type)?;
                for (index, parameter) in function.parameters.iter().enumerate() {
                    if index > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", parameter)?;
                }
                write!(f, ")")
            }
            Type::Class(class) => write!(f, "{}", class.name),
        }
    }
}

/// Finds the conversion from `from` to `to`, comparing value types.
///
/// Implicit conversions are identity and int to double; explicit ones also
/// allow double to int, bool to int and bool to double.
pub fn find_conversion(from: &Type, to: &Type, explicit: bool) -> Option<Conversion> {
    let (from, to) = (from.strip(), to.strip());

    if from == to {
        return Some(Conversion::Identity);
    }

    match (from, to) {
        (Type::Primitive(Primitive::I32), Type::Primitive(Primitive::F64)) => {
            Some(Conversion::IntToDouble)
        }
        (Type::Primitive(Primitive::F64), Type::Primitive(Primitive::I32)) if explicit => {
            Some(Conversion::DoubleToInt)
        }
        (Type::Primitive(Primitive::Bool), Type::Primitive(Primitive::I32)) if explicit => {
            Some(Conversion::BoolToInt)
        }
        (Type::Primitive(Primitive::Bool), Type::Primitive(Primitive::F64)) if explicit => {
            Some(Conversion::BoolToDouble)
        }
        _ => None,
    }
}
