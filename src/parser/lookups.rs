use std::collections::HashMap;

use lazy_static::lazy_static;

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Associativity {
    LeftToRight,
    RightToLeft,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum BinaryOperator {
    Member,
    Multiply,
    Divide,
    Remainder,
    Add,
    Subtract,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    Equals,
    NotEquals,
    SameReference,
    DifferentReference,
    And,
    Or,
    Assignment,
    AddAssignment,
    SubtractAssignment,
    MultiplyAssignment,
    DivideAssignment,
    RemainderAssignment,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum UnaryOperator {
    Negate,
    Not,
    Increment,
    Decrement,
}

lazy_static! {
    pub static ref BINARY_LOOKUP: HashMap<&'static str, BinaryOperator> = {
        let mut map = HashMap::new();
        map.insert(".", BinaryOperator::Member);
        map.insert("*", BinaryOperator::Multiply);
        map.insert("/", BinaryOperator::Divide);
        map.insert("%", BinaryOperator::Remainder);
        map.insert("+", BinaryOperator::Add);
        map.insert("-", BinaryOperator::Subtract);
        map.insert("<", BinaryOperator::Less);
        map.insert("<=", BinaryOperator::LessEquals);
        map.insert(">", BinaryOperator::Greater);
        map.insert(">=", BinaryOperator::GreaterEquals);
        map.insert("==", BinaryOperator::Equals);
        map.insert("!=", BinaryOperator::NotEquals);
        map.insert("===", BinaryOperator::SameReference);
        map.insert("!==", BinaryOperator::DifferentReference);
        map.insert("&&", BinaryOperator::And);
        map.insert("||", BinaryOperator::Or);
        map.insert("=", BinaryOperator::Assignment);
        map.insert("+=", BinaryOperator::AddAssignment);
        map.insert("-=", BinaryOperator::SubtractAssignment);
        map.insert("*=", BinaryOperator::MultiplyAssignment);
        map.insert("/=", BinaryOperator::DivideAssignment);
        map.insert("%=", BinaryOperator::RemainderAssignment);
        map
    };
    pub static ref UNARY_LOOKUP: HashMap<&'static str, UnaryOperator> = {
        let mut map = HashMap::new();
        map.insert("-", UnaryOperator::Negate);
        map.insert("!", UnaryOperator::Not);
        map.insert("++", UnaryOperator::Increment);
        map.insert("--", UnaryOperator::Decrement);
        map
    };
}

impl BinaryOperator {
    pub fn priority(self) -> u8 {
        match self {
            BinaryOperator::Member => 80,
            BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Remainder => 70,
            BinaryOperator::Add | BinaryOperator::Subtract => 60,
            BinaryOperator::Less
            | BinaryOperator::LessEquals
            | BinaryOperator::Greater
            | BinaryOperator::GreaterEquals => 50,
            BinaryOperator::Equals
            | BinaryOperator::NotEquals
            | BinaryOperator::SameReference
            | BinaryOperator::DifferentReference => 40,
            BinaryOperator::And => 30,
            BinaryOperator::Or => 20,
            BinaryOperator::Assignment
            | BinaryOperator::AddAssignment
            | BinaryOperator::SubtractAssignment
            | BinaryOperator::MultiplyAssignment
            | BinaryOperator::DivideAssignment
            | BinaryOperator::RemainderAssignment => 10,
        }
    }

    pub fn associativity(self) -> Associativity {
        if self.priority() == 10 {
            Associativity::RightToLeft
        } else {
            Associativity::LeftToRight
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Member => ".",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Remainder => "%",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEquals => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEquals => ">=",
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::SameReference => "===",
            BinaryOperator::DifferentReference => "!==",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
            BinaryOperator::Assignment => "=",
            BinaryOperator::AddAssignment => "+=",
            BinaryOperator::SubtractAssignment => "-=",
            BinaryOperator::MultiplyAssignment => "*=",
            BinaryOperator::DivideAssignment => "/=",
            BinaryOperator::RemainderAssignment => "%=",
        }
    }

    /// The arithmetic a compound assignment performs in place.
    pub fn compound_base(self) -> Option<BinaryOperator> {
        match self {
            BinaryOperator::AddAssignment => Some(BinaryOperator::Add),
            BinaryOperator::SubtractAssignment => Some(BinaryOperator::Subtract),
            BinaryOperator::MultiplyAssignment => Some(BinaryOperator::Multiply),
            BinaryOperator::DivideAssignment => Some(BinaryOperator::Divide),
            BinaryOperator::RemainderAssignment => Some(BinaryOperator::Remainder),
            _ => None,
        }
    }

    /// Whether the left operand is written to.
    pub fn writes_left(self) -> bool {
        self == BinaryOperator::Assignment || self.compound_base().is_some()
    }

    /// Whether the operands must stay named variables rather than values.
    pub fn needs_named_operands(self) -> bool {
        self.writes_left()
            || matches!(
                self,
                BinaryOperator::SameReference | BinaryOperator::DifferentReference
            )
    }
}

impl UnaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Negate => "-",
            UnaryOperator::Not => "!",
            UnaryOperator::Increment => "++",
            UnaryOperator::Decrement => "--",
        }
    }

    pub fn writes_operand(self) -> bool {
        matches!(self, UnaryOperator::Increment | UnaryOperator::Decrement)
    }
}
