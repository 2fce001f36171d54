use std::collections::HashSet;

use crate::{
    ast::expressions::{Expression, Item, Location, Operand, Value},
    errors::errors::Error,
    parser::{
        lookups::{BinaryOperator, UnaryOperator},
        parser::Parser,
        shunting_yard::shunting_yard,
    },
    type_checker::types::{find_conversion, Type},
    MK_ERROR,
};

impl Operand {
    /// The type the operand will have once lowered, if it can be told
    /// without emitting code.
    pub fn get_type(&self) -> Option<Type> {
        match self {
            Operand::Variable(binding) => Some(binding.ty.clone()),
            Operand::Literal { ty, .. } | Operand::Function { ty, .. } => Some(ty.clone()),
            Operand::Call(lowered) | Operand::SubExpression(lowered) => {
                Some(lowered.result.ty.clone())
            }
            Operand::Resolved(value) => Some(value.ty.clone()),
            Operand::Member(_) => None,
            Operand::Unary { operator, operand } => {
                let inner = operand.get_type()?;
                Some(match operator {
                    UnaryOperator::Negate => inner.strip().clone(),
                    UnaryOperator::Not => Type::BOOL,
                    UnaryOperator::Increment | UnaryOperator::Decrement => inner.reference(),
                })
            }
        }
    }

    /// Lowers the operand for reading. Variables and literals emit nothing;
    /// captured call and sub-expression code is spliced in here.
    pub fn fetch_value(self, parser: &mut Parser) -> Result<Value, Error> {
        match self {
            // The binding as it was when the name was read, so that a rebind
            // later in the same expression does not reach back.
            Operand::Variable(binding) => Ok(Value::named(&binding)),
            Operand::Literal { ir, ty } => Ok(Value::immediate(ir, ty)),
            Operand::Function { label, ty } => Ok(Value::label(label, ty)),
            Operand::Call(lowered) | Operand::SubExpression(lowered) => {
                parser.compiler.emit_all(lowered.code);
                Ok(lowered.result)
            }
            Operand::Member(_) => Err(MK_ERROR!(
                parser.get_position(),
                NotImplemented {
                    feature: String::from("member access")
                }
            )),
            Operand::Unary { operator, operand } => gen_unary(parser, operator, *operand),
            Operand::Resolved(value) => Ok(value),
        }
    }

    /// Lowers the operand into storage nothing else refers to.
    pub fn fetch_owned_copy(self, parser: &mut Parser) -> Result<Value, Error> {
        let value = self.fetch_value(parser)?;
        Ok(parser.compiler.owned_copy(value))
    }
}

/// Reorders `expression` and lowers it to a single value.
pub fn reduce(parser: &mut Parser, expression: Expression) -> Result<Value, Error> {
    reduce_to_operand(parser, expression)?.fetch_value(parser)
}

/// Like `reduce`, but the result never aliases a named variable.
pub fn reduce_owned(parser: &mut Parser, expression: Expression) -> Result<Value, Error> {
    reduce_to_operand(parser, expression)?.fetch_owned_copy(parser)
}

/// Postfix positions of operands that an operator writes to or compares by
/// identity. These have to stay named variables.
fn pinned_operands(postfix: &[Item]) -> HashSet<usize> {
    let mut stack: Vec<Option<usize>> = vec![];
    let mut pinned = HashSet::new();

    for (index, item) in postfix.iter().enumerate() {
        match item {
            Item::Operand(_) => stack.push(Some(index)),
            Item::Binary(operator) => {
                let right = stack.pop().flatten();
                let left = stack.pop().flatten();
                if operator.needs_named_operands() {
                    pinned.extend(left);
                }
                if !operator.writes_left() && operator.needs_named_operands() {
                    pinned.extend(right);
                }
                stack.push(None);
            }
            Item::Unary(_) => {}
        }
    }

    pinned
}

/// Evaluates every pending operand that is not pinned, in source order,
/// into a value of its own. Used before code that may write a variable one
/// of them still has to read.
fn settle_pending(parser: &mut Parser, stack: &mut [(Operand, bool)]) -> Result<(), Error> {
    for (operand, pinned) in stack.iter_mut() {
        let pending = matches!(
            operand,
            Operand::Variable(_)
                | Operand::Unary { .. }
                | Operand::Call(_)
                | Operand::SubExpression(_)
        );
        if *pinned || !pending {
            continue;
        }

        let taken = std::mem::replace(operand, Operand::Member(String::new()));
        *operand = Operand::Resolved(taken.fetch_owned_copy(parser)?);
    }

    Ok(())
}

fn reduce_to_operand(parser: &mut Parser, expression: Expression) -> Result<Operand, Error> {
    let position = parser.get_position();
    let postfix = shunting_yard(expression.items, &position)?;
    let pinned = pinned_operands(&postfix);
    let mut stack: Vec<(Operand, bool)> = vec![];

    for (index, item) in postfix.into_iter().enumerate() {
        match item {
            Item::Operand(operand) => stack.push((operand, pinned.contains(&index))),
            Item::Binary(operator) => {
                let (left, right) = match (stack.pop(), stack.pop()) {
                    (Some((right, _)), Some((left, _))) => (left, right),
                    _ => return Err(MK_ERROR!(position, ExpectedExpression)),
                };
                if left.has_effects() || right.has_effects() {
                    settle_pending(parser, &mut stack)?;
                }
                let value = gen_binary(parser, operator, left, right)?;
                stack.push((Operand::Resolved(value), false));
            }
            Item::Unary(operator) => {
                return Err(MK_ERROR!(
                    position,
                    UnexpectedToken {
                        token: operator.symbol().to_string()
                    }
                ))
            }
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some((operand, _)), true) => Ok(operand),
        _ => Err(MK_ERROR!(position, ExpectedExpression)),
    }
}

fn incompatible(parser: &Parser, operator: &str, left: &Type, right: &Type) -> Error {
    MK_ERROR!(
        parser.get_position(),
        IncompatibleOperands {
            operator: operator.to_string(),
            left: left.to_string(),
            right: right.to_string()
        }
    )
}

pub fn gen_binary(
    parser: &mut Parser,
    operator: BinaryOperator,
    left: Operand,
    right: Operand,
) -> Result<Value, Error> {
    if operator == BinaryOperator::Member {
        return Err(MK_ERROR!(
            parser.get_position(),
            NotImplemented {
                feature: String::from("member access")
            }
        ));
    }

    // Left to right: a right operand that writes a variable must not change
    // what the left one already read.
    let right_effects = right.has_effects();
    let mut left = left.fetch_value(parser)?;
    if right_effects && left.is_named() && !operator.needs_named_operands() {
        left = parser.compiler.owned_copy(left);
    }
    let right = right.fetch_value(parser)?;

    match operator {
        BinaryOperator::Assignment => gen_assignment(parser, left, right),
        BinaryOperator::AddAssignment
        | BinaryOperator::SubtractAssignment
        | BinaryOperator::MultiplyAssignment
        | BinaryOperator::DivideAssignment
        | BinaryOperator::RemainderAssignment => {
            gen_compound_assignment(parser, operator, left, right)
        }
        BinaryOperator::SameReference | BinaryOperator::DifferentReference => {
            gen_reference_identity(parser, operator, left, right)
        }
        BinaryOperator::And | BinaryOperator::Or => gen_logical(parser, operator, left, right),
        BinaryOperator::Add
        | BinaryOperator::Subtract
        | BinaryOperator::Multiply
        | BinaryOperator::Divide
        | BinaryOperator::Remainder => gen_arithmetic(parser, operator, left, right),
        _ => gen_comparison(parser, operator, left, right),
    }
}

/// Brings both numeric operands to a common type. Returns the IR type
/// prefix (`s` or `d`) with the promoted operands.
fn promote(
    parser: &mut Parser,
    operator: BinaryOperator,
    left: Value,
    right: Value,
) -> Result<(&'static str, Value, Value), Error> {
    let (left_type, right_type) = (left.ty.strip().clone(), right.ty.strip().clone());

    if !left_type.is_numeric() || !right_type.is_numeric() {
        return Err(incompatible(parser, operator.symbol(), &left_type, &right_type));
    }

    if left_type != Type::F64 && right_type != Type::F64 {
        return Ok(("s", left, right));
    }

    let left = parser.compiler.convert(left, &Type::F64, false);
    let right = parser.compiler.convert(right, &Type::F64, false);
    match (left, right) {
        (Some(left), Some(right)) => Ok(("d", left, right)),
        _ => Err(incompatible(parser, operator.symbol(), &left_type, &right_type)),
    }
}

fn arithmetic_mnemonic(operator: BinaryOperator) -> &'static str {
    match operator {
        BinaryOperator::Add => "add",
        BinaryOperator::Subtract => "sub",
        BinaryOperator::Multiply => "mul",
        _ => "div",
    }
}

pub fn gen_arithmetic(
    parser: &mut Parser,
    operator: BinaryOperator,
    left: Value,
    right: Value,
) -> Result<Value, Error> {
    if operator == BinaryOperator::Remainder
        && (*left.ty.strip() != Type::I32 || *right.ty.strip() != Type::I32)
    {
        return Err(incompatible(parser, "%", left.ty.strip(), right.ty.strip()));
    }

    let (prefix, left, right) = promote(parser, operator, left, right)?;
    let ty = left.ty.strip().clone();
    let mnemonic = arithmetic_mnemonic(operator);
    let destination = parser.compiler.fresh_temp();

    match operator {
        BinaryOperator::Divide => {
            let remainder = parser.compiler.fresh_temp();
            parser.compiler.emit(format!(
                "{}{} {} {} {} {}",
                prefix, mnemonic, left.ir, right.ir, destination, remainder
            ));
        }
        BinaryOperator::Remainder => {
            let quotient = parser.compiler.fresh_temp();
            parser.compiler.emit(format!(
                "sdiv {} {} {} {}",
                left.ir, right.ir, quotient, destination
            ));
        }
        _ => parser.compiler.emit(format!(
            "{}{} {} {} {}",
            prefix, mnemonic, left.ir, right.ir, destination
        )),
    }

    Ok(Value::temporary(destination, ty))
}

fn jump_condition(operator: BinaryOperator) -> &'static str {
    match operator {
        BinaryOperator::Less => "l",
        BinaryOperator::LessEquals => "le",
        BinaryOperator::Greater => "g",
        BinaryOperator::GreaterEquals => "ge",
        BinaryOperator::NotEquals => "ne",
        _ => "e",
    }
}

pub fn gen_comparison(
    parser: &mut Parser,
    operator: BinaryOperator,
    left: Value,
    right: Value,
) -> Result<Value, Error> {
    let equality = matches!(operator, BinaryOperator::Equals | BinaryOperator::NotEquals);
    let numeric = left.ty.is_numeric() && right.ty.is_numeric();

    let (prefix, left, right) = if numeric || !equality {
        promote(parser, operator, left, right)?
    } else {
        let comparable = find_conversion(&left.ty, &right.ty, false)
            .is_some()
            || find_conversion(&right.ty, &left.ty, false).is_some();
        if !comparable {
            return Err(incompatible(
                parser,
                operator.symbol(),
                left.ty.strip(),
                right.ty.strip(),
            ));
        }
        ("s", left, right)
    };

    let destination = parser.compiler.fresh_temp();
    let label = parser.compiler.fresh_label();
    parser
        .compiler
        .emit(format!("dvar {} sint:1", destination));
    parser.compiler.emit(format!(
        "{}j{} {} {} {}",
        prefix,
        jump_condition(operator),
        label,
        left.ir,
        right.ir
    ));
    parser
        .compiler
        .emit(format!("dvar {} sint:0", destination));
    parser.compiler.emit(format!("label {}", label));

    Ok(Value::temporary(destination, Type::BOOL))
}

/// `&&` and `||` over already evaluated operands.
pub fn gen_logical(
    parser: &mut Parser,
    operator: BinaryOperator,
    left: Value,
    right: Value,
) -> Result<Value, Error> {
    if *left.ty.strip() != Type::BOOL || *right.ty.strip() != Type::BOOL {
        return Err(incompatible(
            parser,
            operator.symbol(),
            left.ty.strip(),
            right.ty.strip(),
        ));
    }

    let (initial, jump, settled) = match operator {
        BinaryOperator::And => (0, "sje", 1),
        _ => (1, "sjne", 0),
    };

    let destination = parser.compiler.fresh_temp();
    let label = parser.compiler.fresh_label();
    parser
        .compiler
        .emit(format!("dvar {} sint:{}", destination, initial));
    for operand in [&left, &right] {
        parser
            .compiler
            .emit(format!("{} {} {} sint:0", jump, label, operand.ir));
    }
    parser
        .compiler
        .emit(format!("dvar {} sint:{}", destination, settled));
    parser.compiler.emit(format!("label {}", label));

    Ok(Value::temporary(destination, Type::BOOL))
}

/// `===` and `!==`: whether two reference variables share storage. Decided
/// at compile time because references are resolved statically.
pub fn gen_reference_identity(
    parser: &mut Parser,
    operator: BinaryOperator,
    left: Value,
    right: Value,
) -> Result<Value, Error> {
    let storage = |value: &Value| match &value.location {
        Location::Named {
            storage, declared, ..
        } if declared.is_reference() => Some(storage.clone()),
        _ => None,
    };

    let (left_storage, right_storage) = match (storage(&left), storage(&right)) {
        (Some(left), Some(right)) => (left, right),
        _ => {
            return Err(MK_ERROR!(
                parser.get_position(),
                ReferenceComparison {
                    operator: operator.symbol().to_string()
                }
            ))
        }
    };

    if left.ty.strip() != right.ty.strip() {
        return Err(incompatible(
            parser,
            operator.symbol(),
            left.ty.strip(),
            right.ty.strip(),
        ));
    }

    let same = left_storage == right_storage;
    let result = if operator == BinaryOperator::SameReference {
        same
    } else {
        !same
    };

    Ok(Value::immediate(
        format!("sint:{}", result as i32),
        Type::BOOL,
    ))
}

/// Points `name` at `target`. Only straight-line code in the declaring block
/// may do this, since the binding is resolved while compiling.
fn rebind(parser: &mut Parser, name: &str, target: String) -> Result<(), Error> {
    if parser.scopes.declared_at(name) != Some(parser.scopes.depth()) {
        return Err(MK_ERROR!(
            parser.get_position(),
            NestedRebind {
                name: name.to_string()
            }
        ));
    }

    parser.scopes.rebind(name, target);
    Ok(())
}

pub fn gen_assignment(parser: &mut Parser, left: Value, right: Value) -> Result<Value, Error> {
    let (name, storage, declared) = match &left.location {
        Location::Named {
            name,
            storage,
            declared,
        } => (name.clone(), storage.clone(), declared.clone()),
        _ => {
            return Err(MK_ERROR!(
                parser.get_position(),
                NotAssignable { target: left.ir }
            ))
        }
    };

    if declared.as_function().is_some() {
        let target = match &right.location {
            Location::Label(label) if right.ty == declared => label.clone(),
            Location::Named { storage, .. } if *right.ty.strip() == declared => storage.clone(),
            _ => {
                return Err(MK_ERROR!(
                    parser.get_position(),
                    TypeMatchError {
                        expected: declared.to_string(),
                        received: right.ty.to_string()
                    }
                ))
            }
        };
        rebind(parser, &name, target.clone())?;
        return Ok(Value::label(target, declared));
    }

    if declared.is_reference() {
        if let Location::Named {
            storage: source,
            declared: source_declared,
            ..
        } = &right.location
        {
            if source_declared.strip() != declared.strip() {
                return Err(MK_ERROR!(
                    parser.get_position(),
                    TypeMatchError {
                        expected: declared.to_string(),
                        received: source_declared.to_string()
                    }
                ));
            }

            let source = source.clone();
            rebind(parser, &name, source.clone())?;
            let value = Value {
                ir: format!("sym:{}", source),
                ty: declared.strip().clone(),
                location: Location::Named {
                    name,
                    storage: source,
                    declared: declared.clone(),
                },
            };
            return Ok(value);
        }
    }

    // Plain variables get a converted copy; references written from a
    // temporary or an immediate update the storage they are bound to.
    let right_type = right.ty.clone();
    let converted = parser
        .compiler
        .convert(right, &declared, true)
        .ok_or_else(|| incompatible(parser, "=", &declared, &right_type))?;
    parser.compiler.store(&converted, &storage, false);

    let result_type = if declared.is_reference() {
        declared.strip().clone()
    } else {
        declared.reference()
    };
    Ok(left.retyped(result_type))
}

pub fn gen_compound_assignment(
    parser: &mut Parser,
    operator: BinaryOperator,
    left: Value,
    right: Value,
) -> Result<Value, Error> {
    let storage = match &left.location {
        Location::Named { storage, .. } => storage.clone(),
        _ => {
            return Err(MK_ERROR!(
                parser.get_position(),
                NotAssignable { target: left.ir }
            ))
        }
    };

    let base = operator.compound_base().unwrap_or(BinaryOperator::Add);
    let (destination_type, right_type) = (left.ty.strip().clone(), right.ty.strip().clone());

    // The destination is modified in place, so only the right side may be
    // promoted.
    let legal = destination_type.is_numeric()
        && right_type.is_numeric()
        && !(destination_type == Type::I32 && right_type == Type::F64)
        && (base != BinaryOperator::Remainder
            || (destination_type == Type::I32 && right_type == Type::I32));
    if !legal {
        return Err(incompatible(
            parser,
            operator.symbol(),
            &destination_type,
            &right_type,
        ));
    }

    let (prefix, left, right) = promote(parser, operator, left, right)?;
    let mnemonic = arithmetic_mnemonic(base);

    match base {
        BinaryOperator::Divide => {
            let remainder = parser.compiler.fresh_temp();
            parser.compiler.emit(format!(
                "{}div {} {} {} {}",
                prefix, left.ir, right.ir, storage, remainder
            ));
        }
        BinaryOperator::Remainder => {
            let quotient = parser.compiler.fresh_temp();
            parser.compiler.emit(format!(
                "sdiv {} {} {} {}",
                left.ir, right.ir, quotient, storage
            ));
        }
        _ => parser.compiler.emit(format!(
            "{}{} {} {} {}",
            prefix, mnemonic, left.ir, right.ir, storage
        )),
    }

    Ok(left.retyped(destination_type.reference()))
}

pub fn gen_unary(
    parser: &mut Parser,
    operator: UnaryOperator,
    operand: Operand,
) -> Result<Value, Error> {
    let value = operand.fetch_value(parser)?;
    let ty = value.ty.strip().clone();

    let mismatch = |parser: &Parser, expected: &str| {
        MK_ERROR!(
            parser.get_position(),
            TypeMatchError {
                expected: format!("{} operand of `{}`", expected, operator.symbol()),
                received: ty.to_string()
            }
        )
    };

    match operator {
        UnaryOperator::Negate => {
            if !ty.is_numeric() {
                return Err(mismatch(parser, "a numeric"));
            }
            let (prefix, zero) = if ty == Type::F64 {
                ("d", "dbl:0")
            } else {
                ("s", "sint:0")
            };
            let destination = parser.compiler.fresh_temp();
            parser.compiler.emit(format!(
                "{}sub {} {} {}",
                prefix, zero, value.ir, destination
            ));
            Ok(Value::temporary(destination, ty))
        }
        UnaryOperator::Not => {
            if ty != Type::BOOL {
                return Err(mismatch(parser, "a bool"));
            }
            let destination = parser.compiler.fresh_temp();
            parser
                .compiler
                .emit(format!("ssub sint:1 {} {}", value.ir, destination));
            Ok(Value::temporary(destination, Type::BOOL))
        }
        UnaryOperator::Increment | UnaryOperator::Decrement => {
            let storage = match &value.location {
                Location::Named { storage, .. } => storage.clone(),
                _ => {
                    return Err(MK_ERROR!(
                        parser.get_position(),
                        NotAssignable { target: value.ir }
                    ))
                }
            };
            if !ty.is_numeric() {
                return Err(mismatch(parser, "a numeric"));
            }

            let (prefix, one) = if ty == Type::F64 {
                ("d", "dbl:1")
            } else {
                ("s", "sint:1")
            };
            let mnemonic = if operator == UnaryOperator::Increment {
                "add"
            } else {
                "sub"
            };
            parser.compiler.emit(format!(
                "{}{} {} {} {}",
                prefix, mnemonic, value.ir, one, storage
            ));
            Ok(value.retyped(ty.reference()))
        }
    }
}
