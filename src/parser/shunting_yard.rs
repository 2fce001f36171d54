use crate::{
    ast::expressions::{Item, Operand},
    errors::errors::Error,
    Position, MK_ERROR,
};

use super::lookups::{Associativity, BinaryOperator, UnaryOperator};

/// Reorders an infix item sequence into postfix.
///
/// A unary operator is folded into the operand that follows it, so the
/// output only holds operands and binary operators.
pub fn shunting_yard(items: Vec<Item>, position: &Position) -> Result<Vec<Item>, Error> {
    let mut output = vec![];
    let mut operators: Vec<BinaryOperator> = vec![];
    let mut pending_unary: Option<UnaryOperator> = None;

    for item in items {
        match item {
            Item::Operand(operand) => {
                let operand = match pending_unary.take() {
                    Some(operator) => Operand::Unary {
                        operator,
                        operand: Box::new(operand),
                    },
                    None => operand,
                };
                output.push(Item::Operand(operand));
            }
            Item::Unary(operator) => {
                if pending_unary.is_some() {
                    return Err(MK_ERROR!(
                        position.clone(),
                        UnexpectedTokenDetailed {
                            token: operator.symbol().to_string(),
                            message: String::from("a unary operator cannot follow another")
                        }
                    ));
                }
                pending_unary = Some(operator);
            }
            Item::Binary(operator) => {
                if pending_unary.is_some() {
                    return Err(MK_ERROR!(
                        position.clone(),
                        UnexpectedTokenDetailed {
                            token: operator.symbol().to_string(),
                            message: String::from("a binary operator cannot follow a unary one")
                        }
                    ));
                }

                while let Some(top) = operators.last() {
                    let pops = top.priority() > operator.priority()
                        || (top.priority() == operator.priority()
                            && operator.associativity() == Associativity::LeftToRight);
                    if !pops {
                        break;
                    }
                    output.push(Item::Binary(*top));
                    operators.pop();
                }
                operators.push(operator);
            }
        }
    }

    if pending_unary.is_some() {
        return Err(MK_ERROR!(position.clone(), ExpectedExpression));
    }

    while let Some(operator) = operators.pop() {
        output.push(Item::Binary(operator));
    }

    Ok(output)
}
