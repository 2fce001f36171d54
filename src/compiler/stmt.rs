use log::debug;

use crate::{
    ast::{
        expressions::{Expression, Location},
        statements::{FunctionInfo, VariableAssignment},
    },
    errors::errors::Error,
    parser::parser::Parser,
    type_checker::{scope::Binding, types::Type},
    MK_ERROR,
};

use super::expr::reduce;

fn type_mismatch(parser: &Parser, expected: &Type, received: &Type) -> Error {
    MK_ERROR!(
        parser.get_position(),
        TypeMatchError {
            expected: expected.to_string(),
            received: received.to_string()
        }
    )
}

/// Lowers a declaration and makes the new name visible in the current scope.
///
/// References and function-typed names alias the storage or label they are
/// initialised from; everything else gets fresh storage holding a converted
/// copy of the initialiser.
pub fn gen_declaration(parser: &mut Parser, declaration: VariableAssignment) -> Result<(), Error> {
    let VariableAssignment {
        ty,
        name,
        storage,
        value,
    } = declaration;

    let value = match value {
        Some(expression) => Some(reduce(parser, expression)?),
        None => None,
    };

    let ty = match (ty, &value) {
        (Some(ty), _) => ty,
        (None, Some(value)) => {
            let inferred = value.ty.strip().clone();
            if inferred.is_void() || inferred == Type::NULL {
                return Err(MK_ERROR!(parser.get_position(), ExpectedExplicitValue));
            }
            inferred
        }
        (None, None) => return Err(MK_ERROR!(parser.get_position(), ExpectedExplicitValue)),
    };

    if let Type::Class(class) = ty.strip() {
        return Err(MK_ERROR!(
            parser.get_position(),
            NotImplemented {
                feature: format!("instances of class `{}`", class.name)
            }
        ));
    }

    let binding_storage = if ty.as_function().is_some() || ty.is_reference() {
        let value = match value {
            Some(value) => value,
            None => {
                return Err(MK_ERROR!(
                    parser.get_position(),
                    UnexpectedTokenDetailed {
                        token: name,
                        message: format!("a `{}` must be bound when it is declared", ty)
                    }
                ))
            }
        };

        match &value.location {
            Location::Label(label) if value.ty == ty => label.clone(),
            Location::Named {
                storage, declared, ..
            } if ty.is_reference() && declared.strip() == ty.strip() => storage.clone(),
            Location::Named {
                storage, declared, ..
            } if *declared.strip() == ty => storage.clone(),
            _ => return Err(type_mismatch(parser, &ty, &value.ty)),
        }
    } else {
        match value {
            Some(value) => {
                let received = value.ty.clone();
                let converted = parser
                    .compiler
                    .convert(value, &ty, true)
                    .ok_or_else(|| type_mismatch(parser, &ty, &received))?;
                parser.compiler.store(&converted, &storage, true);
            }
            None => parser
                .compiler
                .emit(format!("dvar {} {}", storage, ty.zero_value())),
        }
        storage
    };

    debug!("declare `{}: {}` in {}", name, ty, binding_storage);
    parser.scopes.declare_variable(Binding {
        name,
        storage: binding_storage,
        ty,
    });

    Ok(())
}

/// Stores the returned value in the function's return slot and jumps to its
/// exit label.
pub fn gen_return(parser: &mut Parser, expression: Option<Expression>) -> Result<(), Error> {
    let (label, return_type) = match parser.scopes.function_frame() {
        Some(frame) => (frame.label.clone(), frame.return_type.clone()),
        None => return Err(MK_ERROR!(parser.get_position(), ReturnOutsideFunction)),
    };

    match expression {
        Some(expression) => {
            let value = reduce(parser, expression)?;
            if return_type.is_void() {
                return Err(type_mismatch(parser, &return_type, &value.ty));
            }

            let received = value.ty.clone();
            let converted = parser
                .compiler
                .convert(value, &return_type, true)
                .ok_or_else(|| type_mismatch(parser, &return_type, &received))?;
            parser
                .compiler
                .store(&converted, &format!("{}_ret", label), false);
        }
        None if !return_type.is_void() => {
            return Err(type_mismatch(parser, &return_type, &Type::VOID));
        }
        None => {}
    }

    parser.compiler.emit(format!("jmp {}_end", label));
    if let Some(frame) = parser.scopes.function_frame_mut() {
        frame.returned = true;
    }

    Ok(())
}

/// Lowers a branch or loop condition and emits the jump taken when it is
/// false.
pub fn gen_condition(
    parser: &mut Parser,
    expression: Expression,
    false_label: &str,
) -> Result<(), Error> {
    let value = reduce(parser, expression)?;
    if *value.ty.strip() != Type::BOOL {
        return Err(type_mismatch(parser, &Type::BOOL, &value.ty));
    }

    parser
        .compiler
        .emit(format!("sje {} {} sint:0", false_label, value.ir));
    Ok(())
}

/// Wraps a finished function body into its region and files it with the
/// other regions.
pub fn gen_function_region(parser: &mut Parser, info: &FunctionInfo, body: Vec<String>) {
    let mut region = vec![];
    if !info.return_type.is_void() {
        region.push(format!(
            "dvar {} {}",
            info.return_slot(),
            info.return_type.zero_value()
        ));
    }
    region.push(info.header());
    region.extend(body);
    region.push(format!("label {}", info.exit_label()));
    region.push(String::from("endfunc"));

    debug!(
        "function region {} `{}` with {} line(s)",
        info.label,
        info.ty,
        region.len()
    );
    parser.compiler.functions.extend(region);
}
