use std::{collections::HashSet, rc::Rc};

use log::{debug, trace};

use crate::{
    ast::statements::{FunctionInfo, VariableAssignment},
    compiler::{
        expr::reduce,
        stmt::{gen_condition, gen_declaration, gen_function_region, gen_return},
    },
    errors::errors::Error,
    type_checker::{
        scope::{Binding, FunctionFrame, Scope, ScopeKind},
        types::{ClassType, Type},
    },
    MK_ERROR,
};

use super::{
    expr::{parse_expression, parse_required_expression},
    parser::{Parser, Task},
};

/// Parses and lowers one statement, dispatching on its leading token.
pub fn parse_statement(parser: &mut Parser) -> Result<(), Error> {
    if let Task::Class(class) = parser.current_task() {
        let class = Rc::clone(class);
        return parse_member(parser, &class);
    }

    let token = parser.next_token()?;
    trace!("statement at line {} starts with {:?}", parser.get_position().0, token);

    match token.as_str() {
        ";" => return Ok(()),
        "class" => return parse_class(parser),
        "function" => return parse_function(parser, true).map(|_| ()),
        "return" => return parse_return(parser),
        "if" => return parse_if(parser),
        "while" => return parse_while(parser),
        "for" => return parse_for(parser),
        "else" | "elseif" => {
            return Err(MK_ERROR!(
                parser.get_position(),
                UnexpectedTokenDetailed {
                    token: token.clone(),
                    message: String::from("no `if` block precedes it")
                }
            ))
        }
        _ => {}
    }

    if is_declaration_start(parser, &token) {
        return parse_declaration(parser, token, ";");
    }

    parser.push_back(token);
    let parsed = parse_required_expression(parser)?;
    reduce(parser, parsed.expression)?;
    parser.expect(";")
}

fn is_declaration_start(parser: &Parser, token: &str) -> bool {
    token == "var" || parser.scopes.is_basic_type(token).is_some()
}

/// Statements up to and including the closing `}` of the current block.
pub fn parse_block_body(parser: &mut Parser) -> Result<(), Error> {
    loop {
        let token = parser.next_token()?;
        if token.is_empty() {
            return Err(MK_ERROR!(
                parser.get_position(),
                UnexpectedEof {
                    expected: String::from("`}`")
                }
            ));
        }
        if token == "}" {
            return Ok(());
        }

        parser.push_back(token);
        parse_statement(parser)?;
    }
}

fn parse_block(parser: &mut Parser, kind: ScopeKind) -> Result<(), Error> {
    parser.expect("{")?;
    parser.with_scope(Scope::new(kind), Task::Code, parse_block_body)
}

/// Reads a type that starts with `first`: a basic type, a reference, or a
/// function type written as `ret(t1,t2)`.
pub fn parse_type(parser: &mut Parser, first: &str) -> Result<Type, Error> {
    let next = parser.next_token()?;
    if next != "(" {
        parser.push_back(next);
        return parser.scopes.is_basic_type(first).ok_or_else(|| {
            MK_ERROR!(
                parser.get_position(),
                UnknownType {
                    type_: first.to_string()
                }
            )
        });
    }

    let mut name = format!("{}(", first);
    loop {
        let token = parser.next_token()?;
        match token.as_str() {
            ")" => break,
            "" => {
                return Err(MK_ERROR!(
                    parser.get_position(),
                    UnexpectedEof {
                        expected: String::from("`)`")
                    }
                ))
            }
            _ => name.push_str(&token),
        }
    }
    name.push(')');

    match parser.scopes.is_type(&name) {
        Ok(Some(ty)) => Ok(ty),
        Ok(None) => Err(MK_ERROR!(parser.get_position(), UnknownType { type_: name })),
        Err(offender) => Err(MK_ERROR!(
            parser.get_position(),
            UnknownType { type_: offender }
        )),
    }
}

fn parse_new_name(parser: &mut Parser) -> Result<String, Error> {
    let name = parser.next_token()?;
    if name.is_empty() {
        return Err(MK_ERROR!(
            parser.get_position(),
            UnexpectedEof {
                expected: String::from("a name")
            }
        ));
    }
    if !parser.scopes.is_legal_name(&name) {
        return Err(MK_ERROR!(parser.get_position(), InvalidName { name: name }));
    }

    Ok(name)
}

/// `Type name = expr;`, `Type name;` or `var name = expr;`. The terminator
/// is `,` for a `for` header.
fn parse_declaration(parser: &mut Parser, first: String, terminator: &str) -> Result<(), Error> {
    let ty = if first == "var" {
        None
    } else {
        Some(parse_type(parser, &first)?)
    };

    let name = parse_new_name(parser)?;
    let storage = parser.compiler.fresh_storage(&name);

    let token = parser.next_token()?;
    let value = if token == "=" {
        let parsed = parse_required_expression(parser)?;
        parser.expect(terminator)?;
        Some(parsed.expression)
    } else if token == terminator {
        None
    } else if token.is_empty() {
        return Err(MK_ERROR!(
            parser.get_position(),
            UnexpectedEof {
                expected: format!("`=` or `{}`", terminator)
            }
        ));
    } else {
        return Err(MK_ERROR!(
            parser.get_position(),
            UnexpectedTokenDetailed {
                token: token,
                message: String::from("expected `=` after the declared name")
            }
        ));
    };

    gen_declaration(
        parser,
        VariableAssignment {
            ty,
            name,
            storage,
            value,
        },
    )
}

fn parse_class(parser: &mut Parser) -> Result<(), Error> {
    let name = parse_new_name(parser)?;
    let class = Rc::new(ClassType::new(name.clone()));
    parser
        .scopes
        .declare_type(name.clone(), Type::Class(Rc::clone(&class)));
    debug!("class `{}` registered", name);

    parser.expect("{")?;
    parser.with_scope(
        Scope::new(ScopeKind::Class),
        Task::Class(class),
        parse_block_body,
    )
}

/// A member declaration `Type name;` inside a class body.
fn parse_member(parser: &mut Parser, class: &Rc<ClassType>) -> Result<(), Error> {
    let token = parser.next_token()?;

    let constructor = token == class.name && {
        let next = parser.next_token()?;
        let opens = next == "(";
        parser.push_back(next);
        opens
    };
    if token == "function" || constructor {
        return Err(MK_ERROR!(
            parser.get_position(),
            NotImplemented {
                feature: String::from("methods and constructors")
            }
        ));
    }
    if parser.scopes.is_basic_type(&token).is_none() {
        return Err(MK_ERROR!(
            parser.get_position(),
            UnexpectedTokenDetailed {
                token: token,
                message: String::from("class bodies hold member declarations only")
            }
        ));
    }

    let ty = parse_type(parser, &token)?;
    let name = parser.next_token()?;
    let valid = name.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && name.chars().all(|c| c.is_ascii_alphanumeric())
        && !class.has_field(&name);
    if !valid {
        return Err(MK_ERROR!(parser.get_position(), InvalidName { name: name }));
    }

    let next = parser.next_token()?;
    if next == "=" {
        return Err(MK_ERROR!(
            parser.get_position(),
            NotImplemented {
                feature: String::from("member initialisers")
            }
        ));
    }
    parser.push_back(next);
    parser.expect(";")?;

    class.fields.borrow_mut().push((name, ty));
    Ok(())
}

/// Parses a function after the `function` keyword, emits its region and
/// returns its description. Named functions are bound before their body is
/// read so that they can call themselves.
pub fn parse_function(parser: &mut Parser, named: bool) -> Result<FunctionInfo, Error> {
    let return_name = parser.next_token()?;
    let return_type = parser.scopes.is_basic_type(&return_name).ok_or_else(|| {
        MK_ERROR!(
            parser.get_position(),
            UnknownType {
                type_: return_name.clone()
            }
        )
    })?;
    if return_type.is_reference() {
        return Err(MK_ERROR!(
            parser.get_position(),
            NotImplemented {
                feature: String::from("returning references")
            }
        ));
    }

    let name = if named {
        Some(parse_new_name(parser)?)
    } else {
        None
    };

    parser.expect("(")?;
    let mut parameters: Vec<(String, Type)> = vec![];
    let mut seen = HashSet::new();
    loop {
        let token = parser.next_token()?;
        if token == ")" && parameters.is_empty() {
            break;
        }

        let ty = match parser.scopes.is_basic_type(&token) {
            Some(ty) if !ty.is_void() => ty,
            _ => return Err(MK_ERROR!(parser.get_position(), UnknownType { type_: token })),
        };
        let parameter = parse_new_name(parser)?;
        if !seen.insert(parameter.clone()) {
            return Err(MK_ERROR!(
                parser.get_position(),
                InvalidName { name: parameter }
            ));
        }
        parameters.push((parameter, ty));

        match parser.next_token()?.as_str() {
            "," => {}
            ")" => break,
            _ => {
                return Err(MK_ERROR!(
                    parser.get_position(),
                    UnbalancedGrouping {
                        token: String::from("(")
                    }
                ))
            }
        }
    }

    let label = parser.compiler.fresh_function();
    let info = FunctionInfo::new(
        return_type.clone(),
        parameters.iter().map(|(_, ty)| ty.clone()).collect(),
        label.clone(),
    );

    if let Some(name) = &name {
        parser.scopes.declare_variable(Binding {
            name: name.clone(),
            storage: label.clone(),
            ty: info.ty.clone(),
        });
    }

    parser.expect("{")?;
    let frame = FunctionFrame {
        label: label.clone(),
        return_type,
        returned: false,
    };
    let (body, ()) = parser.capture(|parser| {
        parser.with_scope(Scope::for_function(frame), Task::Code, |parser| {
            for (index, (parameter, ty)) in parameters.into_iter().enumerate() {
                parser.scopes.declare_variable(Binding {
                    name: parameter,
                    storage: info.parameter_storage(index),
                    ty,
                });
            }

            parse_block_body(parser)?;

            match parser.scopes.function_frame() {
                Some(frame) if frame.return_required() && !frame.returned => {
                    Err(MK_ERROR!(
                        parser.get_position(),
                        MissingReturn {
                            function: name.clone().unwrap_or_else(|| label.clone())
                        }
                    ))
                }
                _ => Ok(()),
            }
        })
    })?;

    gen_function_region(parser, &info, body);
    Ok(info)
}

fn parse_return(parser: &mut Parser) -> Result<(), Error> {
    if parser.scopes.function_frame().is_none() {
        return Err(MK_ERROR!(parser.get_position(), ReturnOutsideFunction));
    }

    let parsed = parse_expression(parser)?;
    parser.expect(";")?;

    let expression = if parsed.expression.is_empty() {
        None
    } else {
        Some(parsed.expression)
    };
    gen_return(parser, expression)
}

/// `( expr )` around a condition, lowered with its false jump.
fn parse_condition(parser: &mut Parser, false_label: &str) -> Result<(), Error> {
    parser.expect("(")?;
    let parsed = parse_required_expression(parser)?;
    gen_condition(parser, parsed.expression, false_label)?;
    parser.expect(")")
}

fn parse_if(parser: &mut Parser) -> Result<(), Error> {
    let end = parser.compiler.fresh_label();

    loop {
        let next = parser.compiler.fresh_label();
        parse_condition(parser, &next)?;
        parse_block(parser, ScopeKind::If)?;

        let token = parser.next_token()?;
        if token == "elseif" {
            parser.compiler.emit(format!("jmp {}", end));
            parser.compiler.emit(format!("label {}", next));
            continue;
        }

        if token == "else" {
            parser.compiler.emit(format!("jmp {}", end));
            parser.compiler.emit(format!("label {}", next));
            parse_block(parser, ScopeKind::Else)?;
        } else {
            parser.push_back(token);
            parser.compiler.emit(format!("label {}", next));
        }
        break;
    }

    parser.compiler.emit(format!("label {}", end));
    Ok(())
}

fn parse_while(parser: &mut Parser) -> Result<(), Error> {
    let top = parser.compiler.fresh_label();
    let end = parser.compiler.fresh_label();

    parser.compiler.emit(format!("label {}", top));
    parse_condition(parser, &end)?;
    parse_block(parser, ScopeKind::While)?;
    parser.compiler.emit(format!("jmp {}", top));
    parser.compiler.emit(format!("label {}", end));

    Ok(())
}

/// `for (init, cond, incr) { }`. Every clause may be empty. The scope is
/// entered before the header so that `init` can declare the loop variable.
fn parse_for(parser: &mut Parser) -> Result<(), Error> {
    parser.with_scope(Scope::new(ScopeKind::For), Task::Code, |parser| {
        parser.expect("(")?;

        let token = parser.next_token()?;
        if token != "," {
            if is_declaration_start(parser, &token) {
                parse_declaration(parser, token, ",")?;
            } else {
                parser.push_back(token);
                let parsed = parse_required_expression(parser)?;
                reduce(parser, parsed.expression)?;
                parser.expect(",")?;
            }
        }

        let top = parser.compiler.fresh_label();
        let end = parser.compiler.fresh_label();
        parser.compiler.emit(format!("label {}", top));

        let token = parser.next_token()?;
        if token != "," {
            parser.push_back(token);
            let parsed = parse_required_expression(parser)?;
            gen_condition(parser, parsed.expression, &end)?;
            parser.expect(",")?;
        }

        let token = parser.next_token()?;
        let increment = if token == ")" {
            vec![]
        } else {
            parser.push_back(token);
            // The increment runs after the body, so it is read in a block of
            // its own where nothing may be rebound.
            let (increment, _) = parser.capture(|parser| {
                parser.with_scope(Scope::new(ScopeKind::For), Task::Code, |parser| {
                    let parsed = parse_required_expression(parser)?;
                    reduce(parser, parsed.expression)
                })
            })?;
            parser.expect(")")?;
            increment
        };

        parser.expect("{")?;
        parse_block_body(parser)?;

        parser.compiler.emit_all(increment);
        parser.compiler.emit(format!("jmp {}", top));
        parser.compiler.emit(format!("label {}", end));
        Ok(())
    })
}
