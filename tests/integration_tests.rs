//! Integration tests for end-to-end compilation.
//!
//! Programs are compiled to IR and then executed by the interpreter in
//! `support`, so the assertions are about what the program computes.

mod support;

use mcc::{
    compiler::compiler::compile,
    errors::errors::{Error, ErrorImpl},
};
use support::Machine;

fn run(source: &str) -> Machine {
    let ir = compile(source, "test.mc").unwrap();
    Machine::run(&ir)
}

fn compile_error(source: &str) -> Error {
    compile(source, "test.mc").unwrap_err()
}

#[test]
fn test_precedence() {
    let machine = run("i32 x = 1 + 2 * 3; i32 y = (1 + 2) * 3;");
    assert_eq!(machine.int("x_0"), 7);
    assert_eq!(machine.int("y_1"), 9);
}

#[test]
fn test_subtraction_is_left_associative() {
    let machine = run("i32 x = 10 - 4 - 3; i32 y = 2 * 3 - 8 / 2;");
    assert_eq!(machine.int("x_0"), 3);
    assert_eq!(machine.int("y_1"), 2);
}

#[test]
fn test_chained_assignment() {
    let machine = run("i32 a = 0; i32 b = 0; a = b = 3;");
    assert_eq!(machine.int("a_0"), 3);
    assert_eq!(machine.int("b_1"), 3);
}

#[test]
fn test_reference_write_through() {
    let machine = run("i32 x = 1; i32& r = x; r = 5; i32 y = x;");
    assert_eq!(machine.int("x_0"), 5);
    assert_eq!(machine.int("y_2"), 5);
}

#[test]
fn test_reference_compound_assignment() {
    let machine = run("i32 x = 4; i32& r = x; r *= 3; ++r;");
    assert_eq!(machine.int("x_0"), 13);
}

#[test]
fn test_reference_to_literal_is_rejected() {
    assert_eq!(compile_error("i32& r2 = 5;").get_error_name(), "TypeMatchError");
}

#[test]
fn test_promotion() {
    let machine = run("i32 a = 1; f64 b = 2.5; f64 c = a + b; var d = a + b;");
    assert_eq!(machine.double("c_2"), 3.5);
    assert_eq!(machine.double("d_3"), 3.5);

    let error = compile_error("i32 a = 1; f64 b = 2.5; a + \"s\";");
    assert_eq!(error.get_error_name(), "IncompatibleOperands");
}

#[test]
fn test_division_and_casts() {
    let machine = run("f64 d = 7.0 / 2; i32 n = d; i32 q = 7 / 2; i32 m = 7 % 3;");
    assert_eq!(machine.double("d_0"), 3.5);
    assert_eq!(machine.int("n_1"), 3);
    assert_eq!(machine.int("q_2"), 3);
    assert_eq!(machine.int("m_3"), 1);
}

#[test]
fn test_call_checking_names_first_argument() {
    let error = compile_error("function i32 f(i32 x) { return x; } f();");
    assert!(matches!(
        error.get_internal_error(),
        ErrorImpl::ArgumentCount { index: 1, .. }
    ));

    let error = compile_error("function i32 f(i32 x) { return x; } f(\"s\");");
    assert!(matches!(
        error.get_internal_error(),
        ErrorImpl::ArgumentType { index: 1, .. }
    ));
}

#[test]
fn test_block_scoping() {
    let error = compile_error("if (true) { i32 z = 1; } z = 2;");
    assert_eq!(error.get_error_name(), "UnknownIdentifier");

    let error = compile_error("class Point { i32 x; } if (true) { i32 Point = 1; }");
    assert_eq!(error.get_error_name(), "InvalidName");
}

#[test]
fn test_if_elseif_else() {
    let source = "i32 x = X; i32 k = 0; \
                  if (x < 3) { k = 1; } elseif (x < 10) { k = 2; } else { k = 3; }";

    for (x, expected) in [("1", 1), ("5", 2), ("12", 3)] {
        let machine = run(&source.replace('X', x));
        assert_eq!(machine.int("k_1"), expected, "x = {}", x);
    }
}

#[test]
fn test_logical_operators() {
    let machine = run("bool a = 3 > 2 && 1 == 1; bool b = false || 2 < 1; bool c = !b;");
    assert_eq!(machine.int("a_0"), 1);
    assert_eq!(machine.int("b_1"), 0);
    assert_eq!(machine.int("c_2"), 1);
}

#[test]
fn test_while_loop() {
    let machine = run("i32 i = 0; i32 s = 0; while (i < 5) { s += i; ++i; }");
    assert_eq!(machine.int("i_0"), 5);
    assert_eq!(machine.int("s_1"), 10);
}

#[test]
fn test_for_loop() {
    let machine = run("i32 s = 0; for (i32 i = 1, i <= 3, ++i) { s += i; }");
    assert_eq!(machine.int("s_0"), 6);
}

#[test]
fn test_nested_loops() {
    let machine = run(
        "i32 n = 0;
         for (i32 i = 0, i < 3, ++i) {
             for (i32 j = 0, j < 4, ++j) {
                 n += 1;
             }
         }",
    );
    assert_eq!(machine.int("n_0"), 12);
}

#[test]
fn test_function_calls_in_expression() {
    let machine = run("function i32 sq(i32 n) { return n * n; } i32 r = sq(3) + sq(4);");
    assert_eq!(machine.int("r_0"), 25);
}

#[test]
fn test_early_return() {
    let machine = run(
        "function i32 sign(i32 v) {
             if (v < 0) { return -1; }
             return 1;
         }
         i32 a = sign(-4);
         i32 b = sign(9);",
    );
    assert_eq!(machine.int("a_0"), -1);
    assert_eq!(machine.int("b_1"), 1);
}

#[test]
fn test_reference_parameter() {
    let machine = run("function void bump(i32& n) { n += 1; } i32 x = 1; bump(x); bump(x);");
    assert_eq!(machine.int("x_0"), 3);
}

#[test]
fn test_value_parameter_is_a_copy() {
    let machine = run("function void clear(i32 n) { n = 0; } i32 x = 8; clear(x);");
    assert_eq!(machine.int("x_0"), 8);
}

#[test]
fn test_function_values() {
    let machine = run(
        "function i32 one() { return 1; }
         function i32 two() { return 2; }
         i32() g = one;
         i32 a = g();
         g = two;
         i32 b = g();",
    );
    assert_eq!(machine.int("a_1"), 1);
    assert_eq!(machine.int("b_2"), 2);
}

#[test]
fn test_argument_promotion() {
    let machine = run("function f64 half(f64 v) { return v / 2; } f64 h = half(3);");
    assert_eq!(machine.double("h_0"), 1.5);
}

#[test]
fn test_string_equality() {
    let machine = run("string s = \"ab\"; bool e = s == \"ab\"; bool n = s != \"ab\";");
    assert_eq!(machine.int("e_1"), 1);
    assert_eq!(machine.int("n_2"), 0);
}

#[test]
fn test_comments_are_ignored() {
    let machine = run("// leading\ni32 x = /* inline */ 4; /* trailing */");
    assert_eq!(machine.int("x_0"), 4);
}

#[test]
fn test_functions_precede_main_code() {
    let ir = compile("i32 x = 1; function void f() { } f();", "test.mc").unwrap();
    let lines: Vec<&str> = ir.lines().collect();

    assert_eq!(lines[0], "dfunc f0 null");
    assert_eq!(lines[2], "endfunc");
    assert_eq!(lines[3], "dvar x_0 sint:1");
    assert!(ir.ends_with('\n'));
}

#[test]
fn test_first_error_aborts() {
    assert_eq!(
        compile_error("i32 x = 3.5.2;").get_error_name(),
        "MalformedNumber"
    );
    assert_eq!(
        compile_error("i32 x = 1; i32 x = 2;").get_error_name(),
        "InvalidName"
    );
    assert!(compile("i32 x = 1", "test.mc").is_err());
}

#[test]
fn test_write_through_in_branches() {
    let machine = run("i32 x = 1; i32 y = 2; i32& r = x; if (false) { r = 7; } if (true) { r = 9; }");
    assert_eq!(machine.int("x_0"), 9);
    assert_eq!(machine.int("y_1"), 2);
}

#[test]
fn test_conditional_rebind_is_rejected() {
    let error = compile_error("i32 x = 1; i32 y = 2; i32& r = x; if (false) { r = y; } r = 9;");
    assert_eq!(error.get_error_name(), "NestedRebind");

    let error = compile_error("i32 x = 1; i32 y = 2; i32& r = x; while (false) { r = y; }");
    assert_eq!(error.get_error_name(), "NestedRebind");
}

#[test]
fn test_reference_identity_follows_rebinding() {
    let machine = run(
        "i32 x = 1; i32 y = 2; i32& r = x; i32& s = x;
         bool a = r === s;
         r = y;
         bool b = r === s;
         s = y;
         bool c = r === s;",
    );
    assert_eq!(machine.int("a_4"), 1);
    assert_eq!(machine.int("b_5"), 0);
    assert_eq!(machine.int("c_6"), 1);
}

#[test]
fn test_operands_evaluate_left_to_right() {
    let machine = run("i32 x = 1; i32 z = x + (x = 5);");
    assert_eq!(machine.int("x_0"), 5);
    assert_eq!(machine.int("z_1"), 6);

    let machine = run("i32 x = 1; i32 z = x + x * (x = 5);");
    assert_eq!(machine.int("z_1"), 6);

    let machine = run("i32 x = 1; i32 z = x + ++x;");
    assert_eq!(machine.int("x_0"), 2);
    assert_eq!(machine.int("z_1"), 3);
}

#[test]
fn test_calls_evaluate_left_to_right() {
    let next = "i32 n = 0; function i32 next() { n += 1; return n; }";

    let machine = run(&format!("{} i32 z = n + next();", next));
    assert_eq!(machine.int("z_1"), 1);

    let machine = run(&format!("{} i32 z = next() + 10 * next();", next));
    assert_eq!(machine.int("z_1"), 21);
}

#[test]
fn test_reference_return_is_rejected() {
    let error = compile_error("function i32& pick(i32& p) { return 5; }");
    assert_eq!(error.get_error_name(), "NotImplemented");
}
