mod common;

#[test]
fn assignment_is_right_associative() {
    let output = common::run("var a = 1; var b = 2; var c = 3; a = b = c; print a; print b; print c;");
    assert_eq!(output, "3\n3\n3\n");
}

#[test]
fn assignment_to_a_global_is_visible_after_the_statement() {
    let output = common::run("var a = \"before\"; print a; a = \"after\"; print a;");
    assert_eq!(output, "before\nafter\n");
}

#[test]
fn assignment_to_a_local_is_visible_after_the_statement() {
    let output = common::run("{ var a = \"before\"; print a; a = \"after\"; print a; }");
    assert_eq!(output, "before\nafter\n");
}

#[test]
fn assignment_is_an_expression_that_yields_the_assigned_value() {
    let output = common::run("var a = 1; print a = 2;");
    assert_eq!(output, "2\n");
}

#[test]
fn assigning_to_a_grouping_expression_is_a_compile_error() {
    assert!(common::has_compile_error("var a = 1; (a) = 2;"));
}

#[test]
fn assigning_to_a_binary_expression_is_a_compile_error() {
    assert!(common::has_compile_error("var a = 1; var b = 2; a + b = 3;"));
}

#[test]
fn assigning_to_this_is_a_compile_error() {
    assert!(common::has_compile_error("class A { method() { this = 1; } }"));
}

#[test]
fn assigning_to_an_undefined_variable_is_a_runtime_error() {
    let (_, result) = common::run_allowing_runtime_error("unknown = 1;");
    let error = result.unwrap_err();
    assert_eq!(error.message, "Undefined variable 'unknown'.");
}
