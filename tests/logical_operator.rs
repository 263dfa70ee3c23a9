mod common;

#[test]
fn and_short_circuits_on_the_first_falsey_operand() {
    let output = common::run(
        "print false and 1; print true and 1; print 1 and 2 and 3; print false and \"unreached\";",
    );
    assert_eq!(output, "false\n1\n3\nfalse\n");
}

#[test]
fn and_returns_the_actual_operand_value_not_a_boolean() {
    let output = common::run("print nil and \"x\"; print 1 and nil; print 1 and 2;");
    assert_eq!(output, "nil\nnil\n2\n");
}

#[test]
fn or_short_circuits_on_the_first_truthy_operand() {
    let output = common::run(
        "print false or 1; print true or 1; print false or false or true; print 1 or \"unreached\";",
    );
    assert_eq!(output, "1\ntrue\ntrue\n1\n");
}

#[test]
fn or_returns_the_actual_operand_value_not_a_boolean() {
    let output = common::run("print nil or \"x\"; print false or nil; print 1 or 2;");
    assert_eq!(output, "x\nnil\n1\n");
}
