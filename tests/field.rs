mod common;

fn assert_runtime_message(source: &str, message: &str) {
    let (_, result) = common::run_allowing_runtime_error(source);
    assert_eq!(result.unwrap_err().message, message);
}

#[test]
fn calling_a_field_that_holds_a_function_invokes_it() {
    let output = common::run(
        "class Foo {} fun bar(a, b) { print \"bar\"; print a; print b; } \
         var foo = Foo(); foo.bar = bar; foo.bar(1, 2);",
    );
    assert_eq!(output, "bar\n1\n2\n");
}

#[test]
fn calling_a_field_that_is_not_a_function_is_a_runtime_error() {
    assert_runtime_message(
        "class Foo {} var foo = Foo(); foo.bar = \"not fn\"; foo.bar();",
        "Can only call functions and classes.",
    );
}

#[test]
fn fields_and_methods_on_the_same_instance_coexist() {
    let output = common::run(
        "class Foo { method(arg) { print \"method\"; print arg; } } \
         var foo = Foo(); foo.other = \"other\"; print foo.other; foo.method(\"arg\");",
    );
    assert_eq!(output, "other\nmethod\narg\n");
}

#[test]
fn getting_a_property_off_a_non_instance_is_a_runtime_error() {
    for source in ["true.foo;", "nil.foo;", "(\"str\").foo;"] {
        assert_runtime_message(source, "Only instances have properties.");
    }
}

#[test]
fn getting_a_property_off_a_class_is_a_runtime_error() {
    assert_runtime_message("class Foo {} Foo.bar;", "Undefined property 'bar'.");
}

#[test]
fn setting_many_fields_on_one_instance_all_persist() {
    let output = common::run(
        "class Foo {} var foo = Foo(); \
         foo.a = \"a\"; foo.b = \"b\"; foo.c = \"c\"; \
         print foo.a; print foo.b; print foo.c;",
    );
    assert_eq!(output, "a\nb\nc\n");
}

#[test]
fn a_method_reference_off_an_instance_is_a_bound_function() {
    let output = common::run(
        "class Foo { method() { print \"got method\"; } } var foo = Foo(); var m = foo.method; m();",
    );
    assert_eq!(output, "got method\n");
}

#[test]
fn a_method_binds_this_to_the_instance_it_was_fetched_from() {
    let output = common::run(
        "class Foo { method() { this.count = this.count + 1; print this.count; } } \
         var foo = Foo(); foo.count = 0; var m = foo.method; m();",
    );
    assert_eq!(output, "1\n");
}

#[test]
fn setting_a_property_on_a_non_instance_is_a_runtime_error() {
    for source in ["true.foo = 1;", "nil.foo = 1;", "(\"str\").foo = 1;"] {
        assert_runtime_message(source, "Only instances have fields.");
    }
}

#[test]
fn getting_an_undefined_property_is_a_runtime_error() {
    assert_runtime_message("class Foo {} var foo = Foo(); foo.bar;", "Undefined property 'bar'.");
}
