mod common;

#[test]
fn super_call_binds_this_to_the_calling_instance() {
    let output = common::run(
        "class A { method(arg) { print \"A.method(\" + arg + \")\"; } } \
         class B < A { method(arg) { print \"B.method(\" + arg + \")\"; super.method(arg); } } \
         B().method(\"arg\");",
    );
    assert_eq!(output, "B.method(arg)\nA.method(arg)\n");
}

#[test]
fn super_call_reaches_a_differently_named_superclass_method() {
    let output = common::run(
        "class Base { foo() { print \"Base.foo()\"; } } \
         class Derived < Base { bar() { print \"Derived.bar()\"; super.foo(); } } Derived().bar();",
    );
    assert_eq!(output, "Derived.bar()\nBase.foo()\n");
}

#[test]
fn super_call_can_reach_the_overridden_version_of_the_same_name() {
    let output = common::run(
        "class Base { foo() { print \"Base.foo()\"; } } \
         class Derived < Base { foo() { print \"Derived.foo()\"; super.foo(); } } Derived().foo();",
    );
    assert_eq!(output, "Derived.foo()\nBase.foo()\n");
}

#[test]
fn super_inside_a_closure_resolves_against_the_class_where_it_was_written() {
    let output = common::run(
        "class A { say() { print \"A\"; } } \
         class B < A { getClosure() { fun closure() { super.say(); } return closure; } say() { print \"B\"; } } \
         B().getClosure()();",
    );
    assert_eq!(output, "A\n");
}

#[test]
fn a_subclass_without_its_own_init_can_call_the_superclass_init_via_super() {
    let output = common::run(
        "class Base { init(a, b) { print \"Base.init(\" + a + \", \" + b + \")\"; } } \
         class Derived < Base { init() { print \"Derived.init()\"; super.init(\"a\", \"b\"); } } Derived();",
    );
    assert_eq!(output, "Derived.init()\nBase.init(a, b)\n");
}

#[test]
fn calling_super_with_too_many_arguments_is_a_runtime_error() {
    let (_, result) = common::run_allowing_runtime_error(
        "class Base { foo(a, b) {} } class Derived < Base { foo() { super.foo(1, 2, 3, 4); } } Derived().foo();",
    );
    assert_eq!(result.unwrap_err().message, "Expected 2 arguments but got 4.");
}

#[test]
fn an_indirectly_inherited_superclass_method_is_reachable() {
    let output = common::run(
        "class A { foo() { print \"A.foo()\"; } } class B < A {} \
         class C < B { foo() { print \"C.foo()\"; super.foo(); } } C().foo();",
    );
    assert_eq!(output, "C.foo()\nA.foo()\n");
}

#[test]
fn calling_super_with_too_few_arguments_is_a_runtime_error() {
    let (_, result) = common::run_allowing_runtime_error(
        "class Base { foo(a, b) {} } class Derived < Base { foo() { super.foo(1); } } Derived().foo();",
    );
    assert_eq!(result.unwrap_err().message, "Expected 2 arguments but got 1.");
}

#[test]
fn using_super_in_a_class_with_no_superclass_is_a_compile_error() {
    assert!(common::has_compile_error("class Foo { method() { super.method(); } }"));
}

#[test]
fn calling_a_nonexistent_method_via_super_is_a_runtime_error() {
    let (_, result) = common::run_allowing_runtime_error(
        "class Base {} class Derived < Base { method() { super.doesNotExist(); } } Derived().method();",
    );
    assert_eq!(result.unwrap_err().message, "Undefined property 'doesNotExist'.");
}

#[test]
fn the_superclass_in_super_must_not_be_parenthesized() {
    assert!(common::has_compile_error("class A {} class B < A { method() { (super).method(); } }"));
}

#[test]
fn reassigning_the_name_bound_to_the_superclass_does_not_affect_super() {
    let output = common::run(
        "class Base { method() { print \"Base.method()\"; } } class Derived < Base {} \
         var Base = \"not a class anymore\"; Derived().method();",
    );
    assert_eq!(output, "Base.method()\n");
}

#[test]
fn super_outside_of_any_class_is_a_compile_error() {
    assert!(common::has_compile_error("super.method();"));
    assert!(common::has_compile_error("super.method;"));
}

#[test]
fn super_in_a_closure_captured_inside_an_inherited_method_resolves() {
    let output = common::run(
        "class A { say() { print \"A\"; } } \
         class B < A { say() { fun closure() { super.say(); } closure(); } } B().say();",
    );
    assert_eq!(output, "A\n");
}

#[test]
fn super_resolves_correctly_in_a_method_inherited_without_override() {
    let output = common::run(
        "class A { say() { print \"A\"; } } class B < A { greet() { super.say(); } } B().greet();",
    );
    assert_eq!(output, "A\n");
}

#[test]
fn super_inside_a_top_level_function_is_a_compile_error() {
    assert!(common::has_compile_error("fun f() { super.method(); }"));
}

#[test]
fn super_must_be_followed_by_a_dot() {
    assert!(common::has_compile_error("class A {} class B < A { method() { super; } }"));
}

#[test]
fn super_must_be_followed_by_a_method_name() {
    assert!(common::has_compile_error("class A {} class B < A { method() { super.; } }"));
}

#[test]
fn this_inside_a_superclass_method_refers_to_the_subclass_instance() {
    let output = common::run(
        "class A { say() { print this.name; } } class B < A { init(name) { this.name = name; } } \
         B(\"b\").say();",
    );
    assert_eq!(output, "b\n");
}
