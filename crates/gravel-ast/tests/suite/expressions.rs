use gravel_ast::ast::{
    Constant, ConstantValue, ConstructorTarget, ExprKind, Expression, Module, StmtKind,
};
use gravel_syntax::NumberValue;
use pretty_assertions::assert_eq;

use super::{build_err, build_ok, declared_value, script_expr};

fn value_of(module: &Module) -> &Expression {
    declared_value(&module.statements[0])
}

fn number(expr: &Expression) -> &NumberValue {
    match &expr.kind {
        ExprKind::Constant(Constant {
            value: ConstantValue::Number(number),
            ..
        }) => number,
        other => panic!("expected a number constant, got {other:?}"),
    }
}

/// Destructure a method call into (object, method name, arguments).
#[track_caller]
fn call(expr: &Expression) -> (&Expression, &str, &[Expression]) {
    let ExprKind::MethodCall {
        object,
        method,
        arguments,
        ..
    } = &expr.kind
    else {
        panic!("expected a method call, got {:?}", expr.kind);
    };
    let args = match &arguments.kind {
        ExprKind::ArgumentList { arguments } => arguments.as_slice(),
        ExprKind::NamedArgumentList { entries } => entries.as_slice(),
        other => panic!("expected arguments, got {other:?}"),
    };
    (object, method.as_str().unwrap_or("<dynamic>"), args)
}

#[test]
fn command_expression_is_an_implicit_this_call() {
    let module = build_ok("println \"hi\"");
    let expr = script_expr(&module, 0);
    let ExprKind::MethodCall {
        object,
        method,
        arguments,
        implicit_this,
        command,
        ..
    } = &expr.kind
    else {
        panic!("expected a method call, got {:?}", expr.kind);
    };
    assert!(*implicit_this);
    assert!(*command);
    assert_eq!(object.as_variable().map(|var| var.name.as_str()), Some("this"));
    assert_eq!(method.as_str(), Some("println"));
    let ExprKind::ArgumentList { arguments } = &arguments.kind else {
        panic!("expected an argument list, got {:?}", arguments.kind);
    };
    assert_eq!(arguments.len(), 1);
    assert_eq!(arguments[0].as_str(), Some("hi"));
    assert!(arguments[0].as_constant().is_some_and(|c| c.string_literal));
}

#[test]
fn command_chains_are_left_associative() {
    let module = build_ok("take 2 pills of chloroquine");
    let expr = script_expr(&module, 0);
    let ExprKind::Property {
        object, property, ..
    } = &expr.kind
    else {
        panic!("expected a property, got {:?}", expr.kind);
    };
    assert_eq!(property.as_str(), Some("chloroquine"));

    let (inner, method, args) = call(object);
    assert_eq!(method, "pills");
    assert_eq!(args[0].as_variable().map(|var| var.name.as_str()), Some("of"));

    let (this, method, args) = call(inner);
    assert_eq!(method, "take");
    assert_eq!(this.as_variable().map(|var| var.name.as_str()), Some("this"));
    assert_eq!(number(&args[0]), &NumberValue::Int(2));
}

#[test]
fn command_on_a_property_calls_the_property() {
    let module = build_ok("out.println 'x'");
    let (object, method, args) = call(script_expr(&module, 0));
    assert_eq!(method, "println");
    assert_eq!(object.as_variable().map(|var| var.name.as_str()), Some("out"));
    assert_eq!(args.len(), 1);
}

#[test]
fn command_after_a_binary_expression_is_rejected() {
    assert_eq!(build_err("a + b c"), "Unexpected input: 'a + b'");
}

#[test]
fn two_dimensional_array_with_trailing_empty_dimension() {
    let module = build_ok("def a = new int[3][]");
    let ExprKind::Array {
        element_type,
        sizes,
        initializer,
        ty,
    } = &value_of(&module).kind
    else {
        panic!("expected an array, got {:?}", value_of(&module).kind);
    };
    assert_eq!(element_type.name, "int");
    assert_eq!(ty.name, "int[][]");
    assert!(initializer.is_none());
    let sizes = sizes.as_ref().unwrap();
    assert_eq!(sizes.len(), 2);
    assert_eq!(number(&sizes[0]), &NumberValue::Int(3));
    assert!(sizes[1].is_empty());
}

#[test]
fn empty_dimension_before_a_sized_one_is_rejected() {
    assert_eq!(build_err("def a = new int[][3]"), "dimension cannot be empty");
}

#[test]
fn sized_dimension_with_initializer_is_rejected() {
    let err = super::build("def a = new int[1]{2}").unwrap_err();
    assert_eq!(err.first_message(), Some("dimension should be empty"));
    let error = &err.errors()[0];
    assert_eq!((error.line, error.column), (1, 16));
}

#[test]
fn dimensions_carry_their_annotations() {
    let module = build_ok("def grid = new int @A [2] @B [3]");
    let ExprKind::Array { ty, sizes, .. } = &value_of(&module).kind else {
        panic!("expected an array, got {:?}", value_of(&module).kind);
    };
    assert_eq!(ty.name, "int[][]");
    assert_eq!(ty.annotations[0].class_name.name, "B");
    let inner = ty.component.as_deref().expect("component type");
    assert_eq!(inner.annotations[0].class_name.name, "A");
    assert_eq!(sizes.as_ref().map(Vec::len), Some(2));

    let module = build_ok("int @A [] xs = null");
    let ExprKind::Declaration { target, .. } = &script_expr(&module, 0).kind else {
        panic!("expected a declaration, got {:?}", script_expr(&module, 0).kind);
    };
    let ty = target
        .as_variable()
        .and_then(|var| var.ty.as_ref())
        .expect("declared type");
    assert_eq!(ty.name, "int[]");
    assert_eq!(ty.annotations[0].class_name.name, "A");
}

#[test]
fn array_creation_needs_a_sized_dimension() {
    assert_eq!(build_err("def a = new int[]"), "dimensions cannot be all empty");
}

#[test]
fn array_initializer_element_type_drops_one_dimension() {
    let module = build_ok("def a = new String[][] { ['x'], ['y'] }");
    let ExprKind::Array {
        element_type,
        initializer,
        ty,
        ..
    } = &value_of(&module).kind
    else {
        panic!("expected an array, got {:?}", value_of(&module).kind);
    };
    assert_eq!(element_type.name, "String[]");
    assert_eq!(ty.name, "String[][]");
    assert_eq!(initializer.as_ref().map(Vec::len), Some(2));
}

#[test]
fn multiple_assignment_targets_a_tuple_of_untyped_variables() {
    let module = build_ok("(a, b) = [1, 2]");
    let ExprKind::Binary { left, op, right, .. } = &script_expr(&module, 0).kind else {
        panic!("expected a binary expression");
    };
    assert!(op.is("="));
    let ExprKind::Tuple { elements } = &left.kind else {
        panic!("expected a tuple, got {:?}", left.kind);
    };
    let names: Vec<&str> = elements
        .iter()
        .map(|element| element.as_variable().unwrap().name.as_str())
        .collect();
    assert_eq!(names, vec!["a", "b"]);
    assert!(elements
        .iter()
        .all(|element| element.as_variable().unwrap().ty.is_none()));
    assert!(matches!(right.kind, ExprKind::List { .. }));
}

#[test]
fn single_parenthesized_target_is_a_one_element_tuple() {
    let module = build_ok("(a) = [1]");
    let ExprKind::Binary { left, .. } = &script_expr(&module, 0).kind else {
        panic!("expected a binary expression");
    };
    assert!(matches!(&left.kind, ExprKind::Tuple { elements } if elements.len() == 1));
}

#[test]
fn nested_parentheses_in_multiple_assignment_are_rejected() {
    assert_eq!(
        build_err("((a)) = [1]"),
        "Nested parenthesis is not allowed in multiple assignment, e.g. ((a)) = b"
    );
}

#[test]
fn assignment_to_a_call_is_rejected() {
    assert_eq!(
        build_err("a() = 1"),
        "The LHS of an assignment should be a variable or a field accessing expression"
    );
}

#[test]
fn assignment_to_property_and_index_is_accepted() {
    let module = build_ok("a.b = 1\na[0] = 2");
    assert_eq!(module.statements.len(), 2);
}

#[test]
fn negated_literal_folds_into_one_constant() {
    let module = build_ok("def x = -123");
    let value = value_of(&module);
    assert_eq!(number(value), &NumberValue::Int(-123));
    assert!(value.as_constant().unwrap().literal.is_none());
}

#[test]
fn negation_widens_at_the_type_boundary() {
    let module = build_ok("def a = -2147483648\ndef b = 2147483648");
    assert_eq!(number(declared_value(&module.statements[0])), &NumberValue::Int(i32::MIN));
    assert_eq!(
        number(declared_value(&module.statements[1])),
        &NumberValue::Long(2_147_483_648)
    );
}

#[test]
fn out_of_range_literal_is_repaired_by_negation() {
    let module = build_ok("def x = -2147483648i");
    assert_eq!(number(value_of(&module)), &NumberValue::Int(i32::MIN));
}

#[test]
fn out_of_range_literal_is_reported_after_the_unit() {
    assert_eq!(
        build_err("def x = 2147483648i"),
        "Number of value 2147483648i does not fit in the range of int, but int is expected."
    );
}

#[test]
fn negation_of_a_variable_stays_unary() {
    let module = build_ok("def x = -y");
    assert!(matches!(value_of(&module).kind, ExprKind::UnaryMinus { .. }));
}

#[test]
fn ranges_keep_their_inclusiveness() {
    let module = build_ok("def a = 1..3\ndef b = 1..<3");
    assert!(matches!(
        declared_value(&module.statements[0]).kind,
        ExprKind::Range {
            inclusive: true,
            ..
        }
    ));
    assert!(matches!(
        declared_value(&module.statements[1]).kind,
        ExprKind::Range {
            inclusive: false,
            ..
        }
    ));
}

#[test]
fn gstring_keeps_segments_values_and_verbatim_text() {
    let module = build_ok("def s = \"a ${b} c $d.e\"");
    let ExprKind::GString {
        verbatim,
        strings,
        values,
    } = &value_of(&module).kind
    else {
        panic!("expected a gstring, got {:?}", value_of(&module).kind);
    };
    let strings: Vec<&str> = strings.iter().map(|s| s.as_str().unwrap()).collect();
    assert_eq!(strings, vec!["a ", " c ", ""]);
    assert_eq!(values.len(), 2);
    assert_eq!(values[0].as_variable().map(|var| var.name.as_str()), Some("b"));
    assert!(matches!(
        &values[1].kind,
        ExprKind::Property { property, .. } if property.as_str() == Some("e")
    ));
    assert_eq!(verbatim, "a $b c $d.e");
}

#[test]
fn safe_and_spread_navigation() {
    let module = build_ok("a?.b\nc*.d\ne.@f");
    let flags: Vec<(bool, bool, bool)> = (0..3)
        .map(|idx| match &script_expr(&module, idx).kind {
            ExprKind::Property {
                safe,
                spread_safe,
                attribute,
                ..
            } => (*safe, *spread_safe, *attribute),
            other => panic!("expected a property, got {other:?}"),
        })
        .collect();
    assert_eq!(
        flags,
        vec![(true, false, false), (true, true, false), (false, false, true)]
    );
}

#[test]
fn named_arguments_lead_the_positional_ones() {
    let module = build_ok("foo(a: 1, 2)");
    let (_, method, args) = call(script_expr(&module, 0));
    assert_eq!(method, "foo");
    assert_eq!(args.len(), 2);
    assert!(matches!(&args[0].kind, ExprKind::Map { entries } if entries.len() == 1));
    assert_eq!(number(&args[1]), &NumberValue::Int(2));
}

#[test]
fn named_only_arguments_form_a_named_list() {
    let module = build_ok("foo(a: 1, b: 2)");
    let ExprKind::MethodCall { arguments, .. } = &script_expr(&module, 0).kind else {
        panic!("expected a method call");
    };
    assert!(matches!(
        &arguments.kind,
        ExprKind::NamedArgumentList { entries } if entries.len() == 2
    ));
}

#[test]
fn duplicated_named_arguments_are_rejected() {
    assert_eq!(build_err("foo(a: 1, a: 2)"), "Duplicated named parameter 'a' found");
}

#[test]
fn trailing_closure_joins_the_argument_list() {
    let module = build_ok("foo(1) { it }");
    let (_, method, args) = call(script_expr(&module, 0));
    assert_eq!(method, "foo");
    assert_eq!(args.len(), 2);
    assert!(matches!(
        args[1].kind,
        ExprKind::Closure {
            parameters: None,
            ..
        }
    ));
}

#[test]
fn closure_after_property_calls_the_method() {
    let module = build_ok("list.each { x -> println x }");
    let (object, method, args) = call(script_expr(&module, 0));
    assert_eq!(method, "each");
    assert_eq!(object.as_variable().map(|var| var.name.as_str()), Some("list"));
    let ExprKind::Closure { parameters, .. } = &args[0].kind else {
        panic!("expected a closure, got {:?}", args[0].kind);
    };
    assert_eq!(parameters.as_ref().map(Vec::len), Some(1));
}

#[test]
fn empty_list_with_comma_is_rejected() {
    assert_eq!(
        build_err("def l = [,]"),
        "Empty list constructor should not contain any comma(,)"
    );
}

#[test]
fn map_keys_become_constants() {
    let module = build_ok("def m = [a: 1, (b): 2]");
    let ExprKind::Map { entries } = &value_of(&module).kind else {
        panic!("expected a map");
    };
    let keys: Vec<&Expression> = entries
        .iter()
        .map(|entry| match &entry.kind {
            ExprKind::MapEntry { key, .. } => key.as_ref(),
            other => panic!("expected an entry, got {other:?}"),
        })
        .collect();
    assert_eq!(keys[0].as_str(), Some("a"));
    assert!(keys[1].as_variable().is_some());
}

#[test]
fn outer_instance_is_the_first_constructor_argument() {
    let module = build_ok("def i = outer.new Inner(1)");
    let ExprKind::ConstructorCall {
        target, arguments, ..
    } = &value_of(&module).kind
    else {
        panic!("expected a constructor call");
    };
    assert!(matches!(target, ConstructorTarget::Type { ty } if ty.name == "Inner"));
    let ExprKind::ArgumentList { arguments } = &arguments.kind else {
        panic!("expected arguments");
    };
    assert_eq!(arguments.len(), 2);
    assert_eq!(
        arguments[0].as_variable().map(|var| var.name.as_str()),
        Some("outer")
    );
}

#[test]
fn this_call_in_a_constructor_is_a_constructor_call() {
    let module = build_ok("class A {\n  A() { this(1) }\n  A(int x) {}\n}");
    let ctor = &module.classes[0].constructors[0];
    let code = ctor.code.as_ref().unwrap();
    let StmtKind::Expression { expr } = &code.statements()[0].kind else {
        panic!("expected an expression statement");
    };
    assert!(matches!(
        expr.kind,
        ExprKind::ConstructorCall {
            target: ConstructorTarget::This,
            ..
        }
    ));
}

#[test]
fn anonymous_class_creation_names_the_class() {
    let module = build_ok("def r = new Runnable() {\n  void run() {}\n}");
    let ExprKind::ConstructorCall {
        anonymous_class, ..
    } = &value_of(&module).kind
    else {
        panic!("expected a constructor call");
    };
    assert_eq!(anonymous_class.as_deref(), Some("Script$1"));
    assert!(module.class("Script$1").is_some_and(|class| class.anonymous));
}
