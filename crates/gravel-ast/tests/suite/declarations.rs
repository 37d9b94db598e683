use gravel_ast::ast::{ClassKind, ExprKind, Flags};
use pretty_assertions::assert_eq;

use super::{build_err, build_ok};

#[test]
fn class_without_visibility_is_synthetically_public() {
    let module = build_ok("class A {}\nprivate class B {}");
    let a = module.class("A").expect("class A");
    assert!(a.synthetic_public);
    assert!(a.modifiers.contains(Flags::PUBLIC));

    let b = module.class("B").expect("class B");
    assert!(!b.synthetic_public);
    assert!(b.modifiers.contains(Flags::PRIVATE));
    assert!(!b.modifiers.contains(Flags::PUBLIC));
}

#[test]
fn package_qualifies_class_names() {
    let module = build_ok("package a.b\nclass C {\n  class D {}\n}");
    assert_eq!(module.package_name(), Some("a.b"));
    assert!(module.class("a.b.C").is_some());
    let inner = module.class("a.b.C$D").expect("nested class");
    assert_eq!(inner.outer_class.as_deref(), Some("a.b.C"));
}

#[test]
fn annotation_declaration_rules() {
    assert_eq!(
        build_err("@interface A<T> {}"),
        "annotation declaration cannot have type parameters"
    );
    assert_eq!(
        build_err("@interface A extends B {}"),
        "No extends clause allowed for annotation declaration"
    );
    assert_eq!(
        build_err("@interface A implements B {}"),
        "No implements clause allowed for annotation declaration"
    );
}

#[test]
fn annotation_declaration_implements_annotation() {
    let module = build_ok("@interface Marker {}");
    let class = module.class("Marker").expect("annotation");
    assert_eq!(class.kind, ClassKind::Annotation);
    assert!(class.modifiers.contains(Flags::ANNOTATION | Flags::INTERFACE));
    assert_eq!(class.interfaces[0].name, "java.lang.annotation.Annotation");
}

#[test]
fn enum_declaration_rules() {
    assert_eq!(
        build_err("enum E<T> { A }"),
        "enum declaration cannot have type parameters"
    );
    assert_eq!(
        build_err("enum E extends B { A }"),
        "No extends clause allowed for enum declaration"
    );
}

#[test]
fn enum_extends_parameterized_enum_base() {
    let module = build_ok("enum Color { RED, GREEN }");
    let class = module.class("Color").expect("enum");
    assert!(class.modifiers.contains(Flags::ENUM | Flags::FINAL));
    assert_eq!(class.super_class.name, "java.lang.Enum");
    assert_eq!(class.super_class.generics[0].ty.name, "Color");
    let constants: Vec<_> = class
        .fields
        .iter()
        .filter(|field| field.enum_constant)
        .map(|field| field.name.as_str())
        .collect();
    assert_eq!(constants, vec!["RED", "GREEN"]);
}

#[test]
fn interface_cannot_implement() {
    assert_eq!(
        build_err("interface I implements J {}"),
        "No implements clause allowed for interface declaration"
    );
}

#[test]
fn interface_with_default_method_becomes_trait() {
    let module = build_ok("interface I {\n  default int size() { 0 }\n}\ninterface J {}");
    assert!(module.class("I").expect("I").has_annotation("groovy.transform.Trait"));
    let plain = module.class("J").expect("J");
    assert!(!plain.has_annotation("groovy.transform.Trait"));
    assert!(plain.modifiers.contains(Flags::INTERFACE | Flags::ABSTRACT));
}

#[test]
fn trait_carries_trait_annotation() {
    let module = build_ok("trait T {}");
    let class = module.class("T").expect("trait");
    assert_eq!(class.kind, ClassKind::Trait);
    assert!(class.has_annotation("groovy.transform.Trait"));
}

#[test]
fn class_cannot_extend_multiple_classes() {
    assert_eq!(build_err("class A extends B, C {}"), "Cannot extend multiple classes");
}

#[test]
fn var_is_not_a_type_name() {
    assert_eq!(build_err("class var {}"), "var cannot be used for type declarations");
}

#[test]
fn field_without_visibility_is_a_property() {
    let module = build_ok("class A {\n  int x\n  private String y\n}");
    let class = module.class("A").expect("class");
    let property = class.property("x").expect("property x");
    assert!(property.modifiers.contains(Flags::PUBLIC));
    let backing = class.field("x").expect("backing field");
    assert!(backing.synthetic);
    assert!(backing.modifiers.contains(Flags::PRIVATE));

    assert!(class.property("y").is_none());
    let field = class.field("y").expect("field y");
    assert!(!field.synthetic);
}

#[test]
fn duplicated_members_are_fatal() {
    assert_eq!(
        build_err("class A {\n  private int x\n  private int x\n}"),
        "The field 'x' is declared multiple times"
    );
    assert_eq!(
        build_err("class A {\n  int x\n  int x\n}"),
        "The property 'x' is declared multiple times"
    );
}

#[test]
fn duplicated_parameter_is_fatal() {
    assert_eq!(
        build_err("def f(a, b, a) { }"),
        "Duplicated parameter 'a' found."
    );
}

#[test]
fn var_arg_must_come_last() {
    assert_eq!(
        build_err("def f(String... names, int n) { }"),
        "The var-arg parameter names must be the last parameter"
    );
}

#[test]
fn repeated_modifiers_are_fatal() {
    assert_eq!(build_err("static static class A {}"), "Cannot repeat modifier[static]");
    assert_eq!(
        build_err("public private class A {}"),
        "Cannot specify modifier[private] when access scope has already been defined"
    );
}

#[test]
fn class_method_requires_a_body_unless_abstract() {
    assert_eq!(
        build_err("class A {\n  void run()\n}"),
        "You defined a method[run] without a body. Try adding a method body, or declare it abstract"
    );
    let module = build_ok("abstract class A {\n  abstract void run()\n}");
    let method = module.class("A").and_then(|class| class.method("run")).expect("run");
    assert!(method.is_abstract());
    assert!(method.code.is_none());
}

#[test]
fn script_methods_belong_to_the_script_class() {
    let module = build_ok("def greet(name) { \"hi $name\" }\ngreet('x')");
    assert!(module.method("greet").is_some());
    assert_eq!(module.script.as_ref().map(|script| script.name.as_str()), Some("Script"));
}

#[test]
fn constructor_is_collected_separately() {
    let module = build_ok("class P {\n  P(int x) { }\n  void m() { }\n}");
    let class = module.class("P").expect("class");
    assert_eq!(class.constructors.len(), 1);
    assert!(class.constructors[0].is_constructor());
    assert_eq!(class.constructors[0].parameters[0].name, "x");
    assert!(class.method("m").is_some());
}

#[test]
fn enum_constant_body_is_an_anonymous_subclass() {
    let module = build_ok("enum E {\n  A(1) { def f() {} },\n  B\n}");
    let e = module.class("E").expect("enum");
    assert!(!e.modifiers.contains(Flags::FINAL));

    let body = module.class("E$1").expect("constant body class");
    assert!(body.anonymous);
    assert!(body.enum_constant_class);
    assert_eq!(body.super_class.name, "E");
    assert_eq!(body.outer_class.as_deref(), Some("E"));
    assert!(body.method("f").is_some());

    let a = e.field("A").expect("constant A");
    assert_eq!(body.range, a.range);
    let init = a.initial_value.as_ref().expect("constant arguments");
    let ExprKind::List { elements, .. } = &init.kind else {
        panic!("expected a list, got {:?}", init.kind);
    };
    assert_eq!(elements.len(), 2);
    let ExprKind::Class { ty } = &elements[1].kind else {
        panic!("expected the body class, got {:?}", elements[1].kind);
    };
    assert_eq!(ty.name, "E$1");
    assert!(init.range.contains(&elements[0].range));
    assert!(init.range.contains(&elements[1].range));

    assert!(e.field("B").expect("constant B").initial_value.is_none());
}

#[test]
fn anonymous_classes_are_numbered_per_outer_class() {
    let module = build_ok(
        "class O {\n  def m() {\n    def a = new Runnable() { void run() {} }\n    def b = new Runnable() { void run() {} }\n  }\n}",
    );
    for name in ["O$1", "O$2"] {
        let class = module.class(name).unwrap_or_else(|| panic!("missing {name}"));
        assert!(class.anonymous);
        assert_eq!(class.outer_class.as_deref(), Some("O"));
        assert_eq!(class.enclosing_method.as_deref(), Some("m"));
        assert_eq!(class.super_class.name, "Runnable");
    }
    assert!(module.class("O$3").is_none());
}

#[test]
fn property_reuses_an_earlier_field() {
    let module = build_ok("class A {\n  private int x = 1\n  def x\n}");
    let class = module.class("A").expect("class");
    let fields: Vec<_> = class.fields.iter().filter(|field| field.name == "x").collect();
    assert_eq!(fields.len(), 1);
    let field = fields[0];
    assert_eq!(field.ty.name, "int");
    assert!(field.initial_value.is_some());
    assert!(field.synthetic);
    assert!(field.modifiers.contains(Flags::PRIVATE));
    assert!(!field.modifiers.contains(Flags::PUBLIC));

    let property = class.property("x").expect("property");
    assert_eq!(property.ty.name, "int");
    assert!(property.modifiers.contains(Flags::PUBLIC));
}

#[test]
fn annotation_values_may_be_annotations() {
    let module = build_ok("@Outer(inner = @Inner(1))\nclass A {}");
    let outer = &module.class("A").expect("class A").annotations[0];
    assert_eq!(outer.class_name.name, "Outer");
    let value = outer.member("inner").expect("inner member");
    let ExprKind::AnnotationConstant { annotation } = &value.kind else {
        panic!("expected an annotation constant, got {:?}", value.kind);
    };
    assert_eq!(annotation.class_name.name, "Inner");
    assert!(annotation.member("value").is_some());
}
