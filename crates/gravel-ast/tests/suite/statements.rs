use gravel_ast::ast::{ExprKind, Expression, Module, StmtKind};
use gravel_core::SourceRange;
use pretty_assertions::assert_eq;

use super::{build_err, build_ok, script_expr};

#[test]
fn switch_rejects_a_second_default() {
    let message = build_err("switch (x) {\n  default: a()\n  default: b()\n}");
    assert_eq!(message, "a switch must only have one default branch");
}

#[test]
fn switch_default_must_be_last() {
    let message = build_err("switch (x) {\n  default: a()\n  case 1: b()\n}");
    assert_eq!(
        message,
        "a default branch must only appear as the last branch of a switch"
    );
}

#[test]
fn switch_collects_cases_and_default() {
    let module = build_ok("switch (x) {\n  case 1:\n  case 2: a(); break\n  default: b()\n}");
    let StmtKind::Switch { cases, default, .. } = &module.statements[0].kind else {
        panic!("expected switch, got {:?}", module.statements[0].kind);
    };
    assert_eq!(cases.len(), 2);
    assert!(default.is_some());
}

#[test]
fn break_outside_loop_or_switch_is_fatal() {
    let message = build_err("break");
    assert_eq!(message, "break statement is only allowed inside loops or switches");
}

#[test]
fn continue_inside_switch_only_is_fatal() {
    let message = build_err("switch (x) {\n  case 1: continue\n}");
    assert_eq!(message, "continue statement is only allowed inside loops");
}

#[test]
fn break_inside_while_has_no_label() {
    let module = build_ok("while (true) {\n  break\n}");
    let StmtKind::While { body, .. } = &module.statements[0].kind else {
        panic!("expected while, got {:?}", module.statements[0].kind);
    };
    assert_eq!(body.statements().len(), 1);
    assert_eq!(body.statements()[0].kind, StmtKind::Break { label: None });
}

#[test]
fn labeled_break_keeps_its_label() {
    let module = build_ok("outer:\nfor (i in 0..3) {\n  break outer\n}");
    let stmt = &module.statements[0];
    assert_eq!(stmt.labels, vec!["outer"]);
    let StmtKind::ForIn { variable, body, .. } = &stmt.kind else {
        panic!("expected for-in, got {:?}", stmt.kind);
    };
    assert_eq!(variable.name, "i");
    assert_eq!(
        body.statements()[0].kind,
        StmtKind::Break {
            label: Some("outer".into())
        }
    );
}

#[test]
fn classic_for_keeps_init_condition_and_update() {
    let module = build_ok("for (int i = 0; i < 3; i++) {\n  println i\n}");
    let StmtKind::For { control, .. } = &module.statements[0].kind else {
        panic!("expected for, got {:?}", module.statements[0].kind);
    };
    let ExprKind::ClosureList { expressions } = &control.kind else {
        panic!("expected closure list, got {:?}", control.kind);
    };
    assert_eq!(expressions.len(), 3);
    assert!(matches!(expressions[0].kind, ExprKind::Declaration { .. }));
    assert!(matches!(expressions[2].kind, ExprKind::Postfix { .. }));
}

#[test]
fn try_requires_a_handler() {
    let message = build_err("try {\n  a()\n}");
    assert_eq!(
        message,
        "Either a catch or finally clause or both is required for a try-catch-finally statement"
    );
}

#[test]
fn multi_catch_expands_to_one_catch_per_type() {
    let module = build_ok("try {\n  a()\n} catch (IOException | RuntimeException e) {\n  b()\n}");
    let StmtKind::Try { catches, finally, .. } = &module.statements[0].kind else {
        panic!("expected try, got {:?}", module.statements[0].kind);
    };
    let types: Vec<&str> = catches
        .iter()
        .map(|catch| catch.parameter.ty.name.as_str())
        .collect();
    assert_eq!(types, vec!["IOException", "RuntimeException"]);
    assert!(catches.iter().all(|catch| catch.parameter.name == "e"));
    assert!(finally.is_none());
}

fn declared_name(stmt: &gravel_ast::ast::Statement) -> Option<&str> {
    match &stmt.kind {
        StmtKind::Expression {
            expr:
                Expression {
                    kind: ExprKind::Declaration { target, .. },
                    ..
                },
        } => target.as_variable().map(|var| var.name.as_str()),
        _ => None,
    }
}

/// The statements guarded by a resource expansion.
fn guarded(stmt: &gravel_ast::ast::Statement) -> &gravel_ast::ast::Statement {
    match &stmt.statements()[2].kind {
        StmtKind::Try { block, .. } => block,
        other => panic!("expected the guarding try, got {other:?}"),
    }
}

#[test]
fn resources_close_in_reverse_declaration_order() {
    let module = build_ok(
        "try (InputStream is = new FileInputStream(f); OutputStream os = open()) {\n  copy(is, os)\n}",
    );
    let outer = &module.statements[0];
    assert!(matches!(outer.kind, StmtKind::Block { .. }));
    assert_eq!(declared_name(&outer.statements()[0]), Some("is"));

    let inner = guarded(outer);
    assert_eq!(declared_name(&inner.statements()[0]), Some("os"));

    // The innermost guard, the last one to open, wraps the original body and
    // so closes first.
    let body = guarded(inner);
    assert_eq!(body.statements().len(), 1);
    assert!(matches!(
        body.statements()[0].kind,
        StmtKind::Expression { .. }
    ));
}

#[test]
fn resource_declaration_keeps_its_type_and_initializer() {
    let module = build_ok("try (InputStream is = new FileInputStream(f)) {\n  read(is)\n}");
    let decl = &module.statements[0].statements()[0];
    let StmtKind::Expression { expr } = &decl.kind else {
        panic!("expected declaration, got {:?}", decl.kind);
    };
    let ExprKind::Declaration { target, value, .. } = &expr.kind else {
        panic!("expected declaration, got {:?}", expr.kind);
    };
    let var = target.as_variable().unwrap();
    assert_eq!(var.ty.as_ref().map(|ty| ty.name.as_str()), Some("InputStream"));
    assert!(matches!(value.kind, ExprKind::ConstructorCall { .. }));
}

#[test]
fn bare_variable_resource_is_redeclared_from_itself() {
    let module = build_ok("try (r) {\n  r.read()\n}");
    let decl = &module.statements[0].statements()[0];
    let StmtKind::Expression { expr } = &decl.kind else {
        panic!("expected declaration, got {:?}", decl.kind);
    };
    let ExprKind::Declaration { target, value, .. } = &expr.kind else {
        panic!("expected declaration, got {:?}", expr.kind);
    };
    assert_eq!(target.as_variable().map(|var| var.name.as_str()), Some("r"));
    assert_eq!(value.as_variable().map(|var| var.name.as_str()), Some("r"));
}

#[test]
fn resources_with_catch_wrap_the_expansion() {
    let module = build_ok("try (r) {\n  r.read()\n} catch (IOException e) {\n  log(e)\n}");
    let StmtKind::Try { block, catches, .. } = &module.statements[0].kind else {
        panic!("expected try, got {:?}", module.statements[0].kind);
    };
    assert_eq!(catches.len(), 1);
    assert_eq!(declared_name(&block.statements()[0]), Some("r"));
}

#[test]
fn multiple_declarators_in_one_resource_are_rejected() {
    let message = build_err("try (def a = x(), b = y()) {\n  a()\n}");
    assert_eq!(message, "Multi resources can not be declared in one statement");
}

#[test]
fn non_variable_resources_are_rejected() {
    let message = build_err("try (open()) {\n  a()\n}");
    assert_eq!(
        message,
        "Only variable declarations or variable access are allowed to declare resource"
    );
}

#[test]
fn assert_rejects_assignment_conditions() {
    let message = build_err("assert a = 1");
    assert_eq!(message, "Assignment expression is not allowed in the assert statement");
}

#[test]
fn assert_wraps_the_condition_as_boolean() {
    let module = build_ok("assert x > 1 : 'too small'");
    let StmtKind::Assert { cond, message } = &module.statements[0].kind else {
        panic!("expected assert, got {:?}", module.statements[0].kind);
    };
    assert!(matches!(cond.kind, ExprKind::Boolean { .. }));
    assert_eq!(message.as_str(), Some("too small"));
}

#[test]
fn import_inside_a_block_is_rejected() {
    let message = build_err("if (x) {\n  import a.B\n}");
    assert_eq!(message, "Import statement not expected here");
}

#[test]
fn resource_declaration_needs_an_initializer() {
    assert_eq!(
        build_err("try (def a) {\n  a.read()\n}"),
        "Resource 'a' must be initialized"
    );
}

fn var_keyword_of(module: &Module, index: usize) -> Option<SourceRange> {
    match &script_expr(module, index).kind {
        ExprKind::Declaration { var_keyword, .. } => *var_keyword,
        other => panic!("expected a declaration, got {other:?}"),
    }
}

#[test]
fn var_declarations_are_marked() {
    let module = build_ok("var x = 1\ndef y = 2\nvar (a, b) = [1, 2]");
    let var = var_keyword_of(&module, 0).expect("var marker");
    assert_eq!((var.line, var.column, var.last_column), (1, 1, 4));
    assert_eq!(var_keyword_of(&module, 1), None);
    let tuple = var_keyword_of(&module, 2).expect("var marker on the tuple");
    assert_eq!((tuple.line, tuple.column), (3, 1));
}

#[test]
fn var_loop_variable_is_marked() {
    let module = build_ok("for (var item in items) {\n  println item\n}\nfor (item in items) {}");
    let StmtKind::ForIn { variable, .. } = &module.statements[0].kind else {
        panic!("expected for-in, got {:?}", module.statements[0].kind);
    };
    assert!(variable.var_keyword.is_some());
    assert!(variable.dynamic_typed);
    let StmtKind::ForIn { variable, .. } = &module.statements[1].kind else {
        panic!("expected for-in, got {:?}", module.statements[1].kind);
    };
    assert_eq!(variable.var_keyword, None);
}
