use gravel_ast::ast::{ExprKind, Expression, Module, Statement, StmtKind};
use gravel_ast::{build_ast, CompilationFailed};
use gravel_syntax::{ParseOptions, PredictionCache};

mod declarations;
mod expressions;
mod positions;
mod statements;

pub(crate) fn build(text: &str) -> Result<Module, CompilationFailed> {
    build_ast("Script.groovy", text, &ParseOptions::default(), &PredictionCache::new())
}

#[track_caller]
pub(crate) fn build_ok(text: &str) -> Module {
    match build(text) {
        Ok(module) => module,
        Err(err) => panic!("failed to build {text:?}: {:?}", err.errors()),
    }
}

/// Message of the first diagnostic of a build expected to fail.
#[track_caller]
pub(crate) fn build_err(text: &str) -> String {
    match build(text) {
        Ok(module) => panic!("expected {text:?} to fail, got {module:#?}"),
        Err(err) => err.first_message().unwrap_or_default().to_string(),
    }
}

/// The expression of the `index`th script statement.
#[track_caller]
pub(crate) fn script_expr(module: &Module, index: usize) -> &Expression {
    match &module.statements[index].kind {
        StmtKind::Expression { expr } => expr,
        other => panic!("expected an expression statement, got {other:?}"),
    }
}

/// The value of a `def x = value` script statement.
#[track_caller]
pub(crate) fn declared_value(stmt: &Statement) -> &Expression {
    match &stmt.kind {
        StmtKind::Expression {
            expr: Expression {
                kind: ExprKind::Declaration { value, .. },
                ..
            },
        } => value,
        other => panic!("expected a declaration, got {other:?}"),
    }
}
