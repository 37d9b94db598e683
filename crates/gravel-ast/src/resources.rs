//! Expansion of try-with-resources into plain try/catch/finally.
//!
//! Each resource wraps the statements after it:
//!
//! ```text
//! {
//!     R r = init
//!     Throwable __$$primaryExc1 = null
//!     try { <inner> }
//!     catch (Throwable __$$t1) { __$$primaryExc1 = __$$t1; throw __$$t1 }
//!     finally {
//!         if (r != null) {
//!             if (__$$primaryExc1 != null) {
//!                 try { r.close() }
//!                 catch (Throwable __$$suppressedExc1) { __$$primaryExc1.addSuppressed(__$$suppressedExc1) }
//!             } else {
//!                 r.close()
//!             }
//!         }
//!     }
//! }
//! ```
//!
//! so resources open in declaration order and close in reverse. Catch and
//! finally clauses of the source statement wrap the whole expansion.
//! Synthesized nodes carry [`SourceRange::UNKNOWN`], except the block and
//! try around a resource, which span the resource and the code it guards.

use gravel_core::SourceRange;
use smol_str::SmolStr;

use crate::ast::{
    CatchStatement, ConstantValue, ExprKind, Expression, Flags, Operator, Parameter, Statement,
    StmtKind, TypeRef, Variable,
};

const THROWABLE: &str = "java.lang.Throwable";

/// Expand `try (resources) block catches finally` ranged at `range`.
///
/// `counter` numbers the synthetic variables so nested expansions never
/// share a name.
pub(crate) fn desugar(
    resources: Vec<Statement>,
    block: Statement,
    catches: Vec<CatchStatement>,
    finally: Option<Statement>,
    range: SourceRange,
    counter: &mut u32,
) -> Statement {
    let mut body = block;
    for resource in resources.into_iter().rev() {
        *counter += 1;
        body = guard(resource, body, *counter);
    }

    if catches.is_empty() && finally.is_none() {
        body.range = range;
        return body;
    }
    Statement::new(
        StmtKind::Try {
            block: Box::new(body),
            catches,
            finally: finally.map(Box::new),
        },
        range,
    )
}

/// The declaration, primary-exception slot and guarded try for one resource.
fn guard(resource: Statement, body: Statement, id: u32) -> Statement {
    let name = declared_name(&resource);
    let primary = SmolStr::from(format!("__$$primaryExc{id}"));
    let thrown = SmolStr::from(format!("__$$t{id}"));
    let suppressed = SmolStr::from(format!("__$$suppressedExc{id}"));

    let primary_decl = Statement::expression(Expression::synthetic(ExprKind::Declaration {
        target: Box::new(typed_variable(&primary)),
        op: assign(),
        value: Box::new(Expression::null(SourceRange::UNKNOWN)),
        modifiers: Flags::NONE,
        annotations: Vec::new(),
        var_keyword: None,
    }));

    let rethrow = Statement::block(
        vec![
            Statement::expression(assignment(&primary, variable(&thrown))),
            Statement::new(
                StmtKind::Throw {
                    expr: variable(&thrown),
                },
                SourceRange::UNKNOWN,
            ),
        ],
        SourceRange::UNKNOWN,
    );

    let finally = match &name {
        Some(name) => close_on_exit(name, &primary, &suppressed),
        None => Statement::block(Vec::new(), SourceRange::UNKNOWN),
    };

    let guarded = body.range;
    let covered = resource.range.to(guarded);
    let try_stmt = Statement::new(
        StmtKind::Try {
            block: Box::new(body),
            catches: vec![catch_throwable(&thrown, rethrow)],
            finally: Some(Box::new(finally)),
        },
        guarded,
    );

    Statement::block(vec![resource, primary_decl, try_stmt], covered)
}

fn close_on_exit(resource: &SmolStr, primary: &SmolStr, suppressed: &SmolStr) -> Statement {
    let add_suppressed = Statement::expression(call(
        variable(primary),
        "addSuppressed",
        vec![variable(suppressed)],
    ));
    let close_quietly = Statement::new(
        StmtKind::Try {
            block: Box::new(block_of(Statement::expression(close(resource)))),
            catches: vec![catch_throwable(suppressed, block_of(add_suppressed))],
            finally: None,
        },
        SourceRange::UNKNOWN,
    );
    let close_after_failure = Statement::new(
        StmtKind::If {
            cond: not_null(primary),
            then: Box::new(block_of(close_quietly)),
            else_: Box::new(block_of(Statement::expression(close(resource)))),
        },
        SourceRange::UNKNOWN,
    );
    block_of(Statement::new(
        StmtKind::If {
            cond: not_null(resource),
            then: Box::new(block_of(close_after_failure)),
            else_: Box::new(Statement::empty()),
        },
        SourceRange::UNKNOWN,
    ))
}

fn declared_name(resource: &Statement) -> Option<SmolStr> {
    match &resource.kind {
        StmtKind::Expression {
            expr:
                Expression {
                    kind: ExprKind::Declaration { target, .. },
                    ..
                },
        } => target.as_variable().map(|var| var.name.clone()),
        _ => None,
    }
}

fn catch_throwable(name: &SmolStr, code: Statement) -> CatchStatement {
    CatchStatement {
        parameter: Parameter {
            name: name.clone(),
            ty: TypeRef::named(THROWABLE, SourceRange::UNKNOWN),
            dynamic_typed: false,
            modifiers: Flags::NONE,
            annotations: Vec::new(),
            default: None,
            var_keyword: None,
            name_range: SourceRange::UNKNOWN,
            range: SourceRange::UNKNOWN,
        },
        code: Box::new(code),
        range: SourceRange::UNKNOWN,
    }
}

fn block_of(stmt: Statement) -> Statement {
    Statement::block(vec![stmt], SourceRange::UNKNOWN)
}

fn variable(name: &SmolStr) -> Expression {
    Expression::variable(name.clone(), SourceRange::UNKNOWN)
}

fn typed_variable(name: &SmolStr) -> Expression {
    Expression::synthetic(ExprKind::Variable(Variable {
        name: name.clone(),
        ty: Some(TypeRef::named(THROWABLE, SourceRange::UNKNOWN)),
        modifiers: Flags::NONE,
        built_in: false,
    }))
}

fn assign() -> Operator {
    Operator::new("=", SourceRange::UNKNOWN)
}

fn assignment(name: &SmolStr, value: Expression) -> Expression {
    Expression::synthetic(ExprKind::Binary {
        left: Box::new(variable(name)),
        op: assign(),
        right: Box::new(value),
        safe: false,
    })
}

fn not_null(name: &SmolStr) -> Expression {
    let compare = Expression::synthetic(ExprKind::Binary {
        left: Box::new(variable(name)),
        op: Operator::new("!=", SourceRange::UNKNOWN),
        right: Box::new(Expression::constant(ConstantValue::Null, SourceRange::UNKNOWN)),
        safe: false,
    });
    Expression::synthetic(ExprKind::Boolean {
        expr: Box::new(compare),
    })
}

fn close(resource: &SmolStr) -> Expression {
    call(variable(resource), "close", Vec::new())
}

fn call(object: Expression, method: &str, arguments: Vec<Expression>) -> Expression {
    Expression::synthetic(ExprKind::MethodCall {
        object: Box::new(object),
        method: Box::new(Expression::string(method, SourceRange::UNKNOWN)),
        arguments: Box::new(Expression::synthetic(ExprKind::ArgumentList { arguments })),
        implicit_this: false,
        safe: false,
        spread_safe: false,
        generics: Vec::new(),
        command: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(name: &str) -> Statement {
        Statement::expression(Expression::synthetic(ExprKind::Declaration {
            target: Box::new(Expression::variable(name, SourceRange::UNKNOWN)),
            op: assign(),
            value: Box::new(Expression::empty()),
            modifiers: Flags::NONE,
            annotations: Vec::new(),
            var_keyword: None,
        }))
    }

    fn first_declared(stmt: &Statement) -> Option<SmolStr> {
        stmt.statements().first().and_then(declared_name)
    }

    fn guarded_body(stmt: &Statement) -> &Statement {
        match &stmt.statements()[2].kind {
            StmtKind::Try { block, .. } => block,
            other => panic!("expected try, got {other:?}"),
        }
    }

    #[test]
    fn resources_open_in_order_and_nest_in_reverse() {
        let mut counter = 0;
        let body = Statement::block(Vec::new(), SourceRange::UNKNOWN);
        let out = desugar(
            vec![resource("a"), resource("b")],
            body,
            Vec::new(),
            None,
            SourceRange::UNKNOWN,
            &mut counter,
        );
        assert_eq!(counter, 2);
        assert_eq!(first_declared(&out).as_deref(), Some("a"));
        let inner = guarded_body(&out);
        assert_eq!(first_declared(inner).as_deref(), Some("b"));
        assert!(matches!(
            guarded_body(inner).kind,
            StmtKind::Block { ref statements } if statements.is_empty()
        ));
    }

    fn at(start: usize, end: usize) -> SourceRange {
        SourceRange {
            start,
            end,
            line: 1,
            column: start as u32 + 1,
            last_line: 1,
            last_column: end as u32 + 1,
        }
    }

    #[test]
    fn guard_spans_resource_and_body() {
        let mut counter = 0;
        let mut decl = resource("r");
        decl.range = at(5, 14);
        let out = desugar(
            vec![decl],
            Statement::block(Vec::new(), at(16, 18)),
            Vec::new(),
            Some(Statement::empty()),
            at(0, 30),
            &mut counter,
        );
        let StmtKind::Try { block, .. } = &out.kind else {
            panic!("expected try, got {:?}", out.kind);
        };
        assert_eq!(block.range, at(5, 18));
        assert_eq!(block.statements()[2].range, at(16, 18));
        assert!(block.statements()[1].range.is_unknown());
    }

    #[test]
    fn catches_wrap_the_expansion() {
        let mut counter = 0;
        let catch = catch_throwable(&SmolStr::new("e"), Statement::empty());
        let out = desugar(
            vec![resource("r")],
            Statement::empty(),
            vec![catch],
            None,
            SourceRange::UNKNOWN,
            &mut counter,
        );
        match out.kind {
            StmtKind::Try { catches, block, .. } => {
                assert_eq!(catches.len(), 1);
                assert_eq!(catches[0].parameter.name, "e");
                assert_eq!(first_declared(&block).as_deref(), Some("r"));
            }
            other => panic!("expected try, got {other:?}"),
        }
    }
}
