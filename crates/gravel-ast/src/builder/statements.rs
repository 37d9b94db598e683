//! Blocks and statements.

use gravel_core::{SourceRange, Span};
use gravel_syntax::tree::{
    self, Block, CatchClause, ExpressionListElement, ForControl, ForInit, ParExpr, Resource,
    SwitchLabel, SwitchStmt, TryStmt, VariableDeclaration, VariableDeclarationKind,
};

use super::{AstBuilder, BResult};
use crate::ast::{
    CaseStatement, CatchStatement, ExprKind, Expression, Flags, Operator, Parameter, Statement,
    StmtKind, TypeRef, Variable,
};
use crate::reporter::ParsingFailed;
use crate::resources;

impl<'a> AstBuilder<'a> {
    pub(super) fn block(&mut self, block: &Block) -> BResult<Statement> {
        let statements = self.block_statements(&block.statements)?;
        Ok(Statement::block(statements, self.range(block.range)?))
    }

    /// Statements of a block; declaration lists are flattened in place.
    pub(super) fn block_statements(&mut self, statements: &[tree::Statement]) -> BResult<Vec<Statement>> {
        let mut out = Vec::with_capacity(statements.len());
        for stmt in statements {
            match stmt {
                tree::Statement::LocalVariable(decl) => out.extend(self.local_declarations(decl)?),
                _ => out.push(self.statement(stmt)?),
            }
        }
        Ok(out)
    }

    pub(super) fn statement(&mut self, stmt: &tree::Statement) -> BResult<Statement> {
        match stmt {
            tree::Statement::Block(block) => self.block(block),
            tree::Statement::If {
                cond,
                then,
                else_,
                range,
            } => {
                let cond = self.condition(cond)?;
                let then = self.statement(then)?;
                let else_ = match else_ {
                    Some(stmt) => self.statement(stmt)?,
                    None => Statement::empty(),
                };
                Ok(Statement::new(
                    StmtKind::If {
                        cond,
                        then: Box::new(then),
                        else_: Box::new(else_),
                    },
                    self.range(*range)?,
                ))
            }
            tree::Statement::For {
                control,
                body,
                range,
            } => self.for_statement(control, body, *range),
            tree::Statement::While { cond, body, range } => {
                let cond = self.condition(cond)?;
                let body = self.loop_body(body)?;
                Ok(Statement::new(
                    StmtKind::While {
                        cond,
                        body: Box::new(body),
                    },
                    self.range(*range)?,
                ))
            }
            tree::Statement::DoWhile { body, cond, range } => {
                let body = self.loop_body(body)?;
                let cond = self.condition(cond)?;
                Ok(Statement::new(
                    StmtKind::DoWhile {
                        body: Box::new(body),
                        cond,
                    },
                    self.range(*range)?,
                ))
            }
            tree::Statement::Try(stmt) => self.try_statement(stmt),
            tree::Statement::Switch(stmt) => self.switch_statement(stmt),
            tree::Statement::Synchronized { expr, block, range } => {
                let expr = self.statement_expr(&expr.inner)?;
                let block = self.block(block)?;
                Ok(Statement::new(
                    StmtKind::Synchronized {
                        expr,
                        block: Box::new(block),
                    },
                    self.range(*range)?,
                ))
            }
            tree::Statement::Return { expr, range } => {
                let expr = match expr {
                    Some(expr) => self.expr(expr)?,
                    None => Expression::empty(),
                };
                Ok(Statement::new(StmtKind::Return { expr }, self.range(*range)?))
            }
            tree::Statement::Throw { expr, range } => {
                let expr = self.expr(expr)?;
                Ok(Statement::new(StmtKind::Throw { expr }, self.range(*range)?))
            }
            tree::Statement::Break { label, range } => {
                if self.loop_depth == 0 && self.switch_depth == 0 {
                    return self.fail(
                        "break statement is only allowed inside loops or switches",
                        *range,
                    );
                }
                Ok(Statement::new(
                    StmtKind::Break {
                        label: label.as_ref().map(|label| label.text.clone()),
                    },
                    self.range(*range)?,
                ))
            }
            tree::Statement::Continue { label, range } => {
                if self.loop_depth == 0 {
                    return self.fail("continue statement is only allowed inside loops", *range);
                }
                Ok(Statement::new(
                    StmtKind::Continue {
                        label: label.as_ref().map(|label| label.text.clone()),
                    },
                    self.range(*range)?,
                ))
            }
            tree::Statement::Labeled {
                label, statement, ..
            } => {
                let mut stmt = self.statement(statement)?;
                stmt.labels.push(label.text.clone());
                Ok(stmt)
            }
            tree::Statement::Assert {
                cond,
                message,
                range,
            } => {
                let cond = self.expr(cond)?;
                if let ExprKind::Binary { op, .. } = &cond.kind {
                    if op.is("=") {
                        return Err(ParsingFailed::new(
                            "Assignment expression is not allowed in the assert statement",
                            cond.range,
                        ));
                    }
                }
                let message = match message {
                    Some(message) => self.expr(message)?,
                    None => Expression::empty(),
                };
                Ok(Statement::new(
                    StmtKind::Assert {
                        cond: boolean(cond),
                        message,
                    },
                    self.range(*range)?,
                ))
            }
            tree::Statement::LocalVariable(decl) => {
                let range = self.range(decl.range)?;
                let mut statements = self.local_declarations(decl)?;
                if statements.len() == 1 {
                    Ok(statements.remove(0))
                } else {
                    Ok(Statement::block(statements, range))
                }
            }
            tree::Statement::Expression(cmd) => {
                let expr = self.command_expr(cmd)?;
                Ok(Statement::new(
                    StmtKind::Expression { expr },
                    self.range(cmd.range)?,
                ))
            }
            tree::Statement::Empty(span) => Ok(Statement::block(Vec::new(), self.range(*span)?)),
            tree::Statement::Method(method) => {
                self.fail("Method definition not expected here", method.range)
            }
            tree::Statement::Import(import) => {
                self.fail("Import statement not expected here", import.range)
            }
        }
    }

    /// A parenthesized condition, evaluated for its truth value.
    fn condition(&mut self, cond: &ParExpr) -> BResult<Expression> {
        Ok(boolean(self.statement_expr(&cond.inner)?))
    }

    fn loop_body(&mut self, body: &tree::Statement) -> BResult<Statement> {
        self.loop_depth += 1;
        let body = self.statement(body);
        self.loop_depth -= 1;
        body
    }

    fn for_statement(
        &mut self,
        control: &ForControl,
        body: &tree::Statement,
        range: Span,
    ) -> BResult<Statement> {
        let range = self.range(range)?;
        match control {
            ForControl::Enhanced {
                modifiers,
                ty,
                name,
                expr,
                ..
            } => {
                let set = self.modifiers(modifiers)?;
                let (var_type, dynamic_typed) = match ty {
                    Some(ty) => (self.ty(ty)?, false),
                    None => (TypeRef::object(), true),
                };
                let variable = Parameter {
                    name: name.text.clone(),
                    ty: var_type,
                    dynamic_typed,
                    modifiers: set.flags(),
                    annotations: set.annotations(),
                    default: None,
                    var_keyword: set.var_keyword(),
                    name_range: self.range(name.range)?,
                    range: self.range(Span::new(modifiers.range.start, name.range.end))?,
                };
                let collection = self.expr(expr)?;
                let body = self.loop_body(body)?;
                Ok(Statement::new(
                    StmtKind::ForIn {
                        variable,
                        collection,
                        body: Box::new(body),
                    },
                    range,
                ))
            }
            ForControl::Classic {
                init,
                cond,
                update,
                range: control_range,
            } => {
                let init = match init {
                    None => Expression::empty(),
                    Some(ForInit::Declaration(decl)) => self.for_init_declaration(decl)?,
                    Some(ForInit::Expressions(list)) => self.expression_sequence(list)?,
                };
                let cond = match cond {
                    Some(cond) => self.expr(cond)?,
                    None => Expression::empty(),
                };
                let update = if update.is_empty() {
                    Expression::empty()
                } else {
                    self.expression_sequence(update)?
                };
                let control = Expression::new(
                    ExprKind::ClosureList {
                        expressions: vec![init, cond, update],
                    },
                    self.range(*control_range)?,
                );
                let body = self.loop_body(body)?;
                Ok(Statement::new(
                    StmtKind::For {
                        control,
                        body: Box::new(body),
                    },
                    range,
                ))
            }
        }
    }

    fn for_init_declaration(&mut self, decl: &VariableDeclaration) -> BResult<Expression> {
        let range = self.range(decl.range)?;
        let mut expressions: Vec<Expression> = self
            .local_declarations(decl)?
            .into_iter()
            .filter_map(|stmt| match stmt.kind {
                StmtKind::Expression { expr } => Some(expr),
                _ => None,
            })
            .collect();
        if expressions.len() == 1 {
            Ok(expressions.remove(0))
        } else {
            Ok(Expression::new(ExprKind::ClosureList { expressions }, range))
        }
    }

    /// One expression, or several wrapped in a closure list.
    fn expression_sequence(&mut self, list: &[ExpressionListElement]) -> BResult<Expression> {
        let mut expressions = self.expression_list(list, false)?;
        if expressions.len() == 1 {
            return Ok(expressions.remove(0));
        }
        let span = match (list.first(), list.last()) {
            (Some(first), Some(last)) => first.range.cover(last.range),
            _ => return Ok(Expression::empty()),
        };
        Ok(Expression::new(
            ExprKind::ClosureList { expressions },
            self.range(span)?,
        ))
    }

    fn switch_statement(&mut self, stmt: &SwitchStmt) -> BResult<Statement> {
        let expr = self.statement_expr(&stmt.expr.inner)?;

        self.switch_depth += 1;
        let branches = self.switch_branches(stmt);
        self.switch_depth -= 1;
        let branches = branches?;

        let mut cases = Vec::new();
        let mut defaults: Vec<(Statement, Span)> = Vec::new();
        let mut last_is_case = false;
        for branch in branches {
            match branch {
                Branch::Case(case) => {
                    cases.push(case);
                    last_is_case = true;
                }
                Branch::Default(block, label) => {
                    defaults.push((block, label));
                    last_is_case = false;
                }
            }
        }
        if defaults.len() > 1 {
            return self.fail("a switch must only have one default branch", defaults[0].1);
        }
        if !defaults.is_empty() && last_is_case {
            return self.fail(
                "a default branch must only appear as the last branch of a switch",
                defaults[0].1,
            );
        }

        Ok(Statement::new(
            StmtKind::Switch {
                expr,
                cases,
                default: defaults.into_iter().next().map(|(block, _)| Box::new(block)),
            },
            self.range(stmt.range)?,
        ))
    }

    fn switch_branches(&mut self, stmt: &SwitchStmt) -> BResult<Vec<Branch>> {
        let mut branches = Vec::new();
        for group in &stmt.groups {
            let count = group.labels.len();
            let first_label = match group.labels.first() {
                Some(SwitchLabel::Case { range, .. }) | Some(SwitchLabel::Default(range)) => {
                    range.start
                }
                None => group.range.start,
            };
            for (idx, label) in group.labels.iter().enumerate() {
                let is_last = idx + 1 == count;
                match label {
                    SwitchLabel::Case { expr, range } => {
                        let expr = self.expr(expr)?;
                        let (code, end) = if is_last {
                            (self.group_block(group)?, group.range.end)
                        } else {
                            (Statement::empty(), range.end)
                        };
                        branches.push(Branch::Case(CaseStatement {
                            expr,
                            code: Box::new(code),
                            range: self.range(Span::new(first_label, end))?,
                        }));
                    }
                    SwitchLabel::Default(label) => {
                        let mut block = self.group_block(group)?;
                        block.range = self.range(Span::new(label.start, group.range.end))?;
                        branches.push(Branch::Default(block, *label));
                    }
                }
            }
        }
        Ok(branches)
    }

    fn group_block(&mut self, group: &tree::SwitchGroup) -> BResult<Statement> {
        let statements = self.block_statements(&group.statements)?;
        let range = match (group.statements.first(), group.statements.last()) {
            (Some(first), Some(last)) => self.range(first.range().cover(last.range()))?,
            _ => SourceRange::UNKNOWN,
        };
        Ok(Statement::block(statements, range))
    }

    fn try_statement(&mut self, stmt: &TryStmt) -> BResult<Statement> {
        if stmt.resources.is_none() && stmt.catches.is_empty() && stmt.finally.is_none() {
            return self.fail(
                "Either a catch or finally clause or both is required for a try-catch-finally statement",
                stmt.range,
            );
        }
        let range = self.range(stmt.range)?;

        let resources = match &stmt.resources {
            Some(resources) => resources
                .list
                .iter()
                .map(|resource| self.resource(resource))
                .collect::<BResult<Vec<_>>>()?,
            None => Vec::new(),
        };
        let block = self.block(&stmt.block)?;
        let mut catches = Vec::new();
        for clause in &stmt.catches {
            catches.extend(self.catch_clause(clause)?);
        }
        let finally = match &stmt.finally {
            Some(block) => Some(self.block(block)?),
            None => None,
        };

        if resources.is_empty() {
            return Ok(Statement::new(
                StmtKind::Try {
                    block: Box::new(block),
                    catches,
                    finally: finally.map(Box::new),
                },
                range,
            ));
        }
        Ok(resources::desugar(
            resources,
            block,
            catches,
            finally,
            range,
            &mut self.resource_count,
        ))
    }

    /// A resource as a single declaration statement.
    fn resource(&mut self, resource: &Resource) -> BResult<Statement> {
        match resource {
            Resource::Declaration(decl) => {
                if matches!(decl.kind, VariableDeclarationKind::Tuple { .. }) {
                    return self.fail("Multi resources can not be declared in one statement", decl.range);
                }
                let mut statements = self.local_declarations(decl)?;
                if statements.len() != 1 {
                    return self.fail("Multi resources can not be declared in one statement", decl.range);
                }
                if let VariableDeclarationKind::Declarators { declarators, .. } = &decl.kind {
                    if let Some(uninitialized) = declarators.iter().find(|d| d.init.is_none()) {
                        return self.fail(
                            format!("Resource '{}' must be initialized", uninitialized.name.text),
                            uninitialized.range,
                        );
                    }
                }
                Ok(statements.remove(0))
            }
            Resource::Expr(expr) => {
                let span = expr.range();
                let range = self.range(span)?;
                let lowered = self.expr(expr)?;
                let (target, op, value) = if let Some(var) = lowered.as_variable() {
                    // `try (r)` closes an existing variable: `def r = r`.
                    let target = Expression::variable(var.name.clone(), lowered.range);
                    (target, Operator::new("=", SourceRange::UNKNOWN), lowered)
                } else {
                    match lowered.kind {
                        ExprKind::Binary {
                            left, op, right, ..
                        } if op.is("=") && left.as_variable().is_some() => (*left, op, *right),
                        _ => {
                            return self.fail(
                                "Only variable declarations or variable access are allowed to declare resource",
                                span,
                            )
                        }
                    }
                };
                let declaration = Expression::new(
                    ExprKind::Declaration {
                        target: Box::new(target),
                        op,
                        value: Box::new(value),
                        modifiers: Flags::NONE,
                        annotations: Vec::new(),
                        var_keyword: None,
                    },
                    range,
                );
                Ok(Statement::new(StmtKind::Expression { expr: declaration }, range))
            }
        }
    }

    /// One catch statement per caught type.
    fn catch_clause(&mut self, clause: &CatchClause) -> BResult<Vec<CatchStatement>> {
        let modifiers = self.modifiers(&clause.modifiers)?;
        let range = self.range(clause.range)?;
        let name_range = self.range(clause.name.range)?;
        let param_range = self.range(Span::new(clause.modifiers.range.start, clause.name.range.end))?;

        let types: Vec<(TypeRef, bool)> = if clause.types.is_empty() {
            vec![(TypeRef::object(), true)]
        } else {
            clause
                .types
                .iter()
                .map(|name| Ok((TypeRef::named(name.text(), self.range(name.range)?), false)))
                .collect::<BResult<Vec<_>>>()?
        };

        let mut catches = Vec::with_capacity(types.len());
        for (ty, dynamic_typed) in types {
            let code = self.block(&clause.block)?;
            catches.push(CatchStatement {
                parameter: Parameter {
                    name: clause.name.text.clone(),
                    ty,
                    dynamic_typed,
                    modifiers: modifiers.flags(),
                    annotations: modifiers.annotations(),
                    default: None,
                    var_keyword: None,
                    name_range,
                    range: param_range,
                },
                code: Box::new(code),
                range,
            });
        }
        Ok(catches)
    }

    /// A local variable declaration as one statement per declared variable.
    pub(super) fn local_declarations(&mut self, decl: &VariableDeclaration) -> BResult<Vec<Statement>> {
        let modifiers = self.modifiers(&decl.modifiers)?;
        let flags = modifiers.flags();
        let decl_range = self.range(decl.range)?;

        match &decl.kind {
            VariableDeclarationKind::Tuple { pairs, assign, init } => {
                let mut elements = Vec::with_capacity(pairs.len());
                for pair in pairs {
                    let ty = match &pair.ty {
                        Some(ty) => Some(self.ty(ty)?),
                        None => None,
                    };
                    elements.push(Expression::new(
                        ExprKind::Variable(Variable {
                            name: pair.name.text.clone(),
                            ty,
                            modifiers: flags,
                            built_in: false,
                        }),
                        self.range(pair.name.range)?,
                    ));
                }
                let targets_range = match (pairs.first(), pairs.last()) {
                    (Some(first), Some(last)) => self.range(first.range.cover(last.range))?,
                    _ => SourceRange::UNKNOWN,
                };
                let value = self.statement_expr(init)?;
                let declaration = Expression::new(
                    ExprKind::Declaration {
                        target: Box::new(Expression::new(ExprKind::Tuple { elements }, targets_range)),
                        op: Operator::new("=", self.range(*assign)?),
                        value: Box::new(value),
                        modifiers: flags,
                        annotations: modifiers.annotations(),
                        var_keyword: modifiers.var_keyword(),
                    },
                    decl_range,
                );
                Ok(vec![Statement::new(
                    StmtKind::Expression { expr: declaration },
                    decl_range,
                )])
            }
            VariableDeclarationKind::Declarators { ty, declarators } => {
                let var_type = match ty {
                    Some(ty) => Some(self.ty(ty)?),
                    None => None,
                };
                let single = declarators.len() == 1;
                let mut statements = Vec::with_capacity(declarators.len());
                for (idx, declarator) in declarators.iter().enumerate() {
                    let target = Expression::new(
                        ExprKind::Variable(Variable {
                            name: declarator.name.text.clone(),
                            ty: var_type.clone(),
                            modifiers: flags,
                            built_in: false,
                        }),
                        self.range(declarator.name.range)?,
                    );
                    let op = match declarator.assign {
                        Some(assign) => Operator::new("=", self.range(assign)?),
                        None => Operator::new("=", SourceRange::UNKNOWN),
                    };
                    let value = match &declarator.init {
                        Some(init) => self.statement_expr(init)?,
                        None => Expression::empty(),
                    };
                    // The first declarator starts with the modifiers and type.
                    let range = if single {
                        decl_range
                    } else if idx == 0 {
                        self.range(Span::new(decl.range.start, declarator.range.end))?
                    } else {
                        self.range(declarator.range)?
                    };
                    let declaration = Expression::new(
                        ExprKind::Declaration {
                            target: Box::new(target),
                            op,
                            value: Box::new(value),
                            modifiers: flags,
                            annotations: modifiers.annotations(),
                            var_keyword: modifiers.var_keyword(),
                        },
                        range,
                    );
                    statements.push(Statement::new(
                        StmtKind::Expression { expr: declaration },
                        range,
                    ));
                }
                Ok(statements)
            }
        }
    }
}

enum Branch {
    Case(CaseStatement),
    /// The default block and the span of its label.
    Default(Statement, Span),
}

/// Wrap a condition, keeping its range.
fn boolean(expr: Expression) -> Expression {
    let range = expr.range;
    Expression::new(
        ExprKind::Boolean {
            expr: Box::new(expr),
        },
        range,
    )
}
