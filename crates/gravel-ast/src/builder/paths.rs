//! Path expressions: a primary followed by member access, calls, indexing
//! and trailing closures, folded left to right.

use std::collections::HashSet;

use gravel_core::{SourceRange, Span};
use gravel_syntax::tree::{
    ArgumentList, ArgumentListElement, Arguments, CommandArgument, CommandArgumentTail,
    MapEntryKey, MemberAccess, NamePart, PathElement, PathExpr,
};

use super::expressions::call_method;
use super::{AstBuilder, BResult};
use crate::ast::{
    Constant, ConstantValue, ConstructorTarget, ExprKind, Expression, Operator, Variable,
};

impl<'a> AstBuilder<'a> {
    pub(super) fn path_expr(&mut self, path: &PathExpr) -> BResult<Expression> {
        let base = self.primary(&path.primary)?;
        self.fold_path(base, path.primary.range().start, &path.elements)
    }

    /// Every step covers `start` through the end of its element, so a
    /// parenthesized primary contributes its parentheses.
    fn fold_path(
        &mut self,
        mut base: Expression,
        start: usize,
        elements: &[PathElement],
    ) -> BResult<Expression> {
        // Set once `??.` is seen; later `.` accesses stay null-safe.
        let mut safe_chain = false;
        for element in elements {
            let span = Span::new(start, element.range().end);
            base = self.path_element(base, element, span, &mut safe_chain)?;
        }
        Ok(base)
    }

    fn path_element(
        &mut self,
        base: Expression,
        element: &PathElement,
        span: Span,
        safe_chain: &mut bool,
    ) -> BResult<Expression> {
        let range = self.range(span)?;
        let mut lowered = match element {
            PathElement::Member {
                access,
                attribute,
                type_args,
                name,
                ..
            } => {
                let name = self.name_part(name)?;
                let (safe, spread_safe) = match access {
                    MemberAccess::MethodPointer => {
                        return Ok(Expression::new(
                            ExprKind::MethodPointer {
                                object: Box::new(base),
                                method: Box::new(name),
                            },
                            range,
                        ))
                    }
                    MemberAccess::MethodReference => {
                        return Ok(Expression::new(
                            ExprKind::MethodReference {
                                object: Box::new(base),
                                method: Box::new(name),
                            },
                            range,
                        ))
                    }
                    MemberAccess::Dot => (*safe_chain, false),
                    MemberAccess::SafeDot => (true, false),
                    MemberAccess::SafeChainDot => {
                        *safe_chain = true;
                        (true, false)
                    }
                    MemberAccess::SpreadDot => (true, true),
                };
                let generics = match type_args {
                    Some(args) if !attribute => self.type_arguments(args)?,
                    _ => Vec::new(),
                };
                Expression::new(
                    ExprKind::Property {
                        object: Box::new(base),
                        property: Box::new(name),
                        safe,
                        spread_safe,
                        attribute: *attribute,
                        generics,
                    },
                    range,
                )
            }
            PathElement::New { creator, .. } => self.creator(creator, Some(base), span)?,
            PathElement::Index {
                safe,
                elements,
                range: index_range,
            } => {
                let mut lowered = self.expression_list(elements, true)?;
                let right = match (lowered.len(), elements.first()) {
                    (1, Some(first)) if first.spread.is_none() => lowered.remove(0),
                    (1, _) => Expression::new(
                        ExprKind::List {
                            elements: lowered,
                            wrapped: false,
                        },
                        self.range(*index_range)?,
                    ),
                    _ => Expression::new(
                        ExprKind::List {
                            elements: lowered,
                            wrapped: true,
                        },
                        self.range(*index_range)?,
                    ),
                };
                self.index(base, right, *safe, *index_range, *safe_chain)?
            }
            PathElement::NamedIndex {
                safe,
                entries,
                range: index_range,
            } => {
                let right = match entries.as_slice() {
                    [] => Expression::new(
                        ExprKind::SpreadMap {
                            expr: Box::new(Expression::new(
                                ExprKind::Map {
                                    entries: Vec::new(),
                                },
                                self.range(*index_range)?,
                            )),
                        },
                        self.range(*index_range)?,
                    ),
                    [entry] if matches!(entry.key, MapEntryKey::Spread(_)) => {
                        spread_key(self.map_entry(entry)?)
                    }
                    _ => {
                        let mut lowered = Vec::with_capacity(entries.len());
                        for entry in entries {
                            let expr = self.map_entry(entry)?;
                            lowered.push(match entry.key {
                                MapEntryKey::Spread(_) => spread_key(expr),
                                _ => expr,
                            });
                        }
                        Expression::new(
                            ExprKind::List {
                                elements: lowered,
                                wrapped: true,
                            },
                            self.range(*index_range)?,
                        )
                    }
                };
                self.index(base, right, *safe, *index_range, *safe_chain)?
            }
            PathElement::Arguments(args) => {
                let arguments = self.arguments(args)?;
                self.call(base, arguments, span)?
            }
            PathElement::Closure(closure) => {
                let closure = self.closure(closure)?;
                self.append_closure(base, closure)
            }
        };
        lowered.range = range;
        Ok(lowered)
    }

    pub(super) fn name_part(&mut self, name: &NamePart) -> BResult<Expression> {
        match name {
            NamePart::Identifier(ident) | NamePart::Keyword(ident) => {
                Ok(Expression::string(ident.text.as_str(), self.range(ident.range)?))
            }
            NamePart::String(lit) => {
                let value = match gravel_syntax::string_value(&lit.text) {
                    Ok(value) => value,
                    Err(error) => return self.fail(error.message, lit.range),
                };
                Ok(Expression::new(
                    ExprKind::Constant(Constant {
                        value: ConstantValue::String(value),
                        string_literal: true,
                        literal: None,
                    }),
                    self.range(lit.range)?,
                ))
            }
            NamePart::Paren(par) => self.par_expr(par),
            NamePart::GString(gstring) => self.gstring(gstring),
        }
    }

    /// `base[right]` or `base?[right]`.
    fn index(
        &self,
        base: Expression,
        right: Expression,
        safe: bool,
        span: Span,
        safe_chain: bool,
    ) -> BResult<Expression> {
        let bracket = span.start + usize::from(safe);
        let op = Operator::new("[", self.range(Span::new(bracket, bracket + 1))?);
        Ok(Expression::synthetic(ExprKind::Binary {
            left: Box::new(base),
            op,
            right: Box::new(right),
            safe: safe || safe_chain,
        }))
    }

    /// `base(arguments)`; the result is re-ranged by the caller.
    fn call(&self, base: Expression, arguments: Expression, span: Span) -> BResult<Expression> {
        if base.is_parenthesized() {
            return Ok(call_method(base, arguments, false));
        }
        match &base.kind {
            ExprKind::Property {
                attribute: true, ..
            } => Ok(call_method(base, arguments, true)),
            ExprKind::Property { .. } => Ok(property_call(base, arguments)),
            ExprKind::Variable(Variable { name, .. }) if name == "void" => {
                let object = Expression::string("void", base.range);
                Ok(call_method(object, arguments, false))
            }
            ExprKind::Variable(Variable {
                name,
                built_in: true,
                ..
            }) => self.fail(
                format!("Primitive type literal: {name} cannot be used as a method name"),
                span,
            ),
            ExprKind::Variable(Variable { name, .. }) if name == "this" || name == "super" => {
                if self.closure_depth > 0 {
                    let method = Expression::string(name.as_str(), base.range);
                    return Ok(Expression::synthetic(ExprKind::MethodCall {
                        object: Box::new(base),
                        method: Box::new(method),
                        arguments: Box::new(arguments),
                        implicit_this: false,
                        safe: false,
                        spread_safe: false,
                        generics: Vec::new(),
                        command: false,
                    }));
                }
                let target = if name == "this" {
                    ConstructorTarget::This
                } else {
                    ConstructorTarget::Super
                };
                Ok(Expression::synthetic(ExprKind::ConstructorCall {
                    target,
                    arguments: Box::new(arguments),
                    anonymous_class: None,
                }))
            }
            ExprKind::Variable(_)
            | ExprKind::GString { .. }
            | ExprKind::Constant(Constant {
                string_literal: true,
                ..
            }) => Ok(implicit_this_call(base, arguments)),
            _ => Ok(call_method(base, arguments, false)),
        }
    }

    /// `base { ... }`: the closure joins the arguments of a preceding call
    /// or becomes the single argument of a new one.
    fn append_closure(&self, base: Expression, closure: Expression) -> Expression {
        if base.is_parenthesized() {
            let arguments = single_argument(closure);
            return call_method(base, arguments, false);
        }
        match base.kind {
            ExprKind::MethodCall {
                object,
                method,
                arguments,
                implicit_this,
                safe,
                spread_safe,
                generics,
                command,
            } => {
                let closure_range = closure.range;
                let mut arguments = *arguments;
                arguments.kind = match arguments.kind {
                    ExprKind::NamedArgumentList { entries } => {
                        let map = Expression::new(ExprKind::Map { entries }, arguments.range);
                        ExprKind::ArgumentList {
                            arguments: vec![map, closure],
                        }
                    }
                    ExprKind::ArgumentList { arguments: mut list } => {
                        list.push(closure);
                        ExprKind::ArgumentList { arguments: list }
                    }
                    other => ExprKind::ArgumentList {
                        arguments: vec![Expression::new(other, arguments.range), closure],
                    },
                };
                arguments.range = arguments.range.to(closure_range);
                Expression::new(
                    ExprKind::MethodCall {
                        object,
                        method,
                        arguments: Box::new(arguments),
                        implicit_this,
                        safe,
                        spread_safe,
                        generics,
                        command,
                    },
                    base.range,
                )
            }
            kind => {
                let base = Expression {
                    kind,
                    range: base.range,
                    paren_depth: 0,
                };
                let arguments = single_argument(closure);
                match &base.kind {
                    ExprKind::Property { .. } => property_call(base, arguments),
                    ExprKind::Variable(_)
                    | ExprKind::GString { .. }
                    | ExprKind::Constant(Constant {
                        string_literal: true,
                        ..
                    }) => implicit_this_call(base, arguments),
                    _ => call_method(base, arguments, false),
                }
            }
        }
    }

    /// `(...)` of a call. An empty list is ranged inside the parentheses.
    pub(super) fn arguments(&mut self, args: &Arguments) -> BResult<Expression> {
        match &args.list {
            Some(list) => self.argument_list(list),
            None => {
                if let Some(comma) = args.trailing_comma {
                    return self.fail("Expression expected", comma);
                }
                let inner = Span::new(
                    (args.range.start + 1).min(args.range.end),
                    args.range.end.saturating_sub(1).max(args.range.start),
                );
                Ok(Expression::new(
                    ExprKind::ArgumentList {
                        arguments: Vec::new(),
                    },
                    self.range(inner)?,
                ))
            }
        }
    }

    /// Named entries collect into one map that leads the positional
    /// arguments.
    pub(super) fn argument_list(&mut self, list: &ArgumentList) -> BResult<Expression> {
        let mut positional = Vec::new();
        let mut named = Vec::new();
        let mut names = HashSet::new();
        for element in &list.elements {
            match element {
                ArgumentListElement::Expr(expr) => {
                    positional.push(self.expression_list_element(expr, true)?)
                }
                ArgumentListElement::Lambda(lambda) => positional.push(self.lambda(lambda)?),
                ArgumentListElement::MapEntry(entry) => {
                    let lowered = self.map_entry(entry)?;
                    if let ExprKind::MapEntry { key, .. } = &lowered.kind {
                        if let (false, Some(name)) = (key.is_parenthesized(), key.as_str()) {
                            if !names.insert(name.to_string()) {
                                return self.fail(
                                    format!("Duplicated named parameter '{name}' found"),
                                    entry.range,
                                );
                            }
                        }
                    }
                    named.push(lowered);
                }
            }
        }

        let range = self.range(list.range)?;
        let kind = match (named.is_empty(), positional.is_empty()) {
            (true, _) => ExprKind::ArgumentList {
                arguments: positional,
            },
            (false, true) => ExprKind::NamedArgumentList { entries: named },
            (false, false) => {
                let map_range = match (named.first(), named.last()) {
                    (Some(first), Some(last)) => first.range.to(last.range),
                    _ => SourceRange::UNKNOWN,
                };
                let mut arguments = Vec::with_capacity(positional.len() + 1);
                arguments.push(Expression::new(ExprKind::Map { entries: named }, map_range));
                arguments.extend(positional);
                ExprKind::ArgumentList { arguments }
            }
        };
        Ok(Expression::new(kind, range))
    }

    /// One argument of a command chain, applied to everything before it:
    /// `a b c d` is `a(b).c(d)`.
    pub(super) fn command_argument(
        &mut self,
        current: Expression,
        arg: &CommandArgument,
    ) -> BResult<Expression> {
        let start = current.range.start;
        let primary = self.primary(&arg.primary)?;
        let head_range = self.range(Span::new(start, arg.primary.range().end))?;
        match &arg.tail {
            CommandArgumentTail::Args(list) => {
                let arguments = self.argument_list(list)?;
                Ok(Expression::new(
                    ExprKind::MethodCall {
                        object: Box::new(current),
                        method: Box::new(member_name(primary)),
                        arguments: Box::new(arguments),
                        implicit_this: false,
                        safe: false,
                        spread_safe: false,
                        generics: Vec::new(),
                        command: true,
                    },
                    self.range(Span::new(start, arg.range.end))?,
                ))
            }
            CommandArgumentTail::Path(elements) => {
                let property = property(current, member_name(primary), head_range);
                self.fold_path(property, start, elements)
            }
            CommandArgumentTail::None => Ok(property(current, member_name(primary), head_range)),
        }
    }
}

fn property(object: Expression, name: Expression, range: SourceRange) -> Expression {
    Expression::new(
        ExprKind::Property {
            object: Box::new(object),
            property: Box::new(name),
            safe: false,
            spread_safe: false,
            attribute: false,
            generics: Vec::new(),
        },
        range,
    )
}

/// The key of a `*:` entry, which is the spread map itself.
fn spread_key(entry: Expression) -> Expression {
    match entry.kind {
        ExprKind::MapEntry { key, .. } => *key,
        kind => Expression {
            kind,
            range: entry.range,
            paren_depth: entry.paren_depth,
        },
    }
}

fn single_argument(arg: Expression) -> Expression {
    let range = arg.range;
    Expression::new(
        ExprKind::ArgumentList {
            arguments: vec![arg],
        },
        range,
    )
}

/// A bare name in member position becomes its string; anything else
/// (a string literal, a GString, a parenthesized expression) is kept.
fn member_name(expr: Expression) -> Expression {
    match &expr.kind {
        ExprKind::Variable(var) if !expr.is_parenthesized() => {
            Expression::string(var.name.as_str(), expr.range)
        }
        _ => expr,
    }
}

/// `obj.name(arguments)` from the property `obj.name`.
pub(super) fn property_call(prop: Expression, arguments: Expression) -> Expression {
    let range = prop.range.to(arguments.range);
    match prop.kind {
        ExprKind::Property {
            object,
            property,
            safe,
            spread_safe,
            generics,
            ..
        } => Expression::new(
            ExprKind::MethodCall {
                object,
                method: property,
                arguments: Box::new(arguments),
                implicit_this: false,
                safe,
                spread_safe,
                generics,
                command: false,
            },
            range,
        ),
        kind => call_method(
            Expression {
                kind,
                range: prop.range,
                paren_depth: prop.paren_depth,
            },
            arguments,
            false,
        ),
    }
}

/// `name(arguments)` called on the implicit `this`.
pub(super) fn implicit_this_call(name: Expression, arguments: Expression) -> Expression {
    let range = name.range.to(arguments.range);
    Expression::new(
        ExprKind::MethodCall {
            object: Box::new(Expression::variable("this", SourceRange::UNKNOWN)),
            method: Box::new(member_name(name)),
            arguments: Box::new(arguments),
            implicit_this: true,
            safe: false,
            spread_safe: false,
            generics: Vec::new(),
            command: false,
        },
        range,
    )
}
