//! Expressions below the path level: operators, literals, closures,
//! collections and creators.

use gravel_core::{SourceRange, Span};
use gravel_syntax::tree::{
    ArrayInitializer, Closure, CommandExpr, Creator, CreatedNameKind, CreatorKind, Dim, Expr,
    ExpressionListElement, GString, GStringValue, Lambda, LambdaBody, LambdaParams, Lit, Literal,
    MapEntry, MapEntryKey, ParExpr, Primary, StatementExpr, TypeArgumentsOrDiamond,
};
use gravel_syntax::{
    gstring_segment, parse_decimal, parse_integer, string_value, SegmentPosition, StringStyle,
    SyntaxKind,
};

use super::paths::{implicit_this_call, property_call};
use super::{AstBuilder, BResult};
use crate::ast::{
    Constant, ConstantValue, ConstructorTarget, ExprKind, Expression, Flags, NumericLiteral, Operator,
    Parameter, Statement, TypeRef, Variable,
};

impl<'a> AstBuilder<'a> {
    pub(super) fn statement_expr(&mut self, expr: &StatementExpr) -> BResult<Expression> {
        match expr {
            StatementExpr::Command(cmd) => self.command_expr(cmd),
            StatementExpr::Lambda(lambda) => self.lambda(lambda),
        }
    }

    /// A parenthesized expression keeps the range of its content.
    pub(super) fn par_expr(&mut self, par: &ParExpr) -> BResult<Expression> {
        let mut expr = self.statement_expr(&par.inner)?;
        expr.paren_depth += 1;
        Ok(expr)
    }

    /// `expr args? commandArgument*`, the paren-less call form.
    pub(super) fn command_expr(&mut self, cmd: &CommandExpr) -> BResult<Expression> {
        let has_args = cmd.args.is_some();
        let has_command_args = !cmd.command_args.is_empty();
        if self.array_init_depth > 0 && (has_args || has_command_args) {
            return self.fail(
                "Command chain expression can not be used in array initializer",
                cmd.range,
            );
        }

        let base = self.expr(&cmd.expr)?;
        if !has_args && !has_command_args {
            return Ok(base);
        }
        if let ExprKind::Binary { op, .. } = &base.kind {
            if !op.is("[") && !base.is_parenthesized() {
                let span = cmd.expr.range();
                return self.fail(format!("Unexpected input: '{}'", self.source(span)), span);
            }
        }

        let mut current = match &cmd.args {
            Some(list) => {
                let arguments = self.argument_list(list)?;
                let range = base.range.to(arguments.range);
                let mut call = match base.kind {
                    ExprKind::Property { .. } => property_call(base, arguments),
                    ExprKind::Variable(_) | ExprKind::GString { .. } if !base.is_parenthesized() => {
                        self.validate_method_definition(&base, &arguments)?;
                        implicit_this_call(base, arguments)
                    }
                    ExprKind::Constant(Constant {
                        string_literal: true,
                        ..
                    }) if !base.is_parenthesized() => implicit_this_call(base, arguments),
                    _ => call_method(base, arguments, false),
                };
                if let ExprKind::MethodCall { command, .. } = &mut call.kind {
                    *command = true;
                }
                call.range = range;
                call
            }
            None => base,
        };

        for arg in &cmd.command_args {
            current = self.command_argument(current, arg)?;
        }
        current.range = self.range(cmd.range)?;
        Ok(current)
    }

    /// Rejects `String m() { ... }`-like input that parsed as a command.
    fn validate_method_definition(&self, base: &Expression, arguments: &Expression) -> BResult<()> {
        let Some(var) = base.as_variable() else {
            return Ok(());
        };
        let capitalized = var.name.chars().next().map_or(false, char::is_uppercase);
        if !var.built_in && !capitalized {
            return Ok(());
        }
        let ExprKind::ArgumentList { arguments } = &arguments.kind else {
            return Ok(());
        };
        let [call] = arguments.as_slice() else {
            return Ok(());
        };
        let ExprKind::MethodCall {
            arguments: call_args,
            ..
        } = &call.kind
        else {
            return Ok(());
        };
        let ExprKind::ArgumentList { arguments: call_args } = &call_args.kind else {
            return Ok(());
        };
        if let Some(Expression {
            kind: ExprKind::Closure {
                parameters: None, ..
            },
            ..
        }) = call_args.last()
        {
            return Err(crate::reporter::ParsingFailed::new(
                "Method definition not expected here",
                base.range.to(call.range),
            ));
        }
        Ok(())
    }

    pub(super) fn expr(&mut self, expr: &Expr) -> BResult<Expression> {
        match expr {
            Expr::Path(path) => self.path_expr(path),
            Expr::Postfix { expr, op, range } => {
                let expr = self.expr(expr)?;
                Ok(Expression::new(
                    ExprKind::Postfix {
                        expr: Box::new(expr),
                        op: self.operator(op.range)?,
                    },
                    self.range(*range)?,
                ))
            }
            Expr::Prefix { op, expr, range } => {
                let expr = self.expr(expr)?;
                Ok(Expression::new(
                    ExprKind::Prefix {
                        op: self.operator(op.range)?,
                        expr: Box::new(expr),
                    },
                    self.range(*range)?,
                ))
            }
            Expr::UnaryAdd { op, expr, range } => {
                let operand = self.expr(expr)?;
                self.unary_add(op.kind == SyntaxKind::Minus, operand, *range)
            }
            Expr::UnaryNot { op, expr, range } => {
                let expr = Box::new(self.expr(expr)?);
                let kind = if op.kind == SyntaxKind::Tilde {
                    ExprKind::BitwiseNegation { expr }
                } else {
                    ExprKind::Not { expr }
                };
                Ok(Expression::new(kind, self.range(*range)?))
            }
            Expr::Cast { ty, expr, range, .. } => {
                let ty = self.ty(ty)?;
                let expr = self.expr(expr)?;
                Ok(Expression::new(
                    ExprKind::Cast {
                        ty,
                        expr: Box::new(expr),
                        coerce: false,
                    },
                    self.range(*range)?,
                ))
            }
            Expr::Binary { lhs, op, rhs, range } => {
                let left = Box::new(self.expr(lhs)?);
                let right = Box::new(self.expr(rhs)?);
                let kind = match op.kind {
                    SyntaxKind::Range | SyntaxKind::RangeExclusive => ExprKind::Range {
                        from: left,
                        to: right,
                        inclusive: op.kind == SyntaxKind::Range,
                    },
                    _ => ExprKind::Binary {
                        left,
                        op: self.operator(op.range)?,
                        right,
                        safe: false,
                    },
                };
                Ok(Expression::new(kind, self.range(*range)?))
            }
            Expr::InstanceOf { expr, op, ty, range } => {
                let left = self.expr(expr)?;
                let ty = self.ty(ty)?;
                let right = Expression::new(ExprKind::Class { ty: ty.clone() }, ty.range);
                Ok(Expression::new(
                    ExprKind::Binary {
                        left: Box::new(left),
                        op: self.operator(op.range)?,
                        right: Box::new(right),
                        safe: false,
                    },
                    self.range(*range)?,
                ))
            }
            Expr::As { expr, ty, range, .. } => {
                let expr = self.expr(expr)?;
                let ty = self.ty(ty)?;
                Ok(Expression::new(
                    ExprKind::Cast {
                        ty,
                        expr: Box::new(expr),
                        coerce: true,
                    },
                    self.range(*range)?,
                ))
            }
            Expr::Conditional {
                cond,
                then,
                else_,
                range,
            } => {
                let cond = self.expr(cond)?;
                let cond_range = cond.range;
                let cond = Expression::new(
                    ExprKind::Boolean {
                        expr: Box::new(cond),
                    },
                    cond_range,
                );
                let then = self.expr(then)?;
                let else_ = self.expr(else_)?;
                Ok(Expression::new(
                    ExprKind::Ternary {
                        cond: Box::new(cond),
                        then: Box::new(then),
                        else_: Box::new(else_),
                    },
                    self.range(*range)?,
                ))
            }
            Expr::Elvis {
                cond, else_, range, ..
            } => {
                let cond = self.expr(cond)?;
                let else_ = self.expr(else_)?;
                Ok(Expression::new(
                    ExprKind::Elvis {
                        cond: Box::new(cond),
                        else_: Box::new(else_),
                    },
                    self.range(*range)?,
                ))
            }
            Expr::MultipleAssignment {
                names,
                names_range,
                op,
                rhs,
                range,
            } => {
                let elements = names
                    .iter()
                    .map(|name| Ok(Expression::variable(name.text.clone(), self.range(name.range)?)))
                    .collect::<BResult<Vec<_>>>()?;
                let left = Expression::new(ExprKind::Tuple { elements }, self.range(*names_range)?);
                let right = self.statement_expr(rhs)?;
                Ok(Expression::new(
                    ExprKind::Binary {
                        left: Box::new(left),
                        op: self.operator(op.range)?,
                        right: Box::new(right),
                        safe: false,
                    },
                    self.range(*range)?,
                ))
            }
            Expr::Assignment { lhs, op, rhs, range } => self.assignment(lhs, op.range, rhs, *range),
        }
    }

    fn operator(&self, span: Span) -> BResult<Operator> {
        Ok(Operator::new(self.source(span), self.range(span)?))
    }

    /// `+x` and `-x`; signs applied to numeric literals fold into the constant.
    fn unary_add(&mut self, minus: bool, operand: Expression, span: Span) -> BResult<Expression> {
        let range = self.range(span)?;
        let foldable = match &operand.kind {
            ExprKind::Constant(constant) => {
                !operand.is_parenthesized() && !matches!(constant.value, ConstantValue::String(_))
            }
            _ => false,
        };

        if foldable && !minus {
            let mut operand = operand;
            operand.range = range;
            return Ok(operand);
        }
        if foldable {
            if let ExprKind::Constant(Constant {
                literal: Some(literal),
                ..
            }) = &operand.kind
            {
                let text = format!("-{}", literal.text);
                let parsed = if literal.floating {
                    parse_decimal(&text)
                } else {
                    parse_integer(&text)
                };
                return match parsed {
                    Ok(value) => Ok(Expression::constant(ConstantValue::Number(value), range)),
                    Err(error) => self.fail(error.message, span),
                };
            }
        }

        let expr = Box::new(operand);
        let kind = if minus {
            ExprKind::UnaryMinus { expr }
        } else {
            ExprKind::UnaryPlus { expr }
        };
        Ok(Expression::new(kind, range))
    }

    fn assignment(
        &mut self,
        lhs: &Expr,
        op: Span,
        rhs: &StatementExpr,
        span: Span,
    ) -> BResult<Expression> {
        let left = self.expr(lhs)?;
        let op = self.operator(op)?;

        // `(a) = [1]` is a multiple assignment of one variable.
        if left.as_variable().is_some() && left.is_parenthesized() {
            if left.paren_depth > 1 {
                return self.fail(
                    "Nested parenthesis is not allowed in multiple assignment, e.g. ((a)) = b",
                    span,
                );
            }
            let tuple = Expression::new(
                ExprKind::Tuple {
                    elements: vec![left],
                },
                self.range(lhs.range())?,
            );
            let right = self.statement_expr(rhs)?;
            return Ok(Expression::new(
                ExprKind::Binary {
                    left: Box::new(tuple),
                    op,
                    right: Box::new(right),
                    safe: false,
                },
                self.range(span)?,
            ));
        }

        let assignable = match &left.kind {
            ExprKind::Variable(_) => !left.is_parenthesized(),
            ExprKind::Property { .. } => true,
            ExprKind::Binary { op, .. } => op.is("["),
            _ => false,
        };
        if !assignable {
            return self.fail(
                "The LHS of an assignment should be a variable or a field accessing expression",
                span,
            );
        }

        let right = self.statement_expr(rhs)?;
        Ok(Expression::new(
            ExprKind::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                safe: false,
            },
            self.range(span)?,
        ))
    }

    pub(super) fn primary(&mut self, primary: &Primary) -> BResult<Expression> {
        match primary {
            Primary::Identifier { name, type_args } => match type_args {
                Some(args) => {
                    let range = self.range(primary.range())?;
                    let mut ty = TypeRef::named(name.text.as_str(), range);
                    ty.generics = self.type_arguments(args)?;
                    Ok(Expression::new(ExprKind::Class { ty }, range))
                }
                None => Ok(Expression::variable(name.text.clone(), self.range(name.range)?)),
            },
            Primary::Literal(literal) => self.literal(literal),
            Primary::GString(gstring) => self.gstring(gstring),
            Primary::New { creator, range, .. } => self.creator(creator, None, *range),
            Primary::This(span) => Ok(Expression::variable("this", self.range(*span)?)),
            Primary::Super(span) => Ok(Expression::variable("super", self.range(*span)?)),
            Primary::Paren(par) => self.par_expr(par),
            Primary::Closure(closure) => self.closure(closure),
            Primary::Lambda(lambda) => self.lambda(lambda),
            Primary::List(list) => {
                if let (true, Some(comma)) = (list.elements.is_empty(), list.trailing_comma) {
                    return self.fail("Empty list constructor should not contain any comma(,)", comma);
                }
                let elements = self.expression_list(&list.elements, true)?;
                Ok(Expression::new(
                    ExprKind::List {
                        elements,
                        wrapped: false,
                    },
                    self.range(list.range)?,
                ))
            }
            Primary::Map(map) => {
                let entries = self.map_entries(&map.entries)?;
                Ok(Expression::new(ExprKind::Map { entries }, self.range(map.range)?))
            }
            Primary::BuiltInType(ident) => Ok(Expression::new(
                ExprKind::Variable(Variable {
                    name: ident.text.clone(),
                    ty: None,
                    modifiers: Flags::NONE,
                    built_in: true,
                }),
                self.range(ident.range)?,
            )),
        }
    }

    /// Numeric literals that fail to parse are kept as invalid constants; a
    /// later sign fold may still repair them.
    fn literal(&mut self, literal: &Literal) -> BResult<Expression> {
        let range = self.range(literal.range())?;
        let constant = match literal {
            Literal::Integer(lit) => number(lit, false, parse_integer(&lit.text)),
            Literal::Floating(lit) => number(lit, true, parse_decimal(&lit.text)),
            Literal::String(lit) => {
                let value = match string_value(&lit.text) {
                    Ok(value) => value,
                    Err(error) => return self.fail(error.message, lit.range),
                };
                Constant {
                    value: ConstantValue::String(value),
                    string_literal: true,
                    literal: None,
                }
            }
            Literal::Boolean(value, _) => Constant::new(ConstantValue::Boolean(*value)),
            Literal::Null(_) => Constant::new(ConstantValue::Null),
        };
        Ok(Expression::new(ExprKind::Constant(constant), range))
    }

    pub(super) fn gstring(&mut self, gstring: &GString) -> BResult<Expression> {
        let style = StringStyle::of(&gstring.begin.text);
        let mut strings = Vec::with_capacity(gstring.parts.len() + 2);
        strings.push(self.segment(&gstring.begin, SegmentPosition::Begin, style)?);
        for part in &gstring.parts {
            strings.push(self.segment(part, SegmentPosition::Part, style)?);
        }
        strings.push(self.segment(&gstring.end, SegmentPosition::End, style)?);

        let values = gstring
            .values
            .iter()
            .map(|value| self.gstring_value(value))
            .collect::<BResult<Vec<_>>>()?;

        let mut verbatim = String::new();
        for (idx, string) in strings.iter().enumerate() {
            verbatim.push_str(string.as_str().unwrap_or_default());
            if let Some(value) = values.get(idx) {
                if !value.range.is_unknown() {
                    verbatim.push('$');
                    verbatim.push_str(self.source(value.range.span()));
                }
            }
        }

        Ok(Expression::new(
            ExprKind::GString {
                verbatim,
                strings,
                values,
            },
            self.range(gstring.range)?,
        ))
    }

    fn segment(
        &self,
        lit: &Lit,
        position: SegmentPosition,
        style: StringStyle,
    ) -> BResult<Expression> {
        match gstring_segment(&lit.text, position, style) {
            Ok(text) => Ok(Expression::string(text, self.range(lit.range)?)),
            Err(error) => self.fail(error.message, lit.range),
        }
    }

    fn gstring_value(&mut self, value: &GStringValue) -> BResult<Expression> {
        match value {
            GStringValue::Path { name, parts, .. } => {
                let mut expr = Expression::variable(name.text.clone(), self.range(name.range)?);
                for part in parts {
                    let start = part.range.start + 1;
                    let property = Expression::string(
                        part.text.trim_start_matches('.'),
                        self.range(Span::new(start.min(part.range.end), part.range.end))?,
                    );
                    let range = expr.range.to(self.range(part.range)?);
                    expr = Expression::new(
                        ExprKind::Property {
                            object: Box::new(expr),
                            property: Box::new(property),
                            safe: false,
                            spread_safe: false,
                            attribute: false,
                            generics: Vec::new(),
                        },
                        range,
                    );
                }
                Ok(expr)
            }
            // `${expr}` is the expression itself; `${a; b}` is a called closure.
            GStringValue::Closure(closure) if closure.params.is_none() => {
                let range = self.range(closure.range)?;
                match closure.statements.as_slice() {
                    [] => Ok(Expression::null(range)),
                    [gravel_syntax::tree::Statement::Expression(cmd)] => {
                        self.closure_depth += 1;
                        let expr = self.command_expr(cmd);
                        self.closure_depth -= 1;
                        expr
                    }
                    _ => {
                        let closure = self.closure(closure)?;
                        let arguments = Expression::new(ExprKind::ArgumentList { arguments: Vec::new() }, range);
                        let mut call = call_method(closure, arguments, true);
                        call.range = range;
                        Ok(call)
                    }
                }
            }
            GStringValue::Closure(closure) => self.closure(closure),
        }
    }

    pub(super) fn closure(&mut self, closure: &Closure) -> BResult<Expression> {
        self.closure_depth += 1;
        let lowered = self.closure_parts(closure);
        self.closure_depth -= 1;
        let (parameters, code) = lowered?;
        Ok(Expression::new(
            ExprKind::Closure {
                parameters,
                code: Box::new(code),
            },
            self.range(closure.range)?,
        ))
    }

    fn closure_parts(&mut self, closure: &Closure) -> BResult<(Option<Vec<Parameter>>, Statement)> {
        let parameters = match &closure.params {
            Some(params) => Some(self.formal_parameters(&params.params)?),
            None => None,
        };
        let statements = self.block_statements(&closure.statements)?;
        let range = match (closure.statements.first(), closure.statements.last()) {
            (Some(first), Some(last)) => self.range(first.range().cover(last.range()))?,
            _ => SourceRange::UNKNOWN,
        };
        Ok((parameters, Statement::block(statements, range)))
    }

    pub(super) fn lambda(&mut self, lambda: &Lambda) -> BResult<Expression> {
        let parameters = match &lambda.params {
            LambdaParams::Parenthesized(params) => self.formal_parameters(&params.params)?,
            LambdaParams::Single(name) => {
                let range = self.range(name.range)?;
                vec![Parameter {
                    name: name.text.clone(),
                    ty: TypeRef::object(),
                    dynamic_typed: true,
                    modifiers: Flags::NONE,
                    annotations: Vec::new(),
                    default: None,
                    var_keyword: None,
                    name_range: range,
                    range,
                }]
            }
        };
        let code = match &lambda.body {
            LambdaBody::Block(block) => self.block(block)?,
            LambdaBody::Expr(expr) => Statement::expression(self.statement_expr(expr)?),
        };
        Ok(Expression::new(
            ExprKind::Lambda {
                parameters,
                code: Box::new(code),
            },
            self.range(lambda.range)?,
        ))
    }

    pub(super) fn expression_list(
        &mut self,
        elements: &[ExpressionListElement],
        can_spread: bool,
    ) -> BResult<Vec<Expression>> {
        elements
            .iter()
            .map(|element| self.expression_list_element(element, can_spread))
            .collect()
    }

    pub(super) fn expression_list_element(
        &mut self,
        element: &ExpressionListElement,
        can_spread: bool,
    ) -> BResult<Expression> {
        let expr = self.expr(&element.expr)?;
        match element.spread {
            Some(star) if !can_spread => self.fail("spread operator is not allowed here", star),
            Some(_) => Ok(Expression::new(
                ExprKind::Spread {
                    expr: Box::new(expr),
                },
                self.range(element.range)?,
            )),
            None => Ok(expr),
        }
    }

    pub(super) fn map_entries(&mut self, entries: &[MapEntry]) -> BResult<Vec<Expression>> {
        entries.iter().map(|entry| self.map_entry(entry)).collect()
    }

    pub(super) fn map_entry(&mut self, entry: &MapEntry) -> BResult<Expression> {
        let range = self.range(entry.range)?;
        let value = self.expr(&entry.value)?;
        let key = match &entry.key {
            MapEntryKey::Spread(_) => Expression::new(
                ExprKind::SpreadMap {
                    expr: Box::new(value.clone()),
                },
                range,
            ),
            MapEntryKey::Keyword(ident) => {
                Expression::string(ident.text.as_str(), self.range(ident.range)?)
            }
            MapEntryKey::Primary(primary) => {
                let key = self.primary(primary)?;
                match key.as_variable() {
                    // `[a: 1]` keys are names, not variable references.
                    Some(var) if !key.is_parenthesized() => {
                        Expression::string(var.name.as_str(), key.range)
                    }
                    _ => key,
                }
            }
        };
        Ok(Expression::new(
            ExprKind::MapEntry {
                key: Box::new(key),
                value: Box::new(value),
            },
            range,
        ))
    }

    /// `new T(...)`, `new T(...) { ... }` and array creation. `enclosing` is
    /// the outer instance of `outer.new Inner()`.
    pub(super) fn creator(
        &mut self,
        creator: &Creator,
        enclosing: Option<Expression>,
        span: Span,
    ) -> BResult<Expression> {
        let range = self.range(span)?;
        let mut ty = match &creator.name.kind {
            CreatedNameKind::Primitive(ident) => {
                TypeRef::named(ident.text.as_str(), self.range(creator.name.range)?)
            }
            CreatedNameKind::Class { name, type_args } => {
                let mut ty = TypeRef::named(name.text(), self.range(creator.name.range)?);
                if let Some(TypeArgumentsOrDiamond::Args(args)) = type_args {
                    ty.generics = self.type_arguments(args)?;
                }
                ty
            }
        };
        ty.annotations = self.annotations(&creator.name.annotations)?;

        match &creator.kind {
            CreatorKind::Object { args, body } => {
                let mut arguments = self.arguments(args)?;
                if let Some(outer) = enclosing {
                    match &mut arguments.kind {
                        ExprKind::ArgumentList { arguments } => arguments.insert(0, outer),
                        _ => {
                            return self.fail(
                                "Creating instance of non-static class does not support named parameters",
                                args.range,
                            )
                        }
                    }
                }
                let anonymous_class = match body {
                    Some(body) => {
                        let body_range = self.range(body.range)?;
                        Some(self.anonymous_class(body, ty.clone(), false, ty.range, body_range)?)
                    }
                    None => None,
                };
                Ok(Expression::new(
                    ExprKind::ConstructorCall {
                        target: ConstructorTarget::Type { ty },
                        arguments: Box::new(arguments),
                        anonymous_class,
                    },
                    range,
                ))
            }
            CreatorKind::Array { dims, init } => self.array_creation(creator, ty, dims, init.as_ref(), range),
        }
    }

    fn array_creation(
        &mut self,
        creator: &Creator,
        element: TypeRef,
        dims: &[Dim],
        init: Option<&ArrayInitializer>,
        range: SourceRange,
    ) -> BResult<Expression> {
        let name_start = creator.name.range.start;
        let sized = dims.iter().filter(|dim| dim.size.is_some()).count();

        // Array types for each dimension, innermost first.
        let mut array_types = Vec::with_capacity(dims.len());
        let mut current = element.clone();
        for dim in dims {
            let mut array =
                TypeRef::array_of(current, self.range(Span::new(name_start, dim.range.end))?);
            array.annotations = self.annotations(&dim.annotations)?;
            array_types.push(array.clone());
            current = array;
        }
        let ty = current;

        if let Some(init) = init {
            if let Some(dim) = dims.iter().find(|dim| dim.size.is_some()) {
                return self.fail("dimension should be empty", dim.lbracket);
            }
            let element_type = match dims.len() {
                0 | 1 => element,
                n => array_types.swap_remove(n - 2),
            };
            self.array_init_depth += 1;
            let initializer = init
                .elements
                .iter()
                .map(|element| self.statement_expr(element))
                .collect::<BResult<Vec<_>>>();
            self.array_init_depth -= 1;
            return Ok(Expression::new(
                ExprKind::Array {
                    element_type,
                    sizes: None,
                    initializer: Some(initializer?),
                    ty,
                },
                range,
            ));
        }

        // The last empty dimension directly followed by a sized one.
        let misplaced = dims
            .windows(2)
            .filter(|pair| pair[0].size.is_none() && pair[1].size.is_some())
            .last();
        if let Some(pair) = misplaced {
            return self.fail("dimension cannot be empty", pair[0].lbracket);
        }
        if sized == 0 {
            if let Some(first) = dims.first() {
                return self.fail("dimensions cannot be all empty", first.lbracket);
            }
        }

        let mut sizes = Vec::with_capacity(dims.len());
        for dim in dims {
            sizes.push(match &dim.size {
                Some(size) => self.expr(size)?,
                None => Expression::empty(),
            });
        }
        Ok(Expression::new(
            ExprKind::Array {
                element_type: element,
                sizes: Some(sizes),
                initializer: None,
                ty,
            },
            range,
        ))
    }
}

fn number(
    lit: &Lit,
    floating: bool,
    parsed: Result<gravel_syntax::NumberValue, gravel_syntax::LiteralError>,
) -> Constant {
    let value = match parsed {
        Ok(value) => ConstantValue::Number(value),
        Err(error) => ConstantValue::Invalid {
            message: error.message,
        },
    };
    Constant {
        value,
        string_literal: false,
        literal: Some(NumericLiteral {
            text: lit.text.clone(),
            floating,
        }),
    }
}

/// `base.call(args)`
pub(super) fn call_method(base: Expression, arguments: Expression, implicit_this: bool) -> Expression {
    let range = base.range.to(arguments.range);
    Expression::new(
        ExprKind::MethodCall {
            object: Box::new(base),
            method: Box::new(Expression::string("call", SourceRange::UNKNOWN)),
            arguments: Box::new(arguments),
            implicit_this,
            safe: false,
            spread_safe: false,
            generics: Vec::new(),
            command: false,
        },
        range,
    )
}
