//! Expression grammar: command expressions, operator precedence, paths and
//! primaries.

use gravel_core::Span;

use super::{scan, PResult, Parser};
use crate::prediction::Decision;
use crate::syntax_kind::SyntaxKind;
use crate::tree::*;

const ASSIGN_BP: u8 = 2;
/// Operand binding of unary `+`/`-`: looser than `**`.
const UNARY_ADD_BP: u8 = 27;
/// Operand binding of `!`, `~`, prefix `++`/`--` and casts.
const UNARY_NOT_BP: u8 = 31;

/// Returns `(left, right)` binding power. Larger binds tighter.
fn infix_binding_power(op: SyntaxKind) -> Option<(u8, u8)> {
    let bp = match op {
        SyntaxKind::Power => (29, 30),
        SyntaxKind::Star | SyntaxKind::Slash | SyntaxKind::Percent => (25, 26),
        SyntaxKind::Plus | SyntaxKind::Minus => (23, 24),
        SyntaxKind::Shl
        | SyntaxKind::Shr
        | SyntaxKind::UShr
        | SyntaxKind::Range
        | SyntaxKind::RangeExclusive => (21, 22),
        SyntaxKind::Lt
        | SyntaxKind::LtEq
        | SyntaxKind::Gt
        | SyntaxKind::GtEq
        | SyntaxKind::InKw
        | SyntaxKind::NotIn
        | SyntaxKind::InstanceofKw
        | SyntaxKind::NotInstanceof
        | SyntaxKind::AsKw => (19, 20),
        SyntaxKind::EqEq
        | SyntaxKind::NotEq
        | SyntaxKind::Spaceship
        | SyntaxKind::Identical
        | SyntaxKind::NotIdentical => (17, 18),
        SyntaxKind::RegexFind | SyntaxKind::RegexMatch => (15, 16),
        SyntaxKind::Amp => (13, 14),
        SyntaxKind::Caret => (11, 12),
        SyntaxKind::Pipe => (9, 10),
        SyntaxKind::AmpAmp => (7, 8),
        SyntaxKind::PipePipe => (5, 6),
        // Right-associative.
        SyntaxKind::Question | SyntaxKind::Elvis => (4, 3),
        kind if kind.is_assignment_operator() => (ASSIGN_BP, 1),
        _ => return None,
    };
    Some(bp)
}

fn member_access(kind: SyntaxKind) -> Option<MemberAccess> {
    Some(match kind {
        SyntaxKind::Dot => MemberAccess::Dot,
        SyntaxKind::SafeDot => MemberAccess::SafeDot,
        SyntaxKind::SafeChainDot => MemberAccess::SafeChainDot,
        SyntaxKind::SpreadDot => MemberAccess::SpreadDot,
        SyntaxKind::MethodPointer => MemberAccess::MethodPointer,
        SyntaxKind::MethodReference => MemberAccess::MethodReference,
        _ => return None,
    })
}

fn ends_with_call_or_closure(expr: &Expr) -> bool {
    match expr {
        Expr::Path(path) => matches!(
            path.elements.last(),
            Some(PathElement::Arguments(_) | PathElement::Closure(_))
        ),
        _ => false,
    }
}

enum Collection {
    List {
        elements: Vec<ExpressionListElement>,
        trailing_comma: Option<Span>,
    },
    Map(Vec<MapEntry>),
}

impl<'a> Parser<'a> {
    // --- Statement-level expressions -------------------------------------------

    pub(super) fn statement_expr(&mut self) -> PResult<StatementExpr> {
        if self.at_lambda_start() {
            return Ok(StatementExpr::Lambda(self.lambda()?));
        }
        Ok(StatementExpr::Command(self.command_expr()?))
    }

    fn at_lambda_start(&mut self) -> bool {
        if self.current().is_identifier_like() {
            return self.nth(1) == SyntaxKind::Arrow;
        }
        self.at(SyntaxKind::LParen) && self.predict(Decision::Lambda, scan::lambda)
    }

    /// `expression argumentList? commandArgument*`
    pub(super) fn command_expr(&mut self) -> PResult<CommandExpr> {
        let start = self.start();
        let expr = self.expression()?;
        let args = if !ends_with_call_or_closure(&expr) && self.at_argument_start() {
            Some(self.argument_list()?)
        } else {
            None
        };
        let mut command_args = Vec::new();
        while self.at_command_primary_start() {
            command_args.push(self.command_argument()?);
        }
        Ok(CommandExpr {
            expr,
            args,
            command_args,
            range: self.span_from(start),
        })
    }

    /// Can the current token begin an argument of a paren-less call?
    fn at_argument_start(&self) -> bool {
        let kind = self.current();
        if kind.is_keyword() && !kind.is_identifier_like() && self.nth(1) == SyntaxKind::Colon {
            return true;
        }
        (kind.is_identifier_like() && !matches!(kind, SyntaxKind::InKw | SyntaxKind::AsKw))
            || kind.is_primitive_type()
            || matches!(
                kind,
                SyntaxKind::IntegerLiteral
                    | SyntaxKind::FloatingLiteral
                    | SyntaxKind::StringLiteral
                    | SyntaxKind::GStringBegin
                    | SyntaxKind::TrueKw
                    | SyntaxKind::FalseKw
                    | SyntaxKind::NullKw
                    | SyntaxKind::NewKw
                    | SyntaxKind::ThisKw
                    | SyntaxKind::SuperKw
                    | SyntaxKind::Bang
                    | SyntaxKind::Tilde
            )
    }

    fn at_command_primary_start(&self) -> bool {
        let kind = self.current();
        (kind.is_identifier_like() && !matches!(kind, SyntaxKind::InKw | SyntaxKind::AsKw))
            || matches!(
                kind,
                SyntaxKind::IntegerLiteral
                    | SyntaxKind::FloatingLiteral
                    | SyntaxKind::StringLiteral
                    | SyntaxKind::GStringBegin
                    | SyntaxKind::TrueKw
                    | SyntaxKind::FalseKw
                    | SyntaxKind::NullKw
            )
    }

    fn command_argument(&mut self) -> PResult<CommandArgument> {
        let start = self.start();
        let primary = match self.current() {
            kind if kind.is_identifier_like() => Primary::Identifier {
                name: self.ident()?,
                type_args: None,
            },
            SyntaxKind::GStringBegin => Primary::GString(self.gstring()?),
            _ => Primary::Literal(self.literal()?),
        };
        let path = self.path_elements()?;
        let tail = if !path.is_empty() {
            CommandArgumentTail::Path(path)
        } else if self.at_argument_start() {
            CommandArgumentTail::Args(self.argument_list()?)
        } else {
            CommandArgumentTail::None
        };
        Ok(CommandArgument {
            primary,
            tail,
            range: self.span_from(start),
        })
    }

    /// Comma separated arguments without parentheses.
    fn argument_list(&mut self) -> PResult<ArgumentList> {
        let start = self.start();
        let mut elements = vec![self.argument_element()?];
        while self.eat(SyntaxKind::Comma).is_some() {
            self.eat_nls();
            elements.push(self.argument_element()?);
        }
        Ok(ArgumentList {
            elements,
            range: self.span_from(start),
        })
    }

    /// `( argumentList? ,? )`
    pub(super) fn arguments(&mut self) -> PResult<Arguments> {
        let start = self.start();
        self.expect(SyntaxKind::LParen, "(")?;
        self.eat_nls();
        let mut trailing_comma = None;
        let list = if self.at(SyntaxKind::RParen) {
            None
        } else if self.at(SyntaxKind::Comma) {
            trailing_comma = Some(self.bump().range);
            None
        } else {
            let list_start = self.start();
            let mut elements = vec![self.argument_element()?];
            loop {
                self.eat_nls();
                let Some(comma) = self.eat(SyntaxKind::Comma) else {
                    break;
                };
                self.eat_nls();
                if self.at(SyntaxKind::RParen) {
                    trailing_comma = Some(comma.range);
                    break;
                }
                elements.push(self.argument_element()?);
            }
            Some(ArgumentList {
                elements,
                range: self.span_from(list_start),
            })
        };
        self.eat_nls();
        self.expect(SyntaxKind::RParen, ")")?;
        Ok(Arguments {
            list,
            trailing_comma,
            range: self.span_from(start),
        })
    }

    /// One argument: a map entry, a lambda, or an optionally spread
    /// expression.
    fn argument_element(&mut self) -> PResult<ArgumentListElement> {
        let start = self.start();
        let kind = self.current();
        if kind == SyntaxKind::Star && self.nth(1) == SyntaxKind::Colon {
            let star = self.bump();
            let colon = self.bump();
            self.eat_nls();
            let value = self.expression()?;
            return Ok(ArgumentListElement::MapEntry(MapEntry {
                key: MapEntryKey::Spread(star.range.cover(colon.range)),
                value,
                range: self.span_from(start),
            }));
        }
        if kind.is_keyword() && !kind.is_identifier_like() && self.nth(1) == SyntaxKind::Colon {
            let token = self.bump();
            let key = MapEntryKey::Keyword(self.ident_from(token));
            self.bump();
            self.eat_nls();
            let value = self.expression()?;
            return Ok(ArgumentListElement::MapEntry(MapEntry {
                key,
                value,
                range: self.span_from(start),
            }));
        }
        if self.at_lambda_start() {
            return Ok(ArgumentListElement::Lambda(self.lambda()?));
        }

        let spread = self.eat(SyntaxKind::Star).map(|token| token.range);
        let expr = self.expression()?;
        if spread.is_none() && self.at(SyntaxKind::Colon) {
            let key = match expr {
                Expr::Path(path) if path.elements.is_empty() => MapEntryKey::Primary(path.primary),
                other => return Err(self.unexpected_range(other.range())),
            };
            self.bump();
            self.eat_nls();
            let value = self.expression()?;
            return Ok(ArgumentListElement::MapEntry(MapEntry {
                key,
                value,
                range: self.span_from(start),
            }));
        }
        Ok(ArgumentListElement::Expr(ExpressionListElement {
            spread,
            expr,
            range: self.span_from(start),
        }))
    }

    pub(super) fn expression_list(&mut self) -> PResult<Vec<ExpressionListElement>> {
        let mut elements = Vec::new();
        loop {
            let start = self.start();
            let expr = self.expression()?;
            elements.push(ExpressionListElement {
                spread: None,
                expr,
                range: self.span_from(start),
            });
            if self.eat(SyntaxKind::Comma).is_none() {
                break;
            }
            self.eat_nls();
        }
        Ok(elements)
    }

    // --- Operators ----------------------------------------------------------------

    pub(super) fn expression(&mut self) -> PResult<Expr> {
        self.expr_bp(0)
    }

    /// Current infix operator and how many tokens it spans. Shift operators
    /// are written as adjacent `<`/`>` tokens.
    fn infix_at(&self) -> Option<(SyntaxKind, usize)> {
        let adjacent = |n: usize| match (self.tokens.get(self.pos + n), self.tokens.get(self.pos + n + 1)) {
            (Some(a), Some(b)) => a.range.end == b.range.start,
            _ => false,
        };
        let kind = self.current();
        match kind {
            SyntaxKind::Lt if self.nth(1) == SyntaxKind::Lt && adjacent(0) => {
                Some((SyntaxKind::Shl, 2))
            }
            SyntaxKind::Gt if self.nth(1) == SyntaxKind::Gt && adjacent(0) => {
                if self.nth(2) == SyntaxKind::Gt && adjacent(1) {
                    Some((SyntaxKind::UShr, 3))
                } else {
                    Some((SyntaxKind::Shr, 2))
                }
            }
            kind => infix_binding_power(kind).map(|_| (kind, 1)),
        }
    }

    fn bump_op(&mut self, kind: SyntaxKind, width: usize) -> Op {
        let start = self.start();
        for _ in 0..width {
            self.bump();
        }
        Op {
            kind,
            range: self.span_from(start),
        }
    }

    fn expr_bp(&mut self, min_bp: u8) -> PResult<Expr> {
        let start = self.start();
        let mut lhs = self.prefix_expr(min_bp)?;

        loop {
            if self.at(SyntaxKind::Nl) {
                let next = self.peek_past_nls();
                let continues = matches!(
                    next,
                    SyntaxKind::AmpAmp | SyntaxKind::PipePipe | SyntaxKind::Question | SyntaxKind::Elvis
                ) && infix_binding_power(next).is_some_and(|(l_bp, _)| l_bp >= min_bp);
                if !continues {
                    break;
                }
                self.eat_nls();
            }
            let Some((kind, width)) = self.infix_at() else {
                break;
            };
            let Some((l_bp, r_bp)) = infix_binding_power(kind) else {
                break;
            };
            if l_bp < min_bp {
                break;
            }
            let op = self.bump_op(kind, width);
            self.eat_nls();

            lhs = match kind {
                kind if kind.is_assignment_operator() => {
                    let rhs = Box::new(self.statement_expr()?);
                    Expr::Assignment {
                        lhs: Box::new(lhs),
                        op,
                        rhs,
                        range: self.span_from(start),
                    }
                }
                SyntaxKind::Question => {
                    let then = self.expression()?;
                    self.eat_nls();
                    self.expect(SyntaxKind::Colon, ":")?;
                    self.eat_nls();
                    let else_ = self.expr_bp(r_bp)?;
                    Expr::Conditional {
                        cond: Box::new(lhs),
                        then: Box::new(then),
                        else_: Box::new(else_),
                        range: self.span_from(start),
                    }
                }
                SyntaxKind::Elvis => {
                    let else_ = self.expr_bp(r_bp)?;
                    Expr::Elvis {
                        cond: Box::new(lhs),
                        op,
                        else_: Box::new(else_),
                        range: self.span_from(start),
                    }
                }
                SyntaxKind::InstanceofKw | SyntaxKind::NotInstanceof => {
                    let ty = self.type_()?;
                    Expr::InstanceOf {
                        expr: Box::new(lhs),
                        op,
                        ty,
                        range: self.span_from(start),
                    }
                }
                SyntaxKind::AsKw => {
                    let ty = self.type_()?;
                    Expr::As {
                        expr: Box::new(lhs),
                        op,
                        ty,
                        range: self.span_from(start),
                    }
                }
                _ => {
                    let rhs = self.expr_bp(r_bp)?;
                    Expr::Binary {
                        lhs: Box::new(lhs),
                        op,
                        rhs: Box::new(rhs),
                        range: self.span_from(start),
                    }
                }
            };
        }
        Ok(lhs)
    }

    fn prefix_expr(&mut self, min_bp: u8) -> PResult<Expr> {
        let start = self.start();
        match self.current() {
            SyntaxKind::Bang | SyntaxKind::Tilde => {
                let op = self.bump_op(self.current(), 1);
                self.eat_nls();
                let expr = self.expr_bp(UNARY_NOT_BP)?;
                Ok(Expr::UnaryNot {
                    op,
                    expr: Box::new(expr),
                    range: self.span_from(start),
                })
            }
            SyntaxKind::PlusPlus | SyntaxKind::MinusMinus => {
                let op = self.bump_op(self.current(), 1);
                let expr = self.expr_bp(UNARY_NOT_BP)?;
                Ok(Expr::Prefix {
                    op,
                    expr: Box::new(expr),
                    range: self.span_from(start),
                })
            }
            SyntaxKind::Plus | SyntaxKind::Minus => {
                let op = self.bump_op(self.current(), 1);
                let expr = self.expr_bp(UNARY_ADD_BP)?;
                Ok(Expr::UnaryAdd {
                    op,
                    expr: Box::new(expr),
                    range: self.span_from(start),
                })
            }
            SyntaxKind::LParen => {
                if min_bp <= ASSIGN_BP && self.at_multiple_assignment() {
                    return self.multiple_assignment();
                }
                if !self.at_lambda_start() && self.predict(Decision::Cast, scan::cast) {
                    return self.cast();
                }
                self.postfix_expr()
            }
            _ => self.postfix_expr(),
        }
    }

    /// `(a, b) =` with at least two names.
    fn at_multiple_assignment(&self) -> bool {
        self.lookahead(|s, pos| {
            let mut idx = pos + 1;
            let mut names = 0;
            loop {
                if !s.kind(idx)?.is_identifier_like() {
                    return Ok(false);
                }
                names += 1;
                idx += 1;
                match s.kind(idx)? {
                    SyntaxKind::Comma => idx += 1,
                    SyntaxKind::RParen => break,
                    _ => return Ok(false),
                }
            }
            Ok(names >= 2 && s.kind(idx + 1)? == SyntaxKind::Assign)
        })
    }

    fn multiple_assignment(&mut self) -> PResult<Expr> {
        let start = self.start();
        self.bump();
        let mut names = vec![self.ident()?];
        while self.eat(SyntaxKind::Comma).is_some() {
            names.push(self.ident()?);
        }
        self.expect(SyntaxKind::RParen, ")")?;
        let names_range = self.span_from(start);
        let op = self.bump_op(SyntaxKind::Assign, 1);
        self.eat_nls();
        let rhs = Box::new(self.statement_expr()?);
        Ok(Expr::MultipleAssignment {
            names,
            names_range,
            op,
            rhs,
            range: self.span_from(start),
        })
    }

    fn cast(&mut self) -> PResult<Expr> {
        let start = self.start();
        self.expect(SyntaxKind::LParen, "(")?;
        let ty = self.type_()?;
        self.expect(SyntaxKind::RParen, ")")?;
        let paren_range = self.span_from(start);
        let expr = self.expr_bp(UNARY_NOT_BP)?;
        Ok(Expr::Cast {
            ty,
            paren_range,
            expr: Box::new(expr),
            range: self.span_from(start),
        })
    }

    fn postfix_expr(&mut self) -> PResult<Expr> {
        let start = self.start();
        let path = self.path_expr()?;
        let expr = Expr::Path(path);
        if matches!(self.current(), SyntaxKind::PlusPlus | SyntaxKind::MinusMinus) {
            let op = self.bump_op(self.current(), 1);
            return Ok(Expr::Postfix {
                expr: Box::new(expr),
                op,
                range: self.span_from(start),
            });
        }
        Ok(expr)
    }

    // --- Paths -----------------------------------------------------------------------

    fn path_expr(&mut self) -> PResult<PathExpr> {
        let start = self.start();
        let primary = self.primary()?;
        let elements = self.path_elements()?;
        Ok(PathExpr {
            primary,
            elements,
            range: self.span_from(start),
        })
    }

    fn path_elements(&mut self) -> PResult<Vec<PathElement>> {
        let mut elements = Vec::new();
        while let Some(element) = self.path_element()? {
            elements.push(element);
        }
        Ok(elements)
    }

    fn path_element(&mut self) -> PResult<Option<PathElement>> {
        if self.at(SyntaxKind::Nl) {
            if member_access(self.peek_past_nls()).is_none() {
                return Ok(None);
            }
            self.eat_nls();
        }
        let kind = self.current();
        let element = if let Some(access) = member_access(kind) {
            self.member(access)?
        } else {
            match kind {
                SyntaxKind::LParen => PathElement::Arguments(self.arguments()?),
                SyntaxKind::LBracket | SyntaxKind::SafeIndex => self.index()?,
                SyntaxKind::LBrace => PathElement::Closure(self.closure()?),
                _ => return Ok(None),
            }
        };
        Ok(Some(element))
    }

    fn member(&mut self, access: MemberAccess) -> PResult<PathElement> {
        let start = self.start();
        let op_range = self.bump().range;
        self.eat_nls();
        if access == MemberAccess::Dot && self.at(SyntaxKind::NewKw) {
            self.bump();
            self.eat_nls();
            let creator = self.creator()?;
            return Ok(PathElement::New {
                creator,
                range: self.span_from(start),
            });
        }
        let attribute = !matches!(
            access,
            MemberAccess::MethodPointer | MemberAccess::MethodReference
        ) && self.eat(SyntaxKind::At).is_some();
        let type_args = if self.at(SyntaxKind::Lt) {
            Some(self.type_arguments()?)
        } else {
            None
        };
        let name = self.name_part()?;
        Ok(PathElement::Member {
            access,
            op_range,
            attribute,
            type_args,
            name,
            range: self.span_from(start),
        })
    }

    fn name_part(&mut self) -> PResult<NamePart> {
        match self.current() {
            kind if kind.is_identifier_like() => Ok(NamePart::Identifier(self.ident()?)),
            SyntaxKind::StringLiteral => {
                let token = self.bump();
                Ok(NamePart::String(self.lit_from(token)))
            }
            SyntaxKind::GStringBegin => Ok(NamePart::GString(self.gstring()?)),
            SyntaxKind::LParen => Ok(NamePart::Paren(self.par_expr()?)),
            kind if kind.is_keyword() => {
                let token = self.bump();
                Ok(NamePart::Keyword(self.ident_from(token)))
            }
            _ => Err(self.unexpected()),
        }
    }

    fn index(&mut self) -> PResult<PathElement> {
        let start = self.start();
        let safe = self.bump().kind == SyntaxKind::SafeIndex;
        self.eat_nls();
        if self.at(SyntaxKind::Colon) {
            self.bump();
            self.eat_nls();
            self.expect(SyntaxKind::RBracket, "]")?;
            return Ok(PathElement::NamedIndex {
                safe,
                entries: Vec::new(),
                range: self.span_from(start),
            });
        }
        if self.at(SyntaxKind::RBracket) {
            return Err(self.unexpected());
        }
        let collection = self.collection_elements()?;
        self.expect(SyntaxKind::RBracket, "]")?;
        match collection {
            Collection::List {
                elements,
                trailing_comma: None,
            } => Ok(PathElement::Index {
                safe,
                elements,
                range: self.span_from(start),
            }),
            Collection::List {
                trailing_comma: Some(comma),
                ..
            } => Err(self.unexpected_range(comma)),
            Collection::Map(entries) => Ok(PathElement::NamedIndex {
                safe,
                entries,
                range: self.span_from(start),
            }),
        }
    }

    // --- Primaries ---------------------------------------------------------------

    fn primary(&mut self) -> PResult<Primary> {
        let start = self.start();
        match self.current() {
            kind if kind.is_identifier_like() => {
                if self.nth(1) == SyntaxKind::Arrow {
                    return Ok(Primary::Lambda(self.lambda()?));
                }
                let name = self.ident()?;
                let type_args = if kind == SyntaxKind::CapitalizedIdentifier
                    && self.at(SyntaxKind::Lt)
                    && self.at_generic_class_reference()
                {
                    Some(self.type_arguments()?)
                } else {
                    None
                };
                Ok(Primary::Identifier { name, type_args })
            }
            SyntaxKind::IntegerLiteral
            | SyntaxKind::FloatingLiteral
            | SyntaxKind::StringLiteral
            | SyntaxKind::TrueKw
            | SyntaxKind::FalseKw
            | SyntaxKind::NullKw => Ok(Primary::Literal(self.literal()?)),
            SyntaxKind::GStringBegin => Ok(Primary::GString(self.gstring()?)),
            SyntaxKind::NewKw => {
                let new_kw = self.bump().range;
                self.eat_nls();
                let creator = self.creator()?;
                Ok(Primary::New {
                    new_kw,
                    creator,
                    range: self.span_from(start),
                })
            }
            SyntaxKind::ThisKw => Ok(Primary::This(self.bump().range)),
            SyntaxKind::SuperKw => Ok(Primary::Super(self.bump().range)),
            SyntaxKind::LParen => {
                if self.at_lambda_start() {
                    return Ok(Primary::Lambda(self.lambda()?));
                }
                Ok(Primary::Paren(self.par_expr()?))
            }
            SyntaxKind::LBrace => Ok(Primary::Closure(self.closure()?)),
            SyntaxKind::LBracket => self.list_or_map(),
            kind if kind.is_primitive_type() || kind == SyntaxKind::VoidKw => {
                let token = self.bump();
                Ok(Primary::BuiltInType(self.ident_from(token)))
            }
            _ => Err(self.unexpected()),
        }
    }

    /// `Name<Args>` used as a class reference, e.g. `List<String>.class`.
    fn at_generic_class_reference(&self) -> bool {
        self.lookahead(|s, pos| {
            let Some(after) = scan::skip_type_arguments(s, pos)? else {
                return Ok(false);
            };
            Ok(matches!(
                s.kind(after)?,
                SyntaxKind::Dot
                    | SyntaxKind::RParen
                    | SyntaxKind::Comma
                    | SyntaxKind::Nl
                    | SyntaxKind::Semicolon
                    | SyntaxKind::RBracket
                    | SyntaxKind::RBrace
                    | SyntaxKind::Eof
            ))
        })
    }

    fn literal(&mut self) -> PResult<Literal> {
        let token = self.bump();
        Ok(match token.kind {
            SyntaxKind::IntegerLiteral => Literal::Integer(self.lit_from(token)),
            SyntaxKind::FloatingLiteral => Literal::Floating(self.lit_from(token)),
            SyntaxKind::StringLiteral => Literal::String(self.lit_from(token)),
            SyntaxKind::TrueKw => Literal::Boolean(true, token.range),
            SyntaxKind::FalseKw => Literal::Boolean(false, token.range),
            SyntaxKind::NullKw => Literal::Null(token.range),
            _ => return Err(self.unexpected_range(token.range)),
        })
    }

    pub(super) fn par_expr(&mut self) -> PResult<ParExpr> {
        let start = self.start();
        self.expect(SyntaxKind::LParen, "(")?;
        self.eat_nls();
        let inner = Box::new(self.statement_expr()?);
        self.eat_nls();
        self.expect(SyntaxKind::RParen, ")")?;
        Ok(ParExpr {
            inner,
            range: self.span_from(start),
        })
    }

    fn gstring(&mut self) -> PResult<GString> {
        let start = self.start();
        let token = self.expect(SyntaxKind::GStringBegin, "\"")?;
        let begin = self.lit_from(token);
        let mut values = Vec::new();
        let mut parts = Vec::new();
        let end = loop {
            values.push(self.gstring_value()?);
            match self.current() {
                SyntaxKind::GStringPart => {
                    let token = self.bump();
                    parts.push(self.lit_from(token));
                }
                SyntaxKind::GStringEnd => {
                    let token = self.bump();
                    break self.lit_from(token);
                }
                _ => return Err(self.unexpected()),
            }
        };
        Ok(GString {
            begin,
            values,
            parts,
            end,
            range: self.span_from(start),
        })
    }

    fn gstring_value(&mut self) -> PResult<GStringValue> {
        if self.at(SyntaxKind::LBrace) {
            return Ok(GStringValue::Closure(self.closure()?));
        }
        let start = self.start();
        let name = self.ident()?;
        let mut parts = Vec::new();
        while self.at(SyntaxKind::GStringPathPart) {
            let token = self.bump();
            parts.push(self.lit_from(token));
        }
        Ok(GStringValue::Path {
            name,
            parts,
            range: self.span_from(start),
        })
    }

    pub(super) fn closure(&mut self) -> PResult<Closure> {
        let start = self.start();
        let has_params = self.predict(Decision::ClosureParams, scan::closure_params);
        self.expect(SyntaxKind::LBrace, "{")?;
        self.eat_nls();
        let params = if has_params {
            let params = if self.at(SyntaxKind::Arrow) {
                Vec::new()
            } else {
                self.formal_parameter_list()?
            };
            self.eat_nls();
            let arrow = self.expect(SyntaxKind::Arrow, "->")?.range;
            Some(ClosureParams { params, arrow })
        } else {
            None
        };
        let statements = self.block_statements(|kind| kind == SyntaxKind::RBrace)?;
        self.expect(SyntaxKind::RBrace, "}")?;
        Ok(Closure {
            params,
            statements,
            range: self.span_from(start),
        })
    }

    fn lambda(&mut self) -> PResult<Lambda> {
        let start = self.start();
        let params = if self.at(SyntaxKind::LParen) {
            LambdaParams::Parenthesized(self.formal_parameters()?)
        } else {
            LambdaParams::Single(self.ident()?)
        };
        self.eat_nls();
        let arrow = self.expect(SyntaxKind::Arrow, "->")?.range;
        self.eat_nls();
        let body = if self.at(SyntaxKind::LBrace) {
            LambdaBody::Block(self.block()?)
        } else {
            LambdaBody::Expr(Box::new(self.statement_expr()?))
        };
        Ok(Lambda {
            params,
            arrow,
            body,
            range: self.span_from(start),
        })
    }

    // --- Collections -------------------------------------------------------------

    fn list_or_map(&mut self) -> PResult<Primary> {
        let start = self.start();
        self.expect(SyntaxKind::LBracket, "[")?;
        self.eat_nls();
        if self.at(SyntaxKind::Colon) {
            self.bump();
            self.eat_nls();
            self.expect(SyntaxKind::RBracket, "]")?;
            return Ok(Primary::Map(MapLit {
                entries: Vec::new(),
                range: self.span_from(start),
            }));
        }
        let collection = self.collection_elements()?;
        self.expect(SyntaxKind::RBracket, "]")?;
        Ok(match collection {
            Collection::List {
                elements,
                trailing_comma,
            } => Primary::List(ListLit {
                elements,
                trailing_comma,
                range: self.span_from(start),
            }),
            Collection::Map(entries) => Primary::Map(MapLit {
                entries,
                range: self.span_from(start),
            }),
        })
    }

    /// Elements up to a closing `]`. The first element decides between a list
    /// and a map; mixing the two is an error.
    fn collection_elements(&mut self) -> PResult<Collection> {
        let mut elements = Vec::new();
        let mut entries = Vec::new();
        let mut trailing_comma = None;
        if self.at(SyntaxKind::Comma) {
            trailing_comma = Some(self.bump().range);
            self.eat_nls();
            return Ok(Collection::List {
                elements,
                trailing_comma,
            });
        }
        while !self.at(SyntaxKind::RBracket) {
            match self.argument_element()? {
                ArgumentListElement::MapEntry(entry) if elements.is_empty() => entries.push(entry),
                ArgumentListElement::Expr(element) if entries.is_empty() => elements.push(element),
                other => return Err(self.unexpected_range(other.range())),
            }
            self.eat_nls();
            let Some(comma) = self.eat(SyntaxKind::Comma) else {
                break;
            };
            self.eat_nls();
            if self.at(SyntaxKind::RBracket) {
                trailing_comma = Some(comma.range);
            }
        }
        self.eat_nls();
        if entries.is_empty() {
            Ok(Collection::List {
                elements,
                trailing_comma,
            })
        } else {
            Ok(Collection::Map(entries))
        }
    }

    // --- Creators ----------------------------------------------------------------

    pub(super) fn creator(&mut self) -> PResult<Creator> {
        let start = self.start();
        let name = self.created_name()?;
        let kind = if self.lookahead(scan::dim) {
            let mut dims = Vec::new();
            while self.lookahead(scan::dim) {
                let dim_start = self.start();
                let annotations = self.annotations()?;
                let lbracket = self.expect(SyntaxKind::LBracket, "[")?.range;
                self.eat_nls();
                let size = if self.at(SyntaxKind::RBracket) {
                    None
                } else {
                    Some(self.expression()?)
                };
                self.eat_nls();
                self.expect(SyntaxKind::RBracket, "]")?;
                dims.push(Dim {
                    annotations,
                    lbracket,
                    size,
                    range: self.span_from(dim_start),
                });
            }
            // A sized creator takes an initializer only on the same line; the
            // builder then rejects the sizes.
            let all_empty = dims.iter().all(|dim| dim.size.is_none());
            if all_empty && self.peek_past_nls() == SyntaxKind::LBrace {
                self.eat_nls();
            }
            let init = if self.at(SyntaxKind::LBrace) {
                Some(self.array_initializer()?)
            } else {
                None
            };
            CreatorKind::Array { dims, init }
        } else {
            let args = self.arguments()?;
            let body = if self.at(SyntaxKind::LBrace) {
                Some(self.class_body(TypeDeclKind::Class)?)
            } else {
                None
            };
            CreatorKind::Object { args, body }
        };
        Ok(Creator {
            name,
            kind,
            range: self.span_from(start),
        })
    }

    fn created_name(&mut self) -> PResult<CreatedName> {
        let start = self.start();
        let annotations = self.annotations()?;
        let kind = if self.current().is_primitive_type() {
            let token = self.bump();
            CreatedNameKind::Primitive(self.ident_from(token))
        } else {
            let name = self.qualified_name()?;
            let type_args = if self.at(SyntaxKind::Lt) && self.nth(1) == SyntaxKind::Gt {
                let open = self.bump();
                let close = self.bump();
                Some(TypeArgumentsOrDiamond::Diamond(open.range.cover(close.range)))
            } else if self.at(SyntaxKind::Lt) {
                Some(TypeArgumentsOrDiamond::Args(self.type_arguments()?))
            } else {
                None
            };
            CreatedNameKind::Class { name, type_args }
        };
        Ok(CreatedName {
            annotations,
            kind,
            range: self.span_from(start),
        })
    }

    /// `{ init, ... }`. Nested braces are closures.
    fn array_initializer(&mut self) -> PResult<ArrayInitializer> {
        let start = self.start();
        self.expect(SyntaxKind::LBrace, "{")?;
        self.eat_nls();
        let mut elements = Vec::new();
        while !self.at(SyntaxKind::RBrace) {
            elements.push(self.statement_expr()?);
            self.eat_nls();
            if self.eat(SyntaxKind::Comma).is_none() {
                break;
            }
            self.eat_nls();
        }
        self.eat_nls();
        self.expect(SyntaxKind::RBrace, "}")?;
        Ok(ArrayInitializer {
            elements,
            range: self.span_from(start),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::parser::{parse, ParseOptions};
    use crate::prediction::PredictionCache;
    use crate::syntax_kind::SyntaxKind;
    use crate::tree::*;

    fn statement_expr(text: &str) -> CommandExpr {
        let out = parse(text, &ParseOptions::default(), &PredictionCache::new()).unwrap();
        match out.unit.statements.into_iter().next() {
            Some(ScriptStatement::Statement(Statement::Expression(expr))) => expr,
            other => panic!("expected an expression statement, got {other:?}"),
        }
    }

    fn binary_op(expr: &Expr) -> SyntaxKind {
        match expr {
            Expr::Binary { op, .. } => op.kind,
            other => panic!("expected a binary expression, got {other:?}"),
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let cmd = statement_expr("1 + 2 * 3");
        let Expr::Binary { op, rhs, .. } = &cmd.expr else {
            panic!("expected binary");
        };
        assert_eq!(op.kind, SyntaxKind::Plus);
        assert_eq!(binary_op(rhs), SyntaxKind::Star);
    }

    #[test]
    fn unary_minus_is_looser_than_power() {
        let cmd = statement_expr("-2 ** 2");
        let Expr::UnaryAdd { expr, .. } = &cmd.expr else {
            panic!("expected unary minus");
        };
        assert_eq!(binary_op(expr), SyntaxKind::Power);
    }

    #[test]
    fn shifts_are_composed_from_adjacent_angles() {
        assert_eq!(binary_op(&statement_expr("a >>> 2").expr), SyntaxKind::UShr);
        assert_eq!(binary_op(&statement_expr("a << 2").expr), SyntaxKind::Shl);
        assert_eq!(binary_op(&statement_expr("a > b").expr), SyntaxKind::Gt);
    }

    #[test]
    fn command_chain_arguments() {
        let cmd = statement_expr("take 2 pills of chloroquine");
        assert_eq!(cmd.args.as_ref().map(|args| args.elements.len()), Some(1));
        assert_eq!(cmd.command_args.len(), 2);
        assert!(matches!(cmd.command_args[0].tail, CommandArgumentTail::Args(_)));
        assert!(matches!(cmd.command_args[1].tail, CommandArgumentTail::None));
    }

    #[test]
    fn call_with_trailing_closure_takes_no_argument_list() {
        let cmd = statement_expr("foo(1) { it }");
        assert!(cmd.args.is_none());
        let Expr::Path(path) = &cmd.expr else {
            panic!("expected path");
        };
        assert_eq!(path.elements.len(), 2);
    }

    #[test]
    fn map_and_list_literals() {
        let cmd = statement_expr("x = [a: 1, (b): 2, *: m]");
        let Expr::Assignment { rhs, .. } = &cmd.expr else {
            panic!("expected assignment");
        };
        let StatementExpr::Command(rhs) = rhs.as_ref() else {
            panic!("expected command");
        };
        let Expr::Path(path) = &rhs.expr else {
            panic!("expected path");
        };
        let Primary::Map(map) = &path.primary else {
            panic!("expected map");
        };
        assert_eq!(map.entries.len(), 3);
        assert!(matches!(map.entries[2].key, MapEntryKey::Spread(_)));

        let cmd = statement_expr("[1, *rest,]");
        let Expr::Path(path) = &cmd.expr else {
            panic!("expected path");
        };
        let Primary::List(list) = &path.primary else {
            panic!("expected list");
        };
        assert_eq!(list.elements.len(), 2);
        assert!(list.elements[1].spread.is_some());
        assert!(list.trailing_comma.is_some());
    }

    #[test]
    fn safe_navigation_continues_on_next_line() {
        let cmd = statement_expr("a\n  ?.b\n  .c()");
        let Expr::Path(path) = &cmd.expr else {
            panic!("expected path");
        };
        assert_eq!(path.elements.len(), 3);
        assert!(matches!(
            path.elements[0],
            PathElement::Member {
                access: MemberAccess::SafeDot,
                ..
            }
        ));
    }

    #[test]
    fn casts_and_lambdas() {
        let cmd = statement_expr("foo((String) x, (a, b) -> a + b)");
        let Expr::Path(path) = &cmd.expr else {
            panic!("expected path");
        };
        let Some(PathElement::Arguments(args)) = path.elements.first() else {
            panic!("expected arguments");
        };
        let elements = &args.list.as_ref().unwrap().elements;
        assert!(matches!(
            elements[0],
            ArgumentListElement::Expr(ExpressionListElement {
                expr: Expr::Cast { .. },
                ..
            })
        ));
        assert!(matches!(elements[1], ArgumentListElement::Lambda(_)));
    }

    #[test]
    fn multiple_assignment_needs_two_names() {
        let cmd = statement_expr("(a, b) = [1, 2]");
        assert!(matches!(cmd.expr, Expr::MultipleAssignment { ref names, .. } if names.len() == 2));
        let cmd = statement_expr("(a) = 1");
        assert!(matches!(cmd.expr, Expr::Assignment { .. }));
    }
}
