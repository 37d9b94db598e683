//! Token-kind lookahead scans backing the speculative decisions.
//!
//! A scan never builds tree nodes; it walks token kinds from a start index and
//! answers one yes/no question. Scans run under a window: touching a token
//! past the window aborts with [`Overflow`], which tells the caller the answer
//! was not decidable within the window.

use crate::lexer::Token;
use crate::syntax_kind::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Overflow;

pub(super) type ScanResult<T> = Result<T, Overflow>;

pub(super) struct Scanner<'t> {
    tokens: &'t [Token],
    limit: usize,
}

impl<'t> Scanner<'t> {
    pub(super) fn new(tokens: &'t [Token], start: usize, window: usize) -> Self {
        Self {
            tokens,
            limit: start.saturating_add(window),
        }
    }

    pub(super) fn unbounded(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            limit: usize::MAX,
        }
    }

    pub(super) fn kind(&self, idx: usize) -> ScanResult<SyntaxKind> {
        if idx >= self.limit {
            return Err(Overflow);
        }
        Ok(self
            .tokens
            .get(idx)
            .map_or(SyntaxKind::Eof, |token| token.kind))
    }
}

pub(super) fn skip_nls(s: &Scanner<'_>, mut idx: usize) -> ScanResult<usize> {
    while s.kind(idx)? == SyntaxKind::Nl {
        idx += 1;
    }
    Ok(idx)
}

/// `idx` is at an opening bracket; returns the index after its match.
pub(super) fn skip_balanced(s: &Scanner<'_>, mut idx: usize) -> ScanResult<Option<usize>> {
    let mut depth = 0usize;
    loop {
        match s.kind(idx)? {
            SyntaxKind::LParen
            | SyntaxKind::LBracket
            | SyntaxKind::LBrace
            | SyntaxKind::SafeIndex => depth += 1,
            SyntaxKind::RParen | SyntaxKind::RBracket | SyntaxKind::RBrace => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(Some(idx + 1));
                }
            }
            SyntaxKind::Eof => return Ok(None),
            _ => {}
        }
        idx += 1;
    }
}

fn skip_qualified_name(s: &Scanner<'_>, mut idx: usize) -> ScanResult<Option<usize>> {
    if !s.kind(idx)?.is_identifier_like() {
        return Ok(None);
    }
    idx += 1;
    while s.kind(idx)? == SyntaxKind::Dot && s.kind(idx + 1)?.is_identifier_like() {
        idx += 2;
    }
    Ok(Some(idx))
}

pub(super) fn is_annotation_start(s: &Scanner<'_>, idx: usize) -> ScanResult<bool> {
    Ok(s.kind(idx)? == SyntaxKind::At && s.kind(idx + 1)? != SyntaxKind::InterfaceKw)
}

pub(super) fn skip_annotation(s: &Scanner<'_>, idx: usize) -> ScanResult<Option<usize>> {
    let Some(mut idx) = skip_qualified_name(s, idx + 1)? else {
        return Ok(None);
    };
    if s.kind(idx)? == SyntaxKind::LParen {
        match skip_balanced(s, idx)? {
            Some(next) => idx = next,
            None => return Ok(None),
        }
    }
    Ok(Some(idx))
}

/// Skips annotations (each optionally followed by newlines).
pub(super) fn skip_annotations(s: &Scanner<'_>, mut idx: usize) -> ScanResult<Option<usize>> {
    while is_annotation_start(s, idx)? {
        match skip_annotation(s, idx)? {
            Some(next) => idx = skip_nls(s, next)?,
            None => return Ok(None),
        }
    }
    Ok(Some(idx))
}

/// Whether the keyword at `idx` acts as a modifier rather than starting a
/// statement or expression.
pub(super) fn is_modifier_at(s: &Scanner<'_>, idx: usize) -> ScanResult<bool> {
    let kind = s.kind(idx)?;
    Ok(match kind {
        SyntaxKind::SynchronizedKw => s.kind(idx + 1)? != SyntaxKind::LParen,
        SyntaxKind::DefaultKw => s.kind(idx + 1)? != SyntaxKind::Colon,
        SyntaxKind::VarKw => {
            let next = s.kind(idx + 1)?;
            if next == SyntaxKind::LParen {
                // `var (a, b) = ...` rather than a call to `var`.
                match skip_balanced(s, idx + 1)? {
                    Some(after) => s.kind(skip_nls(s, after)?)? == SyntaxKind::Assign,
                    None => false,
                }
            } else {
                next.is_identifier_like() || next.is_primitive_type()
            }
        }
        kind => kind.is_modifier(),
    })
}

/// Skips a run of modifiers and annotations. Returns the index after them and
/// whether anything was skipped.
pub(super) fn skip_modifiers(s: &Scanner<'_>, mut idx: usize) -> ScanResult<Option<(usize, bool)>> {
    let mut any = false;
    loop {
        if is_annotation_start(s, idx)? {
            match skip_annotation(s, idx)? {
                Some(next) => idx = skip_nls(s, next)?,
                None => return Ok(None),
            }
        } else if is_modifier_at(s, idx)? {
            idx = skip_nls(s, idx + 1)?;
        } else {
            return Ok(Some((idx, any)));
        }
        any = true;
    }
}

/// `<` ... `>` of type arguments, including the diamond.
pub(super) fn skip_type_arguments(s: &Scanner<'_>, idx: usize) -> ScanResult<Option<usize>> {
    if s.kind(idx)? != SyntaxKind::Lt {
        return Ok(None);
    }
    if s.kind(idx + 1)? == SyntaxKind::Gt {
        return Ok(Some(idx + 2));
    }
    let mut idx = idx + 1;
    loop {
        let Some(next) = skip_annotations(s, idx)? else {
            return Ok(None);
        };
        idx = next;
        if s.kind(idx)? == SyntaxKind::Question {
            idx += 1;
            if matches!(s.kind(idx)?, SyntaxKind::ExtendsKw | SyntaxKind::SuperKw) {
                match skip_type(s, idx + 1)? {
                    Some(next) => idx = next,
                    None => return Ok(None),
                }
            }
        } else {
            match skip_type(s, idx)? {
                Some(next) => idx = next,
                None => return Ok(None),
            }
        }
        match s.kind(idx)? {
            SyntaxKind::Comma => idx = skip_nls(s, idx + 1)?,
            SyntaxKind::Gt => return Ok(Some(idx + 1)),
            _ => return Ok(None),
        }
    }
}

pub(super) fn skip_type(s: &Scanner<'_>, idx: usize) -> ScanResult<Option<usize>> {
    let Some(mut idx) = skip_annotations(s, idx)? else {
        return Ok(None);
    };
    let first = s.kind(idx)?;
    if first.is_primitive_type() || first == SyntaxKind::VoidKw {
        idx += 1;
    } else if first.is_identifier_like() {
        idx += 1;
        while s.kind(idx)? == SyntaxKind::Dot && s.kind(idx + 1)?.is_identifier_like() {
            idx += 2;
        }
        if s.kind(idx)? == SyntaxKind::Lt {
            match skip_type_arguments(s, idx)? {
                Some(next) => idx = next,
                None => return Ok(None),
            }
        }
    } else {
        return Ok(None);
    }
    while let Some(next) = skip_empty_dim(s, idx)? {
        idx = next;
    }
    Ok(Some(idx))
}

/// `@A []`: an empty dimension with optional annotations. Returns the index
/// after `]`.
fn skip_empty_dim(s: &Scanner<'_>, idx: usize) -> ScanResult<Option<usize>> {
    let Some(idx) = skip_annotations(s, idx)? else {
        return Ok(None);
    };
    if s.kind(idx)? == SyntaxKind::LBracket && s.kind(idx + 1)? == SyntaxKind::RBracket {
        Ok(Some(idx + 2))
    } else {
        Ok(None)
    }
}

/// Whether an empty dimension, possibly annotated, starts at `idx`.
pub(super) fn empty_dim(s: &Scanner<'_>, idx: usize) -> ScanResult<bool> {
    Ok(skip_empty_dim(s, idx)?.is_some())
}

/// Whether a creator dimension, sized or empty and possibly annotated,
/// starts at `idx`.
pub(super) fn dim(s: &Scanner<'_>, idx: usize) -> ScanResult<bool> {
    match skip_annotations(s, idx)? {
        Some(idx) => Ok(s.kind(idx)? == SyntaxKind::LBracket),
        None => Ok(false),
    }
}

/// `<T extends A & B, U>` of a generic declaration.
pub(super) fn skip_type_parameters(s: &Scanner<'_>, idx: usize) -> ScanResult<Option<usize>> {
    if s.kind(idx)? != SyntaxKind::Lt {
        return Ok(None);
    }
    let mut depth = 0usize;
    let mut idx = idx;
    loop {
        match s.kind(idx)? {
            SyntaxKind::Lt => depth += 1,
            SyntaxKind::Gt => {
                depth -= 1;
                if depth == 0 {
                    return Ok(Some(idx + 1));
                }
            }
            kind if kind.is_identifier_like() => {}
            SyntaxKind::Dot
            | SyntaxKind::Comma
            | SyntaxKind::ExtendsKw
            | SyntaxKind::SuperKw
            | SyntaxKind::Amp
            | SyntaxKind::Question
            | SyntaxKind::At
            | SyntaxKind::LBracket
            | SyntaxKind::RBracket
            | SyntaxKind::Nl => {}
            _ => return Ok(None),
        }
        idx += 1;
    }
}

/// Tokens that may appear inside a formal parameter list without defaults.
fn is_parameter_token(kind: SyntaxKind) -> bool {
    kind.is_identifier_like()
        || kind.is_primitive_type()
        || matches!(
            kind,
            SyntaxKind::Dot
                | SyntaxKind::Comma
                | SyntaxKind::Lt
                | SyntaxKind::Gt
                | SyntaxKind::Question
                | SyntaxKind::ExtendsKw
                | SyntaxKind::SuperKw
                | SyntaxKind::LBracket
                | SyntaxKind::RBracket
                | SyntaxKind::Ellipsis
                | SyntaxKind::At
                | SyntaxKind::FinalKw
                | SyntaxKind::DefKw
                | SyntaxKind::Amp
        )
}

fn is_method_name(kind: SyntaxKind) -> bool {
    kind.is_identifier_like() || kind == SyntaxKind::StringLiteral
}

/// `idx` at the `(` of a parameter list: is what follows a method header?
fn is_method_tail(s: &Scanner<'_>, lparen: usize) -> ScanResult<bool> {
    let Some(end) = skip_balanced(s, lparen)? else {
        return Ok(false);
    };
    if matches!(
        s.kind(skip_nls(s, end)?)?,
        SyntaxKind::LBrace | SyntaxKind::ThrowsKw | SyntaxKind::DefaultKw
    ) {
        return Ok(true);
    }
    Ok(matches!(
        s.kind(end)?,
        SyntaxKind::Nl | SyntaxKind::Semicolon | SyntaxKind::RBrace | SyntaxKind::Eof
    ))
}

/// Script or block level method declaration.
///
/// Without modifiers the header must start with a type that is not a plain
/// lower-case name, so `foo(1) { ... }` stays a call with a trailing closure.
pub(super) fn method_declaration(s: &Scanner<'_>, pos: usize) -> ScanResult<bool> {
    let Some((mut idx, mut prefixed)) = skip_modifiers(s, pos)? else {
        return Ok(false);
    };
    if s.kind(idx)? == SyntaxKind::Lt {
        match skip_type_parameters(s, idx)? {
            Some(next) => idx = skip_nls(s, next)?,
            None => return Ok(false),
        }
        prefixed = true;
    }
    if prefixed && is_method_name(s.kind(idx)?) && s.kind(idx + 1)? == SyntaxKind::LParen {
        return is_method_tail(s, idx + 1);
    }
    if !prefixed && s.kind(idx)? == SyntaxKind::Identifier {
        return Ok(false);
    }
    let Some(after_type) = skip_type(s, idx)? else {
        return Ok(false);
    };
    let name = skip_nls(s, after_type)?;
    if is_method_name(s.kind(name)?) && s.kind(name + 1)? == SyntaxKind::LParen {
        return is_method_tail(s, name + 1);
    }
    Ok(false)
}

/// `Type name ...` local declaration without modifiers.
///
/// A leading name only starts a type when it is dotted and then generic or
/// an array, or when it is directly followed by a generic or (annotated)
/// array suffix, or when `name name =` follows.
pub(super) fn local_declaration(s: &Scanner<'_>, pos: usize) -> ScanResult<bool> {
    if s.kind(pos)? == SyntaxKind::Identifier {
        if s.kind(pos + 1)? == SyntaxKind::Dot {
            let mut idx = pos + 1;
            while s.kind(idx)? == SyntaxKind::Dot && s.kind(idx + 1)?.is_identifier_like() {
                idx += 2;
            }
            if !matches!(s.kind(idx)?, SyntaxKind::Lt | SyntaxKind::LBracket | SyntaxKind::At) {
                return Ok(false);
            }
        } else if !matches!(
            s.kind(pos + 1)?,
            SyntaxKind::Lt | SyntaxKind::LBracket | SyntaxKind::At
        )
            && s.kind(pos + 2)? != SyntaxKind::Assign
        {
            return Ok(false);
        }
    }
    let Some(name) = skip_type(s, pos)? else {
        return Ok(false);
    };
    if !s.kind(name)?.is_identifier_like() {
        return Ok(false);
    }
    Ok(matches!(
        s.kind(name + 1)?,
        SyntaxKind::Assign
            | SyntaxKind::Comma
            | SyntaxKind::Nl
            | SyntaxKind::Semicolon
            | SyntaxKind::RBrace
            | SyntaxKind::RParen
            | SyntaxKind::Eof
    ))
}

/// Tokens that can start the operand of a cast.
fn starts_cast_operand(kind: SyntaxKind) -> bool {
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
                | SyntaxKind::LParen
                | SyntaxKind::LBracket
                | SyntaxKind::NewKw
                | SyntaxKind::ThisKw
                | SyntaxKind::SuperKw
                | SyntaxKind::Bang
                | SyntaxKind::Tilde
                | SyntaxKind::PlusPlus
                | SyntaxKind::MinusMinus
        )
}

/// `pos` at `(`: `(Type) operand`.
pub(super) fn cast(s: &Scanner<'_>, pos: usize) -> ScanResult<bool> {
    let Some(close) = skip_type(s, pos + 1)? else {
        return Ok(false);
    };
    if s.kind(close)? != SyntaxKind::RParen {
        return Ok(false);
    }
    Ok(match s.kind(close + 1)? {
        SyntaxKind::Plus | SyntaxKind::Minus => s.kind(pos + 1)?.is_primitive_type(),
        kind => starts_cast_operand(kind),
    })
}

/// `pos` at `(`: `(params) ->`.
pub(super) fn lambda(s: &Scanner<'_>, pos: usize) -> ScanResult<bool> {
    let mut idx = pos + 1;
    let mut depth = 1usize;
    loop {
        match s.kind(idx)? {
            SyntaxKind::LParen => depth += 1,
            SyntaxKind::RParen => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            kind if is_parameter_token(kind) => {}
            _ => return Ok(false),
        }
        idx += 1;
    }
    Ok(s.kind(skip_nls(s, idx + 1)?)? == SyntaxKind::Arrow)
}

/// `pos` at `{`: does the closure declare parameters?
pub(super) fn closure_params(s: &Scanner<'_>, pos: usize) -> ScanResult<bool> {
    let mut idx = skip_nls(s, pos + 1)?;
    loop {
        match s.kind(idx)? {
            SyntaxKind::Arrow => return Ok(true),
            SyntaxKind::Nl => {
                let next = skip_nls(s, idx)?;
                return Ok(s.kind(next)? == SyntaxKind::Arrow);
            }
            kind if is_parameter_token(kind) => idx += 1,
            _ => return Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn decide(text: &str, scan: fn(&Scanner<'_>, usize) -> ScanResult<bool>) -> bool {
        let tokens = lex(text).unwrap();
        scan(&Scanner::unbounded(&tokens), 0).unwrap()
    }

    #[test]
    fn local_declarations() {
        assert!(decide("String s = 'a'", local_declaration));
        assert!(decide("int x", local_declaration));
        assert!(decide("List<String> xs = []", local_declaration));
        assert!(decide("foo bar = 1", local_declaration));
        assert!(decide("a.b.C[] arr", local_declaration));
        assert!(!decide("x = 1", local_declaration));
        assert!(!decide("println x", local_declaration));
        assert!(!decide("Thread.sleep 100", local_declaration));
        assert!(!decide("a[1] = 2", local_declaration));
        assert!(!decide("Foo x y", local_declaration));
    }

    #[test]
    fn method_declarations() {
        assert!(decide("def foo() {}", method_declaration));
        assert!(decide("String foo(int a) { a }", method_declaration));
        assert!(decide("static <T> T id(T t) { t }", method_declaration));
        assert!(decide("void run()\n{ }", method_declaration));
        assert!(!decide("foo(1) { it }", method_declaration));
        assert!(!decide("def x = foo()", method_declaration));
        assert!(!decide("String.valueOf(1)", method_declaration));
    }

    #[test]
    fn annotated_dimensions() {
        assert!(decide("String @A [] x = null", local_declaration));
        assert!(decide("int @A(1) @B [][] xs", local_declaration));
        assert!(decide("@A [3]", dim));
        assert!(decide("[]", empty_dim));
        assert!(!decide("@A [3]", empty_dim));
        assert!(!decide("@A x", dim));
    }

    #[test]
    fn var_before_parentheses() {
        assert!(decide("var (a, b) = [1, 2]", is_modifier_at));
        assert!(!decide("var (a, b)", is_modifier_at));
        assert!(decide("var x = 1", is_modifier_at));
    }

    #[test]
    fn casts_and_lambdas() {
        assert!(decide("(String) x", cast));
        assert!(decide("(int) -1", cast));
        assert!(!decide("(a) - 1", cast));
        assert!(!decide("(a) in b", cast));
        assert!(decide("(a, b) -> a", lambda));
        assert!(!decide("(a + b) * 2", lambda));
        assert!(decide("{ a, b -> a }", closure_params));
        assert!(decide("{ -> 1 }", closure_params));
        assert!(!decide("{ a.b }", closure_params));
    }

    #[test]
    fn window_overflow_is_reported() {
        let tokens = lex("(a.b.c.d.e.f.g) x").unwrap();
        let scanner = Scanner::new(&tokens, 0, 4);
        assert_eq!(cast(&scanner, 0), Err(Overflow));
    }
}
