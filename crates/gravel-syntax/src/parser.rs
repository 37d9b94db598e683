//! Recursive-descent parser producing [`crate::tree`] nodes.
//!
//! Parsing runs in up to two passes. The fast pass resolves speculative
//! decisions from a bounded window of token kinds, consulting and feeding the
//! shared [`PredictionCache`], and gives up on the first syntax error. If it
//! fails, the slow pass reparses from scratch with unbounded lookahead and
//! statement-level error recovery, and its errors are the ones reported.

mod expressions;
mod scan;

use gravel_core::Span;
use serde::Serialize;
use smol_str::SmolStr;
use thiserror::Error;

use crate::lexer::{lex, LexError, Token};
use crate::prediction::{Decision, PredictionCache, PredictionKey, PredictionTable};
use crate::syntax_kind::SyntaxKind;
use crate::tree::*;

use self::scan::{ScanResult, Scanner};

pub const DEFAULT_PREDICTION_WINDOW: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Token kinds a fast-mode decision may look at before it is resolved
    /// to its first viable alternative.
    pub prediction_window: usize,
    /// Try the cached fast mode before full-context parsing.
    pub sll_first: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            prediction_window: DEFAULT_PREDICTION_WINDOW,
            sll_first: true,
        }
    }
}

/// Which pass produced a [`ParseOutput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionMode {
    Sll,
    Ll,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub range: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, range: Span) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("{} syntax error(s)", .0.len())]
    Syntax(Vec<ParseError>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput {
    pub unit: CompilationUnit,
    pub mode: PredictionMode,
}

/// Parse one compilation unit.
///
/// Lexical errors are final. Syntax errors in the fast pass trigger exactly
/// one slow-pass retry.
pub fn parse(
    text: &str,
    options: &ParseOptions,
    cache: &PredictionCache,
) -> Result<ParseOutput, ParseFailure> {
    let tokens = lex(text)?;

    if options.sll_first {
        let (result, learned) = {
            let table = cache.read();
            let mut parser = Parser::new(
                text,
                &tokens,
                Strategy::Sll {
                    window: options.prediction_window.max(1),
                    table: &table,
                },
            );
            let result = parser.compilation_unit();
            (result, std::mem::take(&mut parser.learned))
        };
        let learned_count = learned.len();
        cache.merge(learned);

        match result {
            Ok(unit) => {
                tracing::debug!(
                    target: "gravel.syntax",
                    tokens = tokens.len(),
                    learned = learned_count,
                    "parsed with fast prediction"
                );
                return Ok(ParseOutput {
                    unit,
                    mode: PredictionMode::Sll,
                });
            }
            Err(err) => {
                tracing::debug!(
                    target: "gravel.syntax",
                    error = %err,
                    start = err.range.start,
                    "fast prediction failed; reparsing with full context"
                );
            }
        }
    }

    let mut parser = Parser::new(text, &tokens, Strategy::Ll);
    let result = parser.compilation_unit();
    let mut errors = parser.errors;
    match result {
        Ok(unit) if errors.is_empty() => Ok(ParseOutput {
            unit,
            mode: PredictionMode::Ll,
        }),
        Ok(_) => Err(ParseFailure::Syntax(errors)),
        Err(err) => {
            errors.push(err);
            Err(ParseFailure::Syntax(errors))
        }
    }
}

type PResult<T> = Result<T, ParseError>;

enum Strategy<'a> {
    Sll {
        window: usize,
        table: &'a PredictionTable,
    },
    Ll,
}

struct Parser<'a> {
    text: &'a str,
    tokens: &'a [Token],
    pos: usize,
    /// End of the last consumed non-newline token.
    last_end: usize,
    strategy: Strategy<'a>,
    learned: PredictionTable,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str, tokens: &'a [Token], strategy: Strategy<'a>) -> Self {
        Self {
            text,
            tokens,
            pos: 0,
            last_end: 0,
            strategy,
            learned: PredictionTable::new(),
            errors: Vec::new(),
        }
    }

    // --- Token access ------------------------------------------------------

    fn token(&self) -> Token {
        self.tokens.get(self.pos).copied().unwrap_or(Token {
            kind: SyntaxKind::Eof,
            range: Span::empty(self.text.len()),
        })
    }

    fn nth(&self, n: usize) -> SyntaxKind {
        self.tokens
            .get(self.pos + n)
            .map_or(SyntaxKind::Eof, |token| token.kind)
    }

    fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    fn start(&self) -> usize {
        self.token().range.start
    }

    fn bump(&mut self) -> Token {
        let token = self.token();
        if token.kind != SyntaxKind::Eof {
            self.pos += 1;
            if token.kind != SyntaxKind::Nl {
                self.last_end = token.range.end;
            }
        }
        token
    }

    fn eat(&mut self, kind: SyntaxKind) -> Option<Token> {
        if self.at(kind) {
            Some(self.bump())
        } else {
            None
        }
    }

    fn expect(&mut self, kind: SyntaxKind, what: &str) -> PResult<Token> {
        if self.at(kind) {
            return Ok(self.bump());
        }
        let token = self.token();
        let message = match token.kind {
            SyntaxKind::Eof => format!("Unexpected end of input; expecting '{what}'"),
            _ => format!(
                "Unexpected input: '{}'; expecting '{what}'",
                self.describe(token)
            ),
        };
        Err(ParseError::new(message, token.range))
    }

    fn eat_nls(&mut self) {
        while self.at(SyntaxKind::Nl) {
            self.bump();
        }
    }

    fn eat_seps(&mut self) {
        while matches!(self.current(), SyntaxKind::Nl | SyntaxKind::Semicolon) {
            self.bump();
        }
    }

    fn peek_past_nls(&self) -> SyntaxKind {
        let mut n = 0;
        while self.nth(n) == SyntaxKind::Nl {
            n += 1;
        }
        self.nth(n)
    }

    fn peek_past_seps(&self) -> SyntaxKind {
        let mut n = 0;
        while matches!(self.nth(n), SyntaxKind::Nl | SyntaxKind::Semicolon) {
            n += 1;
        }
        self.nth(n)
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.last_end.max(start))
    }

    fn describe(&self, token: Token) -> &'a str {
        match token.kind {
            SyntaxKind::Nl => "\\n",
            _ => token.text(self.text),
        }
    }

    fn unexpected(&self) -> ParseError {
        let token = self.token();
        match token.kind {
            SyntaxKind::Eof => ParseError::new("Unexpected end of input", token.range),
            _ => ParseError::new(
                format!("Unexpected input: '{}'", self.describe(token)),
                token.range,
            ),
        }
    }

    fn unexpected_range(&self, range: Span) -> ParseError {
        ParseError::new(
            format!("Unexpected input: '{}'", range.text(self.text)),
            range,
        )
    }

    fn ident_from(&self, token: Token) -> Ident {
        Ident {
            text: SmolStr::new(token.text(self.text)),
            range: token.range,
        }
    }

    fn lit_from(&self, token: Token) -> Lit {
        Lit {
            text: SmolStr::new(token.text(self.text)),
            range: token.range,
        }
    }

    fn ident(&mut self) -> PResult<Ident> {
        if !self.current().is_identifier_like() {
            return Err(self.unexpected());
        }
        let token = self.bump();
        Ok(self.ident_from(token))
    }

    /// An identifier or any keyword, for positions that accept both.
    fn ident_or_keyword(&mut self) -> PResult<Ident> {
        let kind = self.current();
        if !(kind.is_identifier_like() || kind.is_keyword()) {
            return Err(self.unexpected());
        }
        let token = self.bump();
        Ok(self.ident_from(token))
    }

    fn at_statement_end(&self) -> bool {
        matches!(
            self.current(),
            SyntaxKind::Nl | SyntaxKind::Semicolon | SyntaxKind::RBrace | SyntaxKind::Eof
        )
    }

    fn scanner(&self) -> Scanner<'a> {
        Scanner::unbounded(self.tokens)
    }

    /// Evaluate a deterministic lookahead from the current position.
    fn lookahead(&self, scan: impl FnOnce(&Scanner<'a>, usize) -> ScanResult<bool>) -> bool {
        scan(&self.scanner(), self.pos).unwrap_or(false)
    }

    // --- Speculation & recovery -----------------------------------------------

    /// Resolve a speculative decision at the current token.
    ///
    /// In fast mode the answer is looked up by the kinds of the next
    /// `window` tokens; a scan that stays inside the window is remembered. A
    /// scan that needs more context picks the first viable alternative
    /// (`true`) and is not remembered.
    fn predict(
        &mut self,
        decision: Decision,
        scan: fn(&Scanner<'_>, usize) -> ScanResult<bool>,
    ) -> bool {
        let pos = self.pos;
        match &self.strategy {
            Strategy::Ll => scan(&Scanner::unbounded(self.tokens), pos).unwrap_or(true),
            Strategy::Sll { window, table } => {
                let window = *window;
                let end = pos.saturating_add(window).min(self.tokens.len());
                let key = PredictionKey {
                    decision,
                    window: self.tokens[pos.min(end)..end]
                        .iter()
                        .map(|token| token.kind)
                        .collect(),
                };
                if let Some(&alt) = table.get(&key).or_else(|| self.learned.get(&key)) {
                    return alt;
                }
                match scan(&Scanner::new(self.tokens, pos, window), pos) {
                    Ok(alt) => {
                        self.learned.insert(key, alt);
                        alt
                    }
                    Err(scan::Overflow) => true,
                }
            }
        }
    }

    /// Record `err` and skip to the next statement boundary in slow mode;
    /// propagate it in fast mode.
    fn recover(&mut self, err: ParseError, start_pos: usize) -> PResult<()> {
        if matches!(self.strategy, Strategy::Sll { .. }) {
            return Err(err);
        }
        self.errors.push(err);
        if self.pos == start_pos {
            self.bump();
        }
        let mut depth = 0usize;
        loop {
            match self.current() {
                SyntaxKind::Eof => break,
                SyntaxKind::Nl | SyntaxKind::Semicolon if depth == 0 => break,
                SyntaxKind::LBrace
                | SyntaxKind::LParen
                | SyntaxKind::LBracket
                | SyntaxKind::SafeIndex => depth += 1,
                SyntaxKind::RBrace if depth == 0 => break,
                SyntaxKind::RBrace | SyntaxKind::RParen | SyntaxKind::RBracket => {
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
            self.bump();
        }
        Ok(())
    }

    fn expect_separator(&self, stop: fn(SyntaxKind) -> bool) -> PResult<()> {
        let kind = self.current();
        if matches!(kind, SyntaxKind::Nl | SyntaxKind::Semicolon | SyntaxKind::Eof) || stop(kind) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    // --- Compilation unit ----------------------------------------------------

    fn compilation_unit(&mut self) -> PResult<CompilationUnit> {
        self.eat_seps();
        let mut package = None;
        if self.after_annotations() == SyntaxKind::PackageKw {
            let start_pos = self.pos;
            match self.package_decl() {
                Ok(decl) => package = Some(decl),
                Err(err) => self.recover(err, start_pos)?,
            }
        }

        let mut statements = Vec::new();
        loop {
            self.eat_seps();
            if self.at(SyntaxKind::Eof) {
                break;
            }
            let start_pos = self.pos;
            match self.script_statement() {
                Ok(statement) => {
                    statements.push(statement);
                    if let Err(err) = self.expect_separator(|_| false) {
                        self.recover(err, self.pos)?;
                    }
                }
                Err(err) => self.recover(err, start_pos)?,
            }
        }

        Ok(CompilationUnit {
            package,
            statements,
            range: Span::new(0, self.text.len()),
        })
    }

    /// Kind of the first token after any annotations at the current position.
    fn after_annotations(&self) -> SyntaxKind {
        let scanner = self.scanner();
        match scan::skip_annotations(&scanner, self.pos) {
            Ok(Some(idx)) => scanner.kind(idx).unwrap_or(SyntaxKind::Eof),
            _ => SyntaxKind::Eof,
        }
    }

    fn package_decl(&mut self) -> PResult<PackageDecl> {
        let start = self.start();
        let annotations = self.annotations()?;
        self.expect(SyntaxKind::PackageKw, "package")?;
        let name = self.import_name()?;
        Ok(PackageDecl {
            annotations,
            name,
            range: self.span_from(start),
        })
    }

    fn import_decl(&mut self) -> PResult<ImportDecl> {
        let start = self.start();
        let annotations = self.annotations()?;
        self.expect(SyntaxKind::ImportKw, "import")?;
        let is_static = self.eat(SyntaxKind::StaticKw).is_some();
        let name = self.import_name()?;
        let mut star = false;
        if self.at(SyntaxKind::Dot) && self.nth(1) == SyntaxKind::Star {
            self.bump();
            self.bump();
            star = true;
        }
        let alias = if self.eat(SyntaxKind::AsKw).is_some() {
            Some(self.ident()?)
        } else {
            None
        };
        Ok(ImportDecl {
            annotations,
            is_static,
            name,
            star,
            alias,
            range: self.span_from(start),
        })
    }

    /// Dotted name whose parts may also be `def` (package and import names).
    fn import_name(&mut self) -> PResult<QualifiedName> {
        let start = self.start();
        let mut parts = Vec::new();
        loop {
            let kind = self.current();
            if !(kind.is_identifier_like() || kind == SyntaxKind::DefKw) {
                return Err(self.unexpected());
            }
            let token = self.bump();
            parts.push(self.ident_from(token));
            let next = self.nth(1);
            if self.at(SyntaxKind::Dot) && (next.is_identifier_like() || next == SyntaxKind::DefKw) {
                self.bump();
                continue;
            }
            break;
        }
        Ok(QualifiedName {
            parts,
            range: self.span_from(start),
        })
    }

    fn qualified_name(&mut self) -> PResult<QualifiedName> {
        let start = self.start();
        let mut parts = vec![self.ident()?];
        while self.at(SyntaxKind::Dot) && self.nth(1).is_identifier_like() {
            self.bump();
            parts.push(self.ident()?);
        }
        Ok(QualifiedName {
            parts,
            range: self.span_from(start),
        })
    }

    fn script_statement(&mut self) -> PResult<ScriptStatement> {
        if self.at_type_decl_start() {
            return Ok(ScriptStatement::Type(self.type_decl()?));
        }
        Ok(ScriptStatement::Statement(self.statement()?))
    }

    fn at_type_decl_start(&self) -> bool {
        self.lookahead(|s, pos| {
            let Some((idx, _)) = scan::skip_modifiers(s, pos)? else {
                return Ok(false);
            };
            Ok(match s.kind(idx)? {
                SyntaxKind::ClassKw | SyntaxKind::InterfaceKw | SyntaxKind::EnumKw => true,
                SyntaxKind::TraitKw => s.kind(idx + 1)?.is_identifier_like(),
                SyntaxKind::At => s.kind(idx + 1)? == SyntaxKind::InterfaceKw,
                _ => false,
            })
        })
    }

    fn at_type_keyword(&self) -> bool {
        match self.current() {
            SyntaxKind::ClassKw | SyntaxKind::InterfaceKw | SyntaxKind::EnumKw => true,
            SyntaxKind::TraitKw => self.nth(1).is_identifier_like(),
            SyntaxKind::At => self.nth(1) == SyntaxKind::InterfaceKw,
            _ => false,
        }
    }

    // --- Modifiers & annotations ------------------------------------------------

    fn at_modifier_start(&self) -> bool {
        self.lookahead(|s, pos| Ok(scan::is_annotation_start(s, pos)? || scan::is_modifier_at(s, pos)?))
    }

    fn modifiers(&mut self) -> PResult<Modifiers> {
        let start = self.start();
        let mut items = Vec::new();
        loop {
            if self.at(SyntaxKind::At) && self.nth(1) != SyntaxKind::InterfaceKw {
                items.push(Modifier::Annotation(Box::new(self.annotation()?)));
            } else if self.lookahead(scan::is_modifier_at) {
                let token = self.bump();
                items.push(Modifier::Keyword {
                    kind: token.kind,
                    range: token.range,
                });
            } else {
                break;
            }
            self.eat_nls();
        }
        let range = match (items.first(), items.last()) {
            (Some(first), Some(last)) => first.range().cover(last.range()),
            _ => Span::empty(start),
        };
        Ok(Modifiers { items, range })
    }

    fn annotations(&mut self) -> PResult<Vec<Annotation>> {
        let mut annotations = Vec::new();
        while self.at(SyntaxKind::At) && self.nth(1) != SyntaxKind::InterfaceKw {
            annotations.push(self.annotation()?);
            self.eat_nls();
        }
        Ok(annotations)
    }

    fn annotation(&mut self) -> PResult<Annotation> {
        let start = self.start();
        self.expect(SyntaxKind::At, "@")?;
        let name = self.qualified_name()?;
        let mut values = None;
        if self.at(SyntaxKind::LParen) {
            self.bump();
            self.eat_nls();
            if !self.at(SyntaxKind::RParen) {
                let kind = self.current();
                values = Some(
                    if (kind.is_identifier_like() || kind.is_keyword())
                        && self.nth(1) == SyntaxKind::Assign
                    {
                        let mut pairs = Vec::new();
                        loop {
                            pairs.push(self.element_value_pair()?);
                            self.eat_nls();
                            if self.eat(SyntaxKind::Comma).is_none() {
                                break;
                            }
                            self.eat_nls();
                        }
                        ElementValues::Pairs(pairs)
                    } else {
                        ElementValues::Single(self.element_value()?)
                    },
                );
            }
            self.eat_nls();
            self.expect(SyntaxKind::RParen, ")")?;
        }
        Ok(Annotation {
            name,
            values,
            range: self.span_from(start),
        })
    }

    fn element_value_pair(&mut self) -> PResult<ElementValuePair> {
        let start = self.start();
        let name = self.ident_or_keyword()?;
        self.eat_nls();
        self.expect(SyntaxKind::Assign, "=")?;
        self.eat_nls();
        let value = self.element_value()?;
        Ok(ElementValuePair {
            name,
            value,
            range: self.span_from(start),
        })
    }

    fn element_value(&mut self) -> PResult<ElementValue> {
        match self.current() {
            SyntaxKind::At if self.nth(1) != SyntaxKind::InterfaceKw => {
                Ok(ElementValue::Annotation(Box::new(self.annotation()?)))
            }
            SyntaxKind::LBracket => {
                let start = self.start();
                self.bump();
                self.eat_nls();
                let mut values = Vec::new();
                while !self.at(SyntaxKind::RBracket) {
                    values.push(self.element_value()?);
                    self.eat_nls();
                    if self.eat(SyntaxKind::Comma).is_none() {
                        break;
                    }
                    self.eat_nls();
                }
                self.expect(SyntaxKind::RBracket, "]")?;
                Ok(ElementValue::Array {
                    values,
                    range: self.span_from(start),
                })
            }
            _ => Ok(ElementValue::Expr(self.expression()?)),
        }
    }

    // --- Types -----------------------------------------------------------------

    fn type_(&mut self) -> PResult<Type> {
        let start = self.start();
        let annotations = self.annotations()?;
        let kind = match self.current() {
            kind if kind.is_primitive_type() => {
                let token = self.bump();
                TypeKind::Primitive(self.ident_from(token))
            }
            SyntaxKind::VoidKw => TypeKind::Void(self.bump().range),
            kind if kind.is_identifier_like() => TypeKind::Class(self.class_or_interface_type()?),
            _ => return Err(self.unexpected()),
        };
        let mut dims = Vec::new();
        while self.lookahead(scan::empty_dim) {
            let dim_start = self.start();
            let annotations = self.annotations()?;
            self.expect(SyntaxKind::LBracket, "[")?;
            self.expect(SyntaxKind::RBracket, "]")?;
            dims.push(EmptyDim {
                annotations,
                range: self.span_from(dim_start),
            });
        }
        Ok(Type {
            annotations,
            kind,
            dims,
            range: self.span_from(start),
        })
    }

    fn class_or_interface_type(&mut self) -> PResult<ClassOrInterfaceType> {
        let start = self.start();
        let name = self.qualified_name()?;
        let type_args = if self.at(SyntaxKind::Lt) {
            Some(self.type_arguments()?)
        } else {
            None
        };
        Ok(ClassOrInterfaceType {
            name,
            type_args,
            range: self.span_from(start),
        })
    }

    fn type_list(&mut self) -> PResult<Vec<Type>> {
        let mut types = vec![self.type_()?];
        while self.eat(SyntaxKind::Comma).is_some() {
            self.eat_nls();
            types.push(self.type_()?);
        }
        Ok(types)
    }

    fn type_arguments(&mut self) -> PResult<TypeArguments> {
        let start = self.start();
        self.expect(SyntaxKind::Lt, "<")?;
        let mut args = Vec::new();
        loop {
            args.push(self.type_argument()?);
            if self.eat(SyntaxKind::Comma).is_none() {
                break;
            }
            self.eat_nls();
        }
        self.expect(SyntaxKind::Gt, ">")?;
        Ok(TypeArguments {
            args,
            range: self.span_from(start),
        })
    }

    fn type_argument(&mut self) -> PResult<TypeArgument> {
        let start = self.start();
        let annotations = self.annotations()?;
        if self.at(SyntaxKind::Question) {
            self.bump();
            let bound = match self.current() {
                SyntaxKind::ExtendsKw => {
                    self.bump();
                    Some((WildcardBound::Extends, self.type_()?))
                }
                SyntaxKind::SuperKw => {
                    self.bump();
                    Some((WildcardBound::Super, self.type_()?))
                }
                _ => None,
            };
            return Ok(TypeArgument::Wildcard {
                annotations,
                bound,
                range: self.span_from(start),
            });
        }
        let mut ty = self.type_()?;
        if !annotations.is_empty() {
            let mut all = annotations;
            all.append(&mut ty.annotations);
            ty.annotations = all;
            ty.range = self.span_from(start);
        }
        Ok(TypeArgument::Type(ty))
    }

    fn type_parameters(&mut self) -> PResult<TypeParameters> {
        let start = self.start();
        self.expect(SyntaxKind::Lt, "<")?;
        let mut params = Vec::new();
        loop {
            let param_start = self.start();
            let annotations = self.annotations()?;
            let name = self.ident()?;
            let mut bounds = Vec::new();
            if self.eat(SyntaxKind::ExtendsKw).is_some() {
                self.eat_nls();
                bounds.push(self.type_()?);
                while self.eat(SyntaxKind::Amp).is_some() {
                    self.eat_nls();
                    bounds.push(self.type_()?);
                }
            }
            params.push(TypeParameter {
                annotations,
                name,
                bounds,
                range: self.span_from(param_start),
            });
            if self.eat(SyntaxKind::Comma).is_none() {
                break;
            }
            self.eat_nls();
        }
        self.expect(SyntaxKind::Gt, ">")?;
        Ok(TypeParameters {
            params,
            range: self.span_from(start),
        })
    }

    // --- Type declarations ----------------------------------------------------

    fn type_decl(&mut self) -> PResult<TypeDecl> {
        let start = self.start();
        let modifiers = self.modifiers()?;
        self.type_decl_rest(modifiers, start)
    }

    fn type_decl_rest(&mut self, modifiers: Modifiers, start: usize) -> PResult<TypeDecl> {
        let kind = match self.current() {
            SyntaxKind::ClassKw => TypeDeclKind::Class,
            SyntaxKind::InterfaceKw => TypeDeclKind::Interface,
            SyntaxKind::EnumKw => TypeDeclKind::Enum,
            SyntaxKind::TraitKw => TypeDeclKind::Trait,
            SyntaxKind::At if self.nth(1) == SyntaxKind::InterfaceKw => {
                self.bump();
                TypeDeclKind::Annotation
            }
            _ => return Err(self.unexpected()),
        };
        self.bump();
        let name = self.ident()?;

        let type_params = if self.peek_past_nls() == SyntaxKind::Lt {
            self.eat_nls();
            Some(self.type_parameters()?)
        } else {
            None
        };
        let mut extends = Vec::new();
        if self.peek_past_nls() == SyntaxKind::ExtendsKw {
            self.eat_nls();
            self.bump();
            self.eat_nls();
            extends = self.type_list()?;
        }
        let mut implements = Vec::new();
        if self.peek_past_nls() == SyntaxKind::ImplementsKw {
            self.eat_nls();
            self.bump();
            self.eat_nls();
            implements = self.type_list()?;
        }
        self.eat_nls();
        let body = self.class_body(kind)?;

        Ok(TypeDecl {
            modifiers,
            kind,
            name,
            type_params,
            extends,
            implements,
            body,
            range: self.span_from(start),
        })
    }

    fn class_body(&mut self, kind: TypeDeclKind) -> PResult<ClassBody> {
        let start = self.start();
        self.expect(SyntaxKind::LBrace, "{")?;
        self.eat_nls();

        let mut enum_constants = Vec::new();
        if kind == TypeDeclKind::Enum {
            while self.at_enum_constant() {
                enum_constants.push(self.enum_constant()?);
                self.eat_nls();
                if self.eat(SyntaxKind::Comma).is_none() {
                    break;
                }
                self.eat_nls();
            }
        }

        let mut members = Vec::new();
        loop {
            self.eat_seps();
            if matches!(self.current(), SyntaxKind::RBrace | SyntaxKind::Eof) {
                break;
            }
            let start_pos = self.pos;
            match self.class_member() {
                Ok(member) => members.push(member),
                Err(err) => self.recover(err, start_pos)?,
            }
        }
        self.expect(SyntaxKind::RBrace, "}")?;

        Ok(ClassBody {
            enum_constants,
            members,
            range: self.span_from(start),
        })
    }

    fn at_enum_constant(&self) -> bool {
        self.lookahead(|s, pos| {
            let Some(idx) = scan::skip_annotations(s, pos)? else {
                return Ok(false);
            };
            Ok(s.kind(idx)?.is_identifier_like()
                && matches!(
                    s.kind(idx + 1)?,
                    SyntaxKind::Comma
                        | SyntaxKind::LParen
                        | SyntaxKind::LBrace
                        | SyntaxKind::Nl
                        | SyntaxKind::Semicolon
                        | SyntaxKind::RBrace
                ))
        })
    }

    fn enum_constant(&mut self) -> PResult<EnumConstant> {
        let start = self.start();
        let annotations = self.annotations()?;
        let name = self.ident()?;
        let arguments = if self.at(SyntaxKind::LParen) {
            Some(self.arguments()?)
        } else {
            None
        };
        let body = if self.at(SyntaxKind::LBrace) {
            Some(self.class_body(TypeDeclKind::Class)?)
        } else {
            None
        };
        Ok(EnumConstant {
            annotations,
            name,
            arguments,
            body,
            range: self.span_from(start),
        })
    }

    fn at_method_name_then_paren(&self) -> bool {
        let kind = self.current();
        (kind.is_identifier_like() || kind == SyntaxKind::StringLiteral)
            && self.nth(1) == SyntaxKind::LParen
    }

    fn declarator_follows(&self) -> bool {
        self.current().is_identifier_like()
            && matches!(
                self.nth(1),
                SyntaxKind::Assign
                    | SyntaxKind::Comma
                    | SyntaxKind::Nl
                    | SyntaxKind::Semicolon
                    | SyntaxKind::RBrace
                    | SyntaxKind::RParen
                    | SyntaxKind::Eof
            )
    }

    fn class_member(&mut self) -> PResult<ClassBodyDecl> {
        let start = self.start();
        if self.at(SyntaxKind::LBrace) {
            let block = self.block()?;
            return Ok(ClassBodyDecl::Initializer {
                static_kw: None,
                block,
                range: self.span_from(start),
            });
        }
        if self.at(SyntaxKind::StaticKw) && {
            let mut n = 1;
            while self.nth(n) == SyntaxKind::Nl {
                n += 1;
            }
            self.nth(n) == SyntaxKind::LBrace
        } {
            let static_kw = self.bump().range;
            self.eat_nls();
            let block = self.block()?;
            return Ok(ClassBodyDecl::Initializer {
                static_kw: Some(static_kw),
                block,
                range: self.span_from(start),
            });
        }

        let modifiers = self.modifiers()?;
        if self.at_type_keyword() {
            return Ok(ClassBodyDecl::Type(self.type_decl_rest(modifiers, start)?));
        }
        let type_params = if self.at(SyntaxKind::Lt) {
            let params = self.type_parameters()?;
            self.eat_nls();
            Some(params)
        } else {
            None
        };
        if self.at_method_name_then_paren() {
            return Ok(ClassBodyDecl::Method(
                self.method_rest(modifiers, type_params, None, start)?,
            ));
        }
        if type_params.is_none() && !modifiers.is_empty() && self.declarator_follows() {
            return Ok(ClassBodyDecl::Field(
                self.declarators_rest(modifiers, None, start)?,
            ));
        }
        let ty = self.type_()?;
        if self.at(SyntaxKind::Nl) {
            let mut n = 0;
            while self.nth(n) == SyntaxKind::Nl {
                n += 1;
            }
            let name = self.nth(n);
            if (name.is_identifier_like() || name == SyntaxKind::StringLiteral)
                && self.nth(n + 1) == SyntaxKind::LParen
            {
                self.eat_nls();
            }
        }
        if self.at_method_name_then_paren() {
            return Ok(ClassBodyDecl::Method(self.method_rest(
                modifiers,
                type_params,
                Some(ty),
                start,
            )?));
        }
        if type_params.is_some() {
            return Err(self.unexpected());
        }
        Ok(ClassBodyDecl::Field(
            self.declarators_rest(modifiers, Some(ty), start)?,
        ))
    }

    /// Script or block level method: modifiers, optional type parameters and
    /// return type, then the common method tail.
    fn method_statement(&mut self) -> PResult<MethodDecl> {
        let start = self.start();
        let modifiers = self.modifiers()?;
        let type_params = if self.at(SyntaxKind::Lt) {
            let params = self.type_parameters()?;
            self.eat_nls();
            Some(params)
        } else {
            None
        };
        if self.at_method_name_then_paren() {
            return self.method_rest(modifiers, type_params, None, start);
        }
        let return_type = self.type_()?;
        self.eat_nls();
        self.method_rest(modifiers, type_params, Some(return_type), start)
    }

    fn method_rest(
        &mut self,
        modifiers: Modifiers,
        type_params: Option<TypeParameters>,
        return_type: Option<Type>,
        start: usize,
    ) -> PResult<MethodDecl> {
        let name = if self.at(SyntaxKind::StringLiteral) {
            let token = self.bump();
            MethodName::String(self.lit_from(token))
        } else {
            MethodName::Identifier(self.ident()?)
        };
        let params = self.formal_parameters()?;

        let mut throws = Vec::new();
        let mut default_value = None;
        let mut body = None;
        if self.at(SyntaxKind::DefaultKw) {
            self.bump();
            self.eat_nls();
            default_value = Some(self.element_value()?);
        } else {
            if self.peek_past_nls() == SyntaxKind::ThrowsKw {
                self.eat_nls();
                self.bump();
                self.eat_nls();
                throws = self.type_list()?;
            }
            if self.peek_past_nls() == SyntaxKind::LBrace {
                self.eat_nls();
                body = Some(self.block()?);
            }
        }

        Ok(MethodDecl {
            modifiers,
            type_params,
            return_type,
            name,
            params,
            throws,
            default_value,
            body,
            range: self.span_from(start),
        })
    }

    fn formal_parameters(&mut self) -> PResult<FormalParameters> {
        let start = self.start();
        self.expect(SyntaxKind::LParen, "(")?;
        self.eat_nls();
        let params = if self.at(SyntaxKind::RParen) {
            Vec::new()
        } else {
            self.formal_parameter_list()?
        };
        self.eat_nls();
        self.expect(SyntaxKind::RParen, ")")?;
        Ok(FormalParameters {
            params,
            range: self.span_from(start),
        })
    }

    fn formal_parameter_list(&mut self) -> PResult<Vec<FormalParameter>> {
        let mut params = vec![self.formal_parameter()?];
        while self.eat(SyntaxKind::Comma).is_some() {
            self.eat_nls();
            params.push(self.formal_parameter()?);
        }
        Ok(params)
    }

    fn formal_parameter(&mut self) -> PResult<FormalParameter> {
        let start = self.start();
        let modifiers = self.modifiers()?;
        let untyped = self.current().is_identifier_like()
            && matches!(
                self.nth(1),
                SyntaxKind::Comma
                    | SyntaxKind::RParen
                    | SyntaxKind::Assign
                    | SyntaxKind::Arrow
                    | SyntaxKind::Nl
            );
        let ty = if untyped { None } else { Some(self.type_()?) };
        let ellipsis = self.eat(SyntaxKind::Ellipsis).map(|token| token.range);
        let name = self.ident()?;
        let default = if self.eat(SyntaxKind::Assign).is_some() {
            self.eat_nls();
            Some(self.expression()?)
        } else {
            None
        };
        Ok(FormalParameter {
            modifiers,
            ty,
            ellipsis,
            name,
            default,
            range: self.span_from(start),
        })
    }

    // --- Variable declarations -----------------------------------------------

    fn variable_declaration(&mut self, modifiers: Modifiers, start: usize) -> PResult<VariableDeclaration> {
        if !modifiers.is_empty() && self.at(SyntaxKind::LParen) {
            self.bump();
            self.eat_nls();
            let mut pairs = Vec::new();
            loop {
                let pair_start = self.start();
                let untyped = self.current().is_identifier_like()
                    && matches!(self.nth(1), SyntaxKind::Comma | SyntaxKind::RParen);
                let ty = if untyped { None } else { Some(self.type_()?) };
                let name = self.ident()?;
                pairs.push(TypeNamePair {
                    ty,
                    name,
                    range: self.span_from(pair_start),
                });
                if self.eat(SyntaxKind::Comma).is_none() {
                    break;
                }
                self.eat_nls();
            }
            self.expect(SyntaxKind::RParen, ")")?;
            self.eat_nls();
            let assign = self.expect(SyntaxKind::Assign, "=")?.range;
            self.eat_nls();
            let init = Box::new(self.statement_expr()?);
            return Ok(VariableDeclaration {
                modifiers,
                kind: VariableDeclarationKind::Tuple {
                    pairs,
                    assign,
                    init,
                },
                range: self.span_from(start),
            });
        }

        let ty = if !modifiers.is_empty() && self.declarator_follows() {
            None
        } else {
            Some(self.type_()?)
        };
        self.declarators_rest(modifiers, ty, start)
    }

    fn declarators_rest(
        &mut self,
        modifiers: Modifiers,
        ty: Option<Type>,
        start: usize,
    ) -> PResult<VariableDeclaration> {
        let mut declarators = vec![self.variable_declarator()?];
        while self.eat(SyntaxKind::Comma).is_some() {
            self.eat_nls();
            declarators.push(self.variable_declarator()?);
        }
        Ok(VariableDeclaration {
            modifiers,
            kind: VariableDeclarationKind::Declarators { ty, declarators },
            range: self.span_from(start),
        })
    }

    fn variable_declarator(&mut self) -> PResult<VariableDeclarator> {
        let start = self.start();
        let name = self.ident()?;
        let (assign, init) = if self.at(SyntaxKind::Assign) {
            let assign = self.bump().range;
            self.eat_nls();
            (Some(assign), Some(self.statement_expr()?))
        } else {
            (None, None)
        };
        Ok(VariableDeclarator {
            name,
            assign,
            init,
            range: self.span_from(start),
        })
    }

    // --- Statements ------------------------------------------------------------

    fn block(&mut self) -> PResult<Block> {
        let start = self.start();
        self.expect(SyntaxKind::LBrace, "{")?;
        let statements = self.block_statements(|kind| kind == SyntaxKind::RBrace)?;
        self.expect(SyntaxKind::RBrace, "}")?;
        Ok(Block {
            statements,
            range: self.span_from(start),
        })
    }

    /// Separator-delimited statements up to (not including) a `stop` token.
    fn block_statements(&mut self, stop: fn(SyntaxKind) -> bool) -> PResult<Vec<Statement>> {
        let mut statements = Vec::new();
        loop {
            self.eat_seps();
            let kind = self.current();
            if kind == SyntaxKind::Eof || stop(kind) {
                break;
            }
            let start_pos = self.pos;
            match self.statement() {
                Ok(statement) => {
                    statements.push(statement);
                    if let Err(err) = self.expect_separator(stop) {
                        self.recover(err, self.pos)?;
                    }
                }
                Err(err) => self.recover(err, start_pos)?,
            }
        }
        Ok(statements)
    }

    fn statement(&mut self) -> PResult<Statement> {
        let start = self.start();
        match self.current() {
            SyntaxKind::LBrace => Ok(Statement::Block(self.block()?)),
            SyntaxKind::IfKw => self.if_statement(),
            SyntaxKind::ForKw => self.for_statement(),
            SyntaxKind::WhileKw => {
                self.bump();
                let cond = self.par_expr()?;
                self.eat_nls();
                let body = Box::new(self.statement()?);
                Ok(Statement::While {
                    cond,
                    body,
                    range: self.span_from(start),
                })
            }
            SyntaxKind::DoKw => {
                self.bump();
                self.eat_nls();
                let body = Box::new(self.statement()?);
                self.eat_seps();
                self.expect(SyntaxKind::WhileKw, "while")?;
                let cond = self.par_expr()?;
                Ok(Statement::DoWhile {
                    body,
                    cond,
                    range: self.span_from(start),
                })
            }
            SyntaxKind::TryKw => Ok(Statement::Try(self.try_statement()?)),
            SyntaxKind::SwitchKw => Ok(Statement::Switch(self.switch_statement()?)),
            SyntaxKind::SynchronizedKw if self.nth(1) == SyntaxKind::LParen => {
                self.bump();
                let expr = self.par_expr()?;
                self.eat_nls();
                let block = self.block()?;
                Ok(Statement::Synchronized {
                    expr,
                    block,
                    range: self.span_from(start),
                })
            }
            SyntaxKind::ReturnKw => {
                self.bump();
                let expr = if self.at_statement_end() {
                    None
                } else {
                    Some(self.expression()?)
                };
                Ok(Statement::Return {
                    expr,
                    range: self.span_from(start),
                })
            }
            SyntaxKind::ThrowKw => {
                self.bump();
                let expr = self.expression()?;
                Ok(Statement::Throw {
                    expr,
                    range: self.span_from(start),
                })
            }
            SyntaxKind::BreakKw | SyntaxKind::ContinueKw => {
                let keyword = self.bump();
                let label = if self.current().is_identifier_like() {
                    Some(self.ident()?)
                } else {
                    None
                };
                let range = self.span_from(start);
                Ok(if keyword.kind == SyntaxKind::BreakKw {
                    Statement::Break { label, range }
                } else {
                    Statement::Continue { label, range }
                })
            }
            SyntaxKind::AssertKw => {
                self.bump();
                let cond = self.expression()?;
                let message = if matches!(self.current(), SyntaxKind::Colon | SyntaxKind::Comma) {
                    self.bump();
                    self.eat_nls();
                    Some(self.expression()?)
                } else {
                    None
                };
                Ok(Statement::Assert {
                    cond,
                    message,
                    range: self.span_from(start),
                })
            }
            SyntaxKind::Semicolon => Ok(Statement::Empty(self.bump().range)),
            SyntaxKind::ImportKw => Ok(Statement::Import(self.import_decl()?)),
            SyntaxKind::At if self.after_annotations() == SyntaxKind::ImportKw => {
                Ok(Statement::Import(self.import_decl()?))
            }
            kind if kind.is_identifier_like() && self.nth(1) == SyntaxKind::Colon => {
                let label = self.ident()?;
                self.bump();
                self.eat_nls();
                let statement = Box::new(self.statement()?);
                Ok(Statement::Labeled {
                    label,
                    statement,
                    range: self.span_from(start),
                })
            }
            _ => self.declaration_or_expression_statement(),
        }
    }

    fn declaration_or_expression_statement(&mut self) -> PResult<Statement> {
        let start = self.start();
        if self.predict(Decision::MethodDeclaration, scan::method_declaration) {
            return Ok(Statement::Method(self.method_statement()?));
        }
        if self.at_modifier_start() {
            let modifiers = self.modifiers()?;
            return Ok(Statement::LocalVariable(
                self.variable_declaration(modifiers, start)?,
            ));
        }
        if self.predict(Decision::LocalDeclaration, scan::local_declaration) {
            let modifiers = Modifiers {
                items: Vec::new(),
                range: Span::empty(start),
            };
            return Ok(Statement::LocalVariable(
                self.variable_declaration(modifiers, start)?,
            ));
        }
        Ok(Statement::Expression(self.command_expr()?))
    }

    fn if_statement(&mut self) -> PResult<Statement> {
        let start = self.start();
        self.bump();
        let cond = self.par_expr()?;
        self.eat_nls();
        let then = Box::new(self.statement()?);
        let else_ = if self.peek_past_seps() == SyntaxKind::ElseKw {
            self.eat_seps();
            self.bump();
            self.eat_nls();
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Statement::If {
            cond,
            then,
            else_,
            range: self.span_from(start),
        })
    }

    fn for_statement(&mut self) -> PResult<Statement> {
        let start = self.start();
        self.bump();
        self.expect(SyntaxKind::LParen, "(")?;
        self.eat_nls();
        let classic = self.lookahead(|s, pos| {
            let mut idx = pos;
            let mut depth = 0usize;
            loop {
                match s.kind(idx)? {
                    SyntaxKind::Semicolon if depth == 0 => return Ok(true),
                    SyntaxKind::LParen | SyntaxKind::LBracket | SyntaxKind::LBrace => depth += 1,
                    SyntaxKind::RParen | SyntaxKind::RBracket | SyntaxKind::RBrace => {
                        if depth == 0 {
                            return Ok(false);
                        }
                        depth -= 1;
                    }
                    SyntaxKind::Eof => return Ok(false),
                    _ => {}
                }
                idx += 1;
            }
        });
        let control = if classic {
            self.classic_for_control()?
        } else {
            self.enhanced_for_control()?
        };
        self.eat_nls();
        self.expect(SyntaxKind::RParen, ")")?;
        self.eat_nls();
        let body = Box::new(self.statement()?);
        Ok(Statement::For {
            control,
            body,
            range: self.span_from(start),
        })
    }

    fn enhanced_for_control(&mut self) -> PResult<ForControl> {
        let start = self.start();
        let modifiers = self.modifiers()?;
        let untyped = self.current().is_identifier_like()
            && matches!(self.nth(1), SyntaxKind::Colon | SyntaxKind::InKw);
        let ty = if untyped { None } else { Some(self.type_()?) };
        let name = self.ident()?;
        if !matches!(self.current(), SyntaxKind::Colon | SyntaxKind::InKw) {
            return Err(self.unexpected());
        }
        self.bump();
        self.eat_nls();
        let expr = self.expression()?;
        Ok(ForControl::Enhanced {
            modifiers,
            ty,
            name,
            expr,
            range: self.span_from(start),
        })
    }

    fn classic_for_control(&mut self) -> PResult<ForControl> {
        let start = self.start();
        let init = if self.at(SyntaxKind::Semicolon) {
            None
        } else if self.at_modifier_start() {
            let modifiers = self.modifiers()?;
            Some(ForInit::Declaration(self.variable_declaration(modifiers, start)?))
        } else if self.predict(Decision::LocalDeclaration, scan::local_declaration) {
            let modifiers = Modifiers {
                items: Vec::new(),
                range: Span::empty(start),
            };
            Some(ForInit::Declaration(self.variable_declaration(modifiers, start)?))
        } else {
            Some(ForInit::Expressions(self.expression_list()?))
        };
        self.expect(SyntaxKind::Semicolon, ";")?;
        self.eat_nls();
        let cond = if self.at(SyntaxKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(SyntaxKind::Semicolon, ";")?;
        self.eat_nls();
        let update = if self.at(SyntaxKind::RParen) {
            Vec::new()
        } else {
            self.expression_list()?
        };
        Ok(ForControl::Classic {
            init,
            cond,
            update,
            range: self.span_from(start),
        })
    }

    fn try_statement(&mut self) -> PResult<TryStmt> {
        let start = self.start();
        self.bump();
        let resources = if self.at(SyntaxKind::LParen) {
            Some(self.resources()?)
        } else {
            None
        };
        self.eat_nls();
        let block = self.block()?;

        let mut catches = Vec::new();
        while self.peek_past_nls() == SyntaxKind::CatchKw {
            self.eat_nls();
            catches.push(self.catch_clause()?);
        }
        let finally = if self.peek_past_nls() == SyntaxKind::FinallyKw {
            self.eat_nls();
            self.bump();
            self.eat_nls();
            Some(self.block()?)
        } else {
            None
        };

        Ok(TryStmt {
            resources,
            block,
            catches,
            finally,
            range: self.span_from(start),
        })
    }

    fn resources(&mut self) -> PResult<Resources> {
        let start = self.start();
        self.expect(SyntaxKind::LParen, "(")?;
        self.eat_nls();
        let mut list = Vec::new();
        loop {
            list.push(self.resource()?);
            self.eat_nls();
            if self.eat(SyntaxKind::Semicolon).is_none() {
                break;
            }
            self.eat_nls();
            if self.at(SyntaxKind::RParen) {
                break;
            }
        }
        self.expect(SyntaxKind::RParen, ")")?;
        Ok(Resources {
            list,
            range: self.span_from(start),
        })
    }

    fn resource(&mut self) -> PResult<Resource> {
        let start = self.start();
        if self.at_modifier_start() {
            let modifiers = self.modifiers()?;
            return Ok(Resource::Declaration(self.variable_declaration(modifiers, start)?));
        }
        if self.predict(Decision::LocalDeclaration, scan::local_declaration) {
            let modifiers = Modifiers {
                items: Vec::new(),
                range: Span::empty(start),
            };
            return Ok(Resource::Declaration(self.variable_declaration(modifiers, start)?));
        }
        Ok(Resource::Expr(self.expression()?))
    }

    fn catch_clause(&mut self) -> PResult<CatchClause> {
        let start = self.start();
        self.expect(SyntaxKind::CatchKw, "catch")?;
        self.expect(SyntaxKind::LParen, "(")?;
        self.eat_nls();
        let modifiers = self.modifiers()?;
        let mut types = Vec::new();
        if !(self.current().is_identifier_like() && self.nth(1) == SyntaxKind::RParen) {
            loop {
                types.push(self.qualified_name()?);
                if self.eat(SyntaxKind::Pipe).is_none() {
                    break;
                }
                self.eat_nls();
            }
        }
        let name = self.ident()?;
        self.eat_nls();
        self.expect(SyntaxKind::RParen, ")")?;
        self.eat_nls();
        let block = self.block()?;
        Ok(CatchClause {
            modifiers,
            types,
            name,
            block,
            range: self.span_from(start),
        })
    }

    fn switch_statement(&mut self) -> PResult<SwitchStmt> {
        let start = self.start();
        self.bump();
        let expr = self.par_expr()?;
        self.eat_nls();
        self.expect(SyntaxKind::LBrace, "{")?;
        let mut groups = Vec::new();
        loop {
            self.eat_seps();
            if matches!(self.current(), SyntaxKind::RBrace | SyntaxKind::Eof) {
                break;
            }
            groups.push(self.switch_group()?);
        }
        self.expect(SyntaxKind::RBrace, "}")?;
        Ok(SwitchStmt {
            expr,
            groups,
            range: self.span_from(start),
        })
    }

    fn switch_group(&mut self) -> PResult<SwitchGroup> {
        let start = self.start();
        let mut labels = Vec::new();
        loop {
            let label_start = self.start();
            match self.current() {
                SyntaxKind::CaseKw => {
                    self.bump();
                    let expr = self.expression()?;
                    self.eat_nls();
                    self.expect(SyntaxKind::Colon, ":")?;
                    labels.push(SwitchLabel::Case {
                        expr,
                        range: self.span_from(label_start),
                    });
                }
                SyntaxKind::DefaultKw => {
                    self.bump();
                    self.expect(SyntaxKind::Colon, ":")?;
                    labels.push(SwitchLabel::Default(self.span_from(label_start)));
                }
                _ => break,
            }
            self.eat_seps();
        }
        if labels.is_empty() {
            return Err(self.unexpected());
        }
        let statements = self.block_statements(|kind| {
            matches!(
                kind,
                SyntaxKind::RBrace | SyntaxKind::CaseKw | SyntaxKind::DefaultKw
            )
        })?;
        Ok(SwitchGroup {
            labels,
            statements,
            range: self.span_from(start),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_ll(text: &str) -> Result<ParseOutput, ParseFailure> {
        parse(
            text,
            &ParseOptions {
                sll_first: false,
                ..ParseOptions::default()
            },
            &PredictionCache::new(),
        )
    }

    #[test]
    fn fast_mode_is_used_for_simple_scripts() {
        let cache = PredictionCache::new();
        let out = parse("int x = 1\nprintln x", &ParseOptions::default(), &cache).unwrap();
        assert_eq!(out.mode, PredictionMode::Sll);
        assert!(!cache.is_empty());
    }

    #[test]
    fn overflowing_window_falls_back_to_full_context() {
        let cache = PredictionCache::new();
        let options = ParseOptions {
            prediction_window: 2,
            sll_first: true,
        };
        let out = parse("def y = (a.b.c.d) + 1", &options, &cache).unwrap();
        assert_eq!(out.mode, PredictionMode::Ll);
    }

    #[test]
    fn syntax_errors_are_collected_in_slow_mode() {
        let err = parse_ll("def a = )\ndef b = 2\nfoo(\n").unwrap_err();
        let ParseFailure::Syntax(errors) = err else {
            panic!("expected syntax errors");
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message, "Unexpected input: ')'");
        assert_eq!(errors[0].range, Span::new(8, 9));
    }

    #[test]
    fn lex_errors_are_not_retried() {
        let err = parse("'abc", &ParseOptions::default(), &PredictionCache::new()).unwrap_err();
        assert!(matches!(err, ParseFailure::Lex(_)));
    }

    #[test]
    fn both_modes_build_the_same_tree() {
        let text = "package p\nimport a.b.C as D\n@Ann(x = 1) class A<T> extends B implements C, D {\n  private int x = 1, y\n  def foo(String s, int... n) throws E { return s }\n  static { init() }\n}\nfor (int i = 0; i < 3; i++) { println i }\nfor (x in [1, 2]) { }\ntry (def r = open()) { r.read() } catch (IOException | E e) { } finally { }\nswitch (x) { case 1: case 2: a(); break\n default: b() }\ndef (p, q) = [1, 2]\nlist.each { a, b -> println \"$a ${b}\" }\n";
        let sll = parse(text, &ParseOptions::default(), &PredictionCache::new()).unwrap();
        let ll = parse_ll(text).unwrap();
        assert_eq!(sll.mode, PredictionMode::Sll);
        assert_eq!(sll.unit, ll.unit);
        assert!(sll.unit.package.is_some());
        assert_eq!(sll.unit.statements.len(), 8);
    }

    #[test]
    fn cached_predictions_are_reused() {
        let cache = PredictionCache::new();
        parse("String s = 'a'", &ParseOptions::default(), &cache).unwrap();
        let learned = cache.len();
        parse("String t = 'b'", &ParseOptions::default(), &cache).unwrap();
        assert_eq!(cache.len(), learned);
    }
}
