//! Groovy lexer.
//!
//! Produces a flat token stream with significant newlines. String literals
//! that interpolate values are split into `GStringBegin`/`GStringPart`/
//! `GStringEnd` tokens with the interpolated code lexed in between.

use gravel_core::Span;
use serde::Serialize;
use thiserror::Error;

use crate::syntax_kind::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Token {
    pub kind: SyntaxKind,
    pub range: Span,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.range.text(source)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{message}")]
pub struct LexError {
    pub message: String,
    pub range: Span,
}

pub(crate) const ILLEGAL_DOLLAR: &str = "illegal string body character after dollar sign; \
solution: either escape a literal dollar sign \"\\$5\" or bracket the value expression \"${5}\"";

/// Tokenize `text`. The last token is always `Eof`.
pub fn lex(text: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(text).run()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    Single,
    Double,
    TripleSingle,
    TripleDouble,
    Slashy,
    DollarSlashy,
}

impl Quote {
    fn open_len(self) -> usize {
        match self {
            Quote::Single | Quote::Double | Quote::Slashy => 1,
            Quote::DollarSlashy => 2,
            Quote::TripleSingle | Quote::TripleDouble => 3,
        }
    }

    fn close(self) -> &'static str {
        match self {
            Quote::Single => "'",
            Quote::Double => "\"",
            Quote::TripleSingle => "'''",
            Quote::TripleDouble => "\"\"\"",
            Quote::Slashy => "/",
            Quote::DollarSlashy => "/$",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    StringBody(Quote),
    Path { quote: Quote, started: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bracket {
    Paren,
    Square,
    Brace,
    Interpolation,
}

enum SegmentEnd {
    Closed,
    Interpolation,
}

struct Lexer<'a> {
    text: &'a str,
    pos: usize,
    tokens: Vec<Token>,
    modes: Vec<Mode>,
    brackets: Vec<Bracket>,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Lexer {
            text,
            pos: 0,
            tokens: Vec::new(),
            modes: vec![Mode::Code],
            brackets: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        if self.text.starts_with("#!") {
            while let Some(c) = self.peek_char() {
                if c == '\n' || c == '\r' {
                    break;
                }
                self.bump_char();
            }
        }

        loop {
            let mode = self.modes.last().copied().unwrap_or(Mode::Code);
            match mode {
                Mode::Code => {
                    if !self.lex_code()? {
                        break;
                    }
                }
                Mode::StringBody(quote) => self.lex_string_continuation(quote)?,
                Mode::Path { quote, started } => self.lex_path(quote, started)?,
            }
        }

        if self.modes.len() > 1 {
            return Err(self.error("Unterminated string literal", Span::empty(self.pos)));
        }

        let end = self.text.len();
        self.tokens.push(Token {
            kind: SyntaxKind::Eof,
            range: Span::empty(end),
        });
        Ok(self.tokens)
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth_char(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn push(&mut self, kind: SyntaxKind, start: usize) {
        self.tokens.push(Token {
            kind,
            range: Span::new(start, self.pos),
        });
    }

    fn last_kind(&self) -> Option<SyntaxKind> {
        self.tokens.last().map(|t| t.kind)
    }

    fn error(&self, message: impl Into<String>, range: Span) -> LexError {
        LexError {
            message: message.into(),
            range,
        }
    }

    fn newlines_significant(&self) -> bool {
        !matches!(
            self.brackets.last(),
            Some(Bracket::Paren) | Some(Bracket::Square)
        )
    }

    fn emit_newline(&mut self, start: usize) {
        if !self.newlines_significant() {
            return;
        }
        if matches!(self.last_kind(), None | Some(SyntaxKind::Nl)) {
            return;
        }
        self.push(SyntaxKind::Nl, start);
    }

    /// Skip whitespace and comments, emitting `Nl` tokens where they count.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            let start = self.pos;
            match self.peek_char() {
                Some('\n') => {
                    self.bump_char();
                    self.emit_newline(start);
                }
                Some('\r') => {
                    self.bump_char();
                    if self.peek_char() == Some('\n') {
                        self.bump_char();
                    }
                    self.emit_newline(start);
                }
                Some('\\') if matches!(self.peek_nth_char(1), Some('\n') | Some('\r')) => {
                    self.bump_char();
                    if self.bump_char() == Some('\r') && self.peek_char() == Some('\n') {
                        self.bump_char();
                    }
                }
                Some(c) if c.is_whitespace() => {
                    self.bump_char();
                }
                Some('/') if self.rest().starts_with("//") => {
                    while let Some(c) = self.peek_char() {
                        if c == '\n' || c == '\r' {
                            break;
                        }
                        self.bump_char();
                    }
                }
                Some('/') if self.rest().starts_with("/*") => {
                    match self.rest()[2..].find("*/") {
                        Some(idx) => self.pos += 2 + idx + 2,
                        None => {
                            return Err(self.error(
                                "Unterminated comment",
                                Span::new(start, self.text.len()),
                            ))
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Lex one token in code mode. Returns `false` at end of input.
    fn lex_code(&mut self) -> Result<bool, LexError> {
        self.skip_trivia()?;
        let start = self.pos;
        let Some(c) = self.peek_char() else {
            return Ok(false);
        };

        let regex_allowed = self
            .last_kind()
            .map_or(true, SyntaxKind::allows_regex_after);

        if c == '$' && self.rest().starts_with("$/") && regex_allowed {
            return self.lex_string(Quote::DollarSlashy).map(|()| true);
        }
        if is_identifier_start(c) {
            self.lex_identifier();
            return Ok(true);
        }
        if c.is_ascii_digit() {
            self.lex_number()?;
            return Ok(true);
        }

        match c {
            '\'' => {
                let quote = if self.rest().starts_with("'''") {
                    Quote::TripleSingle
                } else {
                    Quote::Single
                };
                self.lex_string(quote)?;
            }
            '"' => {
                let quote = if self.rest().starts_with("\"\"\"") {
                    Quote::TripleDouble
                } else {
                    Quote::Double
                };
                self.lex_string(quote)?;
            }
            '/' if regex_allowed => self.lex_string(Quote::Slashy)?,
            _ => {
                let kind = self.lex_punctuation(start)?;
                self.track_brackets(kind);
            }
        }
        Ok(true)
    }

    fn track_brackets(&mut self, kind: SyntaxKind) {
        match kind {
            SyntaxKind::LParen => self.brackets.push(Bracket::Paren),
            SyntaxKind::LBracket | SyntaxKind::SafeIndex => self.brackets.push(Bracket::Square),
            SyntaxKind::LBrace => self.brackets.push(Bracket::Brace),
            SyntaxKind::RParen => {
                if self.brackets.last() == Some(&Bracket::Paren) {
                    self.brackets.pop();
                }
            }
            SyntaxKind::RBracket => {
                if self.brackets.last() == Some(&Bracket::Square) {
                    self.brackets.pop();
                }
            }
            SyntaxKind::RBrace => match self.brackets.last() {
                Some(Bracket::Brace) => {
                    self.brackets.pop();
                }
                Some(Bracket::Interpolation) => {
                    self.brackets.pop();
                    self.modes.pop();
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn lex_identifier(&mut self) {
        let start = self.pos;
        self.bump_char();
        while matches!(self.peek_char(), Some(c) if is_identifier_continue(c)) {
            self.bump_char();
        }
        let text = &self.text[start..self.pos];
        let kind = SyntaxKind::from_keyword(text).unwrap_or_else(|| identifier_kind(text));
        self.push(kind, start);
    }

    fn eat_digits(&mut self, radix: u32) -> usize {
        let mut count = 0;
        while let Some(c) = self.peek_char() {
            if c == '_' || c.is_digit(radix) {
                if c != '_' {
                    count += 1;
                }
                self.bump_char();
            } else {
                break;
            }
        }
        count
    }

    fn lex_number(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        let radix = match (self.peek_char(), self.peek_nth_char(1)) {
            (Some('0'), Some('x' | 'X')) => 16,
            (Some('0'), Some('b' | 'B')) => 2,
            _ => 10,
        };

        let mut kind = SyntaxKind::IntegerLiteral;
        if radix != 10 {
            self.pos += 2;
            if self.eat_digits(radix) == 0 {
                return Err(self.error(
                    format!("Invalid number literal: {}", &self.text[start..self.pos]),
                    Span::new(start, self.pos),
                ));
            }
            if matches!(self.peek_char(), Some('l' | 'L' | 'i' | 'I' | 'g' | 'G')) {
                self.bump_char();
            }
        } else {
            self.eat_digits(10);
            if self.peek_char() == Some('.')
                && matches!(self.peek_nth_char(1), Some(c) if c.is_ascii_digit())
            {
                self.bump_char();
                self.eat_digits(10);
                kind = SyntaxKind::FloatingLiteral;
            }
            if matches!(self.peek_char(), Some('e' | 'E')) {
                let save = self.pos;
                self.bump_char();
                if matches!(self.peek_char(), Some('+' | '-')) {
                    self.bump_char();
                }
                if self.eat_digits(10) == 0 {
                    self.pos = save;
                } else {
                    kind = SyntaxKind::FloatingLiteral;
                }
            }
            match self.peek_char() {
                Some('f' | 'F' | 'd' | 'D') => {
                    self.bump_char();
                    kind = SyntaxKind::FloatingLiteral;
                }
                Some('g' | 'G') => {
                    self.bump_char();
                }
                Some('l' | 'L' | 'i' | 'I') if kind == SyntaxKind::IntegerLiteral => {
                    self.bump_char();
                }
                _ => {}
            }
        }

        if matches!(self.peek_char(), Some(c) if is_identifier_continue(c)) {
            while matches!(self.peek_char(), Some(c) if is_identifier_continue(c)) {
                self.bump_char();
            }
            return Err(self.error(
                format!("Invalid number literal: {}", &self.text[start..self.pos]),
                Span::new(start, self.pos),
            ));
        }

        self.push(kind, start);
        Ok(())
    }

    fn lex_punctuation(&mut self, start: usize) -> Result<SyntaxKind, LexError> {
        const TABLE: &[(&str, SyntaxKind)] = &[
            (">>>=", SyntaxKind::UShrEq),
            ("...", SyntaxKind::Ellipsis),
            ("..<", SyntaxKind::RangeExclusive),
            ("<=>", SyntaxKind::Spaceship),
            ("===", SyntaxKind::Identical),
            ("!==", SyntaxKind::NotIdentical),
            ("**=", SyntaxKind::PowerEq),
            ("??.", SyntaxKind::SafeChainDot),
            ("<<=", SyntaxKind::ShlEq),
            (">>=", SyntaxKind::ShrEq),
            ("==~", SyntaxKind::RegexMatch),
            ("..", SyntaxKind::Range),
            ("*.", SyntaxKind::SpreadDot),
            ("?.", SyntaxKind::SafeDot),
            ("?:", SyntaxKind::Elvis),
            ("?=", SyntaxKind::ElvisEq),
            ("?[", SyntaxKind::SafeIndex),
            (".&", SyntaxKind::MethodPointer),
            ("::", SyntaxKind::MethodReference),
            ("=~", SyntaxKind::RegexFind),
            ("**", SyntaxKind::Power),
            ("->", SyntaxKind::Arrow),
            ("==", SyntaxKind::EqEq),
            ("!=", SyntaxKind::NotEq),
            ("<=", SyntaxKind::LtEq),
            (">=", SyntaxKind::GtEq),
            ("&&", SyntaxKind::AmpAmp),
            ("||", SyntaxKind::PipePipe),
            ("++", SyntaxKind::PlusPlus),
            ("--", SyntaxKind::MinusMinus),
            ("+=", SyntaxKind::PlusEq),
            ("-=", SyntaxKind::MinusEq),
            ("*=", SyntaxKind::StarEq),
            ("/=", SyntaxKind::SlashEq),
            ("&=", SyntaxKind::AmpEq),
            ("|=", SyntaxKind::PipeEq),
            ("^=", SyntaxKind::CaretEq),
            ("%=", SyntaxKind::PercentEq),
            ("(", SyntaxKind::LParen),
            (")", SyntaxKind::RParen),
            ("{", SyntaxKind::LBrace),
            ("}", SyntaxKind::RBrace),
            ("[", SyntaxKind::LBracket),
            ("]", SyntaxKind::RBracket),
            (";", SyntaxKind::Semicolon),
            (",", SyntaxKind::Comma),
            (".", SyntaxKind::Dot),
            ("@", SyntaxKind::At),
            ("=", SyntaxKind::Assign),
            (">", SyntaxKind::Gt),
            ("<", SyntaxKind::Lt),
            ("!", SyntaxKind::Bang),
            ("~", SyntaxKind::Tilde),
            ("?", SyntaxKind::Question),
            (":", SyntaxKind::Colon),
            ("+", SyntaxKind::Plus),
            ("-", SyntaxKind::Minus),
            ("*", SyntaxKind::Star),
            ("/", SyntaxKind::Slash),
            ("&", SyntaxKind::Amp),
            ("|", SyntaxKind::Pipe),
            ("^", SyntaxKind::Caret),
            ("%", SyntaxKind::Percent),
        ];

        let rest = self.rest();
        for (word, kind) in [("!instanceof", SyntaxKind::NotInstanceof), ("!in", SyntaxKind::NotIn)] {
            if rest.starts_with(word)
                && !rest[word.len()..]
                    .chars()
                    .next()
                    .is_some_and(is_identifier_continue)
            {
                self.pos += word.len();
                self.push(kind, start);
                return Ok(kind);
            }
        }

        for &(text, kind) in TABLE {
            if rest.starts_with(text) {
                self.pos += text.len();
                self.push(kind, start);
                return Ok(kind);
            }
        }

        let c = self.peek_char().unwrap_or('\0');
        Err(self.error(
            format!("Unexpected character: '{c}'"),
            Span::new(start, start + c.len_utf8()),
        ))
    }

    fn lex_string(&mut self, quote: Quote) -> Result<(), LexError> {
        let start = self.pos;
        self.pos += quote.open_len();
        match self.scan_segment(quote, start)? {
            SegmentEnd::Closed => self.push(SyntaxKind::StringLiteral, start),
            SegmentEnd::Interpolation => {
                self.push(SyntaxKind::GStringBegin, start);
                self.modes.push(Mode::StringBody(quote));
                self.begin_value(quote);
            }
        }
        Ok(())
    }

    fn lex_string_continuation(&mut self, quote: Quote) -> Result<(), LexError> {
        let start = self.pos;
        match self.scan_segment(quote, start)? {
            SegmentEnd::Closed => {
                self.push(SyntaxKind::GStringEnd, start);
                self.modes.pop();
            }
            SegmentEnd::Interpolation => {
                self.push(SyntaxKind::GStringPart, start);
                self.begin_value(quote);
            }
        }
        Ok(())
    }

    /// Enter the value following a `$`: either `{ code }` or `name.path`.
    fn begin_value(&mut self, quote: Quote) {
        if self.peek_char() == Some('{') {
            let start = self.pos;
            self.bump_char();
            self.push(SyntaxKind::LBrace, start);
            self.brackets.push(Bracket::Interpolation);
            self.modes.push(Mode::Code);
        } else {
            self.modes.push(Mode::Path {
                quote,
                started: false,
            });
        }
    }

    fn lex_path(&mut self, quote: Quote, started: bool) -> Result<(), LexError> {
        if !started {
            let start = self.pos;
            self.bump_char();
            while matches!(self.peek_char(), Some(c) if is_gstring_identifier_continue(c)) {
                self.bump_char();
            }
            let text = &self.text[start..self.pos];
            self.push(identifier_kind(text), start);
            if let Some(mode) = self.modes.last_mut() {
                *mode = Mode::Path {
                    quote,
                    started: true,
                };
            }
            return Ok(());
        }

        if self.peek_char() == Some('.')
            && matches!(self.peek_nth_char(1), Some(c) if is_gstring_identifier_start(c))
        {
            let start = self.pos;
            self.bump_char();
            while matches!(self.peek_char(), Some(c) if is_gstring_identifier_continue(c)) {
                self.bump_char();
            }
            self.push(SyntaxKind::GStringPathPart, start);
        } else {
            self.modes.pop();
        }
        Ok(())
    }

    fn at_value_start(&self) -> bool {
        matches!(self.peek_nth_char(1), Some('{'))
            || matches!(self.peek_nth_char(1), Some(c) if is_gstring_identifier_start(c))
    }

    /// Scan string characters up to the closing delimiter or an interpolation.
    ///
    /// On `Interpolation` the cursor sits just after the `$`.
    fn scan_segment(&mut self, quote: Quote, token_start: usize) -> Result<SegmentEnd, LexError> {
        let close = quote.close();
        loop {
            let rest = self.rest();
            if rest.starts_with(close) {
                self.pos += close.len();
                return Ok(SegmentEnd::Closed);
            }
            let Some(c) = self.peek_char() else {
                return Err(self.error(
                    "Unterminated string literal",
                    Span::new(token_start, self.text.len()),
                ));
            };

            match (quote, c) {
                (Quote::Single | Quote::Double, '\n' | '\r') => {
                    return Err(self.error(
                        "Unterminated string literal",
                        Span::new(token_start, self.pos),
                    ));
                }
                (Quote::Single | Quote::Double | Quote::TripleSingle | Quote::TripleDouble, '\\') => {
                    self.bump_char();
                    self.bump_char();
                }
                (Quote::Slashy, '\\') => {
                    self.bump_char();
                    if matches!(self.peek_char(), Some('/' | '$')) {
                        self.bump_char();
                    }
                }
                (Quote::DollarSlashy, '$') if matches!(self.peek_nth_char(1), Some('$' | '/')) => {
                    self.pos += 2;
                }
                (Quote::Double | Quote::TripleDouble, '$') => {
                    if !self.at_value_start() {
                        return Err(self.error(ILLEGAL_DOLLAR, Span::new(self.pos, self.pos + 1)));
                    }
                    self.bump_char();
                    return Ok(SegmentEnd::Interpolation);
                }
                (Quote::Slashy | Quote::DollarSlashy, '$') => {
                    self.bump_char();
                    if self.at_interpolation_after_dollar() {
                        return Ok(SegmentEnd::Interpolation);
                    }
                }
                _ => {
                    self.bump_char();
                }
            }
        }
    }

    fn at_interpolation_after_dollar(&self) -> bool {
        matches!(self.peek_char(), Some(c) if c == '{' || is_gstring_identifier_start(c))
    }
}

fn identifier_kind(text: &str) -> SyntaxKind {
    if text.chars().next().is_some_and(char::is_uppercase) {
        SyntaxKind::CapitalizedIdentifier
    } else {
        SyntaxKind::Identifier
    }
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c == '$' || unicode_ident::is_xid_start(c)
}

fn is_identifier_continue(c: char) -> bool {
    c == '$' || unicode_ident::is_xid_continue(c)
}

fn is_gstring_identifier_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

fn is_gstring_identifier_continue(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(text: &str) -> Vec<SyntaxKind> {
        lex(text).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn texts(text: &str) -> Vec<(SyntaxKind, String)> {
        lex(text)
            .unwrap()
            .into_iter()
            .map(|t| (t.kind, t.text(text).to_string()))
            .collect()
    }

    #[test]
    fn newlines_are_dropped_inside_parens_only() {
        use SyntaxKind::*;
        assert_eq!(
            kinds("foo(a,\n b)\n{\nx\n}"),
            vec![
                Identifier, LParen, Identifier, Comma, Identifier, RParen, Nl, LBrace, Nl,
                Identifier, Nl, RBrace, Eof
            ]
        );
    }

    #[test]
    fn slashy_strings_follow_regex_rules() {
        use SyntaxKind::*;
        assert_eq!(kinds("a / b"), vec![Identifier, Slash, Identifier, Eof]);
        assert_eq!(kinds("x = /a+b/"), vec![Identifier, Assign, StringLiteral, Eof]);
        assert_eq!(kinds("(1) / 2"), vec![LParen, IntegerLiteral, RParen, Slash, IntegerLiteral, Eof]);
        assert_eq!(kinds("def r = $/a/b/$"), vec![DefKw, Identifier, Assign, StringLiteral, Eof]);
    }

    #[test]
    fn gstring_tokens_keep_quotes_and_dollars() {
        use SyntaxKind::*;
        assert_eq!(
            texts(r#""a${x}b$y.z c""#),
            vec![
                (GStringBegin, "\"a$".to_string()),
                (LBrace, "{".to_string()),
                (Identifier, "x".to_string()),
                (RBrace, "}".to_string()),
                (GStringPart, "b$".to_string()),
                (Identifier, "y".to_string()),
                (GStringPathPart, ".z".to_string()),
                (GStringEnd, " c\"".to_string()),
                (Eof, String::new()),
            ]
        );
    }

    #[test]
    fn nested_braces_inside_interpolation() {
        use SyntaxKind::*;
        assert_eq!(
            kinds(r#""${ [1].collect { it } }""#),
            vec![
                GStringBegin, LBrace, LBracket, IntegerLiteral, RBracket, Dot, Identifier,
                LBrace, Identifier, RBrace, RBrace, GStringEnd, Eof
            ]
        );
    }

    #[test]
    fn lone_dollar_is_a_lex_error() {
        let err = lex("\"cost $ 5\"").unwrap_err();
        assert!(err.message.starts_with("illegal string body character after dollar sign"));
        assert_eq!(err.range, Span::new(6, 7));
    }

    #[test]
    fn single_quoted_strings_never_interpolate() {
        use SyntaxKind::*;
        assert_eq!(kinds("'$x'"), vec![StringLiteral, Eof]);
        assert_eq!(kinds("'''a\nb'''"), vec![StringLiteral, Eof]);
    }

    #[test]
    fn numbers_and_suffixes() {
        use SyntaxKind::*;
        assert_eq!(
            kinds("1 0x1F 1_000L 1.5 2e3 3f 4G 1.5G"),
            vec![
                IntegerLiteral, IntegerLiteral, IntegerLiteral, FloatingLiteral,
                FloatingLiteral, FloatingLiteral, IntegerLiteral, FloatingLiteral, Eof
            ]
        );
        assert_eq!(kinds("1..2"), vec![IntegerLiteral, Range, IntegerLiteral, Eof]);
        assert_eq!(kinds("10.times"), vec![IntegerLiteral, Dot, Identifier, Eof]);
        assert!(lex("12abc").is_err());
    }

    #[test]
    fn groovy_operators() {
        use SyntaxKind::*;
        assert_eq!(
            kinds("a?.b*.c??.d.&e::f ?: g !in h !instanceof I"),
            vec![
                Identifier, SafeDot, Identifier, SpreadDot, Identifier, SafeChainDot,
                Identifier, MethodPointer, Identifier, MethodReference, Identifier, Elvis,
                Identifier, NotIn, Identifier, NotInstanceof, CapitalizedIdentifier, Eof
            ]
        );
        assert_eq!(kinds("a >>>= 1"), vec![Identifier, UShrEq, IntegerLiteral, Eof]);
        assert_eq!(kinds("a >> 1"), vec![Identifier, Gt, Gt, IntegerLiteral, Eof]);
    }

    #[test]
    fn shebang_and_comments_are_skipped() {
        use SyntaxKind::*;
        assert_eq!(
            kinds("#!/usr/bin/env groovy\n/* a */ x // b\ny"),
            vec![Identifier, Nl, Identifier, Eof]
        );
        assert!(lex("/* open").is_err());
    }

    #[test]
    fn unterminated_strings_fail() {
        assert!(lex("'abc").is_err());
        assert!(lex("\"abc\ndef\"").is_err());
        assert!(lex("\"${a\"").is_err());
    }
}
