//! Conversion of every failure raised while building a unit into positioned
//! diagnostics.

use gravel_core::{
    ErrorCollector, LineCol, PositionError, PositionIndex, SourceRange, Span, SyntaxError,
};
use gravel_syntax::{LexError, ParseError};
use thiserror::Error;

/// A fatal structural error raised while walking the parse tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParsingFailed {
    pub message: String,
    pub range: SourceRange,
}

impl ParsingFailed {
    pub fn new(message: impl Into<String>, range: SourceRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

impl From<PositionError> for ParsingFailed {
    fn from(err: PositionError) -> Self {
        ParsingFailed::new(err.to_string(), SourceRange::UNKNOWN)
    }
}

/// The single failure outcome of building one unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{source_name}: compilation failed at the parsing phase with {} error(s)", .errors.len())]
pub struct CompilationFailed {
    pub source_name: String,
    pub errors: ErrorCollector,
}

impl CompilationFailed {
    pub fn errors(&self) -> &[SyntaxError] {
        self.errors.errors()
    }

    /// Message of the first recorded error.
    pub fn first_message(&self) -> Option<&str> {
        self.errors().first().map(|error| error.message.as_str())
    }
}

pub(crate) struct Reporter<'a> {
    source_name: &'a str,
    index: &'a PositionIndex,
    errors: ErrorCollector,
}

impl<'a> Reporter<'a> {
    pub(crate) fn new(source_name: &'a str, index: &'a PositionIndex) -> Self {
        Self {
            source_name,
            index,
            errors: ErrorCollector::new(),
        }
    }

    fn positioned(&self, message: String, span: Span) -> SyntaxError {
        let start = self.index.line_col(span.start).unwrap_or(LineCol::new(1, 1));
        let end = self.index.line_col(span.end).unwrap_or(start);
        SyntaxError::new(message, start, end)
    }

    /// Lexical errors abort the build without a slow-mode retry.
    pub(crate) fn lex_error(mut self, error: LexError) -> CompilationFailed {
        let error = self.positioned(error.message, error.range);
        tracing::debug!(target: "gravel.ast", line = error.line, column = error.column, "lexical error");
        self.errors.add_fatal_error(error);
        self.finish()
    }

    /// Errors collected by the exhaustive parse; the last one is fatal.
    pub(crate) fn syntax_errors(mut self, errors: Vec<ParseError>) -> CompilationFailed {
        let count = errors.len();
        for (idx, error) in errors.into_iter().enumerate() {
            let error = self.positioned(error.message, error.range);
            if idx + 1 == count {
                self.errors.add_fatal_error(error);
            } else {
                self.errors.add_error(error);
            }
        }
        tracing::debug!(target: "gravel.ast", count, "syntax errors");
        self.finish()
    }

    pub(crate) fn parsing_failed(mut self, failure: ParsingFailed) -> CompilationFailed {
        let error = if failure.range.is_unknown() {
            SyntaxError::at(failure.message, LineCol::new(1, 1))
        } else {
            SyntaxError::spanning(failure.message, &failure.range)
        };
        tracing::warn!(
            target: "gravel.ast",
            source = self.source_name,
            line = error.line,
            column = error.column,
            message = %error.message,
            "fatal error while building the AST"
        );
        self.errors.add_fatal_error(error);
        self.finish()
    }

    fn finish(self) -> CompilationFailed {
        CompilationFailed {
            source_name: self.source_name.to_string(),
            errors: self.errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_syntax_error_is_fatal() {
        let index = PositionIndex::new("a\nbb\n");
        let failed = Reporter::new("t.groovy", &index).syntax_errors(vec![
            ParseError::new("first", Span::new(0, 1)),
            ParseError::new("second", Span::new(2, 4)),
        ]);
        assert!(failed.errors.is_fatal());
        assert_eq!(failed.errors().len(), 2);
        let second = &failed.errors()[1];
        assert_eq!((second.line, second.column, second.last_column), (2, 1, 3));
    }

    #[test]
    fn unknown_ranges_point_at_the_start_of_the_unit() {
        let index = PositionIndex::new("x");
        let failed = Reporter::new("t.groovy", &index)
            .parsing_failed(ParsingFailed::new("boom", SourceRange::UNKNOWN));
        assert_eq!(failed.first_message(), Some("boom"));
        assert_eq!(failed.errors()[0].line, 1);
    }
}
