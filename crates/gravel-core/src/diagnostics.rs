use serde::Serialize;
use thiserror::Error;

use crate::text::{LineCol, SourceRange};

/// A positioned syntax error. Columns are 1-based; `last_column` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{message} @ line {line}, column {column}.")]
pub struct SyntaxError {
    pub message: String,
    pub line: u32,
    pub column: u32,
    pub last_line: u32,
    pub last_column: u32,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, start: LineCol, end: LineCol) -> Self {
        Self {
            message: message.into(),
            line: start.line,
            column: start.col,
            last_line: end.line,
            last_column: end.col,
        }
    }

    /// An error pointing at a single position.
    pub fn at(message: impl Into<String>, pos: LineCol) -> Self {
        Self::new(message, pos, pos)
    }

    pub fn spanning(message: impl Into<String>, range: &SourceRange) -> Self {
        Self::new(message, range.start_pos(), range.end_pos())
    }
}

/// Per-unit diagnostic sink.
///
/// Holds every error recorded while building one compilation unit, in the
/// order they were reported. Once a fatal error has been added the unit can
/// no longer succeed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorCollector {
    errors: Vec<SyntaxError>,
    fatal: bool,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error and keep going.
    pub fn add_error(&mut self, error: SyntaxError) {
        self.errors.push(error);
    }

    /// Record an error that ends the unit.
    pub fn add_fatal_error(&mut self, error: SyntaxError) {
        self.fatal = true;
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal
    }

    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn clear(&mut self) {
        self.errors.clear();
        self.fatal = false;
    }

    pub fn into_errors(self) -> Vec<SyntaxError> {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_errors_mark_the_collector() {
        let mut collector = ErrorCollector::new();
        collector.add_error(SyntaxError::at("unexpected token", LineCol::new(1, 3)));
        assert!(collector.has_errors());
        assert!(!collector.is_fatal());

        collector.add_fatal_error(SyntaxError::new(
            "break statement is only allowed inside loops or switches",
            LineCol::new(2, 1),
            LineCol::new(2, 6),
        ));
        assert!(collector.is_fatal());
        assert_eq!(collector.len(), 2);
        assert_eq!(
            collector.errors()[1].to_string(),
            "break statement is only allowed inside loops or switches @ line 2, column 1."
        );
    }
}
