//! Text model primitives: byte spans, line/column pairs, and conversions.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Half-open byte range `[start, end)` into a source text.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[inline]
    pub const fn empty(at: usize) -> Self {
        Self { start: at, end: at }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Smallest span covering both `self` and `other`.
    #[inline]
    pub fn cover(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    #[inline]
    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Slice `text` with this span. Returns `""` for spans outside `text`.
    pub fn text<'a>(&self, text: &'a str) -> &'a str {
        text.get(self.start..self.end).unwrap_or("")
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({}..{})", self.start, self.end)
    }
}

/// A 1-based line and 1-based column, both counted in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl LineCol {
    #[inline]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("line {line}, column {col} is outside the source text")]
    LineColOutOfRange { line: u32, col: u32 },
    #[error("offset {offset} is outside the source text (length {len})")]
    OffsetOutOfRange { offset: usize, len: usize },
}

/// Pre-computed line start offsets for a source text.
///
/// Line `n` (1-based) covers `[line_starts[n - 1], line_starts[n])`, the last
/// line ending at the text length. An empty text has exactly one empty line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PositionIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl PositionIndex {
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts = Vec::with_capacity(bytes.len() / 32 + 1);
        line_starts.push(0);

        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    line_starts.push(i + 1);
                    i += 1;
                }
                b'\r' => {
                    let next = if bytes.get(i + 1) == Some(&b'\n') { i + 2 } else { i + 1 };
                    line_starts.push(next);
                    i = next;
                }
                _ => i += 1,
            }
        }

        Self {
            line_starts,
            len: text.len(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    /// Offset of the first byte of `line` (1-based).
    pub fn line_start(&self, line: u32) -> Option<usize> {
        let idx = (line as usize).checked_sub(1)?;
        self.line_starts.get(idx).copied()
    }

    /// Absolute offset of a 1-based `(line, col)` pair.
    pub fn offset(&self, pos: LineCol) -> Result<usize, PositionError> {
        let out_of_range = PositionError::LineColOutOfRange {
            line: pos.line,
            col: pos.col,
        };
        let start = self.line_start(pos.line).ok_or(out_of_range.clone())?;
        if pos.col == 0 {
            return Err(out_of_range);
        }

        let offset = start + (pos.col as usize - 1);
        let in_range = match self.line_starts.get(pos.line as usize) {
            Some(&next) => offset < next,
            None => offset <= self.len,
        };
        if !in_range {
            return Err(out_of_range);
        }
        Ok(offset)
    }

    /// 1-based `(line, col)` of an absolute offset. `len()` itself is valid
    /// and maps past the last character of the last line.
    pub fn line_col(&self, offset: usize) -> Result<LineCol, PositionError> {
        if offset > self.len {
            return Err(PositionError::OffsetOutOfRange {
                offset,
                len: self.len,
            });
        }

        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(insert) => insert - 1,
        };
        let col = offset - self.line_starts[line] + 1;
        Ok(LineCol {
            line: line as u32 + 1,
            col: col as u32,
        })
    }

    /// Stamp a byte span with both of its line/column pairs.
    pub fn range(&self, span: Span) -> Result<SourceRange, PositionError> {
        let start = self.line_col(span.start)?;
        let end = self.line_col(span.end)?;
        Ok(SourceRange {
            start: span.start,
            end: span.end,
            line: start.line,
            column: start.col,
            last_line: end.line,
            last_column: end.col,
        })
    }
}

/// Position data carried by every AST node.
///
/// `end` and `last_column` are exclusive. A range whose `line` is `0` has not
/// been stamped (synthetic nodes without source text).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct SourceRange {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
    pub last_line: u32,
    pub last_column: u32,
}

impl SourceRange {
    pub const UNKNOWN: SourceRange = SourceRange {
        start: 0,
        end: 0,
        line: 0,
        column: 0,
        last_line: 0,
        last_column: 0,
    };

    #[inline]
    pub fn is_unknown(&self) -> bool {
        self.line == 0
    }

    #[inline]
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    #[inline]
    pub fn start_pos(&self) -> LineCol {
        LineCol::new(self.line, self.column)
    }

    #[inline]
    pub fn end_pos(&self) -> LineCol {
        LineCol::new(self.last_line, self.last_column)
    }

    /// Range from the start of `self` to the end of `other`.
    pub fn to(self, other: SourceRange) -> SourceRange {
        if self.is_unknown() {
            return other;
        }
        if other.is_unknown() {
            return self;
        }
        SourceRange {
            start: self.start,
            end: other.end,
            line: self.line,
            column: self.column,
            last_line: other.last_line,
            last_column: other.last_column,
        }
    }

    /// Whether `other` lies within `self`. Unknown ranges are contained by
    /// everything.
    pub fn contains(&self, other: &SourceRange) -> bool {
        other.is_unknown() || (self.start <= other.start && other.end <= self.end)
    }
}

impl fmt::Debug for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            return f.write_str("SourceRange(?)");
        }
        write!(
            f,
            "SourceRange({}..{} @ {}:{}-{}:{})",
            self.start, self.end, self.line, self.column, self.last_line, self.last_column
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_a_single_empty_line() {
        let index = PositionIndex::new("");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line_col(0), Ok(LineCol::new(1, 1)));
        assert_eq!(index.offset(LineCol::new(1, 1)), Ok(0));
        assert!(index.offset(LineCol::new(2, 1)).is_err());
    }

    #[test]
    fn text_without_trailing_terminator() {
        let index = PositionIndex::new("ab\ncd");
        assert_eq!(index.line_count(), 2);
        assert_eq!(index.line_col(4), Ok(LineCol::new(2, 2)));
        assert_eq!(index.line_col(5), Ok(LineCol::new(2, 3)));
        assert_eq!(index.offset(LineCol::new(2, 3)), Ok(5));
        assert!(index.offset(LineCol::new(2, 4)).is_err());
    }

    #[test]
    fn crlf_counts_as_one_terminator() {
        let index = PositionIndex::new("a\r\nb\rc");
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line_col(3), Ok(LineCol::new(2, 1)));
        assert_eq!(index.line_col(5), Ok(LineCol::new(3, 1)));
    }

    #[test]
    fn out_of_range_positions_fail() {
        let index = PositionIndex::new("abc\n");
        assert!(matches!(
            index.line_col(5),
            Err(PositionError::OffsetOutOfRange { offset: 5, len: 4 })
        ));
        assert!(index.offset(LineCol::new(0, 1)).is_err());
        assert!(index.offset(LineCol::new(1, 0)).is_err());
        assert!(index.offset(LineCol::new(1, 5)).is_err());
        assert!(index.offset(LineCol::new(3, 1)).is_err());
    }

    #[test]
    fn range_stamps_both_ends() {
        let index = PositionIndex::new("def x = 1\nprintln x\n");
        let range = index.range(Span::new(10, 19)).unwrap();
        assert_eq!((range.line, range.column), (2, 1));
        assert_eq!((range.last_line, range.last_column), (2, 10));
    }
}
