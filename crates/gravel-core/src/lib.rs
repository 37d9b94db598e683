//! Core shared types for gravel.
//!
//! Positions, the line/column index, and the syntax diagnostics every other
//! crate reports through.

mod diagnostics;
mod text;

pub use diagnostics::{ErrorCollector, SyntaxError};
pub use text::{LineCol, PositionError, PositionIndex, SourceRange, Span};
