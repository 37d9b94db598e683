//! Groovy lexer and parser.
//!
//! [`parse`] turns source text into an owned, grammar-shaped [`tree`]. The
//! parser first runs a fast pass that memoises speculative decisions in a
//! shared [`PredictionCache`]; when that pass fails it reparses once with
//! unbounded lookahead and statement-level error recovery.

mod lexer;
mod literals;
mod parser;
mod prediction;
mod syntax_kind;
pub mod tree;

pub use lexer::{lex, LexError, Token};
pub use literals::{
    gstring_segment, parse_decimal, parse_integer, remove_cr, string_value, LiteralError,
    NumberValue, SegmentPosition, StringStyle,
};
pub use parser::{
    parse, ParseError, ParseFailure, ParseOptions, ParseOutput, PredictionMode,
    DEFAULT_PREDICTION_WINDOW,
};
pub use prediction::{Decision, PredictionCache};
pub use syntax_kind::SyntaxKind;

#[cfg(test)]
mod tests;
