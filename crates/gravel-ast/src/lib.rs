//! AST construction for Groovy compilation units.
//!
//! [`build_ast`] parses a unit with `gravel-syntax` and lowers the resulting
//! parse tree into a [`Module`](ast::Module) whose every node carries a
//! source range. Any failure (lexical, syntactic, or structural) comes back
//! as a single [`CompilationFailed`] holding the positioned diagnostics.

pub mod ast;
mod builder;
mod modifiers;
mod reporter;
mod resources;

pub use builder::{build_ast, build_module};
pub use reporter::{CompilationFailed, ParsingFailed};
