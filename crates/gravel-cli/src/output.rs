use std::fmt::Write as _;

use gravel_ast::ast::walk::{walk, NodeRef};
use gravel_ast::ast::Module;
use gravel_core::{SourceRange, SyntaxError};
use gravel_syntax::{SyntaxKind, Token};
use serde::Serialize;

/// JSON envelope printed by `gravel parse --json`.
#[derive(Serialize)]
pub(crate) struct ParseReport<'a> {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<TokenEntry<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<&'a Module>,
    #[serde(skip_serializing_if = "no_errors")]
    pub errors: &'a [SyntaxError],
}

fn no_errors(errors: &&[SyntaxError]) -> bool {
    errors.is_empty()
}

#[derive(Serialize)]
pub(crate) struct TokenEntry<'a> {
    pub kind: SyntaxKind,
    pub start: usize,
    pub end: usize,
    pub text: &'a str,
}

pub(crate) fn token_entries<'a>(tokens: &[Token], text: &'a str) -> Vec<TokenEntry<'a>> {
    tokens
        .iter()
        .map(|token| TokenEntry {
            kind: token.kind,
            start: token.range.start,
            end: token.range.end,
            text: token.text(text),
        })
        .collect()
}

pub(crate) fn render_tokens(entries: &[TokenEntry<'_>]) -> String {
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(
            out,
            "{:?} {}..{} {:?}",
            entry.kind, entry.start, entry.end, entry.text
        );
    }
    out
}

/// One line per node, indented by depth, with the node's start position.
pub(crate) fn render_outline(module: &Module) -> String {
    let mut out = String::new();
    walk(NodeRef::Module(module), &mut |node, depth| {
        let _ = writeln!(
            out,
            "{:indent$}{}{}",
            "",
            node.label(),
            position(node.range()),
            indent = depth * 2
        );
    });
    out
}

fn position(range: SourceRange) -> String {
    if range.is_unknown() {
        String::new()
    } else {
        format!(" @{}:{}", range.line, range.column)
    }
}

pub(crate) fn render_errors(errors: &[SyntaxError]) -> String {
    let mut out = String::new();
    for error in errors {
        let _ = writeln!(out, "error:{}:{}: {}", error.line, error.column, error.message);
    }
    out
}

#[cfg(test)]
mod tests {
    use gravel_core::LineCol;

    use super::*;

    #[test]
    fn errors_render_one_per_line() {
        let errors = vec![
            SyntaxError::new("first", LineCol::new(1, 2), LineCol::new(1, 3)),
            SyntaxError::new("second", LineCol::new(4, 1), LineCol::new(4, 5)),
        ];
        assert_eq!(render_errors(&errors), "error:1:2: first\nerror:4:1: second\n");
    }

    #[test]
    fn outline_indents_children() {
        let module = gravel_ast::build_ast(
            "a.groovy",
            "x = 1",
            &Default::default(),
            &gravel_syntax::PredictionCache::new(),
        )
        .expect("script builds");
        let outline = render_outline(&module);
        let lines: Vec<_> = outline.lines().collect();
        assert!(lines[0].starts_with("Module a.groovy"), "{outline}");
        assert!(lines[1].starts_with("  ExpressionStatement @1:1"), "{outline}");
        assert!(lines[2].starts_with("    Binary = @1:1"), "{outline}");
    }

    #[test]
    fn tokens_render_kind_span_and_text() {
        let text = "def x";
        let tokens = gravel_syntax::lex(text).expect("lexes");
        let rendered = render_tokens(&token_entries(&tokens, text));
        let first = rendered.lines().next().expect("a token");
        assert!(first.ends_with("0..3 \"def\""), "{rendered}");
    }
}
