//! Lowering from the grammar-shaped parse tree to the [`Module`] AST.
//!
//! One method per grammar production, grouped by area. Every produced node
//! gets its range before it is handed to the caller; synthetic nodes with no
//! source token either cover their first and last real children or carry
//! [`SourceRange::UNKNOWN`].

mod declarations;
mod expressions;
mod paths;
mod statements;
mod types;
mod unit;

use std::collections::HashMap;

use gravel_core::{PositionIndex, SourceRange, Span};
use gravel_syntax::tree::CompilationUnit;
use gravel_syntax::{ParseFailure, ParseOptions, PredictionCache};
use smol_str::SmolStr;

use crate::ast::{ClassNode, Module};
use crate::reporter::{CompilationFailed, ParsingFailed, Reporter};

pub(crate) type BResult<T> = Result<T, ParsingFailed>;

/// Parse `text` and build its AST.
///
/// Lexical errors abort immediately; syntax errors come from the exhaustive
/// pass when the fast pass failed. Structural errors found while lowering
/// abort the build with a single diagnostic.
pub fn build_ast(
    source_name: &str,
    text: &str,
    options: &ParseOptions,
    cache: &PredictionCache,
) -> Result<Module, CompilationFailed> {
    let index = PositionIndex::new(text);
    let output = match gravel_syntax::parse(text, options, cache) {
        Ok(output) => output,
        Err(ParseFailure::Lex(error)) => {
            return Err(Reporter::new(source_name, &index).lex_error(error))
        }
        Err(ParseFailure::Syntax(errors)) => {
            return Err(Reporter::new(source_name, &index).syntax_errors(errors))
        }
    };
    tracing::debug!(target: "gravel.ast", source = source_name, mode = ?output.mode, "parsed unit");
    lower(source_name, text, &index, &output.unit)
}

/// Build the AST of an already parsed unit.
pub fn build_module(
    source_name: &str,
    text: &str,
    unit: &CompilationUnit,
) -> Result<Module, CompilationFailed> {
    let index = PositionIndex::new(text);
    lower(source_name, text, &index, unit)
}

fn lower(
    source_name: &str,
    text: &str,
    index: &PositionIndex,
    unit: &CompilationUnit,
) -> Result<Module, CompilationFailed> {
    AstBuilder::new(source_name, text, index)
        .compilation_unit(unit)
        .map_err(|failure| Reporter::new(source_name, index).parsing_failed(failure))
}

/// A class whose body is being lowered.
struct ClassFrame {
    node: ClassNode,
    /// Registration slot reserved before the body, for classes that must
    /// precede their nested classes.
    slot: Option<usize>,
    simple_name: SmolStr,
    /// An interface declaring `default` methods, lowered like a trait.
    with_default_methods: bool,
}

pub(crate) struct AstBuilder<'a> {
    source_name: &'a str,
    text: &'a str,
    index: &'a PositionIndex,
    /// `a.b.` for `package a.b`, empty otherwise.
    package_prefix: String,
    script_name: String,
    loop_depth: u32,
    switch_depth: u32,
    closure_depth: u32,
    array_init_depth: u32,
    /// Classes in registration order; `None` marks a reserved slot.
    classes: Vec<Option<ClassNode>>,
    class_stack: Vec<ClassFrame>,
    /// Slots of the anonymous classes created in each method being lowered.
    method_anonymous: Vec<Vec<usize>>,
    anonymous_counts: HashMap<String, u32>,
    /// Suffix for the variables of the next desugared resource.
    resource_count: u32,
}

impl<'a> AstBuilder<'a> {
    pub(crate) fn new(source_name: &'a str, text: &'a str, index: &'a PositionIndex) -> Self {
        Self {
            source_name,
            text,
            index,
            package_prefix: String::new(),
            script_name: script_name(source_name),
            loop_depth: 0,
            switch_depth: 0,
            closure_depth: 0,
            array_init_depth: 0,
            classes: Vec::new(),
            class_stack: Vec::new(),
            method_anonymous: Vec::new(),
            anonymous_counts: HashMap::new(),
            resource_count: 0,
        }
    }

    fn range(&self, span: Span) -> BResult<SourceRange> {
        Ok(self.index.range(span)?)
    }

    fn fail<T>(&self, message: impl Into<String>, span: Span) -> BResult<T> {
        Err(ParsingFailed::new(message, self.range(span)?))
    }

    fn source(&self, span: Span) -> &'a str {
        span.text(self.text)
    }

    /// Binary name of a class declared in the current context.
    fn qualify(&self, simple: &str) -> String {
        match self.class_stack.last() {
            Some(outer) => format!("{}${simple}", outer.node.name),
            None => format!("{}{simple}", self.package_prefix),
        }
    }

    fn next_anonymous_name(&mut self) -> (String, String) {
        let outer = match self.class_stack.last() {
            Some(frame) => frame.node.name.clone(),
            None => format!("{}{}", self.package_prefix, self.script_name),
        };
        let count = self.anonymous_counts.entry(outer.clone()).or_insert(0);
        *count += 1;
        (format!("{outer}${count}"), outer)
    }

    fn reserve_class_slot(&mut self) -> usize {
        self.classes.push(None);
        self.classes.len() - 1
    }

    fn register_class(&mut self, node: ClassNode, slot: Option<usize>) -> usize {
        match slot {
            Some(slot) => {
                self.classes[slot] = Some(node);
                slot
            }
            None => {
                self.classes.push(Some(node));
                self.classes.len() - 1
            }
        }
    }

    fn current_class(&self) -> Option<&ClassNode> {
        self.class_stack.last().map(|frame| &frame.node)
    }

    fn current_class_mut(&mut self) -> Option<&mut ClassNode> {
        self.class_stack.last_mut().map(|frame| &mut frame.node)
    }
}

/// Script class name: the file name without directories or extension.
fn script_name(source_name: &str) -> String {
    let file = source_name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(source_name);
    let stem = match file.rfind('.') {
        Some(dot) if dot > 0 => &file[..dot],
        _ => file,
    };
    if stem.is_empty() {
        "script".to_string()
    } else {
        stem.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_names_drop_directories_and_extension() {
        assert_eq!(script_name("a/b/Foo.groovy"), "Foo");
        assert_eq!(script_name("C:\\x\\bar.gvy"), "bar");
        assert_eq!(script_name("plain"), "plain");
        assert_eq!(script_name(""), "script");
    }
}
