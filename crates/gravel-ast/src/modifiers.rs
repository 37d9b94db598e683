//! Modifier resolution: turns the written modifier list of a declaration
//! into flags and annotations, and rejects illegal combinations.

use gravel_core::SourceRange;
use gravel_syntax::SyntaxKind;

use crate::ast::{AnnotationNode, Flags};
use crate::reporter::ParsingFailed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ModifierKind {
    Public,
    Protected,
    Private,
    Static,
    Abstract,
    Final,
    Strictfp,
    Default,
    Native,
    Synchronized,
    Transient,
    Volatile,
    Def,
    Var,
    Annotation,
}

impl ModifierKind {
    pub(crate) fn from_syntax(kind: SyntaxKind) -> Option<ModifierKind> {
        Some(match kind {
            SyntaxKind::PublicKw => ModifierKind::Public,
            SyntaxKind::ProtectedKw => ModifierKind::Protected,
            SyntaxKind::PrivateKw => ModifierKind::Private,
            SyntaxKind::StaticKw => ModifierKind::Static,
            SyntaxKind::AbstractKw => ModifierKind::Abstract,
            SyntaxKind::FinalKw => ModifierKind::Final,
            SyntaxKind::StrictfpKw => ModifierKind::Strictfp,
            SyntaxKind::DefaultKw => ModifierKind::Default,
            SyntaxKind::NativeKw => ModifierKind::Native,
            SyntaxKind::SynchronizedKw => ModifierKind::Synchronized,
            SyntaxKind::TransientKw => ModifierKind::Transient,
            SyntaxKind::VolatileKw => ModifierKind::Volatile,
            SyntaxKind::DefKw => ModifierKind::Def,
            SyntaxKind::VarKw => ModifierKind::Var,
            _ => return None,
        })
    }

    pub(crate) fn text(self) -> &'static str {
        match self {
            ModifierKind::Public => "public",
            ModifierKind::Protected => "protected",
            ModifierKind::Private => "private",
            ModifierKind::Static => "static",
            ModifierKind::Abstract => "abstract",
            ModifierKind::Final => "final",
            ModifierKind::Strictfp => "strictfp",
            ModifierKind::Default => "default",
            ModifierKind::Native => "native",
            ModifierKind::Synchronized => "synchronized",
            ModifierKind::Transient => "transient",
            ModifierKind::Volatile => "volatile",
            ModifierKind::Def => "def",
            ModifierKind::Var => "var",
            ModifierKind::Annotation => "@",
        }
    }

    /// `def`, `var`, `default` and annotations contribute no flag.
    pub(crate) fn flags(self) -> Flags {
        match self {
            ModifierKind::Public => Flags::PUBLIC,
            ModifierKind::Protected => Flags::PROTECTED,
            ModifierKind::Private => Flags::PRIVATE,
            ModifierKind::Static => Flags::STATIC,
            ModifierKind::Abstract => Flags::ABSTRACT,
            ModifierKind::Final => Flags::FINAL,
            ModifierKind::Strictfp => Flags::STRICT,
            ModifierKind::Native => Flags::NATIVE,
            ModifierKind::Synchronized => Flags::SYNCHRONIZED,
            ModifierKind::Transient => Flags::TRANSIENT,
            ModifierKind::Volatile => Flags::VOLATILE,
            ModifierKind::Default
            | ModifierKind::Def
            | ModifierKind::Var
            | ModifierKind::Annotation => Flags::NONE,
        }
    }

    fn is_visibility(self) -> bool {
        matches!(
            self,
            ModifierKind::Public | ModifierKind::Protected | ModifierKind::Private
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ModifierNode {
    pub(crate) kind: ModifierKind,
    pub(crate) annotation: Option<AnnotationNode>,
    pub(crate) range: SourceRange,
}

impl ModifierNode {
    pub(crate) fn keyword(kind: ModifierKind, range: SourceRange) -> Self {
        Self {
            kind,
            annotation: None,
            range,
        }
    }

    pub(crate) fn annotation(annotation: AnnotationNode) -> Self {
        let range = annotation.range;
        Self {
            kind: ModifierKind::Annotation,
            annotation: Some(annotation),
            range,
        }
    }
}

/// A validated modifier list. Queried through predicates; the raw list is
/// not exposed.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ModifierSet {
    nodes: Vec<ModifierNode>,
}

impl ModifierSet {
    /// Reject repeated keywords and a second visibility modifier.
    pub(crate) fn resolve(nodes: Vec<ModifierNode>) -> Result<Self, ParsingFailed> {
        let mut seen: Vec<ModifierKind> = Vec::with_capacity(nodes.len());
        let mut visibility = 0;
        for node in &nodes {
            if node.kind != ModifierKind::Annotation {
                if seen.contains(&node.kind) {
                    return Err(ParsingFailed::new(
                        format!("Cannot repeat modifier[{}]", node.kind.text()),
                        node.range,
                    ));
                }
                seen.push(node.kind);
            }
            if node.kind.is_visibility() {
                visibility += 1;
                if visibility > 1 {
                    return Err(ParsingFailed::new(
                        format!(
                            "Cannot specify modifier[{}] when access scope has already been defined",
                            node.kind.text()
                        ),
                        node.range,
                    ));
                }
            }
        }
        Ok(Self { nodes })
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn contains(&self, kind: ModifierKind) -> bool {
        self.nodes.iter().any(|node| node.kind == kind)
    }

    pub(crate) fn get(&self, kind: ModifierKind) -> Option<&ModifierNode> {
        self.nodes.iter().find(|node| node.kind == kind)
    }

    pub(crate) fn has_visibility(&self) -> bool {
        self.nodes.iter().any(|node| node.kind.is_visibility())
    }

    /// Range of the `var` keyword. Declarations written with it are marked
    /// so later phases can apply local type inference.
    pub(crate) fn var_keyword(&self) -> Option<SourceRange> {
        self.get(ModifierKind::Var).map(|node| node.range)
    }

    /// Every keyword modifier's flag.
    pub(crate) fn flags(&self) -> Flags {
        self.nodes
            .iter()
            .fold(Flags::NONE, |flags, node| flags | node.kind.flags())
    }

    /// Flags of a class declaration. Without a visibility modifier the class
    /// is public, and the second value reports that the visibility was
    /// implied.
    pub(crate) fn class_flags(&self) -> (Flags, bool) {
        let flags = self.flags();
        if self.has_visibility() {
            (flags, false)
        } else {
            (flags | Flags::PUBLIC, true)
        }
    }

    pub(crate) fn annotations(&self) -> Vec<AnnotationNode> {
        self.nodes
            .iter()
            .filter_map(|node| node.annotation.clone())
            .collect()
    }

    pub(crate) fn validate_constructor(&self, range: SourceRange) -> Result<(), ParsingFailed> {
        self.reject(
            &[
                ModifierKind::Static,
                ModifierKind::Final,
                ModifierKind::Abstract,
                ModifierKind::Native,
            ],
            "Constructor",
            range,
        )
    }

    pub(crate) fn validate_method(&self, range: SourceRange) -> Result<(), ParsingFailed> {
        self.reject(&[ModifierKind::Var], "Method", range)
    }

    fn reject(&self, invalid: &[ModifierKind], what: &str, range: SourceRange) -> Result<(), ParsingFailed> {
        match self.nodes.iter().find(|node| invalid.contains(&node.kind)) {
            Some(node) => Err(ParsingFailed::new(
                format!("{what} has an incorrect modifier '{}'.", node.kind.text()),
                range,
            )),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(kinds: &[ModifierKind]) -> Vec<ModifierNode> {
        kinds
            .iter()
            .map(|kind| ModifierNode::keyword(*kind, SourceRange::UNKNOWN))
            .collect()
    }

    #[test]
    fn repeated_keyword_is_rejected() {
        let err = ModifierSet::resolve(keywords(&[ModifierKind::Static, ModifierKind::Static]))
            .unwrap_err();
        assert_eq!(err.message, "Cannot repeat modifier[static]");
    }

    #[test]
    fn second_visibility_is_rejected() {
        let err = ModifierSet::resolve(keywords(&[ModifierKind::Public, ModifierKind::Private]))
            .unwrap_err();
        assert_eq!(
            err.message,
            "Cannot specify modifier[private] when access scope has already been defined"
        );
    }

    #[test]
    fn class_without_visibility_is_implicitly_public() {
        let set = ModifierSet::resolve(keywords(&[ModifierKind::Final])).unwrap();
        assert_eq!(set.class_flags(), (Flags::PUBLIC | Flags::FINAL, true));
        let set = ModifierSet::resolve(keywords(&[ModifierKind::Protected])).unwrap();
        assert_eq!(set.class_flags(), (Flags::PROTECTED, false));
    }

    #[test]
    fn var_keyword_is_reported_with_its_range() {
        let range = SourceRange {
            start: 0,
            end: 3,
            line: 1,
            column: 1,
            last_line: 1,
            last_column: 4,
        };
        let set = ModifierSet::resolve(vec![ModifierNode::keyword(ModifierKind::Var, range)]).unwrap();
        assert_eq!(set.var_keyword(), Some(range));
        let set = ModifierSet::resolve(keywords(&[ModifierKind::Def])).unwrap();
        assert_eq!(set.var_keyword(), None);
    }

    #[test]
    fn constructor_and_method_restrictions() {
        let set = ModifierSet::resolve(keywords(&[ModifierKind::Static])).unwrap();
        assert_eq!(
            set.validate_constructor(SourceRange::UNKNOWN).unwrap_err().message,
            "Constructor has an incorrect modifier 'static'."
        );
        let set = ModifierSet::resolve(keywords(&[ModifierKind::Var])).unwrap();
        assert_eq!(
            set.validate_method(SourceRange::UNKNOWN).unwrap_err().message,
            "Method has an incorrect modifier 'var'."
        );
    }
}
