//! The AST produced for one compilation unit.
//!
//! Nodes are plain owned data. Every node carries a [`SourceRange`]; nodes
//! synthesized without source text carry [`SourceRange::UNKNOWN`].

mod class;
mod expr;
mod flags;
mod stmt;
pub mod walk;

use gravel_core::SourceRange;
use serde::Serialize;
use smol_str::SmolStr;

pub use class::{
    AnnotationMember, AnnotationNode, ClassKind, ClassNode, FieldNode, GenericsType, MethodKind,
    MethodNode, Parameter, PropertyNode, TypeRef, OBJECT,
};
pub use expr::{
    Constant, ConstantValue, ConstructorTarget, ExprKind, Expression, NumericLiteral, Operator,
    Variable,
};
pub use flags::Flags;
pub use stmt::{CaseStatement, CatchStatement, Statement, StmtKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Module {
    pub source_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageNode>,
    pub imports: Vec<ImportNode>,
    /// Script statements, in source order.
    pub statements: Vec<Statement>,
    /// Script-level methods.
    pub methods: Vec<MethodNode>,
    /// Declared classes in registration order, nested and anonymous
    /// classes included.
    pub classes: Vec<ClassNode>,
    /// Present when the unit has script statements or methods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<ScriptClass>,
    pub range: SourceRange,
}

impl Module {
    pub fn class(&self, name: &str) -> Option<&ClassNode> {
        self.classes.iter().find(|class| class.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodNode> {
        self.methods.iter().find(|method| method.name == name)
    }

    pub fn package_name(&self) -> Option<&str> {
        self.package.as_ref().map(|package| package.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageNode {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<AnnotationNode>,
    pub name_range: SourceRange,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportNode {
    pub kind: ImportKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<AnnotationNode>,
    /// Range of the imported name, without `import`, `static` or alias.
    pub name_range: SourceRange,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImportKind {
    /// `import a.B` or `import a.B as C`; the alias defaults to `B`.
    Single { class_name: String, alias: SmolStr },
    /// `import a.*`
    Star { package_name: String },
    /// `import static a.B.m` or `import static a.B.m as n`.
    Static {
        class_name: String,
        member: SmolStr,
        alias: SmolStr,
    },
    /// `import static a.B.*`
    StaticStar { class_name: String },
}

/// The class generated for script statements and methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptClass {
    pub name: String,
    pub range: SourceRange,
}
