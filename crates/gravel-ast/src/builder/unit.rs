use gravel_core::{SourceRange, Span};
use smol_str::SmolStr;

use gravel_syntax::tree::{CompilationUnit, ImportDecl, PackageDecl, ScriptStatement, Statement};

use super::{AstBuilder, BResult};
use crate::ast::walk::{walk, NodeRef};
use crate::ast::{
    ClassKind, ClassNode, ConstantValue, ExprKind, Expression, Flags, ImportKind, ImportNode,
    Module, PackageNode, ScriptClass, StmtKind, TypeRef,
};
use crate::reporter::ParsingFailed;

const PACKAGE_INFO: &str = "package-info";

impl<'a> AstBuilder<'a> {
    pub(crate) fn compilation_unit(mut self, unit: &CompilationUnit) -> BResult<Module> {
        let package = match &unit.package {
            Some(decl) => Some(self.package_decl(decl)?),
            None => None,
        };

        let mut imports = Vec::new();
        let mut statements = Vec::new();
        let mut methods = Vec::new();
        for item in &unit.statements {
            match item {
                ScriptStatement::Type(decl) => self.type_decl(decl)?,
                ScriptStatement::Statement(Statement::Import(import)) => {
                    imports.push(self.import_decl(import)?)
                }
                ScriptStatement::Statement(Statement::Method(method)) => {
                    methods.push(self.script_method(method)?)
                }
                ScriptStatement::Statement(Statement::LocalVariable(decl)) => {
                    statements.extend(self.local_declarations(decl)?)
                }
                ScriptStatement::Statement(stmt) => statements.push(self.statement(stmt)?),
            }
        }

        let mut classes: Vec<ClassNode> = self.classes.drain(..).flatten().collect();
        let package_name = package.as_ref().map(|package| package.name.clone());

        if self.source_name.ends_with("package-info.groovy") {
            let name = format!("{}{PACKAGE_INFO}", self.package_prefix);
            if !classes.iter().any(|class| class.name == name) {
                classes.push(ClassNode::new(
                    name,
                    ClassKind::Interface,
                    Flags::INTERFACE | Flags::ABSTRACT | Flags::SYNTHETIC,
                    TypeRef::object(),
                ));
            }
        } else if statements.is_empty() && methods.is_empty() && classes.is_empty() {
            statements.push(crate::ast::Statement::new(
                StmtKind::Return {
                    expr: Expression::null(SourceRange::UNKNOWN),
                },
                SourceRange::UNKNOWN,
            ));
        }

        let script = if statements.is_empty() && methods.is_empty() {
            None
        } else {
            let ranges = statements
                .iter()
                .map(|stmt| stmt.range)
                .chain(methods.iter().map(|method| method.range));
            Some(ScriptClass {
                name: format!("{}{}", self.package_prefix, self.script_name),
                range: cover_known(ranges),
            })
        };

        let module = Module {
            source_name: self.source_name.to_string(),
            package,
            imports,
            statements,
            methods,
            classes,
            script,
            range: self.range(Span::new(0, self.text.len()))?,
        };
        tracing::debug!(
            target: "gravel.ast",
            source = self.source_name,
            package = package_name.as_deref().unwrap_or(""),
            classes = module.classes.len(),
            methods = module.methods.len(),
            statements = module.statements.len(),
            "built module"
        );
        match first_invalid_number(&module) {
            Some(failure) => Err(failure),
            None => Ok(module),
        }
    }

    fn package_decl(&mut self, decl: &PackageDecl) -> BResult<PackageNode> {
        let name = decl.name.text();
        self.package_prefix = format!("{name}.");
        Ok(PackageNode {
            annotations: self.annotations(&decl.annotations)?,
            name,
            name_range: self.range(decl.name.range)?,
            range: self.range(decl.range)?,
        })
    }

    pub(super) fn import_decl(&mut self, decl: &ImportDecl) -> BResult<ImportNode> {
        let name = decl.name.text();
        let alias = decl.alias.as_ref().map(|alias| alias.text.clone());
        let kind = match (decl.is_static, decl.star) {
            (true, true) => ImportKind::StaticStar { class_name: name },
            (true, false) => {
                let (class_name, member): (String, SmolStr) = match name.rsplit_once('.') {
                    Some((class_name, member)) => (class_name.to_string(), member.into()),
                    None => (String::new(), name.as_str().into()),
                };
                ImportKind::Static {
                    class_name,
                    alias: alias.unwrap_or_else(|| member.clone()),
                    member,
                }
            }
            (false, true) => ImportKind::Star { package_name: name },
            (false, false) => {
                let last = decl
                    .name
                    .last()
                    .map(|ident| ident.text.clone())
                    .unwrap_or_default();
                ImportKind::Single {
                    class_name: name,
                    alias: alias.unwrap_or(last),
                }
            }
        };
        Ok(ImportNode {
            kind,
            annotations: self.annotations(&decl.annotations)?,
            name_range: self.range(decl.name.range)?,
            range: self.range(decl.range)?,
        })
    }
}

/// Smallest range holding every known range, or unknown if none is.
fn cover_known(ranges: impl Iterator<Item = SourceRange>) -> SourceRange {
    let mut first: Option<SourceRange> = None;
    let mut last: Option<SourceRange> = None;
    for range in ranges.filter(|range| !range.is_unknown()) {
        if first.map_or(true, |first| range.start < first.start) {
            first = Some(range);
        }
        if last.map_or(true, |last| range.end > last.end) {
            last = Some(range);
        }
    }
    match (first, last) {
        (Some(first), Some(last)) => first.to(last),
        _ => SourceRange::UNKNOWN,
    }
}

/// A numeric literal that failed to parse and was not repaired by a sign
/// fold.
fn first_invalid_number(module: &Module) -> Option<ParsingFailed> {
    let mut failure = None;
    walk(NodeRef::Module(module), &mut |node, _| {
        if failure.is_some() {
            return;
        }
        if let NodeRef::Expression(Expression {
            kind: ExprKind::Constant(constant),
            range,
            ..
        }) = node
        {
            if let ConstantValue::Invalid { message } = &constant.value {
                failure = Some(ParsingFailed::new(message.clone(), *range));
            }
        }
    });
    failure
}
