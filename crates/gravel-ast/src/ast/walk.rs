//! Uniform traversal over AST nodes.
//!
//! [`NodeRef`] borrows any positioned node. Its children are the nodes that
//! are syntactically nested inside it, so a child's range lies within its
//! parent's range whenever both are known. Declared types of variables are
//! not visited as children of the variable, since the variable's range is its
//! name only.

use gravel_core::SourceRange;

use super::{
    AnnotationNode, CaseStatement, CatchStatement, ClassNode, ConstructorTarget, ExprKind,
    Expression, FieldNode, GenericsType, ImportNode, MethodNode, Module, PackageNode, Parameter,
    PropertyNode, Statement, StmtKind, TypeRef,
};

#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Module(&'a Module),
    Package(&'a PackageNode),
    Import(&'a ImportNode),
    Class(&'a ClassNode),
    Method(&'a MethodNode),
    Field(&'a FieldNode),
    Property(&'a PropertyNode),
    Parameter(&'a Parameter),
    Statement(&'a Statement),
    Catch(&'a CatchStatement),
    Case(&'a CaseStatement),
    Expression(&'a Expression),
    Type(&'a TypeRef),
    Annotation(&'a AnnotationNode),
    Generics(&'a GenericsType),
}

impl<'a> NodeRef<'a> {
    pub fn range(&self) -> SourceRange {
        match self {
            NodeRef::Module(node) => node.range,
            NodeRef::Package(node) => node.range,
            NodeRef::Import(node) => node.range,
            NodeRef::Class(node) => node.range,
            NodeRef::Method(node) => node.range,
            NodeRef::Field(node) => node.range,
            NodeRef::Property(node) => node.range,
            NodeRef::Parameter(node) => node.range,
            NodeRef::Statement(node) => node.range,
            NodeRef::Catch(node) => node.range,
            NodeRef::Case(node) => node.range,
            NodeRef::Expression(node) => node.range,
            NodeRef::Type(node) => node.range,
            NodeRef::Annotation(node) => node.range,
            NodeRef::Generics(node) => node.range,
        }
    }

    /// Short description used by outlines and test failure messages.
    pub fn label(&self) -> String {
        match self {
            NodeRef::Module(node) => format!("Module {}", node.source_name),
            NodeRef::Package(node) => format!("Package {}", node.name),
            NodeRef::Import(node) => format!("Import {:?}", node.kind),
            NodeRef::Class(node) => format!("{:?} {} [{}]", node.kind, node.name, node.modifiers),
            NodeRef::Method(node) => format!("{:?} {} [{}]", node.kind, node.name, node.modifiers),
            NodeRef::Field(node) => format!("Field {}: {} [{}]", node.name, node.ty.name, node.modifiers),
            NodeRef::Property(node) => format!("Property {}: {}", node.name, node.ty.name),
            NodeRef::Parameter(node) => format!("Parameter {}: {}", node.name, node.ty.name),
            NodeRef::Statement(node) => statement_label(node),
            NodeRef::Catch(node) => format!("Catch {}", node.parameter.name),
            NodeRef::Case(_) => "Case".to_string(),
            NodeRef::Expression(node) => expression_label(node),
            NodeRef::Type(node) => format!("Type {}", node.name),
            NodeRef::Annotation(node) => format!("Annotation @{}", node.class_name.name),
            NodeRef::Generics(node) => format!("Generics {}", node.name),
        }
    }

    pub fn children(&self) -> Vec<NodeRef<'a>> {
        let mut out = Vec::new();
        match *self {
            NodeRef::Module(module) => {
                out.extend(module.package.iter().map(NodeRef::Package));
                out.extend(module.imports.iter().map(NodeRef::Import));
                out.extend(module.statements.iter().map(NodeRef::Statement));
                out.extend(module.methods.iter().map(NodeRef::Method));
                out.extend(module.classes.iter().map(NodeRef::Class));
            }
            NodeRef::Package(package) => {
                out.extend(package.annotations.iter().map(NodeRef::Annotation));
            }
            NodeRef::Import(import) => {
                out.extend(import.annotations.iter().map(NodeRef::Annotation));
            }
            NodeRef::Class(class) => {
                out.extend(class.annotations.iter().map(NodeRef::Annotation));
                out.extend(class.generics.iter().map(NodeRef::Generics));
                // An anonymous class's supertype is written before its body and
                // is reached through the creating expression.
                if !class.anonymous {
                    out.push(NodeRef::Type(&class.super_class));
                    out.extend(class.interfaces.iter().map(NodeRef::Type));
                }
                out.extend(class.fields.iter().map(NodeRef::Field));
                out.extend(class.properties.iter().map(NodeRef::Property));
                out.extend(class.constructors.iter().map(NodeRef::Method));
                out.extend(class.methods.iter().map(NodeRef::Method));
                out.extend(class.object_initializers.iter().map(NodeRef::Statement));
                out.extend(class.static_initializers.iter().map(NodeRef::Statement));
            }
            NodeRef::Method(method) => {
                out.extend(method.annotations.iter().map(NodeRef::Annotation));
                out.extend(method.generics.iter().map(NodeRef::Generics));
                out.push(NodeRef::Type(&method.return_type));
                out.extend(method.parameters.iter().map(NodeRef::Parameter));
                out.extend(method.exceptions.iter().map(NodeRef::Type));
                out.extend(method.code.iter().map(NodeRef::Statement));
            }
            NodeRef::Field(field) => {
                out.extend(field.annotations.iter().map(NodeRef::Annotation));
                out.push(NodeRef::Type(&field.ty));
                out.extend(field.initial_value.iter().map(NodeRef::Expression));
            }
            // The type is the backing field's and is reached through it.
            NodeRef::Property(property) => {
                out.extend(property.annotations.iter().map(NodeRef::Annotation));
            }
            NodeRef::Parameter(param) => {
                out.extend(param.annotations.iter().map(NodeRef::Annotation));
                out.push(NodeRef::Type(&param.ty));
                out.extend(param.default.iter().map(NodeRef::Expression));
            }
            NodeRef::Statement(stmt) => statement_children(stmt, &mut out),
            NodeRef::Catch(catch) => {
                out.push(NodeRef::Parameter(&catch.parameter));
                out.push(NodeRef::Statement(&catch.code));
            }
            NodeRef::Case(case) => {
                out.push(NodeRef::Expression(&case.expr));
                out.push(NodeRef::Statement(&case.code));
            }
            NodeRef::Expression(expr) => expression_children(expr, &mut out),
            NodeRef::Type(ty) => {
                out.extend(ty.annotations.iter().map(NodeRef::Annotation));
                out.extend(ty.generics.iter().map(NodeRef::Generics));
                out.extend(ty.component.iter().map(|component| NodeRef::Type(component)));
            }
            NodeRef::Annotation(annotation) => {
                out.extend(annotation.members.iter().map(|member| NodeRef::Expression(&member.value)));
            }
            NodeRef::Generics(generics) => {
                out.push(NodeRef::Type(&generics.ty));
                out.extend(generics.upper_bounds.iter().map(NodeRef::Type));
                out.extend(generics.lower_bound.iter().map(NodeRef::Type));
            }
        }
        out
    }
}

fn statement_children<'a>(stmt: &'a Statement, out: &mut Vec<NodeRef<'a>>) {
    match &stmt.kind {
        StmtKind::Block { statements } => out.extend(statements.iter().map(NodeRef::Statement)),
        StmtKind::Expression { expr }
        | StmtKind::Return { expr }
        | StmtKind::Throw { expr } => out.push(NodeRef::Expression(expr)),
        StmtKind::If { cond, then, else_ } => {
            out.push(NodeRef::Expression(cond));
            out.push(NodeRef::Statement(then));
            out.push(NodeRef::Statement(else_));
        }
        StmtKind::ForIn {
            variable,
            collection,
            body,
        } => {
            out.push(NodeRef::Parameter(variable));
            out.push(NodeRef::Expression(collection));
            out.push(NodeRef::Statement(body));
        }
        StmtKind::For { control, body } => {
            out.push(NodeRef::Expression(control));
            out.push(NodeRef::Statement(body));
        }
        StmtKind::While { cond, body } => {
            out.push(NodeRef::Expression(cond));
            out.push(NodeRef::Statement(body));
        }
        StmtKind::DoWhile { body, cond } => {
            out.push(NodeRef::Statement(body));
            out.push(NodeRef::Expression(cond));
        }
        StmtKind::Try {
            block,
            catches,
            finally,
        } => {
            out.push(NodeRef::Statement(block));
            out.extend(catches.iter().map(NodeRef::Catch));
            out.extend(finally.iter().map(|stmt| NodeRef::Statement(stmt)));
        }
        StmtKind::Switch {
            expr,
            cases,
            default,
        } => {
            out.push(NodeRef::Expression(expr));
            out.extend(cases.iter().map(NodeRef::Case));
            out.extend(default.iter().map(|stmt| NodeRef::Statement(stmt)));
        }
        StmtKind::Synchronized { expr, block } => {
            out.push(NodeRef::Expression(expr));
            out.push(NodeRef::Statement(block));
        }
        StmtKind::Assert { cond, message } => {
            out.push(NodeRef::Expression(cond));
            out.push(NodeRef::Expression(message));
        }
        StmtKind::Break { .. } | StmtKind::Continue { .. } | StmtKind::Empty => {}
    }
}

fn expression_children<'a>(expr: &'a Expression, out: &mut Vec<NodeRef<'a>>) {
    match &expr.kind {
        ExprKind::Constant(_) | ExprKind::Variable(_) | ExprKind::Empty => {}
        ExprKind::Class { ty } => out.push(NodeRef::Type(ty)),
        ExprKind::Declaration {
            target,
            value,
            annotations,
            ..
        } => {
            out.extend(annotations.iter().map(NodeRef::Annotation));
            out.push(NodeRef::Expression(target));
            out.push(NodeRef::Expression(value));
        }
        ExprKind::Property {
            object, property, ..
        }
        | ExprKind::MethodPointer {
            object,
            method: property,
        }
        | ExprKind::MethodReference {
            object,
            method: property,
        } => {
            out.push(NodeRef::Expression(object));
            out.push(NodeRef::Expression(property));
        }
        ExprKind::MethodCall {
            object,
            method,
            arguments,
            ..
        } => {
            out.push(NodeRef::Expression(object));
            out.push(NodeRef::Expression(method));
            out.push(NodeRef::Expression(arguments));
        }
        ExprKind::ConstructorCall {
            target, arguments, ..
        } => {
            if let ConstructorTarget::Type { ty } = target {
                out.push(NodeRef::Type(ty));
            }
            out.push(NodeRef::Expression(arguments));
        }
        ExprKind::Binary { left, right, .. }
        | ExprKind::MapEntry {
            key: left,
            value: right,
        }
        | ExprKind::Range {
            from: left,
            to: right,
            ..
        }
        | ExprKind::Elvis {
            cond: left,
            else_: right,
        } => {
            out.push(NodeRef::Expression(left));
            out.push(NodeRef::Expression(right));
        }
        ExprKind::Prefix { expr, .. }
        | ExprKind::Postfix { expr, .. }
        | ExprKind::UnaryMinus { expr }
        | ExprKind::UnaryPlus { expr }
        | ExprKind::Not { expr }
        | ExprKind::BitwiseNegation { expr }
        | ExprKind::Boolean { expr }
        | ExprKind::Spread { expr }
        | ExprKind::SpreadMap { expr } => out.push(NodeRef::Expression(expr)),
        ExprKind::Ternary { cond, then, else_ } => {
            out.push(NodeRef::Expression(cond));
            out.push(NodeRef::Expression(then));
            out.push(NodeRef::Expression(else_));
        }
        ExprKind::Cast { ty, expr, .. } => {
            out.push(NodeRef::Type(ty));
            out.push(NodeRef::Expression(expr));
        }
        ExprKind::Closure { parameters, code } => {
            if let Some(parameters) = parameters {
                out.extend(parameters.iter().map(NodeRef::Parameter));
            }
            out.push(NodeRef::Statement(code));
        }
        ExprKind::Lambda { parameters, code } => {
            out.extend(parameters.iter().map(NodeRef::Parameter));
            out.push(NodeRef::Statement(code));
        }
        ExprKind::List { elements, .. }
        | ExprKind::Map { entries: elements }
        | ExprKind::Tuple { elements }
        | ExprKind::ArgumentList {
            arguments: elements,
        }
        | ExprKind::NamedArgumentList { entries: elements }
        | ExprKind::ClosureList {
            expressions: elements,
        } => out.extend(elements.iter().map(NodeRef::Expression)),
        ExprKind::GString {
            strings, values, ..
        } => {
            out.extend(strings.iter().map(NodeRef::Expression));
            out.extend(values.iter().map(NodeRef::Expression));
        }
        ExprKind::Array {
            sizes, initializer, ..
        } => {
            out.extend(sizes.iter().flatten().map(NodeRef::Expression));
            out.extend(initializer.iter().flatten().map(NodeRef::Expression));
        }
        ExprKind::AnnotationConstant { annotation } => out.push(NodeRef::Annotation(annotation)),
    }
}

fn statement_label(stmt: &Statement) -> String {
    let name = match &stmt.kind {
        StmtKind::Block { .. } => "Block",
        StmtKind::Expression { .. } => "ExpressionStatement",
        StmtKind::If { .. } => "If",
        StmtKind::ForIn { .. } => "ForIn",
        StmtKind::For { .. } => "For",
        StmtKind::While { .. } => "While",
        StmtKind::DoWhile { .. } => "DoWhile",
        StmtKind::Try { .. } => "Try",
        StmtKind::Switch { .. } => "Switch",
        StmtKind::Synchronized { .. } => "Synchronized",
        StmtKind::Return { .. } => "Return",
        StmtKind::Throw { .. } => "Throw",
        StmtKind::Break { .. } => "Break",
        StmtKind::Continue { .. } => "Continue",
        StmtKind::Assert { .. } => "Assert",
        StmtKind::Empty => "Empty",
    };
    if stmt.labels.is_empty() {
        name.to_string()
    } else {
        format!("{name} ({}:)", stmt.labels.join(":, "))
    }
}

fn expression_label(expr: &Expression) -> String {
    match &expr.kind {
        ExprKind::Constant(constant) => format!("Constant {:?}", constant.value),
        ExprKind::Variable(var) => format!("Variable {}", var.name),
        ExprKind::Class { ty } => format!("Class {}", ty.name),
        ExprKind::Declaration { op, .. } => format!("Declaration {}", op.text),
        ExprKind::Property {
            safe,
            spread_safe,
            attribute,
            ..
        } => {
            let kind = if *attribute { "Attribute" } else { "Property" };
            format!("{kind}{}", safety(*safe, *spread_safe))
        }
        ExprKind::MethodCall {
            method,
            implicit_this,
            safe,
            spread_safe,
            ..
        } => format!(
            "MethodCall {}{}{}",
            method.as_str().unwrap_or("<dynamic>"),
            if *implicit_this { " (implicit this)" } else { "" },
            safety(*safe, *spread_safe)
        ),
        ExprKind::ConstructorCall { target, .. } => match target {
            ConstructorTarget::Type { ty } => format!("ConstructorCall {}", ty.name),
            ConstructorTarget::This => "ConstructorCall this".to_string(),
            ConstructorTarget::Super => "ConstructorCall super".to_string(),
        },
        ExprKind::Binary { op, .. } => format!("Binary {}", op.text),
        ExprKind::Prefix { op, .. } => format!("Prefix {}", op.text),
        ExprKind::Postfix { op, .. } => format!("Postfix {}", op.text),
        ExprKind::Cast { ty, coerce, .. } => {
            format!("Cast{} {}", if *coerce { " as" } else { "" }, ty.name)
        }
        ExprKind::Range { inclusive, .. } => {
            format!("Range {}", if *inclusive { ".." } else { "..<" })
        }
        ExprKind::Array { ty, .. } => format!("Array {}", ty.name),
        other => variant_name(other).to_string(),
    }
}

fn safety(safe: bool, spread_safe: bool) -> &'static str {
    match (safe, spread_safe) {
        (_, true) => " *.",
        (true, false) => " ?.",
        (false, false) => "",
    }
}

fn variant_name(kind: &ExprKind) -> &'static str {
    match kind {
        ExprKind::MethodPointer { .. } => "MethodPointer",
        ExprKind::MethodReference { .. } => "MethodReference",
        ExprKind::UnaryMinus { .. } => "UnaryMinus",
        ExprKind::UnaryPlus { .. } => "UnaryPlus",
        ExprKind::Not { .. } => "Not",
        ExprKind::BitwiseNegation { .. } => "BitwiseNegation",
        ExprKind::Boolean { .. } => "Boolean",
        ExprKind::Ternary { .. } => "Ternary",
        ExprKind::Elvis { .. } => "Elvis",
        ExprKind::Closure { .. } => "Closure",
        ExprKind::Lambda { .. } => "Lambda",
        ExprKind::List { .. } => "List",
        ExprKind::Map { .. } => "Map",
        ExprKind::MapEntry { .. } => "MapEntry",
        ExprKind::Spread { .. } => "Spread",
        ExprKind::SpreadMap { .. } => "SpreadMap",
        ExprKind::GString { .. } => "GString",
        ExprKind::Tuple { .. } => "Tuple",
        ExprKind::ArgumentList { .. } => "ArgumentList",
        ExprKind::NamedArgumentList { .. } => "NamedArgumentList",
        ExprKind::ClosureList { .. } => "ClosureList",
        ExprKind::AnnotationConstant { .. } => "AnnotationConstant",
        ExprKind::Empty => "Empty",
        _ => "Expression",
    }
}

/// Visit `node` and its descendants in pre-order. `f` receives each node
/// and its depth below `node`.
pub fn walk<'a>(node: NodeRef<'a>, f: &mut dyn FnMut(NodeRef<'a>, usize)) {
    fn go<'a>(node: NodeRef<'a>, depth: usize, f: &mut dyn FnMut(NodeRef<'a>, usize)) {
        f(node, depth);
        for child in node.children() {
            go(child, depth + 1, f);
        }
    }
    go(node, 0, f);
}

/// The innermost node of `module` whose range contains `offset`.
pub fn node_at(module: &Module, offset: usize) -> Option<NodeRef<'_>> {
    let mut found = None;
    let mut current = NodeRef::Module(module);
    loop {
        let next = current.children().into_iter().find(|child| {
            let range = child.range();
            !range.is_unknown() && range.start <= offset && offset < range.end
        });
        match next {
            Some(child) => {
                found = Some(child);
                current = child;
            }
            None => return found,
        }
    }
}
