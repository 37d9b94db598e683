//! Type and member declarations.

use gravel_core::{SourceRange, Span};
use gravel_syntax::tree::{
    Arguments, ClassBody, ClassBodyDecl, EnumConstant, FormalParameter, MethodDecl, MethodName,
    Modifier, Modifiers, Type, TypeDecl, TypeDeclKind, TypeKind, VariableDeclaration, VariableDeclarationKind,
};
use gravel_syntax::NumberValue;
use smol_str::SmolStr;

use super::{AstBuilder, BResult, ClassFrame};
use crate::ast::{
    AnnotationNode, ClassKind, ClassNode, ConstantValue, ConstructorTarget, ExprKind, Expression,
    FieldNode, Flags, GenericsType, MethodKind, MethodNode, Parameter, PropertyNode, Statement, StmtKind,
    TypeRef,
};
use crate::modifiers::{ModifierKind, ModifierNode, ModifierSet};
use crate::reporter::ParsingFailed;

const TRAIT_ANNOTATION: &str = "groovy.transform.Trait";
const ENUM_BASE: &str = "java.lang.Enum";
const ANNOTATION_BASE: &str = "java.lang.annotation.Annotation";

/// Where a method declaration appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MethodContext {
    Script,
    Class,
}

impl<'a> AstBuilder<'a> {
    pub(super) fn modifiers(&mut self, modifiers: &Modifiers) -> BResult<ModifierSet> {
        let mut nodes = Vec::with_capacity(modifiers.items.len());
        for item in &modifiers.items {
            match item {
                Modifier::Keyword { kind, range } => match ModifierKind::from_syntax(*kind) {
                    Some(kind) => nodes.push(ModifierNode::keyword(kind, self.range(*range)?)),
                    None => {
                        return self.fail(
                            format!("Unsupported modifier: {}", self.source(*range)),
                            *range,
                        )
                    }
                },
                Modifier::Annotation(annotation) => {
                    nodes.push(ModifierNode::annotation(self.annotation(annotation)?))
                }
            }
        }
        ModifierSet::resolve(nodes)
    }

    pub(super) fn type_decl(&mut self, decl: &TypeDecl) -> BResult<()> {
        let simple_name = decl.name.text.clone();
        if simple_name == "var" {
            return self.fail("var cannot be used for type declarations", decl.name.range);
        }
        let extends_span = cover(decl.extends.iter().map(|ty| ty.range));
        let implements_span = cover(decl.implements.iter().map(|ty| ty.range));
        match decl.kind {
            TypeDeclKind::Annotation => {
                if let Some(params) = &decl.type_params {
                    return self.fail(
                        "annotation declaration cannot have type parameters",
                        params.range,
                    );
                }
                if let Some(span) = extends_span {
                    return self.fail("No extends clause allowed for annotation declaration", span);
                }
                if let Some(span) = implements_span {
                    return self.fail(
                        "No implements clause allowed for annotation declaration",
                        span,
                    );
                }
            }
            TypeDeclKind::Enum => {
                if let Some(params) = &decl.type_params {
                    return self.fail("enum declaration cannot have type parameters", params.range);
                }
                if let Some(span) = extends_span {
                    return self.fail("No extends clause allowed for enum declaration", span);
                }
            }
            TypeDeclKind::Interface => {
                if let Some(span) = implements_span {
                    return self.fail("No implements clause allowed for interface declaration", span);
                }
            }
            TypeDeclKind::Class | TypeDeclKind::Trait => {}
        }

        let modifiers = self.modifiers(&decl.modifiers)?;
        let (mut flags, synthetic_public) = modifiers.class_flags();
        let name = self.qualify(&simple_name);
        let outer = self.current_class().map(|outer| (outer.name.clone(), outer.is_interface()));
        if outer.as_ref().is_some_and(|(_, interface)| *interface) {
            flags |= Flags::STATIC;
        }

        let with_default_methods =
            decl.kind == TypeDeclKind::Interface && declares_default_methods(&decl.body);
        let kind = match decl.kind {
            TypeDeclKind::Class => ClassKind::Class,
            TypeDeclKind::Interface => ClassKind::Interface,
            TypeDeclKind::Enum => ClassKind::Enum,
            TypeDeclKind::Annotation => ClassKind::Annotation,
            TypeDeclKind::Trait => ClassKind::Trait,
        };

        let mut node = ClassNode::new(name.clone(), kind, flags, TypeRef::object());
        node.synthetic_public = synthetic_public;
        node.name_range = self.range(decl.name.range)?;
        node.range = self.range(decl.range)?;
        node.outer_class = outer.map(|(name, _)| name);
        node.generics = self.type_parameters(decl.type_params.as_ref())?;
        if with_default_methods || decl.kind == TypeDeclKind::Trait {
            node.annotations.push(AnnotationNode {
                class_name: TypeRef::named(TRAIT_ANNOTATION, SourceRange::UNKNOWN),
                members: Vec::new(),
                range: SourceRange::UNKNOWN,
            });
        }
        node.annotations.extend(modifiers.annotations());

        match decl.kind {
            TypeDeclKind::Class | TypeDeclKind::Trait => {
                self.class_supertypes(&mut node, decl)?
            }
            TypeDeclKind::Interface if with_default_methods => {
                self.class_supertypes(&mut node, decl)?
            }
            TypeDeclKind::Interface => {
                node.modifiers |= Flags::INTERFACE | Flags::ABSTRACT;
                node.interfaces = self.types(&decl.extends)?;
            }
            TypeDeclKind::Enum => {
                node.modifiers |= Flags::ENUM | Flags::FINAL;
                let mut base = TypeRef::named(ENUM_BASE, SourceRange::UNKNOWN);
                base.generics.push(GenericsType {
                    name: name.as_str().into(),
                    ty: TypeRef::named(name.clone(), SourceRange::UNKNOWN),
                    upper_bounds: Vec::new(),
                    lower_bound: None,
                    wildcard: false,
                    placeholder: false,
                    range: SourceRange::UNKNOWN,
                });
                node.super_class = base;
                node.interfaces = self.types(&decl.implements)?;
            }
            TypeDeclKind::Annotation => {
                node.modifiers |= Flags::INTERFACE | Flags::ABSTRACT | Flags::ANNOTATION;
                node.interfaces
                    .push(TypeRef::named(ANNOTATION_BASE, SourceRange::UNKNOWN));
            }
        }

        // Classes and traits take their place before any nested class so the
        // first registered class stays the outermost one.
        let slot = matches!(decl.kind, TypeDeclKind::Class | TypeDeclKind::Trait)
            .then(|| self.reserve_class_slot());
        let frame = ClassFrame {
            node,
            slot,
            simple_name,
            with_default_methods,
        };
        let frame = self.class_scope(frame, &decl.body)?;
        let kind = frame.node.kind;
        let slot = self.register_class(frame.node, frame.slot);
        tracing::trace!(target: "gravel.ast", class = %name, ?kind, slot, "registered class");
        Ok(())
    }

    fn class_supertypes(&mut self, node: &mut ClassNode, decl: &TypeDecl) -> BResult<()> {
        if decl.extends.len() > 1 {
            let span = cover(decl.extends.iter().map(|ty| ty.range)).unwrap_or(decl.range);
            return self.fail("Cannot extend multiple classes", span);
        }
        if let Some(ty) = decl.extends.first() {
            node.super_class = self.ty(ty)?;
        }
        node.interfaces = self.types(&decl.implements)?;
        Ok(())
    }

    fn types(&mut self, types: &[Type]) -> BResult<Vec<TypeRef>> {
        types.iter().map(|ty| self.ty(ty)).collect()
    }

    /// Lower `body` with `frame` as the enclosing class and hand the frame
    /// back.
    fn class_scope(&mut self, frame: ClassFrame, body: &ClassBody) -> BResult<ClassFrame> {
        self.class_stack.push(frame);
        let result = self.class_body(body);
        let frame = self.class_stack.pop();
        result?;
        frame.ok_or_else(|| ParsingFailed::new("unbalanced class scope", SourceRange::UNKNOWN))
    }

    fn class_body(&mut self, body: &ClassBody) -> BResult<()> {
        for constant in &body.enum_constants {
            self.enum_constant(constant)?;
        }
        for member in &body.members {
            match member {
                ClassBodyDecl::Initializer {
                    static_kw, block, ..
                } => {
                    let block = self.block(block)?;
                    if let Some(class) = self.current_class_mut() {
                        if static_kw.is_some() {
                            class.static_initializers.push(block);
                        } else {
                            class.object_initializers.push(block);
                        }
                    }
                }
                ClassBodyDecl::Method(method) => self.class_method(method)?,
                ClassBodyDecl::Field(decl) => self.field_declaration(decl)?,
                ClassBodyDecl::Type(decl) => self.type_decl(decl)?,
            }
        }
        Ok(())
    }

    fn enum_constant(&mut self, constant: &EnumConstant) -> BResult<()> {
        let enum_name = match self.current_class() {
            Some(class) => class.name.clone(),
            None => return self.fail("enum constant outside of an enum", constant.range),
        };
        let name_range = self.range(constant.name.range)?;

        let anonymous = match &constant.body {
            Some(body) => {
                let range = self.range(body.range)?;
                let class_range = self.range(constant.range.cover(body.range))?;
                let super_class = TypeRef::named(enum_name.clone(), SourceRange::UNKNOWN);
                let name = self.anonymous_class(body, super_class, true, name_range, class_range)?;
                Some(Expression::new(
                    ExprKind::Class {
                        ty: TypeRef::named(name, range),
                    },
                    range,
                ))
            }
            None => None,
        };

        let initial_value = self
            .enum_constant_init(constant.arguments.as_ref(), anonymous)?
            .map(|init| match init.kind {
                ExprKind::List { .. } => init,
                _ => {
                    let range = init.range;
                    Expression::new(
                        ExprKind::List {
                            elements: vec![init],
                            wrapped: false,
                        },
                        range,
                    )
                }
            });

        let field = FieldNode {
            name: constant.name.text.clone(),
            modifiers: Flags::PUBLIC | Flags::STATIC | Flags::FINAL | Flags::ENUM,
            ty: TypeRef::named(enum_name, SourceRange::UNKNOWN),
            dynamic_typed: false,
            initial_value,
            annotations: self.annotations(&constant.annotations)?,
            synthetic: false,
            enum_constant: true,
            name_range,
            range: self.range(constant.range)?,
        };
        if let Some(class) = self.current_class_mut() {
            class.fields.push(field);
        }
        Ok(())
    }

    /// Constructor arguments of an enum constant, with the class of its
    /// anonymous body appended.
    fn enum_constant_init(
        &mut self,
        arguments: Option<&Arguments>,
        anonymous: Option<Expression>,
    ) -> BResult<Option<Expression>> {
        let Some(args) = arguments else {
            return Ok(anonymous.map(|class| {
                let range = class.range;
                Expression::new(
                    ExprKind::List {
                        elements: vec![class],
                        wrapped: false,
                    },
                    range,
                )
            }));
        };
        // The list spans the arguments and the constant body.
        let args_range = match &anonymous {
            Some(class) => self.range(args.range)?.to(class.range),
            None => self.range(args.range)?,
        };
        let lowered = self.arguments(args)?;
        let mut expressions = match lowered.kind {
            ExprKind::ArgumentList { arguments } => arguments,
            _ => vec![lowered],
        };

        if expressions.len() == 1 {
            let expr = expressions.remove(0);
            if let ExprKind::NamedArgumentList { entries } = expr.kind {
                let wrapped = entries.len() > 1;
                let mut elements = entries;
                elements.extend(anonymous);
                return Ok(Some(Expression::new(
                    ExprKind::List { elements, wrapped },
                    args_range,
                )));
            }
            let Some(class) = anonymous else {
                if matches!(expr.kind, ExprKind::List { .. }) {
                    return Ok(Some(Expression::new(
                        ExprKind::List {
                            elements: vec![expr],
                            wrapped: false,
                        },
                        args_range,
                    )));
                }
                return Ok(Some(expr));
            };
            let mut elements = match expr.kind {
                ExprKind::List { elements, .. } => elements,
                _ => vec![expr],
            };
            elements.push(class);
            return Ok(Some(Expression::new(
                ExprKind::List {
                    elements,
                    wrapped: false,
                },
                args_range,
            )));
        }

        expressions.extend(anonymous);
        Ok(Some(Expression::new(
            ExprKind::List {
                elements: expressions,
                wrapped: true,
            },
            args_range,
        )))
    }

    /// Lower an anonymous class body and register the class; returns its
    /// binary name.
    pub(super) fn anonymous_class(
        &mut self,
        body: &ClassBody,
        super_class: TypeRef,
        enum_constant: bool,
        name_range: SourceRange,
        range: SourceRange,
    ) -> BResult<String> {
        let (name, outer) = self.next_anonymous_name();
        let flags = if enum_constant {
            // The enum loses `final` so the constant body can extend it.
            match self.current_class_mut() {
                Some(enum_class) => {
                    let flags = enum_class.modifiers | Flags::FINAL;
                    enum_class.modifiers.remove(Flags::FINAL);
                    flags
                }
                None => Flags::FINAL,
            }
        } else {
            Flags::PUBLIC
        };

        let mut node = ClassNode::new(name.clone(), ClassKind::Class, flags, super_class);
        node.anonymous = true;
        node.enum_constant_class = enum_constant;
        node.outer_class = Some(outer);
        node.name_range = name_range;
        node.range = range;
        let simple_name = name.rsplit('$').next().unwrap_or(&name).into();
        let frame = ClassFrame {
            node,
            slot: None,
            simple_name,
            with_default_methods: false,
        };
        let frame = self.class_scope(frame, body)?;
        let slot = self.register_class(frame.node, None);
        if let Some(created) = self.method_anonymous.last_mut() {
            created.push(slot);
        }
        Ok(name)
    }

    fn class_method(&mut self, decl: &MethodDecl) -> BResult<()> {
        let method = self.method_decl(decl, MethodContext::Class)?;
        if let Some(class) = self.current_class_mut() {
            match method.kind {
                MethodKind::Constructor => class.constructors.push(method),
                MethodKind::Method => class.methods.push(method),
            }
        }
        Ok(())
    }

    pub(super) fn script_method(&mut self, decl: &MethodDecl) -> BResult<MethodNode> {
        self.method_decl(decl, MethodContext::Script)
    }

    fn method_decl(&mut self, decl: &MethodDecl, context: MethodContext) -> BResult<MethodNode> {
        let modifiers = self.modifiers(&decl.modifiers)?;
        if modifiers.contains(ModifierKind::Var) {
            return self.fail("var cannot be used for method declarations", decl.range);
        }

        let name: SmolStr = match &decl.name {
            MethodName::Identifier(ident) => ident.text.clone(),
            MethodName::String(lit) => match gravel_syntax::string_value(&lit.text) {
                Ok(value) => value.into(),
                Err(err) => return self.fail(err.message, lit.range),
            },
        };

        let (class_kind, class_flags, class_name, with_default_methods) =
            match (context, self.class_stack.last()) {
                (MethodContext::Class, Some(frame)) => (
                    Some(frame.node.kind),
                    frame.node.modifiers,
                    Some(frame.simple_name.clone()),
                    frame.with_default_methods,
                ),
                _ => (None, Flags::NONE, None, false),
            };
        let in_annotation = class_kind == Some(ClassKind::Annotation);

        let (return_type, dynamic_return_type) = match &decl.return_type {
            Some(ty) => {
                if in_annotation && matches!(ty.kind, TypeKind::Void(_)) {
                    return self.fail("annotation method can not have void return type", ty.range);
                }
                (self.return_type(ty)?, false)
            }
            None => (TypeRef::object(), true),
        };
        let parameters = self.formal_parameters(&decl.params.params)?;
        let exceptions = self.types(&decl.throws)?;

        self.method_anonymous.push(Vec::new());
        let code = match &decl.body {
            Some(body) => self.block(body).map(Some),
            None => Ok(None),
        };
        let created = self.method_anonymous.pop().unwrap_or_default();
        let mut code = code?;

        let range = self.range(decl.range)?;
        let is_constructor;
        let mut annotation_default = false;
        let flags = match context {
            MethodContext::Class => {
                if class_flags.contains(Flags::INTERFACE) {
                    for param in &parameters {
                        if let Some(default) = &param.default {
                            let text = self.source(default.range.span());
                            return Err(ParsingFailed::new(
                                format!(
                                    "Cannot specify default value for method parameter '{} = {text}' inside an interface",
                                    param.name
                                ),
                                param.range,
                            ));
                        }
                    }
                }

                let has_return_type = decl.return_type.is_some();
                let has_body = decl.body.is_some();
                is_constructor = !has_return_type
                    && has_body
                    && class_name.as_deref() == Some(name.as_str());
                let mut flags = modifiers.flags();
                if is_constructor {
                    if let Some(body) = &code {
                        self.check_constructor_call_first(body, &name)?;
                    }
                } else {
                    if !has_return_type && has_body && modifiers.is_empty() {
                        return self.fail(format!("Invalid method declaration: {name}"), decl.range);
                    }
                    if let Some(value) = &decl.default_value {
                        let value = self.element_value(value)?;
                        code = Some(Statement::expression(value));
                        annotation_default = true;
                    }
                    let is_static = modifiers.contains(ModifierKind::Static);
                    let is_default = modifiers.contains(ModifierKind::Default);
                    if !is_static
                        && (class_flags.contains(Flags::INTERFACE)
                            || (with_default_methods && !is_default))
                    {
                        flags |= Flags::ABSTRACT;
                    }
                }
                flags
            }
            MethodContext::Script => {
                is_constructor = false;
                let visibility = if modifiers.contains(ModifierKind::Private) {
                    Flags::PRIVATE
                } else {
                    Flags::PUBLIC
                };
                modifiers.flags().without(Flags::VISIBILITY) | visibility
            }
        };

        let names = self.finish_anonymous_classes(&created, &name);
        let method = MethodNode {
            name,
            kind: if is_constructor {
                MethodKind::Constructor
            } else {
                MethodKind::Method
            },
            modifiers: flags,
            synthetic_public: !modifiers.has_visibility(),
            return_type: if is_constructor {
                TypeRef::named("void", SourceRange::UNKNOWN)
            } else {
                return_type
            },
            dynamic_return_type: dynamic_return_type && !is_constructor,
            parameters,
            exceptions,
            code,
            annotation_default,
            generics: self.type_parameters(decl.type_params.as_ref())?,
            annotations: modifiers.annotations(),
            anonymous_classes: names,
            rparen_offset: decl.params.range.end.saturating_sub(1),
            name_range: self.range(decl.name.range())?,
            range,
        };

        self.validate_method(decl, &method, &modifiers, context, class_kind, class_flags)?;
        Ok(method)
    }

    fn validate_method(
        &self,
        decl: &MethodDecl,
        method: &MethodNode,
        modifiers: &ModifierSet,
        context: MethodContext,
        class_kind: Option<ClassKind>,
        class_flags: Flags,
    ) -> BResult<()> {
        let is_abstract = method.is_abstract();
        let has_body = method.code.is_some() && !method.annotation_default;
        let name = &method.name;

        match context {
            MethodContext::Script => {
                if modifiers.is_empty() && decl.return_type.is_none() {
                    return self.fail("Modifiers or return type is required", decl.range);
                }
                if is_abstract || !has_body {
                    let message = format!(
                        "You cannot define {} method[{name}] {}in the script. Try {}{}{}",
                        if is_abstract { "an abstract" } else { "a" },
                        if has_body { "" } else { "without method body " },
                        if is_abstract { "removing the 'abstract'" } else { "" },
                        if is_abstract && !has_body { " and" } else { "" },
                        if has_body { "" } else { " adding a method body" },
                    );
                    return Err(ParsingFailed::new(message, method.range));
                }
            }
            MethodContext::Class => {
                if class_kind == Some(ClassKind::Trait) && is_abstract && has_body {
                    return self.fail("Abstract method should not have method body", decl.range);
                }
                if class_kind == Some(ClassKind::Annotation) && has_body {
                    return self.fail("Annotation type element should not have body", decl.range);
                }
                if !is_abstract && !has_body {
                    return Err(ParsingFailed::new(
                        format!(
                            "You defined a method[{name}] without a body. Try adding a method body, or declare it abstract"
                        ),
                        method.range,
                    ));
                }
                let interface_or_abstract = class_flags.contains(Flags::ABSTRACT)
                    && class_kind != Some(ClassKind::Annotation);
                if interface_or_abstract
                    && !modifiers.contains(ModifierKind::Default)
                    && is_abstract
                    && has_body
                {
                    return Err(ParsingFailed::new(
                        format!(
                            "You defined an abstract method[{name}] with a body. Try removing the method body{}",
                            if class_flags.contains(Flags::INTERFACE) {
                                ", or declare it default"
                            } else {
                                ""
                            }
                        ),
                        method.range,
                    ));
                }
            }
        }

        modifiers.validate_method(method.range)?;
        if method.is_constructor() {
            modifiers.validate_constructor(method.range)?;
        }
        Ok(())
    }

    /// `this(...)` and `super(...)` may only open a constructor body.
    fn check_constructor_call_first(&self, body: &Statement, name: &str) -> BResult<()> {
        for stmt in body.statements().iter().skip(1) {
            if let StmtKind::Expression { expr } = &stmt.kind {
                if let ExprKind::ConstructorCall {
                    target: ConstructorTarget::This | ConstructorTarget::Super,
                    ..
                } = &expr.kind
                {
                    let text = self.source(expr.range.span());
                    return Err(ParsingFailed::new(
                        format!("{text} should be the first statement in the constructor[{name}]"),
                        expr.range,
                    ));
                }
            }
        }
        Ok(())
    }

    /// Record the enclosing method on the anonymous classes created in its
    /// body and return their names.
    fn finish_anonymous_classes(&mut self, slots: &[usize], method: &SmolStr) -> Vec<String> {
        slots
            .iter()
            .filter_map(|slot| {
                self.classes
                    .get_mut(*slot)
                    .and_then(Option::as_mut)
                    .map(|class| {
                        class.enclosing_method = Some(method.clone());
                        class.name.clone()
                    })
            })
            .collect()
    }

    fn field_declaration(&mut self, decl: &VariableDeclaration) -> BResult<()> {
        let modifiers = self.modifiers(&decl.modifiers)?;
        let (ty, declarators) = match &decl.kind {
            VariableDeclarationKind::Declarators { ty, declarators } => (ty, declarators),
            VariableDeclarationKind::Tuple { .. } => {
                return self.fail(
                    "Multiple assignment declaration is not allowed for fields",
                    decl.range,
                )
            }
        };
        let (field_type, dynamic_typed) = match ty {
            Some(ty) => (self.ty(ty)?, false),
            None => (TypeRef::object(), true),
        };
        let interface = self
            .current_class()
            .is_some_and(|class| class.is_interface());

        for declarator in declarators {
            let mut flags = modifiers.flags();
            let mut initial_value = match &declarator.init {
                Some(init) => Some(self.statement_expr(init)?),
                None => None,
            };
            if interface {
                if initial_value.is_none() {
                    initial_value = primitive_default(&field_type)
                        .map(|value| Expression::constant(value, SourceRange::UNKNOWN));
                }
                flags |= Flags::PUBLIC | Flags::STATIC | Flags::FINAL;
            }

            let end = match &initial_value {
                Some(value) if !value.range.is_unknown() => value.range.end,
                _ => declarator.name.range.end,
            };
            let member = Member {
                name: declarator.name.text.clone(),
                flags,
                ty: field_type.clone(),
                dynamic_typed,
                initial_value,
                annotations: modifiers.annotations(),
                name_range: self.range(declarator.name.range)?,
                range: self.range(Span::new(decl.range.start, end))?,
            };
            if interface || modifiers.has_visibility() {
                self.declare_field(member, decl.range)?;
            } else {
                self.declare_property(member, interface, decl.range)?;
            }
        }
        Ok(())
    }

    fn declare_field(&mut self, member: Member, decl_span: Span) -> BResult<()> {
        let decl_range = self.range(decl_span)?;
        let Some(class) = self.current_class_mut() else {
            return Ok(());
        };
        if class
            .field(&member.name)
            .is_some_and(|existing| !existing.synthetic)
        {
            return Err(ParsingFailed::new(
                format!("The field '{}' is declared multiple times", member.name),
                decl_range,
            ));
        }
        // An explicit field replaces the generated backing field of a
        // property with the same name.
        if class.property(&member.name).is_some() {
            class.fields.retain(|field| field.name != member.name);
        }
        class.fields.push(member.into_field(false));
        Ok(())
    }

    fn declare_property(&mut self, member: Member, interface: bool, decl_span: Span) -> BResult<()> {
        let decl_range = self.range(decl_span)?;
        let Some(class) = self.current_class_mut() else {
            return Ok(());
        };
        if class.property(&member.name).is_some() {
            return Err(ParsingFailed::new(
                format!("The property '{}' is declared multiple times", member.name),
                decl_range,
            ));
        }

        let flags = member.flags;
        let (name_range, range) = (member.name_range, member.range);
        // A field declared earlier under this name becomes the property's
        // storage and keeps its type, initializer and position. Annotations
        // written on the property then stay on the property.
        let mut annotations = Vec::new();
        let mut field = match class.fields.iter().position(|existing| existing.name == member.name) {
            Some(idx) => {
                annotations = member.annotations;
                class.fields.remove(idx)
            }
            None => member.into_field(false),
        };
        field.modifiers = flags.without(Flags::PUBLIC) | Flags::PRIVATE;
        field.synthetic = !interface;

        let property = PropertyNode {
            name: field.name.clone(),
            modifiers: flags | Flags::PUBLIC,
            ty: field.ty.clone(),
            annotations,
            name_range,
            range,
        };
        class.fields.push(field);
        class.properties.push(property);
        Ok(())
    }

    pub(super) fn formal_parameters(&mut self, params: &[FormalParameter]) -> BResult<Vec<Parameter>> {
        if let Some(param) = params
            .iter()
            .take(params.len().saturating_sub(1))
            .find(|param| param.ellipsis.is_some())
        {
            return self.fail(
                format!(
                    "The var-arg parameter {} must be the last parameter",
                    param.name.text
                ),
                param.range,
            );
        }

        let parameters = params
            .iter()
            .map(|param| self.formal_parameter(param))
            .collect::<BResult<Vec<_>>>()?;

        for (idx, param) in parameters.iter().enumerate().rev() {
            let duplicated = parameters
                .iter()
                .enumerate()
                .any(|(other_idx, other)| other_idx != idx && other.name == param.name);
            if duplicated {
                return Err(ParsingFailed::new(
                    format!("Duplicated parameter '{}' found.", param.name),
                    param.range,
                ));
            }
        }
        Ok(parameters)
    }

    pub(super) fn formal_parameter(&mut self, param: &FormalParameter) -> BResult<Parameter> {
        let modifiers = self.modifiers(&param.modifiers)?;
        let (mut ty, dynamic_typed) = match &param.ty {
            Some(ty) => (self.ty(ty)?, false),
            None => (TypeRef::object(), true),
        };
        if let Some(ellipsis) = param.ellipsis {
            let span = match &param.ty {
                Some(written) => written.range.cover(ellipsis),
                None => ellipsis,
            };
            ty = TypeRef::array_of(ty, self.range(span)?);
        }
        let default = match &param.default {
            Some(expr) => Some(self.expr(expr)?),
            None => None,
        };
        Ok(Parameter {
            name: param.name.text.clone(),
            ty,
            dynamic_typed,
            modifiers: modifiers.flags(),
            annotations: modifiers.annotations(),
            default,
            var_keyword: modifiers.var_keyword(),
            name_range: self.range(param.name.range)?,
            range: self.range(param.range)?,
        })
    }
}

/// One declarator of a field declaration, before it is stored as a field
/// or a property.
struct Member {
    name: SmolStr,
    flags: Flags,
    ty: TypeRef,
    dynamic_typed: bool,
    initial_value: Option<Expression>,
    annotations: Vec<AnnotationNode>,
    name_range: SourceRange,
    range: SourceRange,
}

impl Member {
    fn into_field(self, synthetic: bool) -> FieldNode {
        FieldNode {
            name: self.name,
            modifiers: self.flags,
            ty: self.ty,
            dynamic_typed: self.dynamic_typed,
            initial_value: self.initial_value,
            annotations: self.annotations,
            synthetic,
            enum_constant: false,
            name_range: self.name_range,
            range: self.range,
        }
    }
}

/// Default value of an interface constant of primitive type.
fn primitive_default(ty: &TypeRef) -> Option<ConstantValue> {
    if ty.is_array() {
        return None;
    }
    Some(match ty.name.as_str() {
        "int" | "short" | "byte" | "char" => ConstantValue::Number(NumberValue::Int(0)),
        "long" => ConstantValue::Number(NumberValue::Long(0)),
        "float" => ConstantValue::Number(NumberValue::Float(0.0)),
        "double" => ConstantValue::Number(NumberValue::Double(0.0)),
        "boolean" => ConstantValue::Boolean(false),
        _ => return None,
    })
}

fn declares_default_methods(body: &ClassBody) -> bool {
    body.members.iter().any(|member| match member {
        ClassBodyDecl::Method(method) => method.modifiers.items.iter().any(|item| {
            matches!(
                item,
                Modifier::Keyword { kind, .. }
                    if ModifierKind::from_syntax(*kind) == Some(ModifierKind::Default)
            )
        }),
        _ => false,
    })
}

fn cover(spans: impl Iterator<Item = Span>) -> Option<Span> {
    spans.reduce(|acc, span| acc.cover(span))
}
