use gravel_core::SourceRange;
use serde::Serialize;
use smol_str::SmolStr;

use super::expr::Expression;
use super::flags::Flags;
use super::stmt::Statement;

pub const OBJECT: &str = "java.lang.Object";

/// A reference to a type as written in source. Names are not resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeRef {
    /// Written name; arrays are spelled `T[]`.
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub generics: Vec<GenericsType>,
    /// Element type of an array type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<Box<TypeRef>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<AnnotationNode>,
    pub range: SourceRange,
}

impl TypeRef {
    pub fn named(name: impl Into<String>, range: SourceRange) -> Self {
        Self {
            name: name.into(),
            generics: Vec::new(),
            component: None,
            annotations: Vec::new(),
            range,
        }
    }

    /// `java.lang.Object` with no source position.
    pub fn object() -> Self {
        Self::named(OBJECT, SourceRange::UNKNOWN)
    }

    pub fn array_of(component: TypeRef, range: SourceRange) -> Self {
        Self {
            name: format!("{}[]", component.name),
            generics: Vec::new(),
            component: Some(Box::new(component)),
            annotations: Vec::new(),
            range,
        }
    }

    pub fn is_array(&self) -> bool {
        self.component.is_some()
    }

    pub fn is_object(&self) -> bool {
        self.name == OBJECT || self.name == "Object"
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self.name.as_str(),
            "boolean" | "byte" | "char" | "short" | "int" | "long" | "float" | "double"
        )
    }

    pub fn is_void(&self) -> bool {
        self.name == "void"
    }

    /// The last segment of a qualified name.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// A type argument or type parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenericsType {
    pub name: SmolStr,
    pub ty: TypeRef,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub upper_bounds: Vec<TypeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<TypeRef>,
    pub wildcard: bool,
    /// A declared type parameter rather than a type argument.
    pub placeholder: bool,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationNode {
    pub class_name: TypeRef,
    pub members: Vec<AnnotationMember>,
    pub range: SourceRange,
}

impl AnnotationNode {
    pub fn member(&self, name: &str) -> Option<&Expression> {
        self.members
            .iter()
            .find(|member| member.name == name)
            .map(|member| &member.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationMember {
    pub name: SmolStr,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: SmolStr,
    pub ty: TypeRef,
    /// No type was written, or it was `def`/`var`.
    pub dynamic_typed: bool,
    pub modifiers: Flags,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<AnnotationNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Expression>,
    /// Range of the `var` keyword, for `for (var x in xs)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub var_keyword: Option<SourceRange>,
    pub name_range: SourceRange,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldNode {
    pub name: SmolStr,
    pub modifiers: Flags,
    pub ty: TypeRef,
    pub dynamic_typed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<Expression>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<AnnotationNode>,
    /// Backing field generated for a property.
    pub synthetic: bool,
    pub enum_constant: bool,
    pub name_range: SourceRange,
    pub range: SourceRange,
}

/// A property; its storage is the field of the same name in
/// [`ClassNode::fields`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyNode {
    pub name: SmolStr,
    pub modifiers: Flags,
    pub ty: TypeRef,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<AnnotationNode>,
    pub name_range: SourceRange,
    pub range: SourceRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    Method,
    Constructor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodNode {
    pub name: SmolStr,
    pub kind: MethodKind,
    pub modifiers: Flags,
    /// No visibility modifier was written.
    pub synthetic_public: bool,
    pub return_type: TypeRef,
    pub dynamic_return_type: bool,
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<TypeRef>,
    /// `None` for abstract methods.
    pub code: Option<Statement>,
    /// `code` holds an annotation member's default value.
    pub annotation_default: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub generics: Vec<GenericsType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<AnnotationNode>,
    /// Names of the anonymous classes created inside the body.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub anonymous_classes: Vec<String>,
    /// Byte offset of the `)` closing the parameter list.
    pub rparen_offset: usize,
    pub name_range: SourceRange,
    pub range: SourceRange,
}

impl MethodNode {
    pub fn is_constructor(&self) -> bool {
        self.kind == MethodKind::Constructor
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(Flags::ABSTRACT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Trait,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassNode {
    /// Binary name: package-qualified, `Outer$Inner` for nested classes.
    pub name: String,
    pub kind: ClassKind,
    pub modifiers: Flags,
    pub synthetic_public: bool,
    pub super_class: TypeRef,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<TypeRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub generics: Vec<GenericsType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<AnnotationNode>,
    pub fields: Vec<FieldNode>,
    pub properties: Vec<PropertyNode>,
    pub methods: Vec<MethodNode>,
    pub constructors: Vec<MethodNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub object_initializers: Vec<Statement>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub static_initializers: Vec<Statement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outer_class: Option<String>,
    /// Method an anonymous class was created in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enclosing_method: Option<SmolStr>,
    pub anonymous: bool,
    /// Anonymous body of an enum constant.
    pub enum_constant_class: bool,
    pub name_range: SourceRange,
    pub range: SourceRange,
}

impl ClassNode {
    pub fn new(name: impl Into<String>, kind: ClassKind, modifiers: Flags, super_class: TypeRef) -> Self {
        Self {
            name: name.into(),
            kind,
            modifiers,
            synthetic_public: false,
            super_class,
            interfaces: Vec::new(),
            generics: Vec::new(),
            annotations: Vec::new(),
            fields: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            object_initializers: Vec::new(),
            static_initializers: Vec::new(),
            outer_class: None,
            enclosing_method: None,
            anonymous: false,
            enum_constant_class: false,
            name_range: SourceRange::UNKNOWN,
            range: SourceRange::UNKNOWN,
        }
    }

    pub fn is_interface(&self) -> bool {
        self.modifiers.contains(Flags::INTERFACE)
    }

    pub fn simple_name(&self) -> &str {
        let name = self.name.rsplit('.').next().unwrap_or(&self.name);
        name.rsplit('$').next().unwrap_or(name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldNode> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyNode> {
        self.properties.iter().find(|property| property.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodNode> {
        self.methods.iter().find(|method| method.name == name)
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations
            .iter()
            .any(|annotation| annotation.class_name.name == name)
    }
}
