use gravel_core::SourceRange;
use gravel_syntax::NumberValue;
use serde::Serialize;
use smol_str::SmolStr;

use super::class::{AnnotationNode, GenericsType, Parameter, TypeRef};
use super::flags::Flags;
use super::stmt::Statement;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expression {
    pub kind: ExprKind,
    pub range: SourceRange,
    /// How many parentheses directly enclose this expression.
    #[serde(skip_serializing_if = "is_zero")]
    pub paren_depth: u32,
}

fn is_zero(depth: &u32) -> bool {
    *depth == 0
}

impl Expression {
    pub fn new(kind: ExprKind, range: SourceRange) -> Self {
        Self {
            kind,
            range,
            paren_depth: 0,
        }
    }

    /// An expression with no source position.
    pub fn synthetic(kind: ExprKind) -> Self {
        Self::new(kind, SourceRange::UNKNOWN)
    }

    pub fn empty() -> Self {
        Self::synthetic(ExprKind::Empty)
    }

    pub fn constant(value: ConstantValue, range: SourceRange) -> Self {
        Self::new(ExprKind::Constant(Constant::new(value)), range)
    }

    pub fn null(range: SourceRange) -> Self {
        Self::constant(ConstantValue::Null, range)
    }

    pub fn string(value: impl Into<String>, range: SourceRange) -> Self {
        Self::constant(ConstantValue::String(value.into()), range)
    }

    pub fn variable(name: impl Into<SmolStr>, range: SourceRange) -> Self {
        Self::new(
            ExprKind::Variable(Variable {
                name: name.into(),
                ty: None,
                modifiers: Flags::NONE,
                built_in: false,
            }),
            range,
        )
    }

    pub fn is_parenthesized(&self) -> bool {
        self.paren_depth > 0
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, ExprKind::Empty)
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match &self.kind {
            ExprKind::Variable(var) => Some(var),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match &self.kind {
            ExprKind::Constant(constant) => Some(constant),
            _ => None,
        }
    }

    /// The text of a string constant.
    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Constant(Constant {
                value: ConstantValue::String(text),
                ..
            }) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constant {
    pub value: ConstantValue,
    /// Written as a string literal (as opposed to a name used as a constant).
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub string_literal: bool,
    /// Source text of a numeric literal, kept for sign folding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal: Option<NumericLiteral>,
}

impl Constant {
    pub fn new(value: ConstantValue) -> Self {
        Self {
            value,
            string_literal: false,
            literal: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumericLiteral {
    pub text: SmolStr,
    pub floating: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ConstantValue {
    Null,
    Boolean(bool),
    String(String),
    Number(NumberValue),
    /// A numeric literal whose value failed to parse. The failure is
    /// reported once the unit is complete unless a sign fold repairs it.
    Invalid { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub name: SmolStr,
    /// Declared type; `None` for references and dynamically typed
    /// declarations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeRef>,
    #[serde(skip_serializing_if = "Flags::is_empty")]
    pub modifiers: Flags,
    /// A primitive type name used as a value (`int.class`, `int[]`).
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub built_in: bool,
}

/// Operator token carried by binary, prefix and postfix expressions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operator {
    pub text: SmolStr,
    pub range: SourceRange,
}

impl Operator {
    pub fn new(text: impl Into<SmolStr>, range: SourceRange) -> Self {
        Self {
            text: text.into(),
            range,
        }
    }

    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum ConstructorTarget {
    Type { ty: TypeRef },
    This,
    Super,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum ExprKind {
    Constant(Constant),
    Variable(Variable),
    /// A class literal such as `List<String>` used as a value.
    Class { ty: TypeRef },
    Declaration {
        /// A [`Variable`] or, for `def (a, b) = ...`, a `Tuple` of variables.
        target: Box<Expression>,
        op: Operator,
        value: Box<Expression>,
        modifiers: Flags,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        annotations: Vec<AnnotationNode>,
        /// Range of the `var` keyword when the declaration was written with
        /// it instead of `def` or a type.
        #[serde(skip_serializing_if = "Option::is_none")]
        var_keyword: Option<SourceRange>,
    },
    Property {
        object: Box<Expression>,
        property: Box<Expression>,
        safe: bool,
        spread_safe: bool,
        /// `.@` field access.
        attribute: bool,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        generics: Vec<GenericsType>,
    },
    MethodCall {
        object: Box<Expression>,
        method: Box<Expression>,
        arguments: Box<Expression>,
        implicit_this: bool,
        safe: bool,
        spread_safe: bool,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        generics: Vec<GenericsType>,
        /// Built from a command expression (`foo a, b`).
        command: bool,
    },
    ConstructorCall {
        target: ConstructorTarget,
        arguments: Box<Expression>,
        #[serde(skip_serializing_if = "Option::is_none")]
        anonymous_class: Option<String>,
    },
    MethodPointer {
        object: Box<Expression>,
        method: Box<Expression>,
    },
    MethodReference {
        object: Box<Expression>,
        method: Box<Expression>,
    },
    Binary {
        left: Box<Expression>,
        op: Operator,
        right: Box<Expression>,
        /// `?[` indexing.
        safe: bool,
    },
    Prefix {
        op: Operator,
        expr: Box<Expression>,
    },
    Postfix {
        expr: Box<Expression>,
        op: Operator,
    },
    UnaryMinus { expr: Box<Expression> },
    UnaryPlus { expr: Box<Expression> },
    Not { expr: Box<Expression> },
    BitwiseNegation { expr: Box<Expression> },
    /// A condition evaluated for its truth value.
    Boolean { expr: Box<Expression> },
    Ternary {
        cond: Box<Expression>,
        then: Box<Expression>,
        else_: Box<Expression>,
    },
    Elvis {
        cond: Box<Expression>,
        else_: Box<Expression>,
    },
    Cast {
        ty: TypeRef,
        expr: Box<Expression>,
        /// `as` coercion rather than a `(T)` cast.
        coerce: bool,
    },
    Closure {
        /// `None` when the closure declares no parameter list and takes the
        /// implicit `it`.
        parameters: Option<Vec<Parameter>>,
        code: Box<Statement>,
    },
    Lambda {
        parameters: Vec<Parameter>,
        code: Box<Statement>,
    },
    List {
        elements: Vec<Expression>,
        /// Written as a list literal, as opposed to a list synthesized for
        /// multi-element indexing.
        wrapped: bool,
    },
    Map { entries: Vec<Expression> },
    MapEntry {
        key: Box<Expression>,
        value: Box<Expression>,
    },
    Spread { expr: Box<Expression> },
    SpreadMap { expr: Box<Expression> },
    Range {
        from: Box<Expression>,
        to: Box<Expression>,
        inclusive: bool,
    },
    GString {
        verbatim: String,
        strings: Vec<Expression>,
        values: Vec<Expression>,
    },
    Tuple { elements: Vec<Expression> },
    ArgumentList { arguments: Vec<Expression> },
    /// Named arguments only: `foo(a: 1, b: 2)`.
    NamedArgumentList { entries: Vec<Expression> },
    /// The init/condition/update triple of a classic `for`.
    ClosureList { expressions: Vec<Expression> },
    Array {
        element_type: TypeRef,
        /// Size expressions, one per dimension; trailing unsized
        /// dimensions are `Empty`. `None` with an initializer.
        #[serde(skip_serializing_if = "Option::is_none")]
        sizes: Option<Vec<Expression>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        initializer: Option<Vec<Expression>>,
        ty: TypeRef,
    },
    AnnotationConstant { annotation: AnnotationNode },
    Empty,
}
