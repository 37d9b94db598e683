//! Owned, grammar-shaped parse tree.
//!
//! One type per grammar production: enums for alternatives, structs for
//! sequences. Every node carries the byte range it was parsed from. The tree
//! is immutable input for AST construction and holds no semantic decisions
//! beyond what the grammar itself encodes.

use gravel_core::Span;
use smol_str::SmolStr;

use crate::syntax_kind::SyntaxKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub text: SmolStr,
    pub range: Span,
}

/// Raw literal token text, quotes and suffixes included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lit {
    pub text: SmolStr,
    pub range: Span,
}

/// An operator token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Op {
    pub kind: SyntaxKind,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    pub parts: Vec<Ident>,
    pub range: Span,
}

impl QualifiedName {
    pub fn text(&self) -> String {
        let mut out = String::new();
        for (idx, part) in self.parts.iter().enumerate() {
            if idx > 0 {
                out.push('.');
            }
            out.push_str(&part.text);
        }
        out
    }

    pub fn last(&self) -> Option<&Ident> {
        self.parts.last()
    }
}

// --- Compilation unit -------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    pub package: Option<PackageDecl>,
    pub statements: Vec<ScriptStatement>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackageDecl {
    pub annotations: Vec<Annotation>,
    pub name: QualifiedName,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub annotations: Vec<Annotation>,
    pub is_static: bool,
    pub name: QualifiedName,
    pub star: bool,
    pub alias: Option<Ident>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStatement {
    Type(TypeDecl),
    Statement(Statement),
}

// --- Modifiers & annotations ----------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Modifier {
    Keyword { kind: SyntaxKind, range: Span },
    Annotation(Box<Annotation>),
}

impl Modifier {
    pub fn range(&self) -> Span {
        match self {
            Modifier::Keyword { range, .. } => *range,
            Modifier::Annotation(annotation) => annotation.range,
        }
    }
}

/// A possibly empty modifier list. An empty list has an empty range at the
/// position where modifiers would start.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Modifiers {
    pub items: Vec<Modifier>,
    pub range: Span,
}

impl Modifiers {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub name: QualifiedName,
    pub values: Option<ElementValues>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementValues {
    Pairs(Vec<ElementValuePair>),
    Single(ElementValue),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementValuePair {
    pub name: Ident,
    pub value: ElementValue,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Expr(Expr),
    Annotation(Box<Annotation>),
    Array { values: Vec<ElementValue>, range: Span },
}

impl ElementValue {
    pub fn range(&self) -> Span {
        match self {
            ElementValue::Expr(expr) => expr.range(),
            ElementValue::Annotation(annotation) => annotation.range,
            ElementValue::Array { range, .. } => *range,
        }
    }
}

// --- Types -----------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    pub annotations: Vec<Annotation>,
    pub kind: TypeKind,
    pub dims: Vec<EmptyDim>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Primitive(Ident),
    Void(Span),
    Class(ClassOrInterfaceType),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassOrInterfaceType {
    pub name: QualifiedName,
    pub type_args: Option<TypeArguments>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmptyDim {
    pub annotations: Vec<Annotation>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeArguments {
    pub args: Vec<TypeArgument>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeArgument {
    Type(Type),
    Wildcard {
        annotations: Vec<Annotation>,
        bound: Option<(WildcardBound, Type)>,
        range: Span,
    },
}

impl TypeArgument {
    pub fn range(&self) -> Span {
        match self {
            TypeArgument::Type(ty) => ty.range,
            TypeArgument::Wildcard { range, .. } => *range,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WildcardBound {
    Extends,
    Super,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeArgumentsOrDiamond {
    Diamond(Span),
    Args(TypeArguments),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameters {
    pub params: Vec<TypeParameter>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameter {
    pub annotations: Vec<Annotation>,
    pub name: Ident,
    pub bounds: Vec<Type>,
    pub range: Span,
}

// --- Declarations ------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDeclKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Trait,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub modifiers: Modifiers,
    pub kind: TypeDeclKind,
    pub name: Ident,
    pub type_params: Option<TypeParameters>,
    pub extends: Vec<Type>,
    pub implements: Vec<Type>,
    pub body: ClassBody,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassBody {
    pub enum_constants: Vec<EnumConstant>,
    pub members: Vec<ClassBodyDecl>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumConstant {
    pub annotations: Vec<Annotation>,
    pub name: Ident,
    pub arguments: Option<Arguments>,
    pub body: Option<ClassBody>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassBodyDecl {
    Initializer {
        static_kw: Option<Span>,
        block: Block,
        range: Span,
    },
    Method(MethodDecl),
    Field(VariableDeclaration),
    Type(TypeDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MethodName {
    Identifier(Ident),
    String(Lit),
}

impl MethodName {
    pub fn range(&self) -> Span {
        match self {
            MethodName::Identifier(ident) => ident.range,
            MethodName::String(lit) => lit.range,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub modifiers: Modifiers,
    pub type_params: Option<TypeParameters>,
    pub return_type: Option<Type>,
    pub name: MethodName,
    pub params: FormalParameters,
    pub throws: Vec<Type>,
    pub default_value: Option<ElementValue>,
    pub body: Option<Block>,
    pub range: Span,
}

/// A parenthesized parameter list; `range` covers both parentheses.
#[derive(Debug, Clone, PartialEq)]
pub struct FormalParameters {
    pub params: Vec<FormalParameter>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormalParameter {
    pub modifiers: Modifiers,
    pub ty: Option<Type>,
    pub ellipsis: Option<Span>,
    pub name: Ident,
    pub default: Option<Expr>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub modifiers: Modifiers,
    pub kind: VariableDeclarationKind,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VariableDeclarationKind {
    Declarators {
        ty: Option<Type>,
        declarators: Vec<VariableDeclarator>,
    },
    /// `def (a, String b) = init`
    Tuple {
        pairs: Vec<TypeNamePair>,
        assign: Span,
        init: Box<StatementExpr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeNamePair {
    pub ty: Option<Type>,
    pub name: Ident,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarator {
    pub name: Ident,
    pub assign: Option<Span>,
    pub init: Option<StatementExpr>,
    pub range: Span,
}

// --- Statements ---------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Block(Block),
    If {
        cond: ParExpr,
        then: Box<Statement>,
        else_: Option<Box<Statement>>,
        range: Span,
    },
    For {
        control: ForControl,
        body: Box<Statement>,
        range: Span,
    },
    While {
        cond: ParExpr,
        body: Box<Statement>,
        range: Span,
    },
    DoWhile {
        body: Box<Statement>,
        cond: ParExpr,
        range: Span,
    },
    Try(TryStmt),
    Switch(SwitchStmt),
    Synchronized {
        expr: ParExpr,
        block: Block,
        range: Span,
    },
    Return {
        expr: Option<Expr>,
        range: Span,
    },
    Throw {
        expr: Expr,
        range: Span,
    },
    Break {
        label: Option<Ident>,
        range: Span,
    },
    Continue {
        label: Option<Ident>,
        range: Span,
    },
    Labeled {
        label: Ident,
        statement: Box<Statement>,
        range: Span,
    },
    Assert {
        cond: Expr,
        message: Option<Expr>,
        range: Span,
    },
    LocalVariable(VariableDeclaration),
    Expression(CommandExpr),
    Empty(Span),
    Method(MethodDecl),
    Import(ImportDecl),
}

impl Statement {
    pub fn range(&self) -> Span {
        match self {
            Statement::Block(block) => block.range,
            Statement::Try(stmt) => stmt.range,
            Statement::Switch(stmt) => stmt.range,
            Statement::LocalVariable(decl) => decl.range,
            Statement::Expression(expr) => expr.range,
            Statement::Empty(range) => *range,
            Statement::Method(method) => method.range,
            Statement::Import(import) => import.range,
            Statement::If { range, .. }
            | Statement::For { range, .. }
            | Statement::While { range, .. }
            | Statement::DoWhile { range, .. }
            | Statement::Synchronized { range, .. }
            | Statement::Return { range, .. }
            | Statement::Throw { range, .. }
            | Statement::Break { range, .. }
            | Statement::Continue { range, .. }
            | Statement::Labeled { range, .. }
            | Statement::Assert { range, .. } => *range,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForControl {
    Enhanced {
        modifiers: Modifiers,
        ty: Option<Type>,
        name: Ident,
        expr: Expr,
        range: Span,
    },
    Classic {
        init: Option<ForInit>,
        cond: Option<Expr>,
        update: Vec<ExpressionListElement>,
        range: Span,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Declaration(VariableDeclaration),
    Expressions(Vec<ExpressionListElement>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryStmt {
    pub resources: Option<Resources>,
    pub block: Block,
    pub catches: Vec<CatchClause>,
    pub finally: Option<Block>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resources {
    pub list: Vec<Resource>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Declaration(VariableDeclaration),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub modifiers: Modifiers,
    pub types: Vec<QualifiedName>,
    pub name: Ident,
    pub block: Block,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    pub expr: ParExpr,
    pub groups: Vec<SwitchGroup>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchGroup {
    pub labels: Vec<SwitchLabel>,
    pub statements: Vec<Statement>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SwitchLabel {
    Case { expr: Expr, range: Span },
    Default(Span),
}

// --- Expressions ----------------------------------------------------------------

/// `expression argumentList? commandArgument*`, the statement-level form.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandExpr {
    pub expr: Expr,
    pub args: Option<ArgumentList>,
    pub command_args: Vec<CommandArgument>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandArgument {
    pub primary: Primary,
    pub tail: CommandArgumentTail,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandArgumentTail {
    None,
    Path(Vec<PathElement>),
    Args(ArgumentList),
}

/// A command expression or a standard lambda.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementExpr {
    Command(CommandExpr),
    Lambda(Lambda),
}

impl StatementExpr {
    pub fn range(&self) -> Span {
        match self {
            StatementExpr::Command(cmd) => cmd.range,
            StatementExpr::Lambda(lambda) => lambda.range,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParExpr {
    pub inner: Box<StatementExpr>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Path(PathExpr),
    Postfix {
        expr: Box<Expr>,
        op: Op,
        range: Span,
    },
    /// `++x`, `--x`
    Prefix {
        op: Op,
        expr: Box<Expr>,
        range: Span,
    },
    /// `+x`, `-x`
    UnaryAdd {
        op: Op,
        expr: Box<Expr>,
        range: Span,
    },
    /// `!x`, `~x`
    UnaryNot {
        op: Op,
        expr: Box<Expr>,
        range: Span,
    },
    Cast {
        ty: Type,
        paren_range: Span,
        expr: Box<Expr>,
        range: Span,
    },
    Binary {
        lhs: Box<Expr>,
        op: Op,
        rhs: Box<Expr>,
        range: Span,
    },
    /// `x instanceof T`, `x !instanceof T`
    InstanceOf {
        expr: Box<Expr>,
        op: Op,
        ty: Type,
        range: Span,
    },
    As {
        expr: Box<Expr>,
        op: Op,
        ty: Type,
        range: Span,
    },
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        else_: Box<Expr>,
        range: Span,
    },
    Elvis {
        cond: Box<Expr>,
        op: Op,
        else_: Box<Expr>,
        range: Span,
    },
    MultipleAssignment {
        names: Vec<Ident>,
        names_range: Span,
        op: Op,
        rhs: Box<StatementExpr>,
        range: Span,
    },
    Assignment {
        lhs: Box<Expr>,
        op: Op,
        rhs: Box<StatementExpr>,
        range: Span,
    },
}

impl Expr {
    pub fn range(&self) -> Span {
        match self {
            Expr::Path(path) => path.range,
            Expr::Postfix { range, .. }
            | Expr::Prefix { range, .. }
            | Expr::UnaryAdd { range, .. }
            | Expr::UnaryNot { range, .. }
            | Expr::Cast { range, .. }
            | Expr::Binary { range, .. }
            | Expr::InstanceOf { range, .. }
            | Expr::As { range, .. }
            | Expr::Conditional { range, .. }
            | Expr::Elvis { range, .. }
            | Expr::MultipleAssignment { range, .. }
            | Expr::Assignment { range, .. } => *range,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathExpr {
    pub primary: Primary,
    pub elements: Vec<PathElement>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primary {
    Identifier {
        name: Ident,
        type_args: Option<TypeArguments>,
    },
    Literal(Literal),
    GString(GString),
    New {
        new_kw: Span,
        creator: Creator,
        range: Span,
    },
    This(Span),
    Super(Span),
    Paren(ParExpr),
    Closure(Closure),
    Lambda(Lambda),
    List(ListLit),
    Map(MapLit),
    BuiltInType(Ident),
}

impl Primary {
    pub fn range(&self) -> Span {
        match self {
            Primary::Identifier { name, type_args } => match type_args {
                Some(args) => name.range.cover(args.range),
                None => name.range,
            },
            Primary::Literal(lit) => lit.range(),
            Primary::GString(gstring) => gstring.range,
            Primary::New { range, .. } => *range,
            Primary::This(range) | Primary::Super(range) => *range,
            Primary::Paren(par) => par.range,
            Primary::Closure(closure) => closure.range,
            Primary::Lambda(lambda) => lambda.range,
            Primary::List(list) => list.range,
            Primary::Map(map) => map.range,
            Primary::BuiltInType(ident) => ident.range,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(Lit),
    Floating(Lit),
    String(Lit),
    Boolean(bool, Span),
    Null(Span),
}

impl Literal {
    pub fn range(&self) -> Span {
        match self {
            Literal::Integer(lit) | Literal::Floating(lit) | Literal::String(lit) => lit.range,
            Literal::Boolean(_, range) | Literal::Null(range) => *range,
        }
    }
}

/// `GStringBegin value (GStringPart value)* GStringEnd`.
///
/// `parts` holds the `GStringPart` tokens; there is always one more value
/// than parts.
#[derive(Debug, Clone, PartialEq)]
pub struct GString {
    pub begin: Lit,
    pub values: Vec<GStringValue>,
    pub parts: Vec<Lit>,
    pub end: Lit,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GStringValue {
    Path {
        name: Ident,
        parts: Vec<Lit>,
        range: Span,
    },
    Closure(Closure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberAccess {
    Dot,
    SafeDot,
    SafeChainDot,
    SpreadDot,
    MethodPointer,
    MethodReference,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathElement {
    Member {
        access: MemberAccess,
        op_range: Span,
        attribute: bool,
        type_args: Option<TypeArguments>,
        name: NamePart,
        range: Span,
    },
    /// `outer.new Inner()`
    New { creator: Creator, range: Span },
    Arguments(Arguments),
    Closure(Closure),
    Index {
        safe: bool,
        elements: Vec<ExpressionListElement>,
        range: Span,
    },
    NamedIndex {
        safe: bool,
        entries: Vec<MapEntry>,
        range: Span,
    },
}

impl PathElement {
    pub fn range(&self) -> Span {
        match self {
            PathElement::Member { range, .. }
            | PathElement::New { range, .. }
            | PathElement::Index { range, .. }
            | PathElement::NamedIndex { range, .. } => *range,
            PathElement::Arguments(args) => args.range,
            PathElement::Closure(closure) => closure.range,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NamePart {
    Identifier(Ident),
    String(Lit),
    Paren(ParExpr),
    GString(GString),
    Keyword(Ident),
}

impl NamePart {
    pub fn range(&self) -> Span {
        match self {
            NamePart::Identifier(ident) | NamePart::Keyword(ident) => ident.range,
            NamePart::String(lit) => lit.range,
            NamePart::Paren(par) => par.range,
            NamePart::GString(gstring) => gstring.range,
        }
    }
}

/// A parenthesized argument list; `range` covers both parentheses.
#[derive(Debug, Clone, PartialEq)]
pub struct Arguments {
    pub list: Option<ArgumentList>,
    pub trailing_comma: Option<Span>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentList {
    pub elements: Vec<ArgumentListElement>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentListElement {
    Expr(ExpressionListElement),
    Lambda(Lambda),
    MapEntry(MapEntry),
}

impl ArgumentListElement {
    pub fn range(&self) -> Span {
        match self {
            ArgumentListElement::Expr(element) => element.range,
            ArgumentListElement::Lambda(lambda) => lambda.range,
            ArgumentListElement::MapEntry(entry) => entry.range,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionListElement {
    pub spread: Option<Span>,
    pub expr: Expr,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListLit {
    pub elements: Vec<ExpressionListElement>,
    pub trailing_comma: Option<Span>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapLit {
    pub entries: Vec<MapEntry>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: MapEntryKey,
    pub value: Expr,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapEntryKey {
    Keyword(Ident),
    Primary(Primary),
    /// `*:`
    Spread(Span),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Closure {
    pub params: Option<ClosureParams>,
    pub statements: Vec<Statement>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosureParams {
    pub params: Vec<FormalParameter>,
    pub arrow: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub params: LambdaParams,
    pub arrow: Span,
    pub body: LambdaBody,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LambdaParams {
    Parenthesized(FormalParameters),
    Single(Ident),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LambdaBody {
    Block(Block),
    Expr(Box<StatementExpr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Creator {
    pub name: CreatedName,
    pub kind: CreatorKind,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedName {
    pub annotations: Vec<Annotation>,
    pub kind: CreatedNameKind,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CreatedNameKind {
    Primitive(Ident),
    Class {
        name: QualifiedName,
        type_args: Option<TypeArgumentsOrDiamond>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CreatorKind {
    Object {
        args: Arguments,
        body: Option<ClassBody>,
    },
    Array {
        dims: Vec<Dim>,
        init: Option<ArrayInitializer>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dim {
    pub annotations: Vec<Annotation>,
    pub lbracket: Span,
    pub size: Option<Expr>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayInitializer {
    pub elements: Vec<StatementExpr>,
    pub range: Span,
}
