use serde::Serialize;

/// Token kinds produced by the lexer.
///
/// Identifiers starting with an uppercase letter get their own kind so that
/// speculative decisions can be memoised on token kinds alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SyntaxKind {
    // --- Layout ---
    Nl,
    Eof,

    // --- Identifiers & literals ---
    Identifier,
    CapitalizedIdentifier,
    IntegerLiteral,
    FloatingLiteral,
    StringLiteral,
    GStringBegin,
    GStringPart,
    GStringEnd,
    GStringPathPart,

    // --- Keywords ---
    AbstractKw,
    AsKw,
    AssertKw,
    BooleanKw,
    BreakKw,
    ByteKw,
    CaseKw,
    CatchKw,
    CharKw,
    ClassKw,
    ConstKw,
    ContinueKw,
    DefKw,
    DefaultKw,
    DoKw,
    DoubleKw,
    ElseKw,
    EnumKw,
    ExtendsKw,
    FalseKw,
    FinalKw,
    FinallyKw,
    FloatKw,
    ForKw,
    GotoKw,
    IfKw,
    ImplementsKw,
    ImportKw,
    InKw,
    InstanceofKw,
    IntKw,
    InterfaceKw,
    LongKw,
    NativeKw,
    NewKw,
    NullKw,
    PackageKw,
    PrivateKw,
    ProtectedKw,
    PublicKw,
    ReturnKw,
    ShortKw,
    StaticKw,
    StrictfpKw,
    SuperKw,
    SwitchKw,
    SynchronizedKw,
    ThisKw,
    ThreadsafeKw,
    ThrowKw,
    ThrowsKw,
    TraitKw,
    TransientKw,
    TrueKw,
    TryKw,
    VarKw,
    VoidKw,
    VolatileKw,
    WhileKw,

    // --- Separators ---
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    At,

    // --- Navigation ---
    SafeDot,
    SafeChainDot,
    SpreadDot,
    MethodPointer,
    MethodReference,
    SafeIndex,
    Range,
    RangeExclusive,
    Ellipsis,
    Arrow,

    // --- Operators ---
    Assign,
    Gt,
    Lt,
    Bang,
    Tilde,
    Question,
    Colon,
    Elvis,
    EqEq,
    Identical,
    NotEq,
    NotIdentical,
    LtEq,
    GtEq,
    Spaceship,
    AmpAmp,
    PipePipe,
    PlusPlus,
    MinusMinus,
    Plus,
    Minus,
    Star,
    Slash,
    Amp,
    Pipe,
    Caret,
    Percent,
    Power,
    RegexFind,
    RegexMatch,
    NotInstanceof,
    NotIn,

    // --- Assignment operators ---
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    AmpEq,
    PipeEq,
    CaretEq,
    PercentEq,
    ShlEq,
    ShrEq,
    UShrEq,
    PowerEq,
    ElvisEq,

    // --- Composed by the parser from adjacent `<`/`>` tokens ---
    Shl,
    Shr,
    UShr,
}

impl SyntaxKind {
    /// Tokens the grammar accepts wherever it expects an identifier.
    pub fn is_identifier_like(self) -> bool {
        matches!(
            self,
            SyntaxKind::Identifier
                | SyntaxKind::CapitalizedIdentifier
                | SyntaxKind::VarKw
                | SyntaxKind::InKw
                | SyntaxKind::TraitKw
                | SyntaxKind::AsKw
        )
    }

    pub fn is_keyword(self) -> bool {
        self >= SyntaxKind::AbstractKw && self <= SyntaxKind::WhileKw
    }

    pub fn is_primitive_type(self) -> bool {
        matches!(
            self,
            SyntaxKind::BooleanKw
                | SyntaxKind::ByteKw
                | SyntaxKind::CharKw
                | SyntaxKind::ShortKw
                | SyntaxKind::IntKw
                | SyntaxKind::LongKw
                | SyntaxKind::FloatKw
                | SyntaxKind::DoubleKw
        )
    }

    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            SyntaxKind::PublicKw
                | SyntaxKind::ProtectedKw
                | SyntaxKind::PrivateKw
                | SyntaxKind::StaticKw
                | SyntaxKind::AbstractKw
                | SyntaxKind::FinalKw
                | SyntaxKind::StrictfpKw
                | SyntaxKind::DefaultKw
                | SyntaxKind::NativeKw
                | SyntaxKind::SynchronizedKw
                | SyntaxKind::TransientKw
                | SyntaxKind::VolatileKw
                | SyntaxKind::DefKw
                | SyntaxKind::VarKw
        )
    }

    pub fn is_assignment_operator(self) -> bool {
        matches!(
            self,
            SyntaxKind::Assign
                | SyntaxKind::PlusEq
                | SyntaxKind::MinusEq
                | SyntaxKind::StarEq
                | SyntaxKind::SlashEq
                | SyntaxKind::AmpEq
                | SyntaxKind::PipeEq
                | SyntaxKind::CaretEq
                | SyntaxKind::PercentEq
                | SyntaxKind::ShlEq
                | SyntaxKind::ShrEq
                | SyntaxKind::UShrEq
                | SyntaxKind::PowerEq
                | SyntaxKind::ElvisEq
        )
    }

    /// Kinds after which a `/` starts a slashy string rather than a division.
    pub fn allows_regex_after(self) -> bool {
        !matches!(
            self,
            SyntaxKind::Identifier
                | SyntaxKind::CapitalizedIdentifier
                | SyntaxKind::IntegerLiteral
                | SyntaxKind::FloatingLiteral
                | SyntaxKind::StringLiteral
                | SyntaxKind::GStringEnd
                | SyntaxKind::RParen
                | SyntaxKind::RBracket
                | SyntaxKind::RBrace
                | SyntaxKind::PlusPlus
                | SyntaxKind::MinusMinus
                | SyntaxKind::ThisKw
                | SyntaxKind::SuperKw
                | SyntaxKind::NullKw
                | SyntaxKind::TrueKw
                | SyntaxKind::FalseKw
        )
    }

    pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
        Some(match text {
            "abstract" => SyntaxKind::AbstractKw,
            "as" => SyntaxKind::AsKw,
            "assert" => SyntaxKind::AssertKw,
            "boolean" => SyntaxKind::BooleanKw,
            "break" => SyntaxKind::BreakKw,
            "byte" => SyntaxKind::ByteKw,
            "case" => SyntaxKind::CaseKw,
            "catch" => SyntaxKind::CatchKw,
            "char" => SyntaxKind::CharKw,
            "class" => SyntaxKind::ClassKw,
            "const" => SyntaxKind::ConstKw,
            "continue" => SyntaxKind::ContinueKw,
            "def" => SyntaxKind::DefKw,
            "default" => SyntaxKind::DefaultKw,
            "do" => SyntaxKind::DoKw,
            "double" => SyntaxKind::DoubleKw,
            "else" => SyntaxKind::ElseKw,
            "enum" => SyntaxKind::EnumKw,
            "extends" => SyntaxKind::ExtendsKw,
            "false" => SyntaxKind::FalseKw,
            "final" => SyntaxKind::FinalKw,
            "finally" => SyntaxKind::FinallyKw,
            "float" => SyntaxKind::FloatKw,
            "for" => SyntaxKind::ForKw,
            "goto" => SyntaxKind::GotoKw,
            "if" => SyntaxKind::IfKw,
            "implements" => SyntaxKind::ImplementsKw,
            "import" => SyntaxKind::ImportKw,
            "in" => SyntaxKind::InKw,
            "instanceof" => SyntaxKind::InstanceofKw,
            "int" => SyntaxKind::IntKw,
            "interface" => SyntaxKind::InterfaceKw,
            "long" => SyntaxKind::LongKw,
            "native" => SyntaxKind::NativeKw,
            "new" => SyntaxKind::NewKw,
            "null" => SyntaxKind::NullKw,
            "package" => SyntaxKind::PackageKw,
            "private" => SyntaxKind::PrivateKw,
            "protected" => SyntaxKind::ProtectedKw,
            "public" => SyntaxKind::PublicKw,
            "return" => SyntaxKind::ReturnKw,
            "short" => SyntaxKind::ShortKw,
            "static" => SyntaxKind::StaticKw,
            "strictfp" => SyntaxKind::StrictfpKw,
            "super" => SyntaxKind::SuperKw,
            "switch" => SyntaxKind::SwitchKw,
            "synchronized" => SyntaxKind::SynchronizedKw,
            "this" => SyntaxKind::ThisKw,
            "threadsafe" => SyntaxKind::ThreadsafeKw,
            "throw" => SyntaxKind::ThrowKw,
            "throws" => SyntaxKind::ThrowsKw,
            "trait" => SyntaxKind::TraitKw,
            "transient" => SyntaxKind::TransientKw,
            "true" => SyntaxKind::TrueKw,
            "try" => SyntaxKind::TryKw,
            "var" => SyntaxKind::VarKw,
            "void" => SyntaxKind::VoidKw,
            "volatile" => SyntaxKind::VolatileKw,
            "while" => SyntaxKind::WhileKw,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::SyntaxKind;

    #[test]
    fn keyword_range_is_contiguous() {
        assert!(SyntaxKind::AbstractKw.is_keyword());
        assert!(SyntaxKind::WhileKw.is_keyword());
        assert!(SyntaxKind::TraitKw.is_keyword());
        assert!(!SyntaxKind::Identifier.is_keyword());
        assert!(!SyntaxKind::LParen.is_keyword());
    }

    #[test]
    fn contextual_keywords_are_identifier_like() {
        for text in ["var", "in", "trait", "as"] {
            let kind = SyntaxKind::from_keyword(text).unwrap();
            assert!(kind.is_identifier_like(), "{text}");
        }
        assert!(!SyntaxKind::DefKw.is_identifier_like());
    }
}
