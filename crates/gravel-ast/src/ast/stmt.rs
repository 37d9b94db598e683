use gravel_core::SourceRange;
use serde::Serialize;
use smol_str::SmolStr;

use super::class::Parameter;
use super::expr::Expression;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub kind: StmtKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<SmolStr>,
    pub range: SourceRange,
}

impl Statement {
    pub fn new(kind: StmtKind, range: SourceRange) -> Self {
        Self {
            kind,
            labels: Vec::new(),
            range,
        }
    }

    pub fn empty() -> Self {
        Self::new(StmtKind::Empty, SourceRange::UNKNOWN)
    }

    pub fn block(statements: Vec<Statement>, range: SourceRange) -> Self {
        Self::new(StmtKind::Block { statements }, range)
    }

    pub fn expression(expr: Expression) -> Self {
        let range = expr.range;
        Self::new(StmtKind::Expression { expr }, range)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, StmtKind::Empty)
    }

    /// Statements of a block, or the statement itself.
    pub fn statements(&self) -> &[Statement] {
        match &self.kind {
            StmtKind::Block { statements } => statements,
            _ => std::slice::from_ref(self),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum StmtKind {
    Block {
        statements: Vec<Statement>,
    },
    Expression {
        expr: Expression,
    },
    If {
        cond: Expression,
        then: Box<Statement>,
        /// `Empty` when there is no `else`.
        else_: Box<Statement>,
    },
    ForIn {
        variable: Parameter,
        collection: Expression,
        body: Box<Statement>,
    },
    For {
        /// A `ClosureList` of init, condition and update.
        control: Expression,
        body: Box<Statement>,
    },
    While {
        cond: Expression,
        body: Box<Statement>,
    },
    DoWhile {
        body: Box<Statement>,
        cond: Expression,
    },
    Try {
        block: Box<Statement>,
        catches: Vec<CatchStatement>,
        #[serde(skip_serializing_if = "Option::is_none")]
        finally: Option<Box<Statement>>,
    },
    Switch {
        expr: Expression,
        cases: Vec<CaseStatement>,
        #[serde(skip_serializing_if = "Option::is_none")]
        default: Option<Box<Statement>>,
    },
    Synchronized {
        expr: Expression,
        block: Box<Statement>,
    },
    Return {
        expr: Expression,
    },
    Throw {
        expr: Expression,
    },
    Break {
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<SmolStr>,
    },
    Continue {
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<SmolStr>,
    },
    Assert {
        cond: Expression,
        /// `Empty` without a message.
        message: Expression,
    },
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatchStatement {
    pub parameter: Parameter,
    pub code: Box<Statement>,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseStatement {
    pub expr: Expression,
    pub code: Box<Statement>,
    pub range: SourceRange,
}
