//! Typed syntax tree for expression sources.

/// 1-based source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Subscript of a variable or detail reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Index {
    /// `x[3]`
    Integer(usize),
    /// `x[i]`, bound by an enclosing aggregate.
    Local(String),
    /// `x['name']`
    OptionName(String),
}

/// Range of an aggregate loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Domain {
    /// `i in x`
    Variable(String),
    /// `i in $detail`
    Detail(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Number(f64),
    Variable {
        name: String,
        index: Option<Index>,
    },
    Detail {
        name: String,
        index: Option<Index>,
    },
    Fragment(String),
    Call {
        function: String,
        args: Vec<Expr>,
    },
    Aggregate {
        function: String,
        local: String,
        domain: Domain,
        body: Box<Expr>,
    },
    Filter {
        detail: String,
        body: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub position: Position,
}

impl Expr {
    pub fn new(kind: ExprKind, position: Position) -> Self {
        Self { kind, position }
    }
}

/// A bracketed expression with its numeric bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintAst {
    pub expr: Expr,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}
