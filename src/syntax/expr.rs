use crate::syntax::{ArithOp, CompareOp};

/// One scalar syntax node as handed over by the external grammar.
///
/// The resolver is polymorphic over node kind: it dispatches by variant and
/// never inspects how the tree was produced. Operator precedence and
/// parenthesization are already encoded in the tree shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Float(f64),
    StringLit(String),
    BoolLit(bool),
    Null,

    /// A column reference, optionally table-qualified (`alias.column`).
    Column { qualifier: Option<String>, name: String },
    /// `*` or `alias.*`; reserved, never subject to ambiguity.
    Star { qualifier: Option<String> },

    Arith { op: ArithOp, left: Box<Expr>, right: Box<Expr> },
    Compare { op: CompareOp, left: Box<Expr>, right: Box<Expr> },
    Between { expr: Box<Expr>, low: Box<Expr>, high: Box<Expr> },
    InList { expr: Box<Expr>, list: Vec<Expr>, negated: bool },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),

    Case { branches: Vec<CaseBranch>, else_expr: Option<Box<Expr>> },
    Cast { expr: Box<Expr>, type_name: String },

    /// An aggregate-function call site (`sum(x)`, `avg(x)`, ...).
    Call { name: String, arg: Box<Expr> },
    /// `RANK() OVER (...)` / `DENSE_RANK() OVER (...)`.
    Rank { dense: bool, order_by: Vec<WindowOrder>, partition_by: Vec<Expr> },

    Now,
    Today,
    /// `timestamp(date, time)` with fixed calendar/time components.
    Timestamp { date: (i32, u32, u32), time: (u32, u32, u32) },
}

/// One `WHEN condition THEN result` pair, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseBranch {
    pub condition: Expr,
    pub result: Expr,
}

/// One entry of a window's ORDER BY list.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowOrder {
    pub expr: Expr,
    pub ascending: bool,
}

impl Expr {
    pub fn column(name: &str) -> Expr {
        Expr::Column { qualifier: None, name: name.to_string() }
    }

    pub fn qualified(qualifier: &str, name: &str) -> Expr {
        Expr::Column { qualifier: Some(qualifier.to_string()), name: name.to_string() }
    }
}
