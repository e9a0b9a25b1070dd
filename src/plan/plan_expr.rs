use std::fmt::{self, Display};

use crate::catalog::SqlType;
use crate::plan::Literal;
use crate::syntax::{ArithOp, CompareOp};

/// The backend primitive language the plan emits.
///
/// These are the only operations a logical plan asks of a backend
/// expression engine; the resolver never executes them.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanExpr {
    Literal(Literal),
    /// A concrete reference to one table's column.
    Column { table: String, name: String, ty: SqlType },
    Arith { op: ArithOp, left: Box<PlanExpr>, right: Box<PlanExpr> },
    Compare { op: CompareOp, left: Box<PlanExpr>, right: Box<PlanExpr> },
    /// Inclusive range predicate, both ends.
    Between { expr: Box<PlanExpr>, low: Box<PlanExpr>, high: Box<PlanExpr> },
    /// Membership check against raw literal values.
    InList { expr: Box<PlanExpr>, list: Vec<Literal>, negated: bool },
    And { left: Box<PlanExpr>, right: Box<PlanExpr> },
    Or { left: Box<PlanExpr>, right: Box<PlanExpr> },
    /// (condition, result) branches in source order; no ELSE means NULL.
    Case { branches: Vec<(PlanExpr, PlanExpr)>, else_expr: Option<Box<PlanExpr>> },
    Cast { expr: Box<PlanExpr>, ty: SqlType },
    Aggregate { func: AggFunc, arg: Box<PlanExpr> },
    /// A ranking function applied to `target` over an explicit window.
    Window {
        func: RankFunc,
        target: Box<PlanExpr>,
        order_by: Vec<SortKey>,
        partition_by: Vec<PlanExpr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggFunc {
    Sum,
    Avg,
    Max,
    Min,
}

impl Display for AggFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggFunc::Sum => write!(f, "sum"),
            AggFunc::Avg => write!(f, "avg"),
            AggFunc::Max => write!(f, "max"),
            AggFunc::Min => write!(f, "min"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankFunc {
    Rank,
    DenseRank,
}

impl Display for RankFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankFunc::Rank => write!(f, "rank"),
            RankFunc::DenseRank => write!(f, "dense_rank"),
        }
    }
}

/// One window ordering entry; descending entries carry `ascending: false`.
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub expr: PlanExpr,
    pub ascending: bool,
}
