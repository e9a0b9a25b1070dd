//! Semantic resolver and logical-plan builder for parsed SQL syntax trees.
//!
//! The input is a syntax tree produced by an external parser together with a
//! read-only catalog of table schemas. The output is a [`LogicalPlan`]: every
//! identifier resolved, every expression typed, every clause lowered into a
//! backend-agnostic form a query engine can execute without consulting the
//! catalog again.

pub mod catalog;
pub use catalog::{CatalogView, ColumnInfo, SqlType, TableSchema};

pub mod error;
pub use error::ResolveError;

pub mod syntax;
pub use syntax::{
    ArithOp, CaseBranch, CompareOp, Expr, Join, JoinType, OrderItem, Query, SelectItem,
    SelectStmt, SetOpKind, TableFactor, WindowOrder,
};

pub mod resolve;
pub use resolve::{
    AggregateResolver, ColumnOrigin, ColumnValue, ExpressionBuilder, Scope, TableRef, Value,
    WindowResolver,
};

pub mod plan;
pub use plan::{
    FromSource, Literal, LogicalPlan, PlanAssembler, PlanExpr, SelectEntry, SetOperation,
};

/// Resolve one parsed query against a catalog and build its logical plan.
///
/// This is the whole public surface for callers that do not need the
/// intermediate resolution types.
pub fn plan_query(query: &Query, catalog: &dyn CatalogView) -> Result<LogicalPlan, ResolveError> {
    let span = tracing::trace_span!("plan_query");
    let _guard = span.enter();
    let plan = PlanAssembler::assemble(query, catalog)?;
    tracing::trace!(outputs = plan.select.len(), "logical plan assembled");
    Ok(plan)
}
