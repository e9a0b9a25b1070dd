use std::fmt::Write;

use crate::catalog::SqlType;
use crate::error::ResolveError;
use crate::plan::{PartitionByClause, PlanExpr, RankFunc, SortKey};
use crate::resolve::{ColumnValue, ExprValue, Scope};
use crate::syntax::{Expr, WindowOrder};

pub struct WindowResolver;

impl WindowResolver {
    /// Build a ranking expression from a window specification.
    ///
    /// The first ORDER BY column is the ranking target; descending entries
    /// get a descending sort key; PARTITION BY columns become the window's
    /// group list (empty when absent). Each call site owns its own window.
    pub fn resolve(
        dense: bool,
        order_by: &[WindowOrder],
        partition_by: &[Expr],
        scope: &Scope,
    ) -> Result<ExprValue, ResolveError> {
        if order_by.is_empty() {
            return Err(ResolveError::MalformedQuery(
                "rank window requires an ORDER BY list".into(),
            ));
        }

        let func = if dense { RankFunc::DenseRank } else { RankFunc::Rank };

        let mut keys = Vec::with_capacity(order_by.len());
        let mut target: Option<ColumnValue> = None;
        for entry in order_by {
            let column = Self::window_column(&entry.expr, scope)?;
            if target.is_none() {
                target = Some(column.clone());
            }
            keys.push(SortKey { expr: column.plan_expr(), ascending: entry.ascending });
        }
        let target = target.expect("order list is non-empty");

        let mut partitions = Vec::with_capacity(partition_by.len());
        for expr in partition_by {
            partitions.push(PartitionByClause { column: Self::window_column(expr, scope)? });
        }

        let fingerprint = Self::fingerprint(func, &target, order_by, scope)?;
        Ok(ExprValue {
            expr: PlanExpr::Window {
                func,
                target: Box::new(target.plan_expr()),
                order_by: keys,
                partition_by: partitions.iter().map(|p| p.column.plan_expr()).collect(),
            },
            ty: SqlType::Int64,
            fingerprint,
            alias: None,
        })
    }

    fn window_column(expr: &Expr, scope: &Scope) -> Result<ColumnValue, ResolveError> {
        match expr {
            Expr::Column { qualifier, name } => scope.resolve(qualifier.as_deref(), name),
            other => Err(ResolveError::UnsupportedConstruct(format!(
                "window entry must be a column, got {:?}",
                other
            ))),
        }
    }

    fn fingerprint(
        func: RankFunc,
        target: &ColumnValue,
        order_by: &[WindowOrder],
        scope: &Scope,
    ) -> Result<String, ResolveError> {
        let mut out = format!("{}({})over(", func, target.fingerprint());
        for (i, entry) in order_by.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let column = Self::window_column(&entry.expr, scope)?;
            let _ = write!(
                out,
                "{} {}",
                column.fingerprint(),
                if entry.ascending { "asc" } else { "desc" }
            );
        }
        out.push(')');
        Ok(out)
    }
}
