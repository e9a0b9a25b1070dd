use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::catalog::SqlType;
use crate::error::ResolveError;
use crate::plan::{AggFunc, PlanExpr};
use crate::resolve::{AggregateValue, ColumnValue};

static SUM_AGGREGATIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| HashSet::from(["sum"]));
static AVG_AGGREGATIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| HashSet::from(["avg", "mean"]));
static MAX_AGGREGATIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| HashSet::from(["max", "maximum"]));
static MIN_AGGREGATIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| HashSet::from(["min", "minimum"]));

pub struct AggregateResolver;

impl AggregateResolver {
    pub fn is_aggregate_name(name: &str) -> bool {
        let lname = name.to_ascii_lowercase();
        let lname = lname.as_str();
        SUM_AGGREGATIONS.contains(lname)
            || AVG_AGGREGATIONS.contains(lname)
            || MAX_AGGREGATIONS.contains(lname)
            || MIN_AGGREGATIONS.contains(lname)
    }

    /// Lower an aggregate call site over a resolved column.
    ///
    /// Numeric-only classes (sum, avg) are checked first and reject
    /// non-numeric columns; an unrecognized name has no lowering at all.
    pub fn apply(name: &str, column: &ColumnValue) -> Result<AggregateValue, ResolveError> {
        let lname = name.to_ascii_lowercase();
        let numeric = SUM_AGGREGATIONS.contains(lname.as_str()) || AVG_AGGREGATIONS.contains(lname.as_str());
        if numeric && !column.effective_ty().is_numeric() {
            return Err(ResolveError::TypeMismatch {
                what: format!("aggregation {}", lname),
                column: format!("{}.{}", column.table, column.name),
                ty: column.effective_ty().to_string(),
            });
        }

        let (func, ty) = if SUM_AGGREGATIONS.contains(lname.as_str()) {
            (AggFunc::Sum, column.effective_ty())
        } else if AVG_AGGREGATIONS.contains(lname.as_str()) {
            (AggFunc::Avg, SqlType::Float64)
        } else if MAX_AGGREGATIONS.contains(lname.as_str()) {
            (AggFunc::Max, column.effective_ty())
        } else if MIN_AGGREGATIONS.contains(lname.as_str()) {
            (AggFunc::Min, column.effective_ty())
        } else {
            return Err(ResolveError::UnsupportedConstruct(format!(
                "aggregation {} not implemented",
                name
            )));
        };

        Ok(AggregateValue {
            expr: PlanExpr::Aggregate { func, arg: Box::new(column.plan_expr()) },
            ty,
            fingerprint: format!("{}({})", func, column.fingerprint()),
            alias: column.alias.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, ty: SqlType) -> ColumnValue {
        ColumnValue {
            table: "forest_fires".into(),
            name: name.into(),
            written: name.into(),
            ty,
            cast_ty: None,
            alias: None,
        }
    }

    #[test]
    fn dialect_synonyms_share_one_class() {
        for name in ["avg", "AVG", "mean"] {
            let agg = AggregateResolver::apply(name, &col("temp", SqlType::Float64)).unwrap();
            assert!(matches!(agg.expr, PlanExpr::Aggregate { func: AggFunc::Avg, .. }));
            assert_eq!(agg.ty, SqlType::Float64);
        }
        for name in ["maximum", "max"] {
            let agg = AggregateResolver::apply(name, &col("month", SqlType::String)).unwrap();
            assert!(matches!(agg.expr, PlanExpr::Aggregate { func: AggFunc::Max, .. }));
            assert_eq!(agg.ty, SqlType::String);
        }
    }

    #[test]
    fn sum_of_non_numeric_column_names_the_offender() {
        let err = AggregateResolver::apply("sum", &col("month", SqlType::String)).unwrap_err();
        match err {
            ResolveError::TypeMismatch { what, column, ty } => {
                assert_eq!(what, "aggregation sum");
                assert_eq!(column, "forest_fires.month");
                assert_eq!(ty, "string");
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn unknown_aggregation_is_unsupported() {
        let err = AggregateResolver::apply("median", &col("temp", SqlType::Float64)).unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnsupportedConstruct("aggregation median not implemented".into())
        );
    }

    #[test]
    fn aggregate_keeps_the_column_alias_and_fingerprints_canonically() {
        let mut c = col("temp", SqlType::Float64);
        c.alias = Some("hottest".into());
        let agg = AggregateResolver::apply("max", &c).unwrap();
        assert_eq!(agg.alias.as_deref(), Some("hottest"));
        assert_eq!(agg.fingerprint, "max(forest_fires.temp)");
    }
}
