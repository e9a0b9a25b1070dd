use crate::catalog::CatalogView;
use crate::error::ResolveError;
use crate::plan::{
    AliasClause, FromSource, GroupByClause, HavingClause, LimitClause, LogicalPlan, OrderByClause,
    SelectEntry, SetOperation, WhereClause,
};
use crate::resolve::{ExpressionBuilder, Scope, TableRef, Value};
use crate::syntax::{Expr, JoinType, Query, SelectStmt, TableFactor};

/// Combines resolved clause objects into one logical plan.
///
/// The assembler owns the plan exclusively during construction; once
/// returned it is read-only and belongs to the backend collaborator.
pub struct PlanAssembler;

impl PlanAssembler {
    pub fn assemble(query: &Query, catalog: &dyn CatalogView) -> Result<LogicalPlan, ResolveError> {
        match query {
            Query::Select(stmt) => Self::assemble_select(stmt, catalog),
            // each side is resolved independently, with its own scope,
            // ORDER BY and LIMIT applying before the set operation
            Query::SetOp { kind, all, left, right } => {
                let mut plan = Self::assemble(left, catalog)?;
                let right = Self::assemble(right, catalog)?;
                plan.set_ops.push(SetOperation { kind: *kind, distinct: !*all, plan: Box::new(right) });
                Ok(plan)
            }
        }
    }

    fn assemble_select(stmt: &SelectStmt, catalog: &dyn CatalogView) -> Result<LogicalPlan, ResolveError> {
        if stmt.from.is_empty() {
            return Err(ResolveError::MalformedQuery("query has no FROM source".into()));
        }

        // scope covers FROM and JOIN tables, in written order
        let mut tables = Vec::with_capacity(stmt.from.len() + stmt.joins.len());
        for factor in &stmt.from {
            tables.push(Self::table_ref(factor, catalog)?);
        }
        for join in &stmt.joins {
            tables.push(Self::table_ref(&join.factor, catalog)?);
        }
        let scope = Scope::new(tables);

        // FROM/JOIN tree: implicit multi-table FROM chains as CROSS joins
        let mut refs = scope.tables.iter();
        let mut from = Self::from_source(refs.next().expect("from is non-empty"));
        for _ in 1..stmt.from.len() {
            let right = Self::from_source(refs.next().expect("ref per FROM item"));
            from = FromSource::Join {
                left: Box::new(from),
                right: Box::new(right),
                join_type: JoinType::Cross,
                on: None,
            };
        }
        for join in &stmt.joins {
            let right = Self::from_source(refs.next().expect("ref per JOIN item"));
            let on = match &join.on {
                Some(expr) => Some(ExpressionBuilder::build_predicate(expr, &scope)?),
                None => None,
            };
            from = FromSource::Join {
                left: Box::new(from),
                right: Box::new(right),
                join_type: join.join_type,
                on,
            };
        }

        // select list, written order preserved; * expands in FROM order
        let mut select = Vec::with_capacity(stmt.projection.len());
        for item in &stmt.projection {
            if let Expr::Star { qualifier } = &item.expr {
                for column in scope.expand_star(qualifier.as_deref())? {
                    let value = Value::Column(column);
                    let label = value.label(select.len());
                    select.push(SelectEntry { value, label });
                }
                continue;
            }
            let mut value = ExpressionBuilder::build(&item.expr, &scope)?;
            if let Some(alias) = &item.alias {
                value.set_alias(AliasClause { alias: alias.clone() });
            }
            let label = value.label(select.len());
            select.push(SelectEntry { value, label });
        }

        let mut plan = LogicalPlan::new(select, from);
        plan.distinct = stmt.distinct;

        if let Some(expr) = &stmt.where_clause {
            plan.filter = Some(WhereClause { predicate: ExpressionBuilder::build_predicate(expr, &scope)? });
        }

        for expr in &stmt.group_by {
            match ExpressionBuilder::build(expr, &scope)? {
                Value::Column(key) => plan.group_by.push(GroupByClause { key }),
                other => {
                    return Err(ResolveError::MalformedQuery(format!(
                        "GROUP BY entries must be columns, got {}",
                        other.fingerprint()
                    )));
                }
            }
        }

        if let Some(expr) = &stmt.having {
            plan.having = Some(HavingClause { predicate: ExpressionBuilder::build_predicate(expr, &scope)? });
        }

        for item in &stmt.order_by {
            // select-list aliases win over scope columns
            let wanted = item.name.to_ascii_lowercase();
            let aliased = plan
                .select
                .iter()
                .find(|entry| entry.label.to_ascii_lowercase() == wanted)
                .map(|entry| entry.value.clone());
            let value = match aliased {
                Some(value) => value,
                None => Value::Column(Self::order_target(&item.name, &scope)?),
            };
            plan.order_by.push(OrderByClause { value, ascending: item.ascending });
        }

        if let Some(count) = stmt.limit {
            plan.limit = Some(LimitClause { count });
        }

        Ok(plan)
    }

    fn order_target(name: &str, scope: &Scope) -> Result<crate::resolve::ColumnValue, ResolveError> {
        match name.split_once('.') {
            Some((qualifier, column)) => scope.resolve(Some(qualifier), column),
            None => scope.resolve(None, name),
        }
    }

    fn table_ref(factor: &TableFactor, catalog: &dyn CatalogView) -> Result<TableRef, ResolveError> {
        match factor {
            TableFactor::Table { name, alias } => {
                let schema = catalog
                    .table(name)
                    .ok_or_else(|| ResolveError::UnknownTable(name.clone()))?;
                let visible = alias.clone().unwrap_or_else(|| name.clone());
                Ok(TableRef::Base { visible, schema })
            }
            TableFactor::Derived { query, alias } => {
                // independent nested plan: only its output columns are
                // visible outside, under the alias
                let plan = Self::assemble(query, catalog)?;
                let schema = plan.output_schema(alias);
                Ok(TableRef::Derived { visible: alias.clone(), plan: Box::new(plan), schema })
            }
        }
    }

    fn from_source(table: &TableRef) -> FromSource {
        match table {
            TableRef::Base { visible, schema } => FromSource::Table {
                backing: schema.name.clone(),
                visible: visible.clone(),
            },
            TableRef::Derived { visible, plan, .. } => FromSource::Derived {
                visible: visible.clone(),
                plan: plan.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{SqlType, TableSchema};
    use crate::plan::{AggFunc, PlanExpr};
    use crate::syntax::{CompareOp, Join, OrderItem, SelectItem, SetOpKind};
    use std::collections::HashMap;

    // ---- minimal catalog fixtures ----
    struct TestCatalog {
        by_name: HashMap<String, TableSchema>,
    }
    impl TestCatalog {
        fn new() -> Self {
            Self { by_name: HashMap::new() }
        }
        fn with(mut self, schema: TableSchema) -> Self {
            self.by_name.insert(schema.name.to_ascii_lowercase(), schema);
            self
        }
    }
    impl CatalogView for TestCatalog {
        fn table(&self, name: &str) -> Option<TableSchema> {
            self.by_name.get(name.to_ascii_lowercase().as_str()).cloned()
        }
    }

    fn catalog() -> TestCatalog {
        TestCatalog::new()
            .with(
                TableSchema::new("forest_fires")
                    .with_column("temp", SqlType::Float64)
                    .with_column("RH", SqlType::Int64)
                    .with_column("wind", SqlType::Float64)
                    .with_column("rain", SqlType::Float64)
                    .with_column("day", SqlType::String)
                    .with_column("month", SqlType::String),
            )
            .with(
                TableSchema::new("digimon_mon_list")
                    .with_column("Attribute", SqlType::String)
                    .with_column("Digimon", SqlType::String)
                    .with_column("wind", SqlType::Float64),
            )
    }

    fn select(projection: Vec<SelectItem>, from: Vec<TableFactor>) -> SelectStmt {
        SelectStmt { projection, from, ..SelectStmt::default() }
    }

    fn call(name: &str, column: &str) -> Expr {
        Expr::Call { name: name.into(), arg: Box::new(Expr::column(column)) }
    }

    // select temp, RH as humidity from forest_fires
    #[test]
    fn plan_for_projection_with_alias() {
        let stmt = select(
            vec![
                SelectItem::bare(Expr::column("temp")),
                SelectItem::aliased(Expr::column("RH"), "humidity"),
            ],
            vec![TableFactor::table("forest_fires")],
        );
        let plan = PlanAssembler::assemble(&Query::Select(stmt), &catalog()).expect("plan");

        assert_eq!(plan.select.len(), 2);
        assert_eq!(plan.select[0].label, "temp");
        assert_eq!(plan.select[1].label, "humidity");
        match &plan.select[1].value {
            Value::Column(c) => {
                assert_eq!(c.name, "RH");
                assert_eq!(c.alias.as_deref(), Some("humidity"));
            }
            other => panic!("expected Column, got {other:?}"),
        }
        assert!(matches!(
            &plan.from.source,
            FromSource::Table { backing, visible }
                if backing == "forest_fires" && visible == "forest_fires"
        ));
        assert!(plan.filter.is_none());
        assert!(plan.group_by.is_empty());
        assert!(plan.order_by.is_empty());
        assert!(plan.limit.is_none());
    }

    // select min(temp), max(temp) from forest_fires group by day, month
    #[test]
    fn plan_for_group_by_aggregates_with_positional_aliases() {
        let mut stmt = select(
            vec![SelectItem::bare(call("min", "temp")), SelectItem::bare(call("max", "temp"))],
            vec![TableFactor::table("forest_fires")],
        );
        stmt.group_by = vec![Expr::column("day"), Expr::column("month")];

        let plan = PlanAssembler::assemble(&Query::Select(stmt), &catalog()).expect("plan");

        let keys: Vec<&str> = plan.group_by.iter().map(|g| g.key.name.as_str()).collect();
        assert_eq!(keys, vec!["day", "month"], "group keys keep SQL-text order");

        assert_eq!(plan.select[0].label, "_col0");
        assert_eq!(plan.select[1].label, "_col1");
        match &plan.select[0].value {
            Value::Aggregate(a) => {
                assert!(matches!(a.expr, PlanExpr::Aggregate { func: AggFunc::Min, .. }));
            }
            other => panic!("expected Aggregate, got {other:?}"),
        }
        match &plan.select[1].value {
            Value::Aggregate(a) => {
                assert!(matches!(a.expr, PlanExpr::Aggregate { func: AggFunc::Max, .. }));
            }
            other => panic!("expected Aggregate, got {other:?}"),
        }
    }

    // select * from forest_fires table1, forest_fires table2
    #[test]
    fn star_over_self_join_retains_both_column_sets() {
        let stmt = select(
            vec![SelectItem::bare(Expr::Star { qualifier: None })],
            vec![
                TableFactor::aliased("forest_fires", "table1"),
                TableFactor::aliased("forest_fires", "table2"),
            ],
        );
        let plan = PlanAssembler::assemble(&Query::Select(stmt), &catalog()).expect("plan");

        assert_eq!(plan.select.len(), 12, "both column sets retained, not merged");
        assert_eq!(plan.select[0].label, "table1.temp");
        assert_eq!(plan.select[6].label, "table2.temp");
        assert!(matches!(
            &plan.from.source,
            FromSource::Join { join_type: JoinType::Cross, on: None, .. }
        ));
    }

    // select * from a, a (no aliases at all)
    #[test]
    fn duplicate_from_items_without_aliases_do_not_collide() {
        let stmt = select(
            vec![SelectItem::bare(Expr::Star { qualifier: None })],
            vec![TableFactor::table("forest_fires"), TableFactor::table("forest_fires")],
        );
        let plan = PlanAssembler::assemble(&Query::Select(stmt), &catalog()).expect("no catalog collision");
        assert_eq!(plan.select.len(), 12);
    }

    // select wind from forest_fires where wind between 5 and 6
    #[test]
    fn where_between_has_canonical_closed_range_fingerprint() {
        let mut stmt = select(
            vec![SelectItem::bare(Expr::column("wind"))],
            vec![TableFactor::table("forest_fires")],
        );
        stmt.where_clause = Some(Expr::Between {
            expr: Box::new(Expr::column("wind")),
            low: Box::new(Expr::Int(5)),
            high: Box::new(Expr::Int(6)),
        });
        let plan = PlanAssembler::assemble(&Query::Select(stmt), &catalog()).expect("plan");
        assert_eq!(
            plan.filter.unwrap().predicate.fingerprint,
            "forest_fires.wind>=5&forest_fires.wind<=6"
        );
    }

    #[test]
    fn unqualified_shared_column_is_ambiguous_and_qualified_is_not() {
        let make = |expr: Expr| {
            select(
                vec![SelectItem::bare(expr)],
                vec![TableFactor::table("forest_fires"), TableFactor::table("digimon_mon_list")],
            )
        };

        let err = PlanAssembler::assemble(&Query::Select(make(Expr::column("wind"))), &catalog()).unwrap_err();
        match err {
            ResolveError::AmbiguousReference { name, tables } => {
                assert_eq!(name, "wind");
                assert_eq!(tables, vec!["forest_fires".to_string(), "digimon_mon_list".to_string()]);
            }
            other => panic!("expected AmbiguousReference, got {other:?}"),
        }

        let plan = PlanAssembler::assemble(
            &Query::Select(make(Expr::qualified("digimon_mon_list", "wind"))),
            &catalog(),
        )
        .expect("qualified reference resolves");
        match &plan.select[0].value {
            Value::Column(c) => assert_eq!(c.table, "digimon_mon_list"),
            other => panic!("expected Column, got {other:?}"),
        }
    }

    #[test]
    fn explicit_join_resolves_on_predicate_in_combined_scope() {
        let mut stmt = select(
            vec![SelectItem::bare(Expr::qualified("f", "temp"))],
            vec![TableFactor::aliased("forest_fires", "f")],
        );
        stmt.joins = vec![Join {
            join_type: JoinType::Inner,
            factor: TableFactor::aliased("digimon_mon_list", "d"),
            on: Some(Expr::Compare {
                op: CompareOp::Eq,
                left: Box::new(Expr::qualified("f", "wind")),
                right: Box::new(Expr::qualified("d", "wind")),
            }),
        }];

        let plan = PlanAssembler::assemble(&Query::Select(stmt), &catalog()).expect("plan");
        match &plan.from.source {
            FromSource::Join { join_type, on, left, right } => {
                assert_eq!(*join_type, JoinType::Inner);
                assert_eq!(on.as_ref().unwrap().fingerprint, "f.wind=d.wind");
                assert!(matches!(&**left, FromSource::Table { visible, .. } if visible == "f"));
                assert!(matches!(&**right, FromSource::Table { visible, .. } if visible == "d"));
            }
            other => panic!("expected Join, got {other:?}"),
        }
    }

    #[test]
    fn unknown_from_table_fails_resolution() {
        let stmt = select(
            vec![SelectItem::bare(Expr::column("x"))],
            vec![TableFactor::table("no_such_table")],
        );
        assert_eq!(
            PlanAssembler::assemble(&Query::Select(stmt), &catalog()).unwrap_err(),
            ResolveError::UnknownTable("no_such_table".into())
        );
    }

    #[test]
    fn subquery_exposes_only_its_output_labels() {
        let inner = select(
            vec![SelectItem::aliased(Expr::column("wind"), "breeze")],
            vec![TableFactor::table("forest_fires")],
        );
        let outer_ok = select(
            vec![SelectItem::bare(Expr::column("breeze"))],
            vec![TableFactor::Derived {
                query: Box::new(Query::Select(inner.clone())),
                alias: "fires".into(),
            }],
        );
        let plan = PlanAssembler::assemble(&Query::Select(outer_ok), &catalog()).expect("alias visible outside");
        match &plan.select[0].value {
            Value::Column(c) => {
                assert_eq!(c.table, "fires");
                assert_eq!(c.name, "breeze");
                assert_eq!(c.ty, SqlType::Float64);
            }
            other => panic!("expected Column, got {other:?}"),
        }
        assert!(matches!(&plan.from.source, FromSource::Derived { visible, .. } if visible == "fires"));

        // the pre-alias name is invisible outside the subquery
        let outer_bad = select(
            vec![SelectItem::bare(Expr::column("wind"))],
            vec![TableFactor::Derived { query: Box::new(Query::Select(inner)), alias: "fires".into() }],
        );
        assert_eq!(
            PlanAssembler::assemble(&Query::Select(outer_bad), &catalog()).unwrap_err(),
            ResolveError::UnknownColumn { name: "wind".into(), table: None }
        );
    }

    #[test]
    fn set_operation_keeps_each_sides_order_and_limit() {
        let side = |ascending: bool| {
            let mut stmt = select(
                vec![SelectItem::bare(Expr::Star { qualifier: None })],
                vec![TableFactor::table("forest_fires")],
            );
            stmt.order_by = vec![OrderItem { name: "wind".into(), ascending }];
            stmt.limit = Some(5);
            Query::Select(stmt)
        };

        // bare UNION behaves as DISTINCT
        let query = Query::SetOp {
            kind: SetOpKind::Union,
            all: false,
            left: Box::new(side(false)),
            right: Box::new(side(true)),
        };
        let plan = PlanAssembler::assemble(&query, &catalog()).expect("plan");

        assert_eq!(plan.order_by.len(), 1);
        assert!(!plan.order_by[0].ascending);
        assert_eq!(plan.limit, Some(LimitClause { count: 5 }));
        assert_eq!(plan.set_ops.len(), 1);
        let op = &plan.set_ops[0];
        assert_eq!(op.kind, SetOpKind::Union);
        assert!(op.distinct);
        assert!(op.plan.order_by[0].ascending);
        assert_eq!(op.plan.limit, Some(LimitClause { count: 5 }));
    }

    #[test]
    fn union_all_chain_applies_left_to_right() {
        let leaf = || {
            Query::Select(select(
                vec![SelectItem::bare(Expr::column("wind"))],
                vec![TableFactor::table("forest_fires")],
            ))
        };
        let query = Query::SetOp {
            kind: SetOpKind::Except,
            all: false,
            left: Box::new(Query::SetOp {
                kind: SetOpKind::Union,
                all: true,
                left: Box::new(leaf()),
                right: Box::new(leaf()),
            }),
            right: Box::new(leaf()),
        };
        let plan = PlanAssembler::assemble(&query, &catalog()).expect("plan");
        assert_eq!(plan.set_ops.len(), 2);
        assert_eq!(plan.set_ops[0].kind, SetOpKind::Union);
        assert!(!plan.set_ops[0].distinct, "UNION ALL keeps duplicates");
        assert_eq!(plan.set_ops[1].kind, SetOpKind::Except);
        assert!(plan.set_ops[1].distinct);
    }

    #[test]
    fn distinct_is_a_projection_flag() {
        let mut stmt = select(
            vec![SelectItem::bare(Expr::column("month")), SelectItem::bare(Expr::column("day"))],
            vec![TableFactor::table("forest_fires")],
        );
        stmt.distinct = true;
        let plan = PlanAssembler::assemble(&Query::Select(stmt), &catalog()).expect("plan");
        assert!(plan.distinct);
    }

    #[test]
    fn order_by_prefers_select_alias_then_scope_column() {
        let mut stmt = select(
            vec![SelectItem::aliased(Expr::column("rain"), "water")],
            vec![TableFactor::table("forest_fires")],
        );
        stmt.order_by = vec![
            OrderItem { name: "water".into(), ascending: true },
            OrderItem { name: "wind".into(), ascending: false },
        ];
        let plan = PlanAssembler::assemble(&Query::Select(stmt), &catalog()).expect("plan");

        match &plan.order_by[0].value {
            Value::Column(c) => assert_eq!(c.name, "rain"),
            other => panic!("expected aliased column, got {other:?}"),
        }
        match &plan.order_by[1].value {
            Value::Column(c) => assert_eq!(c.name, "wind"),
            other => panic!("expected scope column, got {other:?}"),
        }
        assert!(!plan.order_by[1].ascending);
    }

    #[test]
    fn having_with_aggregate_resolves_as_ordinary_predicate() {
        let mut stmt = select(
            vec![SelectItem::bare(Expr::column("month")), SelectItem::bare(call("sum", "rain"))],
            vec![TableFactor::table("forest_fires")],
        );
        stmt.group_by = vec![Expr::column("month")];
        stmt.having = Some(Expr::Compare {
            op: CompareOp::Gt,
            left: Box::new(call("sum", "rain")),
            right: Box::new(Expr::Int(100)),
        });
        let plan = PlanAssembler::assemble(&Query::Select(stmt), &catalog()).expect("plan");
        assert_eq!(plan.having.unwrap().predicate.fingerprint, "sum(forest_fires.rain)>100");
    }

    #[test]
    fn rank_in_select_list_gets_its_own_window() {
        use crate::syntax::WindowOrder;
        let rank = |dense: bool| Expr::Rank {
            dense,
            order_by: vec![
                WindowOrder { expr: Expr::column("wind"), ascending: false },
                WindowOrder { expr: Expr::column("rain"), ascending: true },
            ],
            partition_by: vec![],
        };
        let stmt = select(
            vec![
                SelectItem::aliased(rank(false), "r"),
                SelectItem::aliased(rank(true), "dr"),
            ],
            vec![TableFactor::table("forest_fires")],
        );
        let plan = PlanAssembler::assemble(&Query::Select(stmt), &catalog()).expect("plan");
        assert_eq!(plan.select[0].label, "r");
        assert_eq!(plan.select[1].label, "dr");
        for entry in &plan.select {
            match &entry.value {
                Value::Expression(e) => assert!(matches!(e.expr, PlanExpr::Window { .. })),
                other => panic!("expected window Expression, got {other:?}"),
            }
        }
    }
}
