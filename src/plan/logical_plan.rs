use crate::catalog::TableSchema;
use crate::plan::{
    FromClause, GroupByClause, HavingClause, LimitClause, OrderByClause, WhereClause,
};
use crate::resolve::{PredicateValue, Value};
use crate::syntax::{JoinType, SetOpKind};

/// The source a query reads from: a base table, a join tree, or a derived
/// table (subquery under an alias).
#[derive(Debug, Clone, PartialEq)]
pub enum FromSource {
    Table {
        /// catalog table name
        backing: String,
        /// visible name (alias or table)
        visible: String,
    },
    Join {
        left: Box<FromSource>,
        right: Box<FromSource>,
        join_type: JoinType,
        /// absent for CROSS joins / implicit multi-table FROM
        on: Option<PredicateValue>,
    },
    Derived {
        visible: String,
        plan: Box<LogicalPlan>,
    },
}

/// One output of the projection: a resolved value and its output label.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectEntry {
    pub value: Value,
    pub label: String,
}

/// A set operation applied to this plan's output, left to right.
/// `distinct: false` is the `ALL` form.
#[derive(Debug, Clone, PartialEq)]
pub struct SetOperation {
    pub kind: SetOpKind,
    pub distinct: bool,
    pub plan: Box<LogicalPlan>,
}

/// The fully resolved, backend-agnostic description of one query.
///
/// Read-only once returned; each side of a set operation keeps its own
/// ORDER BY and LIMIT, which apply before the operation.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalPlan {
    /// Select list in written order.
    pub select: Vec<SelectEntry>,
    pub from: FromClause,
    pub filter: Option<WhereClause>,
    pub group_by: Vec<GroupByClause>,
    pub having: Option<HavingClause>,
    pub order_by: Vec<OrderByClause>,
    pub limit: Option<LimitClause>,
    /// Applied to the final projection, after all other clauses.
    pub distinct: bool,
    pub set_ops: Vec<SetOperation>,
}

impl LogicalPlan {
    pub fn new(select: Vec<SelectEntry>, from: FromSource) -> LogicalPlan {
        LogicalPlan {
            select,
            from: FromClause { source: from },
            filter: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
            distinct: false,
            set_ops: Vec::new(),
        }
    }

    /// The schema an outer query sees when this plan is a derived table:
    /// only the final output labels and types, never intermediate names.
    pub fn output_schema(&self, visible: &str) -> TableSchema {
        let mut schema = TableSchema::new(visible);
        for entry in &self.select {
            schema = schema.with_column(&entry.label, entry.value.ty());
        }
        schema
    }
}
