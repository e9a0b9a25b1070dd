use crate::syntax::{Expr, JoinType, SetOpKind};

/// A parsed query: a plain SELECT or a set operation over two queries.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Select(SelectStmt),
    SetOp {
        kind: SetOpKind,
        /// true for `ALL`; bare set operators behave as DISTINCT.
        all: bool,
        left: Box<Query>,
        right: Box<Query>,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectStmt {
    pub distinct: bool,
    pub projection: Vec<SelectItem>,
    pub from: Vec<TableFactor>,
    pub joins: Vec<Join>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub order_by: Vec<OrderItem>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl SelectItem {
    pub fn bare(expr: Expr) -> SelectItem {
        SelectItem { expr, alias: None }
    }

    pub fn aliased(expr: Expr, alias: &str) -> SelectItem {
        SelectItem { expr, alias: Some(alias.to_string()) }
    }
}

/// One FROM item: a base table or a derived table (subquery under an alias).
#[derive(Debug, Clone, PartialEq)]
pub enum TableFactor {
    Table { name: String, alias: Option<String> },
    Derived { query: Box<Query>, alias: String },
}

impl TableFactor {
    pub fn table(name: &str) -> TableFactor {
        TableFactor::Table { name: name.to_string(), alias: None }
    }

    pub fn aliased(name: &str, alias: &str) -> TableFactor {
        TableFactor::Table { name: name.to_string(), alias: Some(alias.to_string()) }
    }
}

/// An explicit JOIN clause. `on` is absent for CROSS joins.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub factor: TableFactor,
    pub on: Option<Expr>,
}

/// One ORDER BY entry; `name` may be an output alias or a scope column.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub name: String,
    pub ascending: bool,
}
