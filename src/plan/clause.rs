use crate::plan::FromSource;
use crate::resolve::{ColumnValue, PredicateValue, Value};

/// Typed carriers for each SQL clause, built once during resolution and
/// consumed positionally by the plan assembler.

#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub predicate: PredicateValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HavingClause {
    pub predicate: PredicateValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupByClause {
    pub key: ColumnValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByClause {
    pub value: Value,
    pub ascending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartitionByClause {
    pub column: ColumnValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitClause {
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FromClause {
    pub source: FromSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasClause {
    pub alias: String,
}

impl From<AliasClause> for String {
    fn from(clause: AliasClause) -> String {
        clause.alias
    }
}
