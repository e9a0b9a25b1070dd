use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::catalog::SqlType;

/// Metadata for one catalog column: the original-case name a backend needs
/// to reference it, and its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub ty: SqlType,
}

/// The ordered column list of one table, keyed by lower-cased column name.
///
/// Lookups are case-insensitive; the original-case name survives on the
/// `ColumnInfo` so output labels and backend references stay faithful.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSchema {
    /// Table name as registered (original case).
    pub name: String,
    /// Map of lower-cased column name -> column metadata, in column order.
    pub columns: IndexMap<String, ColumnInfo>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), columns: IndexMap::new() }
    }

    pub fn with_column(mut self, name: &str, ty: SqlType) -> Self {
        self.columns.insert(name.to_ascii_lowercase(), ColumnInfo { name: name.to_string(), ty });
        self
    }

    /// Return the `ColumnInfo` for a column name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.get(name.to_ascii_lowercase().as_str())
    }

    /// Build a `TableSchema` from a sample JSON row by classifying each
    /// field's value shape. Nulls, arrays and nested objects land as String.
    pub fn infer_from_object(name: impl Into<String>, obj: &Map<String, Value>) -> TableSchema {
        let mut schema = TableSchema::new(name);
        for (key, value) in obj {
            let ty = match value {
                Value::Bool(_) => SqlType::Bool,
                Value::Number(n) if n.is_i64() || n.is_u64() => SqlType::Int64,
                Value::Number(_) => SqlType::Float64,
                _ => SqlType::String,
            };
            schema.columns.insert(key.to_ascii_lowercase(), ColumnInfo { name: key.clone(), ty });
        }
        schema
    }
}

/// Read access to table schemas, handed to the resolver by the embedding
/// system. Implementations must give a consistent snapshot for the duration
/// of one `plan_query` call; the resolver never writes through this trait.
pub trait CatalogView {
    /// Schema of the named table (case-insensitive), or `None` if unknown.
    fn table(&self, name: &str) -> Option<TableSchema>;
}
