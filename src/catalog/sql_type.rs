use std::collections::HashMap;
use std::fmt::{self, Display};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

/// Canonical backend column/result types.
///
/// Every type keyword a query may name (`smallint`, `varchar`, `datetime64`,
/// ...) maps onto exactly one of these variants via [`SqlType::from_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlType {
    Bool,
    Int16,
    Int32,
    Int64,
    Float64,
    String,
    Date,
    Time,
    Timestamp,
}

/// Lookup table from SQL type keywords to canonical types.
static TYPE_NAMES: Lazy<HashMap<&'static str, SqlType>> = Lazy::new(|| {
    HashMap::from([
        ("smallint", SqlType::Int16),
        ("int16", SqlType::Int16),
        ("int", SqlType::Int32),
        ("int32", SqlType::Int32),
        ("bigint", SqlType::Int64),
        ("int64", SqlType::Int64),
        ("float", SqlType::Float64),
        ("float64", SqlType::Float64),
        ("varchar", SqlType::String),
        ("string", SqlType::String),
        ("text", SqlType::String),
        ("object", SqlType::String),
        ("category", SqlType::String),
        ("bool", SqlType::Bool),
        ("boolean", SqlType::Bool),
        ("datetime64", SqlType::Timestamp),
        ("timestamp", SqlType::Timestamp),
        ("date", SqlType::Date),
        ("time", SqlType::Time),
    ])
});

impl SqlType {
    /// Resolve a type keyword (case-insensitive) to its canonical type.
    pub fn from_name(name: &str) -> Result<SqlType, ResolveError> {
        TYPE_NAMES
            .get(name.to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| ResolveError::UnknownType(name.to_string()))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, SqlType::Int16 | SqlType::Int32 | SqlType::Int64 | SqlType::Float64)
    }

    /// Promote two types to a common representative for arithmetic and CASE
    /// branches. Integer widths widen; mixing integer and float yields
    /// Float64. Different non-numeric types keep the left-hand type.
    pub fn promote(a: SqlType, b: SqlType) -> SqlType {
        use SqlType::*;
        if a == b { return a; }
        match (a, b) {
            (Int16, Int32) | (Int32, Int16) => Int32,
            (Int16, Int64) | (Int64, Int16) => Int64,
            (Int32, Int64) | (Int64, Int32) => Int64,
            (x, y) if x.is_numeric() && y.is_numeric() => Float64,
            (x, _) => x,
        }
    }
}

impl Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::Bool => write!(f, "bool"),
            SqlType::Int16 => write!(f, "int16"),
            SqlType::Int32 => write!(f, "int32"),
            SqlType::Int64 => write!(f, "int64"),
            SqlType::Float64 => write!(f, "float64"),
            SqlType::String => write!(f, "string"),
            SqlType::Date => write!(f, "date"),
            SqlType::Time => write!(f, "time"),
            SqlType::Timestamp => write!(f, "timestamp"),
        }
    }
}
