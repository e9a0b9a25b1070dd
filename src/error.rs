use std::fmt::{self, Display};

/// Errors raised while resolving a query into a logical plan.
///
/// Any error aborts the whole resolution; a plan with an unresolved piece
/// is unsound to hand to a backend, so there is no partial recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A bare column name matches columns in more than one visible table.
    AmbiguousReference { name: String, tables: Vec<String> },
    /// A FROM/JOIN name has no match in the catalog.
    UnknownTable(String),
    /// A column name has no match in the current scope.
    UnknownColumn { name: String, table: Option<String> },
    /// A CAST names a type outside the canonical lookup table.
    UnknownType(String),
    /// An aggregate or cast applied to an incompatible column type.
    TypeMismatch { what: String, column: String, ty: String },
    /// A syntax node with no defined lowering.
    UnsupportedConstruct(String),
    /// A general semantic inconsistency not covered above.
    MalformedQuery(String),
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::AmbiguousReference { name, tables } => {
                write!(f, "ambiguous column reference '{}' (candidates: {})", name, tables.join(", "))
            }
            ResolveError::UnknownTable(name) => write!(f, "table '{}' not found", name),
            ResolveError::UnknownColumn { name, table } => match table {
                Some(t) => write!(f, "column '{}' not found in table '{}'", name, t),
                None => write!(f, "column '{}' not found in any table in scope", name),
            },
            ResolveError::UnknownType(name) => write!(f, "unrecognized type name '{}'", name),
            ResolveError::TypeMismatch { what, column, ty } => {
                write!(f, "{} not valid for column '{}' of type {}", what, column, ty)
            }
            ResolveError::UnsupportedConstruct(msg) => write!(f, "unsupported construct: {}", msg),
            ResolveError::MalformedQuery(msg) => write!(f, "malformed query: {}", msg),
        }
    }
}

impl std::error::Error for ResolveError {}
