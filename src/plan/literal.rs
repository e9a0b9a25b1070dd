use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use ordered_float::NotNan;
use std::fmt::{self, Display};

use crate::catalog::SqlType;
use crate::error::ResolveError;

/// A typed constant. Floats are `NotNan` so literals stay `Eq + Hash`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    String(String),
    Int(i64),
    Float(NotNan<f64>),
    Bool(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    Null,
}

impl Literal {
    pub fn float(value: f64) -> Literal {
        // NaN never comes out of literal folding; guard anyway
        Literal::Float(NotNan::new(value).unwrap_or_else(|_| NotNan::new(0.0).unwrap()))
    }

    pub fn ty(&self) -> SqlType {
        match self {
            Literal::String(_) => SqlType::String,
            Literal::Int(_) => SqlType::Int64,
            Literal::Float(_) => SqlType::Float64,
            Literal::Bool(_) => SqlType::Bool,
            Literal::Date(_) => SqlType::Date,
            Literal::Time(_) => SqlType::Time,
            Literal::Timestamp(_) => SqlType::Timestamp,
            Literal::Null => SqlType::String,
        }
    }

    /// Convert this constant to the target type, immediately.
    ///
    /// Numeric casts convert the stored value (float to integer truncates
    /// toward zero); any value casts to string through its rendering; a
    /// string casts to a numeric type only if it parses as one.
    pub fn cast(&self, ty: SqlType) -> Result<Literal, ResolveError> {
        let mismatch = || ResolveError::TypeMismatch {
            what: format!("cast to {}", ty),
            column: self.to_string(),
            ty: self.ty().to_string(),
        };
        match (self, ty) {
            (Literal::Null, _) => Ok(Literal::Null),

            (Literal::Int(v), SqlType::Int16 | SqlType::Int32 | SqlType::Int64) => Ok(Literal::Int(*v)),
            (Literal::Int(v), SqlType::Float64) => Ok(Literal::float(*v as f64)),
            (Literal::Float(v), SqlType::Float64) => Ok(Literal::Float(*v)),
            (Literal::Float(v), SqlType::Int16 | SqlType::Int32 | SqlType::Int64) => {
                Ok(Literal::Int(v.into_inner().trunc() as i64))
            }

            (Literal::String(s), SqlType::Int16 | SqlType::Int32 | SqlType::Int64) => {
                s.trim().parse::<i64>().map(Literal::Int).map_err(|_| mismatch())
            }
            (Literal::String(s), SqlType::Float64) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(|v| NotNan::new(v).ok())
                .map(Literal::Float)
                .ok_or_else(mismatch),

            (Literal::Bool(b), SqlType::Bool) => Ok(Literal::Bool(*b)),
            (Literal::String(s), SqlType::String) => Ok(Literal::String(s.clone())),
            (lit, SqlType::String) => Ok(Literal::String(lit.render())),

            (Literal::Date(d), SqlType::Date) => Ok(Literal::Date(*d)),
            (Literal::Date(d), SqlType::Timestamp) => Ok(Literal::Timestamp(
                d.and_hms_opt(0, 0, 0).ok_or_else(mismatch)?,
            )),
            (Literal::Timestamp(ts), SqlType::Timestamp) => Ok(Literal::Timestamp(*ts)),
            (Literal::Timestamp(ts), SqlType::Date) => Ok(Literal::Date(ts.date())),
            (Literal::Time(t), SqlType::Time) => Ok(Literal::Time(*t)),

            _ => Err(mismatch()),
        }
    }

    /// Raw value rendering (strings unquoted), used by cast-to-string.
    fn render(&self) -> String {
        match self {
            Literal::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// The rendering used as this literal's plan fingerprint.
impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "'{}'", s),
            Literal::Int(v) => write!(f, "{}", v),
            Literal::Float(v) => write!(f, "{}", v.into_inner()),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Literal::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
            Literal::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
            Literal::Null => write!(f, "null"),
        }
    }
}

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(_) => write!(f, "String({})", self),
            Literal::Int(_) => write!(f, "Int({})", self),
            Literal::Float(_) => write!(f, "Float({})", self),
            Literal::Bool(_) => write!(f, "Bool({})", self),
            Literal::Date(_) => write!(f, "Date({})", self),
            Literal::Time(_) => write!(f, "Time({})", self),
            Literal::Timestamp(_) => write!(f, "Timestamp({})", self),
            Literal::Null => write!(f, "Null"),
        }
    }
}
