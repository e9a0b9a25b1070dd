use crate::catalog::SqlType;
use crate::plan::{Literal, PlanExpr};

/// A typed constant with an optional display alias (`now()` carries
/// alias `"now()"` unless overridden).
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralValue {
    pub lit: Literal,
    pub ty: SqlType,
    pub alias: Option<String>,
}

impl LiteralValue {
    pub fn new(lit: Literal) -> LiteralValue {
        let ty = lit.ty();
        LiteralValue { lit, ty, alias: None }
    }
}

/// A resolved column reference: its visible table, the catalog's
/// original-case name, the name as written in the query, and an optional
/// declared output type from an `AS TYPE` cast.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnValue {
    pub table: String,
    pub name: String,
    pub written: String,
    pub ty: SqlType,
    pub cast_ty: Option<SqlType>,
    pub alias: Option<String>,
}

impl ColumnValue {
    /// Declared output type: the cast target when present, else the
    /// catalog type.
    pub fn effective_ty(&self) -> SqlType {
        self.cast_ty.unwrap_or(self.ty)
    }

    pub fn plan_expr(&self) -> PlanExpr {
        let column = PlanExpr::Column {
            table: self.table.clone(),
            name: self.name.clone(),
            ty: self.ty,
        };
        match self.cast_ty {
            Some(ty) => PlanExpr::Cast { expr: Box::new(column), ty },
            None => column,
        }
    }

    pub fn fingerprint(&self) -> String {
        format!("{}.{}", self.table, self.name)
    }
}

/// A composite built from other Values by an operator.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprValue {
    pub expr: PlanExpr,
    pub ty: SqlType,
    pub fingerprint: String,
    pub alias: Option<String>,
}

/// A predicate-producing expression carrying its plan fingerprint: the
/// canonical string built from operand fingerprints joined by the operator
/// symbol. Two identical predicate trees always fingerprint identically.
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateValue {
    pub expr: PlanExpr,
    pub fingerprint: String,
    pub alias: Option<String>,
}

/// A reduction over a column, tagged with its result type.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateValue {
    pub expr: PlanExpr,
    pub ty: SqlType,
    pub fingerprint: String,
    pub alias: Option<String>,
}

/// The unit of scalar/column semantic meaning produced by resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Literal(LiteralValue),
    Column(ColumnValue),
    Expression(ExprValue),
    Predicate(PredicateValue),
    Aggregate(AggregateValue),
}

impl Value {
    pub fn ty(&self) -> SqlType {
        match self {
            Value::Literal(v) => v.ty,
            Value::Column(v) => v.effective_ty(),
            Value::Expression(v) => v.ty,
            Value::Predicate(_) => SqlType::Bool,
            Value::Aggregate(v) => v.ty,
        }
    }

    pub fn alias(&self) -> Option<&str> {
        match self {
            Value::Literal(v) => v.alias.as_deref(),
            Value::Column(v) => v.alias.as_deref(),
            Value::Expression(v) => v.alias.as_deref(),
            Value::Predicate(v) => v.alias.as_deref(),
            Value::Aggregate(v) => v.alias.as_deref(),
        }
    }

    /// Apply an explicit `AS alias`. Renames the output label only; the
    /// resolution key stays untouched.
    pub fn set_alias(&mut self, alias: impl Into<String>) {
        let alias = Some(alias.into());
        match self {
            Value::Literal(v) => v.alias = alias,
            Value::Column(v) => v.alias = alias,
            Value::Expression(v) => v.alias = alias,
            Value::Predicate(v) => v.alias = alias,
            Value::Aggregate(v) => v.alias = alias,
        }
    }

    /// The backend-evaluable form of this value.
    pub fn plan_expr(&self) -> PlanExpr {
        match self {
            Value::Literal(v) => PlanExpr::Literal(v.lit.clone()),
            Value::Column(v) => v.plan_expr(),
            Value::Expression(v) => v.expr.clone(),
            Value::Predicate(v) => v.expr.clone(),
            Value::Aggregate(v) => v.expr.clone(),
        }
    }

    /// Canonical structural-equality key for this value's tree.
    pub fn fingerprint(&self) -> String {
        match self {
            Value::Literal(v) => v.lit.to_string(),
            Value::Column(v) => v.fingerprint(),
            Value::Expression(v) => v.fingerprint.clone(),
            Value::Predicate(v) => v.fingerprint.clone(),
            Value::Aggregate(v) => v.fingerprint.clone(),
        }
    }

    /// Output label for select position `position`: explicit alias, else
    /// the query-written column name, else `_col{position}`.
    pub fn label(&self, position: usize) -> String {
        if let Some(alias) = self.alias() {
            return alias.to_string();
        }
        match self {
            Value::Column(v) => v.written.clone(),
            _ => format!("_col{}", position),
        }
    }
}
