use chrono::{Local, NaiveDate};
use std::fmt::Write;

use crate::catalog::SqlType;
use crate::error::ResolveError;
use crate::plan::{Literal, PlanExpr};
use crate::resolve::{
    AggregateResolver, ExprValue, LiteralValue, PredicateValue, Scope, Value, WindowResolver,
};
use crate::syntax::{ArithOp, Expr};

/// Transforms one syntax node into one Value, given the enclosing scope.
///
/// Two evaluation modes run in parallel: arithmetic between two literals is
/// folded eagerly through a typed evaluator, while any column-bearing
/// operand defers to a symbolic expression over the backend operations.
pub struct ExpressionBuilder;

impl ExpressionBuilder {
    pub fn build(expr: &Expr, scope: &Scope) -> Result<Value, ResolveError> {
        match expr {
            Expr::Int(v) => Ok(Value::Literal(LiteralValue::new(Literal::Int(*v)))),
            Expr::Float(v) => Ok(Value::Literal(LiteralValue::new(Literal::float(*v)))),
            Expr::StringLit(s) => Ok(Value::Literal(LiteralValue::new(Literal::String(s.clone())))),
            Expr::BoolLit(b) => Ok(Value::Literal(LiteralValue::new(Literal::Bool(*b)))),
            Expr::Null => Ok(Value::Literal(LiteralValue::new(Literal::Null))),

            Expr::Column { qualifier, name } => {
                Ok(Value::Column(scope.resolve(qualifier.as_deref(), name)?))
            }
            Expr::Star { .. } => Err(ResolveError::MalformedQuery(
                "* is only valid as a select-list item".into(),
            )),

            Expr::Arith { op, left, right } => Self::arith(*op, left, right, scope),

            Expr::Compare { op, left, right } => {
                let l = Self::build(left, scope)?;
                let r = Self::build(right, scope)?;
                Ok(Value::Predicate(PredicateValue {
                    fingerprint: format!("{}{}{}", l.fingerprint(), op, r.fingerprint()),
                    expr: PlanExpr::Compare {
                        op: *op,
                        left: Box::new(l.plan_expr()),
                        right: Box::new(r.plan_expr()),
                    },
                    alias: None,
                }))
            }

            Expr::Between { expr, low, high } => {
                let e = Self::build(expr, scope)?;
                let lo = Self::build(low, scope)?;
                let hi = Self::build(high, scope)?;
                // canonical closed-range form, shared with the AND pair
                let fingerprint = format!(
                    "{}>={}&{}<={}",
                    e.fingerprint(),
                    lo.fingerprint(),
                    e.fingerprint(),
                    hi.fingerprint()
                );
                Ok(Value::Predicate(PredicateValue {
                    expr: PlanExpr::Between {
                        expr: Box::new(e.plan_expr()),
                        low: Box::new(lo.plan_expr()),
                        high: Box::new(hi.plan_expr()),
                    },
                    fingerprint,
                    alias: None,
                }))
            }

            Expr::InList { expr, list, negated } => Self::in_list(expr, list, *negated, scope),

            Expr::And(left, right) => {
                let l = Self::build_predicate(left, scope)?;
                let r = Self::build_predicate(right, scope)?;
                Ok(Value::Predicate(PredicateValue {
                    fingerprint: format!("{}&{}", l.fingerprint, r.fingerprint),
                    expr: PlanExpr::And { left: Box::new(l.expr), right: Box::new(r.expr) },
                    alias: None,
                }))
            }
            Expr::Or(left, right) => {
                let l = Self::build_predicate(left, scope)?;
                let r = Self::build_predicate(right, scope)?;
                Ok(Value::Predicate(PredicateValue {
                    fingerprint: format!("{}|{}", l.fingerprint, r.fingerprint),
                    expr: PlanExpr::Or { left: Box::new(l.expr), right: Box::new(r.expr) },
                    alias: None,
                }))
            }

            Expr::Case { branches, else_expr } => Self::case(branches, else_expr.as_deref(), scope),

            Expr::Cast { expr, type_name } => {
                let ty = SqlType::from_name(type_name)?;
                Self::cast(Self::build(expr, scope)?, ty)
            }

            Expr::Call { name, arg } => match Self::build(arg, scope)? {
                Value::Column(column) => {
                    Ok(Value::Aggregate(AggregateResolver::apply(name, &column)?))
                }
                other => Err(ResolveError::UnsupportedConstruct(format!(
                    "aggregation {} over non-column {}",
                    name,
                    other.fingerprint()
                ))),
            },

            Expr::Rank { dense, order_by, partition_by } => Ok(Value::Expression(
                WindowResolver::resolve(*dense, order_by, partition_by, scope)?,
            )),

            Expr::Now => {
                let mut value = LiteralValue::new(Literal::Timestamp(Local::now().naive_local()));
                value.alias = Some("now()".into());
                Ok(Value::Literal(value))
            }
            Expr::Today => {
                let mut value = LiteralValue::new(Literal::Date(Local::now().date_naive()));
                value.alias = Some("today()".into());
                Ok(Value::Literal(value))
            }
            Expr::Timestamp { date, time } => {
                let (y, m, d) = *date;
                let (h, mi, s) = *time;
                let ts = NaiveDate::from_ymd_opt(y, m, d)
                    .and_then(|day| day.and_hms_opt(h, mi, s))
                    .ok_or_else(|| {
                        ResolveError::MalformedQuery(format!(
                            "invalid timestamp components {}-{}-{} {}:{}:{}",
                            y, m, d, h, mi, s
                        ))
                    })?;
                Ok(Value::Literal(LiteralValue::new(Literal::Timestamp(ts))))
            }
        }
    }

    /// Resolve a node that must yield a boolean predicate. A Bool-typed
    /// column or literal promotes; anything else is a type error.
    pub fn build_predicate(expr: &Expr, scope: &Scope) -> Result<PredicateValue, ResolveError> {
        match Self::build(expr, scope)? {
            Value::Predicate(p) => Ok(p),
            Value::Column(c) if c.effective_ty() == SqlType::Bool => Ok(PredicateValue {
                fingerprint: c.fingerprint(),
                expr: c.plan_expr(),
                alias: c.alias,
            }),
            Value::Literal(l) if l.ty == SqlType::Bool => Ok(PredicateValue {
                fingerprint: l.lit.to_string(),
                expr: PlanExpr::Literal(l.lit),
                alias: l.alias,
            }),
            other => Err(ResolveError::TypeMismatch {
                what: "boolean predicate".into(),
                column: other.fingerprint(),
                ty: other.ty().to_string(),
            }),
        }
    }

    fn arith(op: ArithOp, left: &Expr, right: &Expr, scope: &Scope) -> Result<Value, ResolveError> {
        let l = Self::build(left, scope)?;
        let r = Self::build(right, scope)?;

        // eager mode: two literal operands fold to a single literal
        if let (Value::Literal(ll), Value::Literal(rl)) = (&l, &r) {
            let lit = Self::fold_arith(op, &ll.lit, &rl.lit)?;
            return Ok(Value::Literal(LiteralValue::new(lit)));
        }

        for operand in [&l, &r] {
            if !operand.ty().is_numeric() {
                return Err(ResolveError::TypeMismatch {
                    what: format!("arithmetic {}", op),
                    column: operand.fingerprint(),
                    ty: operand.ty().to_string(),
                });
            }
        }

        let ty = match op {
            ArithOp::Div => SqlType::Float64,
            _ => SqlType::promote(l.ty(), r.ty()),
        };
        Ok(Value::Expression(ExprValue {
            fingerprint: format!("{}{}{}", l.fingerprint(), op, r.fingerprint()),
            expr: PlanExpr::Arith {
                op,
                left: Box::new(l.plan_expr()),
                right: Box::new(r.plan_expr()),
            },
            ty,
            alias: None,
        }))
    }

    /// Typed constant folding over a closed operator grammar; never a
    /// general-purpose evaluator. Division always promotes to float.
    fn fold_arith(op: ArithOp, l: &Literal, r: &Literal) -> Result<Literal, ResolveError> {
        let overflow = || ResolveError::MalformedQuery("literal arithmetic overflow".into());

        if let (Literal::Int(a), Literal::Int(b)) = (l, r) {
            return match op {
                ArithOp::Add => a.checked_add(*b).map(Literal::Int).ok_or_else(overflow),
                ArithOp::Sub => a.checked_sub(*b).map(Literal::Int).ok_or_else(overflow),
                ArithOp::Mul => a.checked_mul(*b).map(Literal::Int).ok_or_else(overflow),
                ArithOp::Div => Self::fold_float_arith(op, *a as f64, *b as f64),
            };
        }

        let as_float = |lit: &Literal| match lit {
            Literal::Int(v) => Some(*v as f64),
            Literal::Float(v) => Some(v.into_inner()),
            _ => None,
        };
        match (as_float(l), as_float(r)) {
            (Some(a), Some(b)) => Self::fold_float_arith(op, a, b),
            _ => Err(ResolveError::TypeMismatch {
                what: format!("arithmetic {}", op),
                column: format!("{}{}{}", l, op, r),
                ty: if as_float(l).is_none() { l.ty().to_string() } else { r.ty().to_string() },
            }),
        }
    }

    fn fold_float_arith(op: ArithOp, a: f64, b: f64) -> Result<Literal, ResolveError> {
        let v = match op {
            ArithOp::Add => a + b,
            ArithOp::Sub => a - b,
            ArithOp::Mul => a * b,
            ArithOp::Div => {
                if b == 0.0 {
                    return Err(ResolveError::MalformedQuery("division by zero in literal expression".into()));
                }
                a / b
            }
        };
        Ok(Literal::float(v))
    }

    fn in_list(expr: &Expr, list: &[Expr], negated: bool, scope: &Scope) -> Result<Value, ResolveError> {
        let e = Self::build(expr, scope)?;
        // membership checks run against raw literal values
        let mut literals = Vec::with_capacity(list.len());
        for element in list {
            match Self::build(element, scope)? {
                Value::Literal(l) => literals.push(l.lit),
                other => {
                    return Err(ResolveError::MalformedQuery(format!(
                        "IN list elements must be literals, got {}",
                        other.fingerprint()
                    )));
                }
            }
        }

        let mut fingerprint = format!(
            "{} {} (",
            e.fingerprint(),
            if negated { "not in" } else { "in" }
        );
        for (i, lit) in literals.iter().enumerate() {
            if i > 0 {
                fingerprint.push(',');
            }
            let _ = write!(fingerprint, "{}", lit);
        }
        fingerprint.push(')');

        Ok(Value::Predicate(PredicateValue {
            expr: PlanExpr::InList { expr: Box::new(e.plan_expr()), list: literals, negated },
            fingerprint,
            alias: None,
        }))
    }

    fn case(
        branches: &[crate::syntax::CaseBranch],
        else_expr: Option<&Expr>,
        scope: &Scope,
    ) -> Result<Value, ResolveError> {
        if branches.is_empty() {
            return Err(ResolveError::MalformedQuery("CASE requires at least one WHEN branch".into()));
        }

        let mut lowered = Vec::with_capacity(branches.len());
        let mut ty: Option<SqlType> = None;
        let mut fingerprint = String::from("case(");
        for (i, branch) in branches.iter().enumerate() {
            let condition = Self::build_predicate(&branch.condition, scope)?;
            let result = Self::build(&branch.result, scope)?;
            ty = Some(match ty {
                None => result.ty(),
                Some(t) => SqlType::promote(t, result.ty()),
            });
            if i > 0 {
                fingerprint.push(',');
            }
            let _ = write!(fingerprint, "when {} then {}", condition.fingerprint, result.fingerprint());
            lowered.push((condition.expr, result.plan_expr()));
        }

        // no ELSE: unmatched rows produce NULL
        let else_value = match else_expr {
            Some(expr) => {
                let value = Self::build(expr, scope)?;
                ty = Some(SqlType::promote(ty.expect("at least one branch"), value.ty()));
                let _ = write!(fingerprint, ",else {}", value.fingerprint());
                Some(Box::new(value.plan_expr()))
            }
            None => None,
        };
        fingerprint.push(')');

        Ok(Value::Expression(ExprValue {
            expr: PlanExpr::Case { branches: lowered, else_expr: else_value },
            ty: ty.expect("at least one branch"),
            fingerprint,
            alias: None,
        }))
    }

    fn cast(value: Value, ty: SqlType) -> Result<Value, ResolveError> {
        match value {
            // casting a bare column only mutates the declared output type
            Value::Column(mut column) => {
                column.cast_ty = Some(ty);
                Ok(Value::Column(column))
            }
            // casting a literal converts immediately
            Value::Literal(literal) => {
                let lit = literal.lit.cast(ty)?;
                Ok(Value::Literal(LiteralValue { lit, ty, alias: literal.alias }))
            }
            Value::Expression(inner) => Ok(Value::Expression(ExprValue {
                fingerprint: format!("cast({},{})", inner.fingerprint, ty),
                expr: PlanExpr::Cast { expr: Box::new(inner.expr), ty },
                ty,
                alias: inner.alias,
            })),
            Value::Aggregate(inner) => Ok(Value::Expression(ExprValue {
                fingerprint: format!("cast({},{})", inner.fingerprint, ty),
                expr: PlanExpr::Cast { expr: Box::new(inner.expr), ty },
                ty,
                alias: inner.alias,
            })),
            Value::Predicate(inner) => Ok(Value::Expression(ExprValue {
                fingerprint: format!("cast({},{})", inner.fingerprint, ty),
                expr: PlanExpr::Cast { expr: Box::new(inner.expr), ty },
                ty,
                alias: inner.alias,
            })),
        }
    }
}
