//! Filter evaluation over schemaless document fields.
//!
//! SQL three-valued logic is collapsed the usual way for a filter: anything
//! that is not `true` (including `NULL`) rejects the record.

use crate::core::{DbError, Result};
use crate::parser::ast::{BinaryOp, Expr};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Evaluation context bound to one record's fields.
pub struct EvaluationContext<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(fields: &'a Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Does the record satisfy `expr`?
    pub fn matches(&self, expr: &Expr) -> Result<bool> {
        Ok(matches!(self.evaluate(expr)?, Value::Bool(true)))
    }

    pub fn evaluate(&self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Field(name) => Ok(self.fields.get(name).cloned().unwrap_or(Value::Null)),
            Expr::Literal(value) => Ok(value.clone()),
            Expr::IsNull { expr, negated } => {
                let is_null = self.evaluate(expr)?.is_null();
                Ok(Value::Bool(is_null != *negated))
            }
            Expr::Not(inner) => match self.evaluate(inner)? {
                Value::Bool(b) => Ok(Value::Bool(!b)),
                Value::Null => Ok(Value::Null),
                other => Err(DbError::TypeMismatch(format!(
                    "NOT expects a boolean, got {}",
                    other
                ))),
            },
            Expr::BinaryOp { left, op, right } => match op {
                BinaryOp::And | BinaryOp::Or => {
                    let left = self.evaluate(left)?;
                    let right = self.evaluate(right)?;
                    logical(*op, &left, &right)
                }
                _ => {
                    let left = self.evaluate(left)?;
                    let right = self.evaluate(right)?;
                    Ok(comparison(*op, &left, &right))
                }
            },
        }
    }
}

fn logical(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    let as_bool = |v: &Value| match v {
        Value::Bool(b) => Ok(Some(*b)),
        Value::Null => Ok(None),
        other => Err(DbError::TypeMismatch(format!(
            "Logical operator expects booleans, got {}",
            other
        ))),
    };

    let (l, r) = (as_bool(left)?, as_bool(right)?);
    let result = match op {
        BinaryOp::And => match (l, r) {
            (Some(false), _) | (_, Some(false)) => Some(false),
            (Some(true), Some(true)) => Some(true),
            _ => None,
        },
        _ => match (l, r) {
            (Some(true), _) | (_, Some(true)) => Some(true),
            (Some(false), Some(false)) => Some(false),
            _ => None,
        },
    };

    Ok(result.map(Value::Bool).unwrap_or(Value::Null))
}

fn comparison(op: BinaryOp, left: &Value, right: &Value) -> Value {
    let Some(ordering) = compare_values(left, right) else {
        return Value::Null;
    };

    let result = match op {
        BinaryOp::Eq => ordering == Ordering::Equal,
        BinaryOp::NotEq => ordering != Ordering::Equal,
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::LtEq => ordering != Ordering::Greater,
        BinaryOp::Gt => ordering == Ordering::Greater,
        BinaryOp::GtEq => ordering != Ordering::Less,
        BinaryOp::And | BinaryOp::Or => unreachable!("logical operators handled separately"),
    };
    Value::Bool(result)
}

/// Orders two JSON scalars of the same kind. `None` when either side is
/// `NULL` or the kinds differ.
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => {
            if let (Some(l), Some(r)) = (l.as_i64(), r.as_i64()) {
                Some(l.cmp(&r))
            } else {
                l.as_f64()?.partial_cmp(&r.as_f64()?)
            }
        }
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        (Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
        _ => None,
    }
}
