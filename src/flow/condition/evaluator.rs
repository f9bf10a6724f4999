// SPDX-License-Identifier: MIT

//! Condition expression evaluator

use serde_json::Value;
use std::borrow::Cow;

use super::ast::{CompareOp, Expression, Literal, Path};
use crate::engine::RunContext;

/// Where paths in an expression are resolved
///
/// A path whose first segment equals `binding` reads from the value under
/// test; any other path reads from the run context state.
pub struct Scope<'a> {
    binding: &'a str,
    value: &'a Value,
    ctx: &'a RunContext,
}

impl<'a> Scope<'a> {
    pub fn new(binding: &'a str, value: &'a Value, ctx: &'a RunContext) -> Self {
        Self {
            binding,
            value,
            ctx,
        }
    }

    fn resolve(&self, path: &Path) -> Option<Cow<'a, Value>> {
        if path.is_bound_to(self.binding) {
            return match &path.rest {
                None => Some(Cow::Borrowed(self.value)),
                Some(rest) => lookup(self.value, rest).map(Cow::Borrowed),
            };
        }

        let found = self.ctx.get_path(&path.to_string());
        if found.is_none() {
            log::debug!(
                "Condition path '{}' is not under '{}' and has no run state value",
                path,
                self.binding
            );
        }
        found.map(Cow::Owned)
    }
}

/// Walk a dotted path through objects (by key) and arrays (by index)
pub fn lookup<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.').try_fold(value, |current, part| match current {
        Value::Array(items) => items.get(part.parse::<usize>().ok()?),
        other => other.get(part),
    })
}

/// Evaluate a condition expression within a scope
pub fn evaluate(expr: &Expression, scope: &Scope<'_>) -> bool {
    match expr {
        Expression::Const(value) => *value,
        Expression::Compare { path, op, value } => {
            let resolved = scope.resolve(path);
            evaluate_compare(resolved.as_deref(), *op, value)
        }
        Expression::Truthy(path) => scope.resolve(path).as_deref().is_some_and(is_truthy),
        Expression::And(left, right) => evaluate(left, scope) && evaluate(right, scope),
        Expression::Or(left, right) => evaluate(left, scope) || evaluate(right, scope),
        Expression::Not(inner) => !evaluate(inner, scope),
    }
}

fn evaluate_compare(left: Option<&Value>, op: CompareOp, right: &Literal) -> bool {
    match op {
        CompareOp::Eq => values_equal(left, right),
        CompareOp::NotEq => !values_equal(left, right),
        CompareOp::Gt => compare_numbers(left, right, |a, b| a > b),
        CompareOp::Gte => compare_numbers(left, right, |a, b| a >= b),
        CompareOp::Lt => compare_numbers(left, right, |a, b| a < b),
        CompareOp::Lte => compare_numbers(left, right, |a, b| a <= b),
        CompareOp::Contains => check_contains(left, right),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn numbers_equal(value: &Value, rn: f64) -> bool {
    value
        .as_f64()
        .map(|f| (f - rn).abs() < f64::EPSILON)
        .unwrap_or(false)
}

fn values_equal(left: Option<&Value>, right: &Literal) -> bool {
    match (left, right) {
        (None, Literal::Null) => true,
        (None, _) => false,
        (Some(Value::Null), Literal::Null) => true,
        (Some(Value::String(s)), Literal::String(rs)) => s == rs,
        (Some(n @ Value::Number(_)), Literal::Number(rn)) => numbers_equal(n, *rn),
        (Some(Value::Bool(b)), Literal::Boolean(rb)) => b == rb,
        _ => false,
    }
}

fn compare_numbers<F>(left: Option<&Value>, right: &Literal, cmp: F) -> bool
where
    F: Fn(f64, f64) -> bool,
{
    match (left, right) {
        (Some(Value::Number(n)), Literal::Number(rn)) => {
            n.as_f64().map(|f| cmp(f, *rn)).unwrap_or(false)
        }
        _ => false,
    }
}

fn check_contains(left: Option<&Value>, right: &Literal) -> bool {
    match (left, right) {
        (Some(Value::String(s)), Literal::String(substr)) => s.contains(substr.as_str()),
        (Some(Value::Array(arr)), Literal::String(val)) => {
            arr.iter().any(|v| v.as_str() == Some(val.as_str()))
        }
        (Some(Value::Array(arr)), Literal::Number(val)) => {
            arr.iter().any(|v| numbers_equal(v, *val))
        }
        (Some(Value::Array(arr)), Literal::Boolean(val)) => {
            arr.iter().any(|v| v.as_bool() == Some(*val))
        }
        (Some(Value::Array(arr)), Literal::Null) => arr.iter().any(Value::is_null),
        _ => false,
    }
}
