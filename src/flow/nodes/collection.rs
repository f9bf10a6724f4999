// SPDX-License-Identifier: MIT

//! Array-processing nodes: filter, map and reduce
//!
//! Each expects an array input (a `Single` array or a `Many` list); any
//! other shape fails the node.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;

use crate::engine::{BoxError, Condition, Node, NodeInput, RunContext};

type MapFn = Arc<dyn Fn(&Value) -> Result<Value, BoxError> + Send + Sync>;
type ReduceFn = Arc<dyn Fn(Value, &Value) -> Result<Value, BoxError> + Send + Sync>;

fn expect_array(input: NodeInput) -> Result<Vec<Value>, BoxError> {
    match input.into_value() {
        Value::Array(items) => Ok(items),
        other => Err(format!("expected an array input, got {}", type_name(&other)).into()),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// An arithmetic operand; integers stay exact until a float joins in
#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn of(value: &Value) -> Result<Self, BoxError> {
        match (value.as_i64(), value.as_f64()) {
            (Some(i), _) => Ok(Num::Int(i)),
            (None, Some(f)) => Ok(Num::Float(f)),
            _ => Err(format!("expected a number, got {}", type_name(value)).into()),
        }
    }

    fn operand(value: f64) -> Self {
        if value.fract() == 0.0 && value.abs() < MAX_SAFE_FLOAT {
            Num::Int(value as i64)
        } else {
            Num::Float(value)
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }

    fn into_value(self) -> Result<Value, BoxError> {
        match self {
            Num::Int(i) => Ok(Value::from(i)),
            Num::Float(f) => number(f),
        }
    }

    /// Integer arithmetic when both sides are integers and `int` succeeds,
    /// float arithmetic otherwise
    fn combine(
        self,
        other: Num,
        int: impl Fn(i64, i64) -> Option<i64>,
        float: impl Fn(f64, f64) -> f64,
    ) -> Result<Value, BoxError> {
        if let (Num::Int(a), Num::Int(b)) = (self, other) {
            if let Some(result) = int(a, b) {
                return Ok(Value::from(result));
            }
        }
        number(float(self.as_f64(), other.as_f64()))
    }

    fn compare(self, other: Num) -> Option<Ordering> {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => Some(a.cmp(&b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }

    /// `other` if it orders as `wanted` against `self`, else `self`
    fn pick(self, other: Num, wanted: Ordering) -> Result<Value, BoxError> {
        if other.compare(self) == Some(wanted) {
            other.into_value()
        } else {
            self.into_value()
        }
    }
}

/// Integer quotient only when it divides evenly
fn exact_div(a: i64, b: i64) -> Option<i64> {
    a.checked_rem(b).filter(|r| *r == 0).and_then(|_| a.checked_div(b))
}

/// 2^53, past which not every integer has an exact f64
const MAX_SAFE_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Render a float as JSON, keeping integral results integral
fn number(value: f64) -> Result<Value, BoxError> {
    if !value.is_finite() {
        return Err(format!("arithmetic produced a non-finite result: {}", value).into());
    }
    if value.fract() == 0.0 && value.abs() < MAX_SAFE_FLOAT {
        Ok(Value::from(value as i64))
    } else {
        Ok(Value::from(value))
    }
}

/// Keeps the items for which a predicate holds
pub struct FilterNode {
    id: String,
    predicate: Condition,
}

impl FilterNode {
    pub fn new<F>(id: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value, &RunContext) -> bool + Send + Sync + 'static,
    {
        Self::from_condition(id, Arc::new(predicate))
    }

    pub fn from_condition(id: impl Into<String>, predicate: Condition) -> Self {
        Self {
            id: id.into(),
            predicate,
        }
    }
}

#[async_trait]
impl Node for FilterNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn execute(&self, input: NodeInput, ctx: &RunContext) -> Result<Value, BoxError> {
        let items = expect_array(input)?;
        let kept: Vec<Value> = items
            .into_iter()
            .filter(|item| (self.predicate)(item, ctx))
            .collect();
        Ok(Value::Array(kept))
    }
}

/// Built-in per-item operations for `MapNode`
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MapOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Negate,
    Uppercase,
    Lowercase,
}

impl MapOp {
    pub fn needs_operand(&self) -> bool {
        matches!(
            self,
            MapOp::Add | MapOp::Subtract | MapOp::Multiply | MapOp::Divide
        )
    }

    pub fn apply(&self, item: &Value, operand: f64) -> Result<Value, BoxError> {
        let operand = Num::operand(operand);
        match self {
            MapOp::Add => Num::of(item)?.combine(operand, i64::checked_add, |a, b| a + b),
            MapOp::Subtract => Num::of(item)?.combine(operand, i64::checked_sub, |a, b| a - b),
            MapOp::Multiply => Num::of(item)?.combine(operand, i64::checked_mul, |a, b| a * b),
            MapOp::Divide => Num::of(item)?.combine(operand, exact_div, |a, b| a / b),
            MapOp::Negate => {
                Num::of(item)?.combine(Num::Int(0), |a, _| a.checked_neg(), |a, _| -a)
            }
            MapOp::Uppercase | MapOp::Lowercase => {
                let s = item
                    .as_str()
                    .ok_or_else(|| format!("expected a string, got {}", type_name(item)))?;
                Ok(Value::String(if *self == MapOp::Uppercase {
                    s.to_uppercase()
                } else {
                    s.to_lowercase()
                }))
            }
        }
    }
}

/// Applies a fallible function to every item
pub struct MapNode {
    id: String,
    func: MapFn,
}

impl MapNode {
    pub fn new<F>(id: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            func: Arc::new(func),
        }
    }

    pub fn with_op(id: impl Into<String>, op: MapOp, operand: f64) -> Self {
        Self::new(id, move |item| op.apply(item, operand))
    }
}

#[async_trait]
impl Node for MapNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn execute(&self, input: NodeInput, _ctx: &RunContext) -> Result<Value, BoxError> {
        let mapped = expect_array(input)?
            .iter()
            .map(|item| (self.func)(item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::Array(mapped))
    }
}

/// Built-in folds for `ReduceNode`
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReduceOp {
    Sum,
    Product,
    Min,
    Max,
    Count,
    /// Joins strings, or flattens arrays, onto the accumulator
    Concat,
}

impl ReduceOp {
    pub fn apply(&self, acc: Value, item: &Value) -> Result<Value, BoxError> {
        match self {
            ReduceOp::Sum => {
                Num::of(&acc)?.combine(Num::of(item)?, i64::checked_add, |a, b| a + b)
            }
            ReduceOp::Product => {
                Num::of(&acc)?.combine(Num::of(item)?, i64::checked_mul, |a, b| a * b)
            }
            ReduceOp::Min => Num::of(&acc)?.pick(Num::of(item)?, Ordering::Less),
            ReduceOp::Max => Num::of(&acc)?.pick(Num::of(item)?, Ordering::Greater),
            ReduceOp::Count => {
                Num::of(&acc)?.combine(Num::Int(1), i64::checked_add, |a, b| a + b)
            }
            ReduceOp::Concat => match (acc, item) {
                (Value::String(mut s), Value::String(next)) => {
                    s.push_str(next);
                    Ok(Value::String(s))
                }
                (Value::Array(mut items), Value::Array(more)) => {
                    items.extend(more.iter().cloned());
                    Ok(Value::Array(items))
                }
                (Value::Array(mut items), other) => {
                    items.push(other.clone());
                    Ok(Value::Array(items))
                }
                (acc, _) => Err(format!("cannot concat onto {}", type_name(&acc)).into()),
            },
        }
    }

    /// Accumulator used when a definition gives no initial value
    pub fn default_initial(&self) -> Value {
        match self {
            ReduceOp::Sum | ReduceOp::Count => Value::from(0),
            ReduceOp::Product => Value::from(1),
            ReduceOp::Min => Value::from(f64::MAX),
            ReduceOp::Max => Value::from(f64::MIN),
            ReduceOp::Concat => Value::Array(vec![]),
        }
    }
}

/// Folds the items into one value starting from `initial`
pub struct ReduceNode {
    id: String,
    initial: Value,
    func: ReduceFn,
}

impl ReduceNode {
    pub fn new<F>(id: impl Into<String>, initial: Value, func: F) -> Self
    where
        F: Fn(Value, &Value) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            initial,
            func: Arc::new(func),
        }
    }

    pub fn with_op(id: impl Into<String>, op: ReduceOp, initial: Option<Value>) -> Self {
        let initial = initial.unwrap_or_else(|| op.default_initial());
        Self::new(id, initial, move |acc, item| op.apply(acc, item))
    }
}

#[async_trait]
impl Node for ReduceNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn execute(&self, input: NodeInput, _ctx: &RunContext) -> Result<Value, BoxError> {
        expect_array(input)?
            .iter()
            .try_fold(self.initial.clone(), |acc, item| (self.func)(acc, item))
    }
}
