// SPDX-License-Identifier: MIT

//! The node abstraction executed by the engine

use async_trait::async_trait;
use serde_json::Value;

use super::context::RunContext;
use super::error::BoxError;

/// Aggregated input handed to a node
///
/// Entry nodes receive the run payload as `Single`. Other nodes receive
/// `Single` when exactly one upstream edge contributed and `Many` (in edge
/// order, possibly empty) otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeInput {
    Single(Value),
    Many(Vec<Value>),
}

impl NodeInput {
    pub(crate) fn from_values(mut values: Vec<Value>) -> Self {
        if values.len() == 1 {
            Self::Single(values.remove(0))
        } else {
            Self::Many(values)
        }
    }

    /// Flatten to a JSON value, `Many` becoming an array
    pub fn into_value(self) -> Value {
        match self {
            Self::Single(value) => value,
            Self::Many(values) => Value::Array(values),
        }
    }

    pub fn as_single(&self) -> Option<&Value> {
        match self {
            Self::Single(value) => Some(value),
            Self::Many(_) => None,
        }
    }

    /// All contributions as a list; `Single` yields one element
    pub fn into_vec(self) -> Vec<Value> {
        match self {
            Self::Single(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

/// A unit of work in a graph
///
/// `Ok` is a succeeded result carrying the node's output, `Err` a failed
/// one. A panic inside `execute` is caught by the executor and recorded as
/// a fault; it never escapes `Graph::execute`.
#[async_trait]
pub trait Node: Send + Sync {
    /// Unique id of the node within its graph
    fn id(&self) -> &str;

    async fn execute(&self, input: NodeInput, ctx: &RunContext) -> Result<Value, BoxError>;
}
