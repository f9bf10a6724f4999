// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::engine::{BoxError, Condition, Node, NodeInput, RunContext};

pub const THEN_BRANCH: &str = "then";
pub const ELSE_BRANCH: &str = "else";

/// Tests its input and records the chosen branch in the run context
///
/// Writes `"then"` or `"else"` under `key` and passes the input through, so
/// outgoing edges can branch with conditions such as `check == 'then'`.
/// Graph definitions default `key` to the node id, keeping sibling
/// conditionals from overwriting each other's verdict.
pub struct ConditionalNode {
    id: String,
    key: String,
    predicate: Condition,
}

impl ConditionalNode {
    pub fn new<F>(id: impl Into<String>, key: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value, &RunContext) -> bool + Send + Sync + 'static,
    {
        Self::from_condition(id, key, Arc::new(predicate))
    }

    pub fn from_condition(
        id: impl Into<String>,
        key: impl Into<String>,
        predicate: Condition,
    ) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            predicate,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl Node for ConditionalNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn execute(&self, input: NodeInput, ctx: &RunContext) -> Result<Value, BoxError> {
        let value = input.into_value();
        let branch = if (self.predicate)(&value, ctx) {
            THEN_BRANCH
        } else {
            ELSE_BRANCH
        };
        log::debug!("Conditional '{}' took the '{}' branch", self.id, branch);
        ctx.set(&self.key, Value::String(branch.to_string()));
        Ok(value)
    }
}
