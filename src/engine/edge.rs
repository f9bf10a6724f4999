// SPDX-License-Identifier: MIT

//! Directed data links between nodes

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::context::RunContext;

/// Reshapes an upstream output before it reaches the target
pub type Transform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Decides whether an edge contributes, given the (transformed) data and the run context
pub type Condition = Arc<dyn Fn(&Value, &RunContext) -> bool + Send + Sync>;

/// An edge from one node to another, optionally transformed and conditioned
#[derive(Clone)]
pub struct Edge {
    pub from: String,
    pub to: String,
    transform: Option<Transform>,
    condition: Option<Condition>,
}

impl Edge {
    /// An unconditional edge that forwards the source output unchanged
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            transform: None,
            condition: None,
        }
    }

    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    pub fn with_condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(&Value, &RunContext) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Arc::new(condition));
        self
    }

    pub fn has_transform(&self) -> bool {
        self.transform.is_some()
    }

    pub fn has_condition(&self) -> bool {
        self.condition.is_some()
    }

    /// Apply the transform, then the condition.
    ///
    /// Returns the value this edge contributes to its target, or `None` when
    /// the condition rejects it.
    pub fn evaluate(&self, data: &Value, ctx: &RunContext) -> Option<Value> {
        let data = match &self.transform {
            Some(transform) => transform(data.clone()),
            None => data.clone(),
        };

        match &self.condition {
            Some(condition) if !condition(&data, ctx) => None,
            _ => Some(data),
        }
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edge")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("transform", &self.transform.is_some())
            .field("condition", &self.condition.is_some())
            .finish()
    }
}
