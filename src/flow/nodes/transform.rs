// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::engine::{BoxError, Node, NodeInput, RunContext};

type TransformFn = Arc<dyn Fn(Value) -> Result<Value, BoxError> + Send + Sync>;

/// Applies a fallible function to the whole (flattened) input
pub struct TransformNode {
    id: String,
    transform: TransformFn,
}

impl TransformNode {
    pub fn new<F>(id: impl Into<String>, transform: F) -> Self
    where
        F: Fn(Value) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            transform: Arc::new(transform),
        }
    }
}

#[async_trait]
impl Node for TransformNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn execute(&self, input: NodeInput, _ctx: &RunContext) -> Result<Value, BoxError> {
        (self.transform)(input.into_value())
    }
}
