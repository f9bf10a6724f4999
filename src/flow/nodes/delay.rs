// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::engine::{BoxError, Node, NodeInput, RunContext};

/// Waits, then passes its input through
pub struct DelayNode {
    id: String,
    duration: Duration,
}

impl DelayNode {
    pub fn new(id: impl Into<String>, duration: Duration) -> Self {
        Self {
            id: id.into(),
            duration,
        }
    }

    pub fn from_millis(id: impl Into<String>, millis: u64) -> Self {
        Self::new(id, Duration::from_millis(millis))
    }
}

#[async_trait]
impl Node for DelayNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn execute(&self, input: NodeInput, _ctx: &RunContext) -> Result<Value, BoxError> {
        tokio::time::sleep(self.duration).await;
        Ok(input.into_value())
    }
}
