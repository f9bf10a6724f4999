// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;

use crate::engine::{BoxError, Node, NodeInput, RunContext};

/// Returns its input unchanged; `Many` inputs become an array
pub struct PassthroughNode {
    id: String,
}

impl PassthroughNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Node for PassthroughNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn execute(&self, input: NodeInput, _ctx: &RunContext) -> Result<Value, BoxError> {
        Ok(input.into_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_passthrough() {
        let ctx = RunContext::new(None);
        let node = PassthroughNode::new("p");
        assert_eq!(node.id(), "p");
        assert_eq!(
            node.execute(NodeInput::Single(json!(1)), &ctx).await.unwrap(),
            json!(1)
        );
        assert_eq!(
            node.execute(NodeInput::Many(vec![json!(1), json!(2)]), &ctx)
                .await
                .unwrap(),
            json!([1, 2])
        );
    }
}
