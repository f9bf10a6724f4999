// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::engine::{BoxError, Graph, Node, NodeInput, RunContext};

/// Runs a nested graph with the input as its payload
///
/// Produces the output of the nested terminal node when there is exactly
/// one, otherwise an object keyed by terminal node id. Any error in the
/// nested run fails this node.
pub struct SubgraphNode {
    id: String,
    graph: Arc<Graph>,
}

impl SubgraphNode {
    pub fn new(id: impl Into<String>, graph: Arc<Graph>) -> Self {
        Self {
            id: id.into(),
            graph,
        }
    }
}

#[async_trait]
impl Node for SubgraphNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn execute(&self, input: NodeInput, _ctx: &RunContext) -> Result<Value, BoxError> {
        let mut result = self.graph.execute(input.into_value()).await;

        if !result.succeeded {
            let reasons: Vec<String> = result.errors.iter().map(ToString::to_string).collect();
            return Err(format!(
                "subgraph '{}' failed: {}",
                self.graph.name(),
                reasons.join("; ")
            )
            .into());
        }

        let terminals = self.graph.terminal_nodes();
        if let [only] = terminals.as_slice() {
            return Ok(result.outputs.remove(only).unwrap_or(Value::Null));
        }

        let collected: Map<String, Value> = terminals
            .into_iter()
            .filter_map(|id| {
                let output = result.outputs.remove(&id)?;
                Some((id, output))
            })
            .collect();
        Ok(Value::Object(collected))
    }
}
