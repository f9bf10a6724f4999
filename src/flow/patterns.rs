// SPDX-License-Identifier: MIT

//! Orchestration recipes built from `add_node` and `add_edge`

use std::sync::Arc;

use crate::engine::{Edge, Graph, Node};

/// Add `nodes` as a sequential chain, each feeding the next
///
/// Returns the ids in chain order.
pub fn chain(graph: &mut Graph, nodes: impl IntoIterator<Item = Arc<dyn Node>>) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for node in nodes {
        let id = node.id().to_string();
        graph.add_node(node);
        if let Some(prev) = ids.last() {
            graph.add_edge(Edge::new(prev.clone(), id.clone()));
        }
        ids.push(id);
    }
    ids
}

/// Fan `source` out to every branch, then join all branches into `collector`
///
/// The collector receives `NodeInput::Many` in branch order when two or
/// more branches succeed.
pub fn fan_out_in(
    graph: &mut Graph,
    source: Arc<dyn Node>,
    branches: impl IntoIterator<Item = Arc<dyn Node>>,
    collector: Arc<dyn Node>,
) {
    let source_id = source.id().to_string();
    let collector_id = collector.id().to_string();
    graph.add_node(source);

    let mut branch_ids = Vec::new();
    for branch in branches {
        let id = branch.id().to_string();
        graph.add_node(branch);
        graph.add_edge(Edge::new(source_id.clone(), id.clone()));
        branch_ids.push(id);
    }

    graph.add_node(collector);
    for id in branch_ids {
        graph.add_edge(Edge::new(id, collector_id.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::nodes::{MapNode, MapOp, PassthroughNode, ReduceNode, ReduceOp};
    use serde_json::json;

    #[tokio::test]
    async fn test_chain() {
        let mut graph = Graph::new("chain");
        let ids = chain(
            &mut graph,
            [
                Arc::new(PassthroughNode::new("in")) as Arc<dyn Node>,
                Arc::new(MapNode::with_op("inc", MapOp::Add, 1.0)),
                Arc::new(ReduceNode::with_op("sum", ReduceOp::Sum, None)),
            ],
        );

        assert_eq!(ids, vec!["in", "inc", "sum"]);
        assert_eq!(graph.entry_nodes(), vec!["in"]);

        let result = graph.execute(json!([1, 2, 3])).await;
        assert_eq!(result.output("sum"), Some(&json!(9)));
    }

    #[tokio::test]
    async fn test_fan_out_in() {
        let mut graph = Graph::new("fan");
        fan_out_in(
            &mut graph,
            Arc::new(PassthroughNode::new("split")),
            [
                Arc::new(MapNode::with_op("x2", MapOp::Multiply, 2.0)) as Arc<dyn Node>,
                Arc::new(MapNode::with_op("x3", MapOp::Multiply, 3.0)),
            ],
            Arc::new(PassthroughNode::new("join")),
        );

        assert_eq!(graph.dependencies("join"), vec!["x2", "x3"]);

        let result = graph.execute(json!([1])).await;
        assert_eq!(result.output("join"), Some(&json!([[2], [3]])));
    }
}
