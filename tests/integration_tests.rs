//! Integration tests for graph construction and execution
//!
//! These tests verify end-to-end behaviour using built-in and mock nodes.

use async_trait::async_trait;
use flowgraph_rs::engine::state::{FieldType, ReducerType, StateFieldDef, StateSchema};
use flowgraph_rs::engine::{
    BoxError, Edge, EngineConfig, Graph, GraphError, Node, NodeInput, RunContext, SkipReason,
};
use flowgraph_rs::flow::nodes::{
    FilterNode, MapNode, MapOp, PassthroughNode, ReduceNode, ReduceOp, SubgraphNode, TransformNode,
};
use flowgraph_rs::flow::patterns::fan_out_in;
use flowgraph_rs::flow::{GraphBuilder, GraphLoader, NodeRegistry};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Barrier;

// ============================================================================
// Mock Components
// ============================================================================

/// Mock node that counts its invocations and returns a fixed value
struct CountingNode {
    id: String,
    value: Value,
    calls: AtomicUsize,
}

impl CountingNode {
    fn new(id: &str, value: Value) -> Self {
        Self {
            id: id.to_string(),
            value,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Node for CountingNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn execute(&self, _input: NodeInput, _ctx: &RunContext) -> Result<Value, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.value.clone())
    }
}

/// Mock node that always fails
struct ErrorNode(&'static str);

#[async_trait]
impl Node for ErrorNode {
    fn id(&self) -> &str {
        self.0
    }

    async fn execute(&self, _input: NodeInput, _ctx: &RunContext) -> Result<Value, BoxError> {
        Err("intentional failure".into())
    }
}

/// Mock node that appends its id to the `visited` state key
struct VisitNode(&'static str);

#[async_trait]
impl Node for VisitNode {
    fn id(&self) -> &str {
        self.0
    }

    async fn execute(&self, input: NodeInput, ctx: &RunContext) -> Result<Value, BoxError> {
        ctx.set("visited", json!(self.0));
        Ok(input.into_value())
    }
}

/// Mock node that waits until every node sharing the barrier has started
struct RendezvousNode {
    id: String,
    barrier: Arc<Barrier>,
}

#[async_trait]
impl Node for RendezvousNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn execute(&self, _input: NodeInput, _ctx: &RunContext) -> Result<Value, BoxError> {
        self.barrier.wait().await;
        Ok(json!(self.id))
    }
}

fn uppercase(id: &str) -> Arc<dyn Node> {
    Arc::new(TransformNode::new(id, |value| match value {
        Value::String(s) => Ok(Value::String(s.to_uppercase())),
        other => Err(format!("expected a string, got {}", other).into()),
    }))
}

// ============================================================================
// Engine Tests
// ============================================================================

#[tokio::test]
async fn test_no_edges_every_node_gets_payload() {
    let mut graph = Graph::new("flat");
    for id in ["a", "b", "c"] {
        graph.add_node(Arc::new(PassthroughNode::new(id)));
    }

    let result = graph.execute(json!({"n": 1})).await;

    assert!(result.succeeded);
    assert_eq!(result.outputs.len(), 3);
    for id in ["a", "b", "c"] {
        assert_eq!(result.output(id), Some(&json!({"n": 1})));
    }
}

#[tokio::test]
async fn test_failing_branch_does_not_affect_sibling() {
    let mut graph = Graph::new("branches");
    graph
        .add_node(Arc::new(PassthroughNode::new("entry")))
        .add_node(Arc::new(ErrorNode("error_branch")))
        .add_node(Arc::new(PassthroughNode::new("error_terminal")))
        .add_node(uppercase("ok_branch"))
        .add_node(Arc::new(PassthroughNode::new("ok_terminal")))
        .add_edge(Edge::new("entry", "error_branch"))
        .add_edge(Edge::new("error_branch", "error_terminal"))
        .add_edge(Edge::new("entry", "ok_branch"))
        .add_edge(Edge::new("ok_branch", "ok_terminal"));

    let result = graph.execute(json!("hello")).await;

    assert!(!result.succeeded);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(
        result.errors[0],
        GraphError::failed("error_branch", "intentional failure")
    );
    assert!(result.output("error_terminal").is_none());
    assert_eq!(result.output("ok_terminal"), Some(&json!("HELLO")));
}

#[tokio::test]
async fn test_conditional_edges_route_by_value() {
    let mut graph = Graph::new("route");
    graph
        .add_node(Arc::new(PassthroughNode::new("entry")))
        .add_node(Arc::new(PassthroughNode::new("positive")))
        .add_node(Arc::new(PassthroughNode::new("non_positive")))
        .add_edge(Edge::new("entry", "positive").when("data > 0").unwrap())
        .add_edge(Edge::new("entry", "non_positive").when("data <= 0").unwrap());

    let result = graph.execute(json!(5)).await;

    assert!(result.succeeded);
    assert_eq!(result.output("positive"), Some(&json!(5)));
    assert!(result.output("non_positive").is_none());
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].id, "non_positive");
    assert_eq!(result.skipped[0].reason, SkipReason::NoQualifyingInput);
}

#[tokio::test]
async fn test_filter_map_reduce_pipeline() {
    let mut graph = Graph::new("pipeline");
    graph
        .add_node(Arc::new(PassthroughNode::new("input")))
        .add_node(Arc::new(FilterNode::new("filter", |v, _| {
            v.as_f64().is_some_and(|n| n > 0.0)
        })))
        .add_node(Arc::new(MapNode::with_op("map", MapOp::Multiply, 2.0)))
        .add_node(Arc::new(ReduceNode::with_op(
            "reduce",
            ReduceOp::Sum,
            Some(json!(0)),
        )))
        .add_node(Arc::new(PassthroughNode::new("output")))
        .add_edge(Edge::new("input", "filter"))
        .add_edge(Edge::new("filter", "map"))
        .add_edge(Edge::new("map", "reduce"))
        .add_edge(Edge::new("reduce", "output"));

    let result = graph.execute(json!([1, -2, 3, -4, 5])).await;

    assert!(result.succeeded);
    assert_eq!(result.output("output"), Some(&json!(18)));
}

#[tokio::test]
async fn test_repeated_runs_are_equal() {
    let counter = Arc::new(CountingNode::new("count", json!("same")));
    let mut graph = Graph::new("repeat");
    graph
        .add_node(counter.clone())
        .add_node(Arc::new(ErrorNode("fail")))
        .add_edge(Edge::new("count", "fail"));

    let first = graph.execute(json!(1)).await;
    let second = graph.execute(json!(1)).await;

    assert_eq!(first.outputs, second.outputs);
    assert_eq!(first.errors, second.errors);
    assert_eq!(counter.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_edge_to_unregistered_node() {
    let mut graph = Graph::new("dangling");
    graph
        .add_node(Arc::new(PassthroughNode::new("a")))
        .add_edge(Edge::new("a", "missing"));

    let result = graph.execute(json!(null)).await;

    assert!(!result.succeeded);
    assert_eq!(result.errors, vec![GraphError::not_found("missing")]);
    assert_eq!(result.output("a"), Some(&json!(null)));
}

#[tokio::test]
async fn test_cycle_terminates() {
    let mut graph = Graph::new("loop");
    graph
        .add_node(Arc::new(PassthroughNode::new("start")))
        .add_node(Arc::new(PassthroughNode::new("ping")))
        .add_node(Arc::new(PassthroughNode::new("pong")))
        .add_edge(Edge::new("start", "ping"))
        .add_edge(Edge::new("ping", "pong"))
        .add_edge(Edge::new("pong", "ping"));

    let result = tokio::time::timeout(Duration::from_secs(5), graph.execute(json!(1)))
        .await
        .expect("cycle must not hang the scheduler");

    assert_eq!(result.output("start"), Some(&json!(1)));
    assert!(result.was_skipped("ping"));
    assert!(result.was_skipped("pong"));
    assert!(matches!(
        result.errors.as_slice(),
        [GraphError::CycleDetected { nodes }] if nodes == &["ping", "pong"]
    ));
}

#[tokio::test]
async fn test_concurrent_mode_runs_ready_nodes_together() {
    // Both branches block until the other has started, which only completes
    // when they are dispatched in the same wave.
    let barrier = Arc::new(Barrier::new(2));
    let mut graph = Graph::new("rendezvous").with_config(EngineConfig::concurrent());
    fan_out_in(
        &mut graph,
        Arc::new(PassthroughNode::new("start")),
        ["left", "right"].map(|id| {
            Arc::new(RendezvousNode {
                id: id.to_string(),
                barrier: barrier.clone(),
            }) as Arc<dyn Node>
        }),
        Arc::new(PassthroughNode::new("join")),
    );

    let result = tokio::time::timeout(Duration::from_secs(5), graph.execute(json!(null)))
        .await
        .expect("concurrent branches should meet at the barrier");

    assert!(result.succeeded);
    assert_eq!(result.output("join"), Some(&json!(["left", "right"])));
}

#[tokio::test]
async fn test_context_state_uses_reducers() {
    let schema = StateSchema::default().field(
        "visited",
        StateFieldDef::new(FieldType::Array).with_reducer(ReducerType::Append),
    );
    let mut graph = Graph::new("visits").with_state_schema(schema);
    graph
        .add_node(Arc::new(VisitNode("first")))
        .add_node(Arc::new(VisitNode("second")))
        .add_edge(Edge::new("first", "second"));

    let result = graph.execute(json!(0)).await;

    assert_eq!(result.state["visited"], json!(["first", "second"]));
}

#[tokio::test]
async fn test_subgraph_node_nests_a_run() {
    let mut inner = Graph::new("inner");
    inner
        .add_node(Arc::new(MapNode::with_op("inc", MapOp::Add, 1.0)))
        .add_node(Arc::new(ReduceNode::with_op("sum", ReduceOp::Sum, None)))
        .add_edge(Edge::new("inc", "sum"));

    let mut outer = Graph::new("outer");
    outer
        .add_node(Arc::new(PassthroughNode::new("in")))
        .add_node(Arc::new(SubgraphNode::new("nested", Arc::new(inner))))
        .add_edge(Edge::new("in", "nested"));

    let result = outer.execute(json!([1, 2, 3])).await;

    assert!(result.succeeded);
    assert_eq!(result.output("nested"), Some(&json!(9)));
}

// ============================================================================
// Definition Tests
// ============================================================================

const PIPELINE_YAML: &str = r#"
name: sum-doubled-positives
description: "Keeps positive numbers, doubles them and sums the result"
nodes:
  - id: input
    kind: passthrough
  - id: filter
    kind: filter
    when: "item > 0"
  - id: map
    kind: map
    op: multiply
    operand: 2
  - id: reduce
    kind: reduce
    op: sum
    initial: 0
  - id: output
    kind: passthrough
edges:
  - from: input
    to: filter
  - from: filter
    to: map
  - from: map
    to: reduce
  - from: reduce
    to: output
"#;

#[tokio::test]
async fn test_yaml_pipeline_end_to_end() {
    let def = GraphLoader::parse_yaml(PIPELINE_YAML).unwrap();
    let graph = GraphBuilder::new(NodeRegistry::new())
        .build(&def)
        .await
        .unwrap();

    let result = graph.execute(json!([1, -2, 3, -4, 5])).await;

    assert!(result.succeeded);
    assert_eq!(result.output("output"), Some(&json!(18)));
    assert_eq!(result.to_json()["outputs"]["output"], 18);
}

#[tokio::test]
async fn test_yaml_registered_nodes_and_failure() {
    let registry = NodeRegistry::new();
    registry
        .register(
            "shout",
            |id: &str, _: &Value| -> Result<Arc<dyn Node>, BoxError> { Ok(uppercase(id)) },
        )
        .await;

    let def = GraphLoader::parse_yaml(
        r#"
name: shouting
mode: concurrent
nodes:
  - id: entry
    kind: passthrough
  - id: loud
    kind: registered
    factory: shout
  - id: count
    kind: reduce
    op: count
edges:
  - from: entry
    to: loud
    select: message
  - from: entry
    to: count
    select: message
"#,
    )
    .unwrap();
    let graph = GraphBuilder::new(registry).build(&def).await.unwrap();

    let result = graph.execute(json!({"message": "hi"})).await;

    assert_eq!(result.output("loud"), Some(&json!("HI")));
    assert!(result.output("count").is_none());
    assert!(!result.succeeded);
    assert!(matches!(
        &result.errors[0],
        GraphError::NodeFailed { id, message } if id == "count" && message.contains("array")
    ));
}
