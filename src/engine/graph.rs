// SPDX-License-Identifier: MIT

//! Graph store: node registry and adjacency list

use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::config::EngineConfig;
use super::edge::Edge;
use super::executor;
use super::node::Node;
use super::result::ExecutionResult;
use super::state::StateSchema;

/// A set of nodes and the edges between them
///
/// Built once (possibly incrementally) and executable any number of times;
/// each `execute` call is independent.
pub struct Graph {
    name: String,
    nodes: HashMap<String, Arc<dyn Node>>,
    node_order: Vec<String>,
    edges: HashMap<String, Vec<Edge>>,
    source_order: Vec<String>,
    schema: Option<StateSchema>,
    config: EngineConfig,
}

impl Graph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: HashMap::new(),
            node_order: Vec::new(),
            edges: HashMap::new(),
            source_order: Vec::new(),
            schema: None,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_state_schema(mut self, schema: StateSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state_schema(&self) -> Option<&StateSchema> {
        self.schema.as_ref()
    }

    /// Register a node, replacing any node already registered under its id
    pub fn add_node(&mut self, node: Arc<dyn Node>) -> &mut Self {
        let id = node.id().to_string();
        if self.nodes.insert(id.clone(), node).is_none() {
            self.node_order.push(id.clone());
        }
        self.ensure_edge_list(&id);
        self
    }

    /// Append an edge to its source's outgoing list
    pub fn add_edge(&mut self, edge: Edge) -> &mut Self {
        self.ensure_edge_list(&edge.from);
        if let Some(list) = self.edges.get_mut(&edge.from) {
            list.push(edge);
        }
        self
    }

    fn ensure_edge_list(&mut self, id: &str) {
        if !self.edges.contains_key(id) {
            self.edges.insert(id.to_string(), Vec::new());
            self.source_order.push(id.to_string());
        }
    }

    pub fn node(&self, id: &str) -> Option<&Arc<dyn Node>> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Registered node ids in registration order
    pub fn node_ids(&self) -> &[String] {
        &self.node_order
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn outgoing(&self, id: &str) -> &[Edge] {
        self.edges.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// All edges, grouped by source in first-seen order, then addition order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.source_order
            .iter()
            .flat_map(move |source| self.outgoing(source).iter())
    }

    /// Edges targeting `id`, in aggregation order
    pub fn incoming(&self, id: &str) -> Vec<&Edge> {
        self.edges().filter(|edge| edge.to == id).collect()
    }

    /// Nodes with no incoming edge, in registration order
    ///
    /// Recomputed on every call so edges added later are honoured.
    pub fn entry_nodes(&self) -> Vec<String> {
        let targets: HashSet<&str> = self.edges().map(|edge| edge.to.as_str()).collect();
        self.node_order
            .iter()
            .filter(|id| !targets.contains(id.as_str()))
            .cloned()
            .collect()
    }

    /// Nodes with no outgoing edge, in registration order
    pub fn terminal_nodes(&self) -> Vec<String> {
        self.node_order
            .iter()
            .filter(|id| self.outgoing(id).is_empty())
            .cloned()
            .collect()
    }

    /// Distinct source ids of edges targeting `id`; cycle-closing edges count too
    pub fn dependencies(&self, id: &str) -> Vec<String> {
        distinct(self.incoming(id).into_iter().map(|edge| edge.from.as_str()))
    }

    /// Distinct target ids of edges leaving `id`
    pub fn downstream(&self, id: &str) -> Vec<String> {
        distinct(self.outgoing(id).iter().map(|edge| edge.to.as_str()))
    }

    /// Edge sources that were never registered as nodes
    pub fn unregistered_sources(&self) -> Vec<String> {
        self.source_order
            .iter()
            .filter(|id| !self.nodes.contains_key(*id) && !self.outgoing(id).is_empty())
            .cloned()
            .collect()
    }

    /// Run the graph with `initial` as the payload of every entry node
    pub async fn execute(&self, initial: Value) -> ExecutionResult {
        executor::run(self, initial).await
    }
}

fn distinct<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}
