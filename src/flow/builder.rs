// SPDX-License-Identifier: MIT

//! Graph builder - turns definitions into runnable graphs
//!
//! Built-in node kinds are constructed directly; `registered` nodes are
//! resolved through the `NodeRegistry` and `subgraph` nodes load another
//! definition file relative to the one that references them.

use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use crate::engine::{Edge, EngineConfig, Graph, Node};
use crate::flow::condition::{compile, lookup, ITEM_BINDING};
use crate::flow::error::FlowError;
use crate::flow::loader::GraphLoader;
use crate::flow::nodes::{
    ConditionalNode, DelayNode, FilterNode, MapNode, PassthroughNode, ReduceNode, SubgraphNode,
};
use crate::flow::registry::NodeRegistry;
use crate::flow::types::{EdgeDefinition, GraphDefinition, NodeDefinition, NodeKind};

type BuildFuture<'a> = Pin<Box<dyn Future<Output = Result<Graph, FlowError>> + Send + 'a>>;

/// Builds graphs from YAML definitions
pub struct GraphBuilder {
    loader: GraphLoader,
    registry: NodeRegistry,
}

impl GraphBuilder {
    pub fn new(registry: NodeRegistry) -> Self {
        Self {
            loader: GraphLoader::new(),
            registry,
        }
    }

    /// Load and build a graph from a YAML file
    pub async fn build_file<P: AsRef<Path>>(&self, path: P) -> Result<Graph, FlowError> {
        self.build_file_within(path.as_ref().to_path_buf(), Vec::new())
            .await
    }

    /// Build a graph from a parsed definition; subgraph files resolve
    /// against the working directory
    pub async fn build(&self, def: &GraphDefinition) -> Result<Graph, FlowError> {
        self.build_def(def, None, Vec::new()).await
    }

    fn build_file_within(&self, path: PathBuf, mut chain: Vec<PathBuf>) -> BuildFuture<'_> {
        Box::pin(async move {
            let path = canonical(&path)?;
            if chain.contains(&path) {
                return Err(FlowError::InvalidDefinition(format!(
                    "subgraph '{}' includes itself",
                    path.display()
                )));
            }

            let def = self.loader.load_file(&path)?;
            let base = path.parent().map(Path::to_path_buf);
            chain.push(path);
            self.build_def(&def, base, chain).await
        })
    }

    fn build_def<'a>(
        &'a self,
        def: &'a GraphDefinition,
        base: Option<PathBuf>,
        chain: Vec<PathBuf>,
    ) -> BuildFuture<'a> {
        Box::pin(async move {
            let mut graph = Graph::new(def.name.clone()).with_config(EngineConfig { mode: def.mode });
            if let Some(schema) = &def.state {
                graph = graph.with_state_schema(schema.clone());
            }

            let mut seen = HashSet::new();
            for node_def in &def.nodes {
                if !seen.insert(node_def.id.as_str()) {
                    log::warn!(
                        "Graph '{}' defines node '{}' more than once; the last definition wins",
                        def.name,
                        node_def.id
                    );
                }
                let node = self.build_node(node_def, base.as_deref(), &chain).await?;
                graph.add_node(node);
            }

            for edge_def in &def.edges {
                for end in [&edge_def.from, &edge_def.to] {
                    if !seen.contains(end.as_str()) {
                        log::warn!(
                            "Graph '{}' has an edge referencing undefined node '{}'",
                            def.name,
                            end
                        );
                    }
                }
                graph.add_edge(build_edge(edge_def)?);
            }

            log::info!(
                "Built graph '{}' with {} nodes and {} edges",
                def.name,
                graph.len(),
                def.edges.len()
            );
            Ok(graph)
        })
    }

    async fn build_node(
        &self,
        def: &NodeDefinition,
        base: Option<&Path>,
        chain: &[PathBuf],
    ) -> Result<Arc<dyn Node>, FlowError> {
        let id = def.id.as_str();
        let node: Arc<dyn Node> = match def.kind {
            NodeKind::Passthrough => Arc::new(PassthroughNode::new(id)),
            NodeKind::Filter => {
                let predicate = compile(required(id, "when", &def.when)?, ITEM_BINDING)?;
                Arc::new(FilterNode::from_condition(id, predicate))
            }
            NodeKind::Map => {
                let op = def
                    .map_op()
                    .map_err(|e| FlowError::invalid_node(id, e.to_string()))?
                    .ok_or_else(|| FlowError::invalid_node(id, "missing 'op'"))?;
                let operand = match (op.needs_operand(), def.operand) {
                    (true, None) => {
                        return Err(FlowError::invalid_node(
                            id,
                            format!("op '{:?}' needs an 'operand'", op),
                        ))
                    }
                    (_, operand) => operand.unwrap_or_default(),
                };
                Arc::new(MapNode::with_op(id, op, operand))
            }
            NodeKind::Reduce => {
                let op = def
                    .reduce_op()
                    .map_err(|e| FlowError::invalid_node(id, e.to_string()))?
                    .ok_or_else(|| FlowError::invalid_node(id, "missing 'op'"))?;
                Arc::new(ReduceNode::with_op(id, op, def.initial.clone()))
            }
            NodeKind::Conditional => {
                let predicate = compile(required(id, "when", &def.when)?, ITEM_BINDING)?;
                let key = def.key.as_deref().unwrap_or(id);
                Arc::new(ConditionalNode::from_condition(id, key, predicate))
            }
            NodeKind::Delay => {
                let millis = def
                    .millis
                    .ok_or_else(|| FlowError::invalid_node(id, "missing 'millis'"))?;
                Arc::new(DelayNode::from_millis(id, millis))
            }
            NodeKind::Subgraph => {
                let file = required(id, "file", &def.file)?;
                let path = match base {
                    Some(base) => base.join(file),
                    None => PathBuf::from(file),
                };
                let inner = self.build_file_within(path, chain.to_vec()).await?;
                Arc::new(SubgraphNode::new(id, Arc::new(inner)))
            }
            NodeKind::Registered => {
                let name = required(id, "factory", &def.factory)?;
                let factory = self
                    .registry
                    .get(name)
                    .await
                    .ok_or_else(|| FlowError::UnknownFactory(name.to_string()))?;
                let node = factory(id, &def.config)
                    .map_err(|e| FlowError::invalid_node(id, e.to_string()))?;
                if node.id() != id {
                    return Err(FlowError::invalid_node(
                        id,
                        format!("factory '{}' produced node '{}'", name, node.id()),
                    ));
                }
                node
            }
        };
        Ok(node)
    }
}

/// Resolve `..` and symlinks so each file has one identity in the include chain
fn canonical(path: &Path) -> Result<PathBuf, FlowError> {
    fs::canonicalize(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => FlowError::FileNotFound(path.display().to_string()),
        _ => FlowError::Io(e),
    })
}

fn required<'a>(id: &str, field: &str, value: &'a Option<String>) -> Result<&'a str, FlowError> {
    value
        .as_deref()
        .ok_or_else(|| FlowError::invalid_node(id, format!("missing '{}'", field)))
}

fn build_edge(def: &EdgeDefinition) -> Result<Edge, FlowError> {
    let mut edge = Edge::new(def.from.clone(), def.to.clone());
    if let Some(path) = def.select.clone() {
        edge = edge.with_transform(move |value: Value| {
            lookup(&value, &path).cloned().unwrap_or(Value::Null)
        });
    }
    if let Some(when) = &def.when {
        edge = edge.when(when)?;
    }
    Ok(edge)
}
