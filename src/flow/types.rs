// SPDX-License-Identifier: MIT

//! YAML schema types for graph definitions
//!
//! ```yaml
//! name: sum-positives
//! mode: sequential
//! nodes:
//!   - id: input
//!     kind: passthrough
//!   - id: positives
//!     kind: filter
//!     when: "item > 0"
//! edges:
//!   - from: input
//!     to: positives
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::state::StateSchema;
use crate::engine::ExecutionMode;
use crate::flow::nodes::{MapOp, ReduceOp};

/// Top-level graph definition
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GraphDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mode: ExecutionMode,
    /// Declared run-state fields with reducers and defaults
    pub state: Option<StateSchema>,
    pub nodes: Vec<NodeDefinition>,
    #[serde(default)]
    pub edges: Vec<EdgeDefinition>,
}

/// Built-in node kinds a definition can instantiate
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Passthrough,
    Filter,
    Map,
    Reduce,
    Conditional,
    Delay,
    /// Another graph definition file run as a single node
    Subgraph,
    /// Built by a factory from the `NodeRegistry`
    Registered,
}

/// A node in a graph definition
///
/// Which optional fields are required depends on `kind`:
/// - `filter`: `when`
/// - `map`: `op`, plus `operand` for arithmetic ops
/// - `reduce`: `op`, optional `initial`
/// - `conditional`: `when`, optional `key` (defaults to the node id)
/// - `delay`: `millis`
/// - `subgraph`: `file`
/// - `registered`: `factory`, optional `config`
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NodeDefinition {
    pub id: String,
    pub kind: NodeKind,
    pub when: Option<String>,
    pub op: Option<String>,
    pub operand: Option<f64>,
    pub initial: Option<Value>,
    pub key: Option<String>,
    pub millis: Option<u64>,
    pub file: Option<String>,
    pub factory: Option<String>,
    #[serde(default)]
    pub config: Value,
}

impl NodeDefinition {
    pub fn map_op(&self) -> Result<Option<MapOp>, serde_yaml::Error> {
        self.op.as_deref().map(serde_yaml::from_str).transpose()
    }

    pub fn reduce_op(&self) -> Result<Option<ReduceOp>, serde_yaml::Error> {
        self.op.as_deref().map(serde_yaml::from_str).transpose()
    }
}

/// An edge in a graph definition
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EdgeDefinition {
    pub from: String,
    pub to: String,
    /// Condition over the edge data, bound as `data`
    pub when: Option<String>,
    /// Dotted path selecting part of the upstream output
    pub select: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_ops() {
        let node: NodeDefinition = serde_yaml::from_str(
            r#"
id: double
kind: map
op: multiply
operand: 2
"#,
        )
        .unwrap();
        assert_eq!(node.kind, NodeKind::Map);
        assert_eq!(node.map_op().unwrap(), Some(MapOp::Multiply));
        assert_eq!(node.operand, Some(2.0));
        assert_eq!(node.config, Value::Null);

        let node: NodeDefinition =
            serde_yaml::from_str("id: total\nkind: reduce\nop: sum\ninitial: 0").unwrap();
        assert_eq!(node.reduce_op().unwrap(), Some(ReduceOp::Sum));

        let node: NodeDefinition = serde_yaml::from_str("id: x\nkind: map\nop: modulo").unwrap();
        assert!(node.map_op().is_err());
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let result: Result<NodeDefinition, _> = serde_yaml::from_str("id: x\nkind: http");
        assert!(result.is_err());
    }
}
