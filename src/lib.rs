// SPDX-License-Identifier: MIT

//! In-process graph execution engine
//!
//! Nodes are connected by directed edges carrying optional transforms and
//! conditions. `Graph::execute` walks the graph from its entry nodes,
//! aggregating upstream outputs into each node's input, and returns every
//! output together with the errors recorded along the way.

pub mod engine;
pub mod flow;

pub use engine::{
    BoxError, Edge, EngineConfig, ExecutionMode, ExecutionResult, Graph, GraphError, Node,
    NodeInput, RunContext,
};
