// SPDX-License-Identifier: MIT

//! Core execution engine: graph store, run context and scheduler

mod config;
mod context;
mod edge;
mod error;
mod executor;
mod graph;
mod node;
mod result;
pub mod state;

pub use config::{EngineConfig, ExecutionMode};
pub use context::RunContext;
pub use edge::{Condition, Edge, Transform};
pub use error::{BoxError, GraphError};
pub use graph::Graph;
pub use node::{Node, NodeInput};
pub use result::{ExecutionResult, SkipReason, SkippedNode};
