// SPDX-License-Identifier: MIT

//! Built-in node kinds
//!
//! - `PassthroughNode` / `TransformNode` - identity and whole-value transforms
//! - `FilterNode` / `MapNode` / `ReduceNode` - array processing
//! - `ConditionalNode` - records a branch decision in the run context
//! - `DelayNode` - timed pause
//! - `SubgraphNode` - runs a nested graph as one node

mod collection;
mod conditional;
mod delay;
mod passthrough;
mod subgraph;
mod transform;

pub use collection::{FilterNode, MapNode, MapOp, ReduceNode, ReduceOp};
pub use conditional::{ConditionalNode, ELSE_BRANCH, THEN_BRANCH};
pub use delay::DelayNode;
pub use passthrough::PassthroughNode;
pub use subgraph::SubgraphNode;
pub use transform::TransformNode;
