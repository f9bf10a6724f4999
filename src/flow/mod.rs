// SPDX-License-Identifier: MIT

//! Application layer over the engine: built-in nodes, the condition
//! language, YAML graph definitions and orchestration patterns

pub mod builder;
pub mod condition;
pub mod error;
pub mod loader;
pub mod nodes;
pub mod patterns;
pub mod registry;
pub mod types;

pub use builder::GraphBuilder;
pub use error::{ConditionError, FlowError};
pub use loader::GraphLoader;
pub use registry::NodeRegistry;
pub use types::GraphDefinition;
