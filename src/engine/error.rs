// SPDX-License-Identifier: MIT

//! Run-level error types for the graph engine
//!
//! Errors raised while walking a graph are collected into the run's
//! error list instead of being returned from `Graph::execute`.

use thiserror::Error;

/// Error type returned by node implementations
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An error recorded during a single graph run
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GraphError {
    /// An edge references a node id that was never registered
    #[error("Node '{id}' not found")]
    NodeNotFound { id: String },

    /// The node's unit of work returned a failed result
    #[error("Node '{id}' failed: {message}")]
    NodeFailed { id: String, message: String },

    /// The node's unit of work panicked
    #[error("Node '{id}' panicked: {message}")]
    NodePanicked { id: String, message: String },

    /// Nodes that could never become ready because they sit on or behind a cycle
    #[error("Circular dependency detected: {nodes:?}")]
    CycleDetected { nodes: Vec<String> },
}

impl GraphError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound { id: id.into() }
    }

    pub fn failed(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NodeFailed {
            id: id.into(),
            message: message.into(),
        }
    }

    pub fn panicked(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NodePanicked {
            id: id.into(),
            message: message.into(),
        }
    }

    /// The node this error is attributed to, if any
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Self::NodeNotFound { id }
            | Self::NodeFailed { id, .. }
            | Self::NodePanicked { id, .. } => Some(id),
            Self::CycleDetected { .. } => None,
        }
    }
}
