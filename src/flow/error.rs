// SPDX-License-Identifier: MIT

//! Construction-time errors for graph definitions
//!
//! Everything that can go wrong before a graph runs: reading and parsing
//! definitions, compiling `when` expressions, resolving node factories.

use thiserror::Error;

/// Error raised while turning a definition into a runnable graph
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Graph file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid condition: {0}")]
    Condition(#[from] ConditionError),

    /// A `registered` node names a factory that was never registered
    #[error("Unknown node factory: {0}")]
    UnknownFactory(String),

    #[error("Invalid node '{id}': {message}")]
    InvalidNode { id: String, message: String },

    #[error("Invalid graph definition: {0}")]
    InvalidDefinition(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl FlowError {
    pub fn invalid_node(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidNode {
            id: id.into(),
            message: message.into(),
        }
    }
}

/// Syntax error in a condition expression
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConditionError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected '{token}' at position {position}")]
    UnexpectedToken { token: String, position: usize },

    #[error("unterminated string starting at position {0}")]
    UnterminatedString(usize),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),
}
