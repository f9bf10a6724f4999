// SPDX-License-Identifier: MIT

//! Graph loader - YAML file loading and parsing

use std::fs;
use std::path::Path;

use super::error::FlowError;
use super::types::GraphDefinition;

/// Loads graph definitions from YAML files
pub struct GraphLoader;

impl GraphLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a graph definition from a YAML file
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<GraphDefinition, FlowError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(FlowError::FileNotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    /// Parse a graph definition from a YAML string
    pub fn parse_yaml(content: &str) -> Result<GraphDefinition, FlowError> {
        let def: GraphDefinition = serde_yaml::from_str(content)?;
        Ok(def)
    }
}

impl Default for GraphLoader {
    fn default() -> Self {
        Self::new()
    }
}
