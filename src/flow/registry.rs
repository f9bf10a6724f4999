// SPDX-License-Identifier: MIT

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::engine::{BoxError, Node};

/// Builds a node from its id and the `config` block of its definition
pub type NodeFactory = Arc<dyn Fn(&str, &Value) -> Result<Arc<dyn Node>, BoxError> + Send + Sync>;

/// Named node factories for `registered` nodes in graph definitions
#[derive(Clone)]
pub struct NodeRegistry {
    factories: Arc<RwLock<HashMap<String, NodeFactory>>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            factories: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn register<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn(&str, &Value) -> Result<Arc<dyn Node>, BoxError> + Send + Sync + 'static,
    {
        let mut factories = self.factories.write().await;
        factories.insert(name.into(), Arc::new(factory));
    }

    pub async fn get(&self, name: &str) -> Option<NodeFactory> {
        let factories = self.factories.read().await;
        factories.get(name).cloned()
    }

    pub async fn names(&self) -> Vec<String> {
        let factories = self.factories.read().await;
        let mut names: Vec<String> = factories.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
