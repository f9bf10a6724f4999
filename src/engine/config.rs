// SPDX-License-Identifier: MIT

//! Engine configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How the scheduler dispatches ready nodes
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// One node at a time, each awaited before the next is considered
    #[default]
    Sequential,
    /// Every ready node of a scheduler wave is dispatched together
    Concurrent,
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "concurrent" => Ok(Self::Concurrent),
            other => Err(format!("Unknown execution mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub mode: ExecutionMode,
}

impl EngineConfig {
    pub fn concurrent() -> Self {
        Self {
            mode: ExecutionMode::Concurrent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_default() {
        assert_eq!(EngineConfig::default().mode, ExecutionMode::Sequential);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(
            "Concurrent".parse::<ExecutionMode>(),
            Ok(ExecutionMode::Concurrent)
        );
        assert_eq!(
            "sequential".parse::<ExecutionMode>(),
            Ok(ExecutionMode::Sequential)
        );
        assert!("parallel"
            .parse::<ExecutionMode>()
            .unwrap_err()
            .contains("Unknown execution mode"));
    }

    #[test]
    fn test_mode_deserialize() {
        let config: EngineConfig = serde_yaml::from_str("mode: concurrent").unwrap();
        assert_eq!(config, EngineConfig::concurrent());
    }
}
