// SPDX-License-Identifier: MIT

//! Externally visible outcome of a graph run

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

use super::error::GraphError;

/// Why a node finished without running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Not an entry node and no upstream edge contributed a value
    NoQualifyingInput,
    /// Never became ready because it sits on or behind a cycle
    Cycle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedNode {
    pub id: String,
    pub reason: SkipReason,
}

/// Result of one `Graph::execute` call
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub run_id: Uuid,
    /// True iff no error was recorded anywhere in the run
    pub succeeded: bool,
    /// One entry per node that produced a value
    pub outputs: HashMap<String, Value>,
    pub errors: Vec<GraphError>,
    pub skipped: Vec<SkippedNode>,
    /// Final run context state
    pub state: Value,
    pub duration_ms: u64,
}

impl ExecutionResult {
    pub fn output(&self, id: &str) -> Option<&Value> {
        self.outputs.get(id)
    }

    pub fn was_skipped(&self, id: &str) -> bool {
        self.skipped.iter().any(|s| s.id == id)
    }

    pub fn to_json(&self) -> Value {
        json!({
            "run_id": self.run_id.to_string(),
            "succeeded": self.succeeded,
            "outputs": self.outputs,
            "errors": self.errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "skipped": self.skipped,
            "state": self.state,
            "duration_ms": self.duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ExecutionResult {
        let mut outputs = HashMap::new();
        outputs.insert("a".to_string(), json!(1));
        ExecutionResult {
            run_id: Uuid::new_v4(),
            succeeded: false,
            outputs,
            errors: vec![GraphError::not_found("ghost")],
            skipped: vec![SkippedNode {
                id: "b".to_string(),
                reason: SkipReason::NoQualifyingInput,
            }],
            state: json!({}),
            duration_ms: 3,
        }
    }

    #[test]
    fn test_lookup_helpers() {
        let result = sample();
        assert_eq!(result.output("a"), Some(&json!(1)));
        assert!(result.was_skipped("b"));
        assert!(!result.was_skipped("a"));
    }

    #[test]
    fn test_to_json() {
        let json = sample().to_json();
        assert_eq!(json["succeeded"], false);
        assert_eq!(json["outputs"]["a"], 1);
        assert_eq!(json["errors"][0], "Node 'ghost' not found");
        assert_eq!(json["skipped"][0]["reason"], "no_qualifying_input");
        assert_eq!(json["duration_ms"], 3);
    }
}
