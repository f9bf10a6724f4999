// SPDX-License-Identifier: MIT

//! Run-scoped context shared by nodes and edge conditions

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use super::error::GraphError;
use super::state::{RunState, StateSchema};

/// Transient state for one `Graph::execute` call
///
/// Every store sits behind its own mutex, so nodes running concurrently may
/// read and write shared keys through `&RunContext`.
#[derive(Debug)]
pub struct RunContext {
    run_id: Uuid,
    state: Mutex<RunState>,
    errors: Mutex<Vec<GraphError>>,
    metadata: Mutex<HashMap<String, Value>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A node that panicked mid-write leaves the data usable; the panic itself
    // is reported as a run error.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RunContext {
    pub fn new(schema: Option<&StateSchema>) -> Self {
        let state = schema.map(RunState::new).unwrap_or_default();
        let run_id = Uuid::new_v4();

        let mut metadata = HashMap::new();
        metadata.insert("run_id".to_string(), Value::String(run_id.to_string()));
        metadata.insert(
            "started_at".to_string(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );

        Self {
            run_id,
            state: Mutex::new(state),
            errors: Mutex::new(Vec::new()),
            metadata: Mutex::new(metadata),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        lock(&self.state).get(key).cloned()
    }

    /// Dotted lookup into the state, e.g. `review.score`
    pub fn get_path(&self, path: &str) -> Option<Value> {
        lock(&self.state).get_path(path).cloned()
    }

    /// Write a key through its declared reducer
    pub fn set(&self, key: &str, value: Value) {
        lock(&self.state).update(key, value);
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        lock(&self.state).remove(key)
    }

    pub fn state_snapshot(&self) -> Value {
        lock(&self.state).to_json()
    }

    pub fn record_error(&self, error: GraphError) {
        lock(&self.errors).push(error);
    }

    pub fn errors(&self) -> Vec<GraphError> {
        lock(&self.errors).clone()
    }

    pub fn has_errors(&self) -> bool {
        !lock(&self.errors).is_empty()
    }

    pub fn metadata(&self, key: &str) -> Option<Value> {
        lock(&self.metadata).get(key).cloned()
    }

    pub fn set_metadata(&self, key: impl Into<String>, value: Value) {
        lock(&self.metadata).insert(key.into(), value);
    }

    pub(crate) fn into_parts(self) -> (Value, Vec<GraphError>) {
        let state = self
            .state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        let errors = self
            .errors
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        (state.to_json(), errors)
    }
}
