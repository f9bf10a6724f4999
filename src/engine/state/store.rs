// SPDX-License-Identifier: MIT

//! Reducer-aware key/value store

use serde_json::{Map, Value};
use std::collections::HashMap;

use super::schema::{ReducerType, StateSchema};

#[derive(Debug, Clone, Default)]
pub struct RunState {
    fields: HashMap<String, Value>,
    reducers: HashMap<String, ReducerType>,
}

impl RunState {
    /// Seed a store from a schema's defaults and reducers
    pub fn new(schema: &StateSchema) -> Self {
        let mut state = Self::default();
        for (name, def) in &schema.fields {
            if let Some(default) = &def.default {
                state.fields.insert(name.clone(), default.clone());
            }
            state.reducers.insert(name.clone(), def.reducer.clone());
        }
        state
    }

    /// Merge `value` into `key` using the field's reducer (undeclared keys overwrite)
    pub fn update(&mut self, key: &str, value: Value) {
        let reducer = self.reducers.get(key).unwrap_or(&ReducerType::Overwrite);

        match reducer {
            ReducerType::Overwrite => {
                self.fields.insert(key.to_string(), value);
            }
            ReducerType::Append => {
                let slot = self
                    .fields
                    .entry(key.to_string())
                    .or_insert_with(|| Value::Array(vec![]));
                if let Value::Array(items) = slot {
                    match value {
                        Value::Array(more) => items.extend(more),
                        other => items.push(other),
                    }
                }
            }
            ReducerType::Max => self.keep_if(key, value, |new, current| new > current),
            ReducerType::Min => self.keep_if(key, value, |new, current| new < current),
            ReducerType::Merge => {
                let slot = self
                    .fields
                    .entry(key.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                if let (Value::Object(current), Value::Object(incoming)) = (slot, value) {
                    current.extend(incoming);
                }
            }
        }
    }

    fn keep_if(&mut self, key: &str, value: Value, better: impl Fn(f64, f64) -> bool) {
        let Some(new) = value.as_f64() else {
            return;
        };
        let current = self.fields.get(key).and_then(Value::as_f64);
        if current.map_or(true, |current| better(new, current)) {
            self.fields.insert(key.to_string(), value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Look up a nested value with dot notation, e.g. `review.score`
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let root = self.fields.get(parts.next()?)?;
        parts.try_fold(root, |current, part| current.get(part))
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }
}
