// SPDX-License-Identifier: MIT

//! Condition expressions for edges and predicate nodes
//!
//! Conditions are simple expressions like:
//! - `data > 0`
//! - `data.status == 'done' and retries < 3`
//! - `not (item.tags contains 'skip')`
//!
//! The value under test is bound to a root name (`data` on edges, `item`
//! in filters and conditionals); every other root reads the run context.

mod ast;
mod evaluator;
mod parser;

use serde_json::Value;
use std::sync::Arc;

pub use ast::{CompareOp, Expression, Literal, Path};
pub use evaluator::{evaluate, lookup, Scope};
pub use parser::parse;

use crate::engine::{Condition, Edge, RunContext};
use crate::flow::error::ConditionError;

/// Root name bound to the data flowing over an edge
pub const EDGE_BINDING: &str = "data";

/// Root name bound to the item tested by filters and conditionals
pub const ITEM_BINDING: &str = "item";

/// Parse `source` once and return a reusable predicate over `binding`
pub fn compile(source: &str, binding: &str) -> Result<Condition, ConditionError> {
    let expr = parse(source)?;
    let binding = binding.to_string();
    Ok(Arc::new(move |value: &Value, ctx: &RunContext| {
        evaluate(&expr, &Scope::new(&binding, value, ctx))
    }))
}

impl Edge {
    /// Attach a condition written in the expression language, with the
    /// edge data bound to `data`
    ///
    /// Paths rooted anywhere else read the run state, so `x > 0` compares
    /// the state field `x` and is false while that field is unset. Write
    /// `data > 0` to test the edge data itself.
    pub fn when(self, source: &str) -> Result<Self, ConditionError> {
        let condition = compile(source, EDGE_BINDING)?;
        Ok(self.with_condition(move |value, ctx| condition(value, ctx)))
    }
}
