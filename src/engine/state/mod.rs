// SPDX-License-Identifier: MIT

//! Key/value state shared by the nodes of a run
//!
//! - `StateSchema` - optional declaration of fields, reducers and defaults
//! - `RunState` - the store itself, merging writes through each field's reducer

mod schema;
mod store;

pub use schema::{FieldType, ReducerType, StateFieldDef, StateSchema};
pub use store::RunState;
