//! Value model
//!
//! The typed value tree consumed by the filter engine, and the total
//! type-bracket ordering every comparison in the crate goes through.
//!
//! # Invariants
//!
//! - Document keys are unique; insertion order is preserved for re-encoding
//! - `compare` is total: antisymmetric, transitive, deterministic
//! - NaN sits in its own bracket between null and the other numbers

mod compare;
mod errors;
pub mod extjson;
mod types;

pub use compare::{compare, values_equal};
pub use errors::{ValueError, ValueResult};
pub use types::{Binary, Document, ObjectId, Timestamp, TypeRank, Value, OBJECT_ID_LEN};
