//! Query execution and in-memory filtering
//!
//! # Execution Flow (strict order)
//!
//! 1. Analyze the filter for pushdown
//! 2. Fetch rows from the backend, with the predicate when eligible
//! 3. Without pushdown, filter every row in memory
//! 4. Return results in backend order
//!
//! Pushed-down rows are never re-filtered; the in-memory evaluator defines
//! the semantics the backend predicate must reproduce.

mod errors;
#[allow(clippy::module_inception)]
mod executor;
mod filters;
mod path;
mod result;

pub use errors::{ExecutorError, ExecutorResult, Severity};
pub use executor::{BackendExecutor, MemoryBackend, QueryExecutor};
pub use filters::{matches, PredicateFilter};
pub use path::{resolve, Resolved};
pub use result::ExecutionResult;
