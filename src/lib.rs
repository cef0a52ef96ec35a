//! docproxy - filter pushdown for a document-to-SQL proxy
//!
//! Decides, per query, whether a document filter can be handed to the SQL
//! backend as a parameterized predicate or must be evaluated in memory,
//! and guarantees both paths return the same documents.
//!
//! Data flow:
//!
//! filter document -> [`filter`] -> [`planner`] -> [`compiler`] -> backend
//!                                       \-> [`executor`] (in-memory evaluation)

pub mod cli;
pub mod compiler;
pub mod config;
pub mod executor;
pub mod filter;
pub mod observability;
pub mod planner;
pub mod schema;
pub mod value;
