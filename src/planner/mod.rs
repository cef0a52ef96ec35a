//! Filter pushdown planning
//!
//! Decides, per query, whether a filter becomes a backend predicate or is
//! evaluated in memory after a full scan.
//!
//! # Principles
//!
//! - Conservative: only explicitly proven shapes are pushed down
//! - Ordered: eligibility is an explicit chain of named rules
//! - Total: every input yields exactly one plan or one hard error
//! - Corruption is an error, never a fallback

mod analyzer;
mod errors;
mod explain;
mod plan;
mod rules;

pub use analyzer::PushdownAnalyzer;
pub use errors::{PushdownError, PushdownResult};
pub use explain::ExplainPlan;
pub use plan::{EligiblePlan, FallbackReason, PushdownPlan};
pub use rules::{Rule, RuleContext, Verdict, RULES};
