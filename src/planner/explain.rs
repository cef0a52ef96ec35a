//! Explain output for pushdown decisions
//!
//! Deterministic and human-readable. Bound parameter values are never
//! printed, only their count.

use std::fmt;

use super::errors::PushdownError;
use super::plan::PushdownPlan;

/// Explain block for one analyzed filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainPlan {
    /// Collection queried
    pub collection: String,
    /// Whether analysis completed (no hard error)
    pub accepted: bool,
    /// Whether the filter is pushed to the backend
    pub filter_pushdown: bool,
    /// Backend predicate template (if pushed down)
    pub predicate: Option<String>,
    /// Number of bound parameters (if pushed down)
    pub param_count: Option<usize>,
    /// Fallback reason (if not pushed down)
    pub fallback_reason: Option<String>,
    /// Rejection error code (if rejected)
    pub rejection_code: Option<String>,
    /// Rejection message (if rejected)
    pub rejection_reason: Option<String>,
}

impl ExplainPlan {
    pub fn from_plan(collection: impl Into<String>, plan: &PushdownPlan) -> Self {
        let (predicate, param_count, fallback_reason) = match plan {
            PushdownPlan::Eligible(eligible) => (
                Some(eligible.predicate.template().to_string()),
                Some(eligible.predicate.params().len()),
                None,
            ),
            PushdownPlan::Fallback { reason } => (None, None, Some(reason.as_str().to_string())),
        };

        Self {
            collection: collection.into(),
            accepted: true,
            filter_pushdown: plan.is_eligible(),
            predicate,
            param_count,
            fallback_reason,
            rejection_code: None,
            rejection_reason: None,
        }
    }

    pub fn from_error(collection: impl Into<String>, err: &PushdownError) -> Self {
        Self {
            collection: collection.into(),
            accepted: false,
            filter_pushdown: false,
            predicate: None,
            param_count: None,
            fallback_reason: None,
            rejection_code: Some(err.code().to_string()),
            rejection_reason: Some(err.to_string()),
        }
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN PLAN ===")?;
        writeln!(f, "Collection: {}", self.collection)?;

        if !self.accepted {
            writeln!(f, "Status: REJECTED")?;
            if let Some(code) = &self.rejection_code {
                writeln!(f, "Error Code: {}", code)?;
            }
            if let Some(reason) = &self.rejection_reason {
                writeln!(f, "Reason: {}", reason)?;
            }
            return Ok(());
        }

        writeln!(f, "Status: ACCEPTED")?;
        writeln!(f, "Filter Pushdown: {}", self.filter_pushdown)?;
        if let Some(predicate) = &self.predicate {
            writeln!(f, "Predicate: {}", predicate)?;
        }
        if let Some(count) = self.param_count {
            writeln!(f, "Parameters: {}", count)?;
        }
        if let Some(reason) = &self.fallback_reason {
            writeln!(f, "Fallback Reason: {}", reason)?;
        }

        Ok(())
    }
}
