//! Executor errors
//!
//! Error codes:
//! - DOCPROXY_BACKEND_FAILED (ERROR)
//! - DOCPROXY_BACKEND_ROW_INVALID (ERROR)
//! - analysis errors keep their own codes

use std::fmt;

use thiserror::Error;

use crate::planner::PushdownError;

/// Severity levels for executor errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
    /// Operation failed but the proxy is healthy
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Query execution failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorError {
    /// Analysis failed (malformed filter, corrupted value, schema error)
    #[error(transparent)]
    Pushdown(#[from] PushdownError),

    /// Backend call failed
    #[error("backend failed for collection '{collection}': {reason}")]
    Backend { collection: String, reason: String },

    /// Backend returned a row that does not decode as a document
    #[error("invalid row in collection '{collection}': {reason}")]
    InvalidRow { collection: String, reason: String },
}

impl ExecutorError {
    pub fn backend(collection: impl Into<String>, reason: impl Into<String>) -> Self {
        ExecutorError::Backend {
            collection: collection.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_row(collection: impl Into<String>, reason: impl Into<String>) -> Self {
        ExecutorError::InvalidRow {
            collection: collection.into(),
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorError::Pushdown(err) => err.code(),
            ExecutorError::Backend { .. } => "DOCPROXY_BACKEND_FAILED",
            ExecutorError::InvalidRow { .. } => "DOCPROXY_BACKEND_ROW_INVALID",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            ExecutorError::Pushdown(_) => Severity::Reject,
            _ => Severity::Error,
        }
    }
}

/// Result type for query execution
pub type ExecutorResult<T> = Result<T, ExecutorError>;
