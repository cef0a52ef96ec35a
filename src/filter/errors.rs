//! Filter construction errors
//!
//! Every variant is a malformed filter: the query is rejected and never
//! retried.

use std::fmt;

use thiserror::Error;

use crate::value::ValueError;

/// Severity levels for filter errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Malformed filter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// Field path contains an empty segment
    #[error("malformed filter: empty segment in field path {0:?}")]
    EmptyPathSegment(String),

    /// Operator name is not recognized
    #[error("malformed filter: unknown operator {0}")]
    UnknownOperator(String),

    /// Operator operand has the wrong shape or type
    #[error("malformed filter: {operator} {reason}")]
    InvalidOperand {
        operator: &'static str,
        reason: String,
    },

    /// Document mixes operator keys with plain field keys
    #[error("malformed filter: field {0:?} mixes operators and plain keys")]
    MixedOperatorDocument(String),

    /// Filter input could not be decoded into values
    #[error("malformed filter: {0}")]
    InvalidValue(#[from] ValueError),
}

impl FilterError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        "DOCPROXY_FILTER_MALFORMED"
    }

    pub fn severity(&self) -> Severity {
        Severity::Reject
    }

    pub(crate) fn operand(operator: &'static str, reason: impl Into<String>) -> Self {
        FilterError::InvalidOperand {
            operator,
            reason: reason.into(),
        }
    }
}

/// Result type for filter construction
pub type FilterResult<T> = Result<T, FilterError>;
