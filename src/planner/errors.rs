//! Pushdown analysis errors
//!
//! Error codes:
//! - DOCPROXY_FILTER_MALFORMED (REJECT)
//! - DOCPROXY_CORRUPTED_VALUE (REJECT)
//! - DOCPROXY_SCHEMA_* (propagated from the accessor)
//!
//! A fallback is not an error and never appears here.

use thiserror::Error;

use crate::filter::FilterError;
use crate::schema::SchemaError;
use crate::value::ValueError;

/// Hard failure of pushdown analysis
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PushdownError {
    /// Filter could not be constructed
    #[error(transparent)]
    Malformed(#[from] FilterError),

    /// Equality operand failed to re-decode
    #[error("corrupted value for field '{field}': {source}")]
    CorruptedValue {
        field: String,
        #[source]
        source: ValueError,
    },

    /// Schema accessor failure, unchanged
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl PushdownError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            PushdownError::Malformed(err) => err.code(),
            PushdownError::CorruptedValue { .. } => "DOCPROXY_CORRUPTED_VALUE",
            PushdownError::Schema(err) => err.code(),
        }
    }

    pub fn is_corrupted_value(&self) -> bool {
        matches!(self, PushdownError::CorruptedValue { .. })
    }
}

/// Result type for pushdown analysis
pub type PushdownResult<T> = Result<T, PushdownError>;
