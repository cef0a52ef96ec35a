//! Schema accessor errors
//!
//! Error codes:
//! - DOCPROXY_SCHEMA_UNKNOWN_COLLECTION (REJECT)
//! - DOCPROXY_SCHEMA_MALFORMED (FATAL, catalog load)
//! - DOCPROXY_SCHEMA_DUPLICATE (FATAL, catalog load)
//! - DOCPROXY_SCHEMA_UNAVAILABLE (REJECT)
//!
//! These are accessor failures. A collection without a primary key is not an
//! error; it is an empty key list.

use std::fmt;

use thiserror::Error;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
    /// Catalog cannot be used; startup must stop
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema accessor failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Collection is not known to the catalog
    #[error("collection '{0}' not found")]
    UnknownCollection(String),

    /// Metadata file could not be read or parsed
    #[error("malformed metadata '{path}': {reason}")]
    MalformedMetadata { path: String, reason: String },

    /// Collection registered twice
    #[error("collection '{0}' already registered")]
    DuplicateCollection(String),

    /// Metadata store could not be reached
    #[error("schema metadata unavailable: {0}")]
    Unavailable(String),
}

impl SchemaError {
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::MalformedMetadata {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::UnknownCollection(_) => "DOCPROXY_SCHEMA_UNKNOWN_COLLECTION",
            SchemaError::MalformedMetadata { .. } => "DOCPROXY_SCHEMA_MALFORMED",
            SchemaError::DuplicateCollection(_) => "DOCPROXY_SCHEMA_DUPLICATE",
            SchemaError::Unavailable(_) => "DOCPROXY_SCHEMA_UNAVAILABLE",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            SchemaError::MalformedMetadata { .. } | SchemaError::DuplicateCollection(_) => {
                Severity::Fatal
            }
            _ => Severity::Reject,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            SchemaError::UnknownCollection("c".into()).code(),
            "DOCPROXY_SCHEMA_UNKNOWN_COLLECTION"
        );
        assert_eq!(SchemaError::malformed("p", "r").code(), "DOCPROXY_SCHEMA_MALFORMED");
        assert_eq!(
            SchemaError::DuplicateCollection("c".into()).code(),
            "DOCPROXY_SCHEMA_DUPLICATE"
        );
        assert_eq!(
            SchemaError::Unavailable("down".into()).code(),
            "DOCPROXY_SCHEMA_UNAVAILABLE"
        );
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(SchemaError::UnknownCollection("c".into()).severity(), Severity::Reject);
        assert!(SchemaError::malformed("p", "r").is_fatal());
        assert!(!SchemaError::Unavailable("x".into()).is_fatal());
    }

    #[test]
    fn test_display_names_collection() {
        let err = SchemaError::UnknownCollection("users".into());
        assert!(err.to_string().contains("users"));
    }
}
