//! Value model error types
//!
//! Error codes:
//! - DOCPROXY_OBJECT_ID_LENGTH
//! - DOCPROXY_OBJECT_ID_HEX
//! - DOCPROXY_DUPLICATE_KEY
//! - DOCPROXY_EXTENDED_JSON_INVALID

use thiserror::Error;

/// Errors raised while constructing or decoding values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// Object identifier bytes are not exactly 12 bytes long
    #[error("object identifier must be 12 bytes, got {0}")]
    InvalidObjectIdLength(usize),

    /// Object identifier text is not a valid hex string
    #[error("invalid object identifier hex string: {0:?}")]
    InvalidObjectIdHex(String),

    /// Key inserted twice into a document
    #[error("duplicate document key: {0:?}")]
    DuplicateKey(String),

    /// Extended JSON input could not be decoded
    #[error("invalid extended JSON: {0}")]
    InvalidExtendedJson(String),
}

impl ValueError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ValueError::InvalidObjectIdLength(_) => "DOCPROXY_OBJECT_ID_LENGTH",
            ValueError::InvalidObjectIdHex(_) => "DOCPROXY_OBJECT_ID_HEX",
            ValueError::DuplicateKey(_) => "DOCPROXY_DUPLICATE_KEY",
            ValueError::InvalidExtendedJson(_) => "DOCPROXY_EXTENDED_JSON_INVALID",
        }
    }

    pub(crate) fn extjson(reason: impl Into<String>) -> Self {
        ValueError::InvalidExtendedJson(reason.into())
    }
}

/// Result type for value operations
pub type ValueResult<T> = Result<T, ValueError>;
