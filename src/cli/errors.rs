//! CLI error types

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::filter::FilterError;
use crate::schema::SchemaError;
use crate::value::ValueError;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Catalog could not be loaded
    #[error(transparent)]
    Catalog(#[from] SchemaError),

    /// Filter argument could not be parsed
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// Filter or document argument is not valid extended JSON
    #[error("invalid input: {0}")]
    Input(#[from] ValueError),

    /// stdout failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON encoding failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(err) => err.code(),
            CliError::Catalog(err) => err.code(),
            CliError::Filter(err) => err.code(),
            CliError::Input(err) => err.code(),
            CliError::Io(_) => "DOCPROXY_CLI_IO_ERROR",
            CliError::Json(_) => "DOCPROXY_CLI_IO_ERROR",
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
