//! Pushdown configuration
//!
//! JSON file, every field optional:
//!
//! ```json
//! {
//!   "disable_filter_pushdown": false,
//!   "backend": "postgresql",
//!   "json_column": null
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::compiler::{Backend, SqlDialect};
use crate::observability::Event;

/// Configuration load failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON in '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        "DOCPROXY_CONFIG_INVALID"
    }
}

/// Settings for the pushdown path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PushdownConfig {
    /// Forces every filter through the in-memory evaluator
    #[serde(default)]
    pub disable_filter_pushdown: bool,

    /// Backend dialect for compiled predicates
    #[serde(default)]
    pub backend: Backend,

    /// JSON column override; dialect default when absent
    #[serde(default)]
    pub json_column: Option<String>,
}

impl Default for PushdownConfig {
    fn default() -> Self {
        Self {
            disable_filter_pushdown: false,
            backend: Backend::Postgresql,
            json_column: None,
        }
    }
}

impl PushdownConfig {
    /// Loads and validates a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config: PushdownConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        config.validate()?;

        info!(
            event = Event::ConfigLoaded.as_str(),
            path = %path.display(),
            backend = config.backend.as_str(),
            pushdown_disabled = config.disable_filter_pushdown,
            "configuration loaded"
        );

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(column) = &self.json_column {
            if column.is_empty() {
                return Err(ConfigError::Invalid("json_column must not be empty".into()));
            }
        }
        Ok(())
    }

    /// Dialect for the configured backend and column
    pub fn dialect(&self) -> Box<dyn SqlDialect> {
        self.backend.dialect(self.json_column.as_deref())
    }
}
