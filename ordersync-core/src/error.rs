//! Error types for ordersync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading endpoint configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure while reading the configuration file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file did not exist at the expected path.
    #[error("endpoint configuration not found at {path}")]
    NotFound { path: PathBuf },

    /// JSON parse error, with file path and line context from serde_json.
    #[error("failed to parse endpoint configuration at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// YAML parse error, with file path and line context from serde_yaml.
    #[error("failed to parse endpoint configuration at {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A descriptor parsed but describes an unusable endpoint.
    #[error("endpoint #{index} is invalid: {reason}")]
    InvalidEndpoint { index: usize, reason: String },

    /// Two descriptors resolve to the same endpoint name.
    #[error("duplicate endpoint name '{name}'")]
    DuplicateEndpoint { name: String },
}
