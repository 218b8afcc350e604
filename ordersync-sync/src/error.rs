//! Error types for ordersync-sync.

use thiserror::Error;

use ordersync_core::ConfigError;
use ordersync_store::StoreError;

use crate::reconcile::SyncStep;

/// All errors that can arise from sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The store failed (or timed out) during `step`.
    #[error("{step}: {source}")]
    Store {
        step: SyncStep,
        #[source]
        source: StoreError,
    },

    /// A document is not valid JSON or not the expected shape.
    #[error("{step}: malformed document {path}: {source}")]
    MalformedDocument {
        step: SyncStep,
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// JSON encoding failed on the write path.
    #[error("{step}: cannot encode {path}: {source}")]
    Encode {
        step: SyncStep,
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A pass was scoped to an endpoint that is not configured.
    #[error("no endpoint named '{name}' is configured")]
    UnknownEndpoint { name: String },

    /// The endpoint configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl SyncError {
    /// The step an endpoint-scoped error happened at, if any.
    pub fn step(&self) -> Option<SyncStep> {
        match self {
            SyncError::Store { step, .. }
            | SyncError::MalformedDocument { step, .. }
            | SyncError::Encode { step, .. } => Some(*step),
            SyncError::UnknownEndpoint { .. } | SyncError::Config(_) => None,
        }
    }
}

/// Convenience constructor for [`SyncError::Store`].
pub(crate) fn store_err(step: SyncStep) -> impl FnOnce(StoreError) -> SyncError {
    move |source| SyncError::Store { step, source }
}
