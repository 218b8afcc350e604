//! Remote document stores.
//!
//! A [`Connector`] opens one [`DocumentStore`] session per endpoint cycle.
//! The session is a plain value owned by the cycle that opened it; nothing
//! here keeps a process-wide connection.
//!
//! Backends:
//! - [`implementations::ftp`]: FTP servers (`suppaftp`)
//! - [`implementations::local`]: a directory on the local filesystem
//! - [`implementations::memory`]: in-process maps, for tests and dry setups

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use ordersync_core::{Endpoint, EndpointTarget};

pub mod implementations {
    pub mod ftp;
    pub mod local;
    pub mod memory;
}

pub use implementations::ftp::FtpConnector;
pub use implementations::local::LocalConnector;
pub use implementations::memory::{MemoryBackend, MemoryConnector};

/// Default bound on a single remote operation.
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur during store operations.
///
/// `NotFound` is the only outcome callers are expected to recover from; every
/// other variant means the endpoint could not be read or written.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The named document does not exist.
    #[error("document not found: {path}")]
    NotFound { path: String },

    /// The session could not be established.
    #[error("cannot connect to {target}: {message}")]
    Connect { target: String, message: String },

    /// Any other failure talking to the store.
    #[error("{op} {path} failed: {message}")]
    Transport {
        op: &'static str,
        path: String,
        message: String,
    },

    /// The operation did not finish within its bound.
    #[error("{op} timed out after {}s", after.as_secs_f64())]
    Timeout { op: &'static str, after: Duration },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub(crate) fn transport(op: &'static str, path: &str, message: impl ToString) -> Self {
        StoreError::Transport {
            op,
            path: path.to_string(),
            message: message.to_string(),
        }
    }
}

/// One open session against an endpoint's document area.
#[async_trait]
pub trait DocumentStore: Send {
    /// Full content of the document at `path`.
    async fn fetch(&mut self, path: &str) -> Result<Vec<u8>, StoreError>;

    /// Whether a document exists at `path`.
    async fn exists(&mut self, path: &str) -> Result<bool, StoreError> {
        match self.fetch(path).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Replace the document at `path` with `bytes`.
    async fn store(&mut self, path: &str, bytes: Vec<u8>) -> Result<(), StoreError>;

    /// Remove the document at `path`; `NotFound` if it was absent.
    async fn delete(&mut self, path: &str) -> Result<(), StoreError>;

    /// Close the session. Further calls fail.
    async fn disconnect(&mut self) -> Result<(), StoreError>;
}

/// Opens sessions.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn DocumentStore>, StoreError>;
}

/// Routes each endpoint to the backend its target names.
#[derive(Debug, Clone)]
pub struct TransportConnector {
    ftp: FtpConnector,
    local: LocalConnector,
}

impl TransportConnector {
    pub fn new(op_timeout: Duration) -> Self {
        Self {
            ftp: FtpConnector::new(op_timeout),
            local: LocalConnector,
        }
    }
}

impl Default for TransportConnector {
    fn default() -> Self {
        Self::new(DEFAULT_OP_TIMEOUT)
    }
}

#[async_trait]
impl Connector for TransportConnector {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn DocumentStore>, StoreError> {
        match endpoint.target {
            EndpointTarget::Ftp { .. } => self.ftp.connect(endpoint).await,
            EndpointTarget::Local { .. } => self.local.connect(endpoint).await,
        }
    }
}

/// Run `fut`, turning an elapsed `limit` into [`StoreError::Timeout`].
pub async fn bounded<T, F>(limit: Duration, op: &'static str, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout { op, after: limit }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn bounded_reports_timeout() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, StoreError>(())
        };
        let err = bounded(Duration::from_secs(5), "fetch", slow)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Timeout { op: "fetch", .. }));
        assert!(err.to_string().contains("timed out after 5s"));
    }

    #[tokio::test]
    async fn bounded_passes_through_result() {
        let value = bounded(Duration::from_secs(5), "fetch", async { Ok(7) })
            .await
            .expect("value");
        assert_eq!(value, 7);
    }

    #[test]
    fn not_found_is_distinguishable() {
        assert!(StoreError::NotFound {
            path: "orders.json".into()
        }
        .is_not_found());
        assert!(!StoreError::transport("fetch", "orders.json", "reset").is_not_found());
    }
}
