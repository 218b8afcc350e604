use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ordersync_core::ConfigError),

    #[error("malformed control message: {0}")]
    Json(#[from] serde_json::Error),

    /// The daemon answered with an error reply, or a pass it ran failed.
    #[error("{0}")]
    Refused(String),

    #[error("a reconciliation pass is already running")]
    PassInFlight,

    #[error("{0} task stopped unexpectedly")]
    TaskLost(String),

    #[error("daemon socket already in use: {}", .0.display())]
    SocketInUse(PathBuf),

    #[error("daemon is not running (no listener on {})", socket.display())]
    NotRunning { socket: PathBuf },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
