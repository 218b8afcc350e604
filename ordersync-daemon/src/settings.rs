use std::path::PathBuf;
use std::time::Duration;

use ordersync_store::DEFAULT_OP_TIMEOUT;

use crate::paths::{DEFAULT_HTTP_PORT, DEFAULT_INTERVAL};

/// Runtime settings for one daemon process.
#[derive(Debug, Clone)]
pub struct DaemonSettings {
    /// Endpoint configuration file.
    pub config_path: PathBuf,
    /// Time between scheduled passes.
    pub interval: Duration,
    /// Port for the liveness responder; `0` picks a free one.
    pub http_port: u16,
    /// Bound on every remote operation.
    pub op_timeout: Duration,
    /// Emit logs as JSON lines instead of the human format.
    pub json_logs: bool,
}

impl DaemonSettings {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            interval: DEFAULT_INTERVAL,
            http_port: DEFAULT_HTTP_PORT,
            op_timeout: DEFAULT_OP_TIMEOUT,
            json_logs: false,
        }
    }
}
