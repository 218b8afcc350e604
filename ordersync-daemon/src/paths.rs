use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DAEMON_LABEL: &str = "dev.ordersync.daemon";
pub const DAEMON_SOCKET: &str = "daemon.sock";

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_HTTP_PORT: u16 = 3000;

pub fn ordersync_root(home: &Path) -> PathBuf {
    home.join(".ordersync")
}

pub fn run_dir(home: &Path) -> PathBuf {
    ordersync_root(home).join("run")
}

pub fn socket_path(home: &Path) -> PathBuf {
    run_dir(home).join(DAEMON_SOCKET)
}
