//! `ordersync daemon`: background scheduler lifecycle.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use ordersync_daemon::paths::{socket_path, DEFAULT_HTTP_PORT};
use ordersync_daemon::{
    request_status, request_stop, request_sync, start_blocking, DaemonError, DaemonSettings,
};

#[derive(Args, Debug)]
pub struct DaemonArgs {
    /// State directory holding `.ordersync/run` (defaults to the home directory).
    #[arg(long, global = true, env = "ORDERSYNC_HOME")]
    pub home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand, Debug)]
pub enum DaemonCommand {
    /// Run the scheduler in the foreground until stopped.
    Start(DaemonStartArgs),
    /// Request graceful daemon shutdown over the control socket.
    Stop,
    /// Query daemon runtime status over the control socket.
    Status,
    /// Ask the running daemon for an immediate pass.
    Sync {
        /// Only reconcile the endpoint with this name.
        #[arg(long)]
        endpoint: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct DaemonStartArgs {
    /// Seconds between scheduled passes.
    #[arg(long, env = "ORDERSYNC_INTERVAL_SECS", default_value_t = 300)]
    pub interval_secs: u64,

    /// Port for the liveness responder.
    #[arg(long, env = "PORT", default_value_t = DEFAULT_HTTP_PORT)]
    pub port: u16,

    /// Bound on each remote operation, in seconds.
    #[arg(long, env = "ORDERSYNC_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub json_logs: bool,
}

pub fn run(args: DaemonArgs, config: &Path) -> Result<()> {
    let home = match args.home {
        Some(home) => home,
        None => dirs::home_dir().context("could not determine home directory")?,
    };

    match args.command {
        DaemonCommand::Start(start) => {
            let settings = DaemonSettings {
                config_path: config.to_path_buf(),
                interval: Duration::from_secs(start.interval_secs.max(1)),
                http_port: start.port,
                op_timeout: Duration::from_secs(start.timeout_secs),
                json_logs: start.json_logs,
            };
            start_blocking(&home, settings).context("daemon exited with error")?;
        }
        DaemonCommand::Stop => match request_stop(&home) {
            Ok(()) => println!("daemon stop requested"),
            Err(DaemonError::NotRunning { .. }) => {
                println!("daemon is not running");
            }
            Err(err) => return Err(err).context("failed to stop daemon"),
        },
        DaemonCommand::Status => match request_status(&home) {
            Ok(status) => print_json(&status)?,
            Err(DaemonError::NotRunning { .. }) => {
                print_json(&serde_json::json!({
                    "running": false,
                    "socket": socket_path(&home).display().to_string(),
                }))?;
            }
            Err(err) => return Err(err).context("failed to query daemon status"),
        },
        DaemonCommand::Sync { endpoint } => {
            let report = request_sync(&home, endpoint).context("daemon sync failed")?;
            print_json(&report)?;
        }
    }

    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to render daemon response JSON")?
    );
    Ok(())
}
