//! ordersync: reconcile order lists against their action queues.
//!
//! # Usage
//!
//! ```text
//! ordersync [--config <file>] sync [--endpoint <name>] [--dry-run] [--json]
//! ordersync [--config <file>] endpoints [--json]
//! ordersync [--config <file>] daemon start [--interval-secs N] [--port N] [--timeout-secs N]
//! ordersync daemon stop|status
//! ordersync daemon sync [--endpoint <name>]
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{daemon::DaemonArgs, endpoints::EndpointsArgs, sync::SyncArgs};
use ordersync_core::config::DEFAULT_CONFIG_FILE;

#[derive(Parser, Debug)]
#[command(
    name = "ordersync",
    version,
    about = "Apply queued order actions to order lists on remote endpoints",
    long_about = None,
)]
struct Cli {
    /// Endpoint configuration file (JSON, or YAML by extension).
    #[arg(
        long,
        global = true,
        env = "ORDERSYNC_CONFIG",
        default_value = DEFAULT_CONFIG_FILE
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one reconciliation pass now, in this process.
    Sync(SyncArgs),

    /// List configured endpoints.
    Endpoints(EndpointsArgs),

    /// Run or talk to the background scheduler.
    Daemon(DaemonArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Sync(args) => args.run(&cli.config),
        Commands::Endpoints(args) => args.run(&cli.config),
        Commands::Daemon(args) => commands::daemon::run(args, &cli.config),
    }
}
