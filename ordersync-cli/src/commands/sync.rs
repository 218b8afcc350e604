//! `ordersync sync`: run one reconciliation pass in the foreground.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use ordersync_core::config::load_endpoints_at;
use ordersync_sync::{
    CycleSummary, EndpointOutcome, EndpointReport, PassReport, ReconcileOptions, Reconciler,
    SyncScope,
};

/// Arguments for `ordersync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Only reconcile the endpoint with this name.
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Fetch and apply without writing anything back.
    #[arg(long)]
    pub dry_run: bool,

    /// Bound on each remote operation, in seconds.
    #[arg(long, env = "ORDERSYNC_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Emit the pass report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self, config: &Path) -> Result<()> {
        ordersync_daemon::init_tracing("warn", false);

        let endpoints = load_endpoints_at(config)
            .with_context(|| format!("failed to load endpoints from {}", config.display()))?;
        if endpoints.is_empty() {
            println!("No endpoints configured in {}.", config.display());
            return Ok(());
        }

        let options = ReconcileOptions {
            dry_run: self.dry_run,
            op_timeout: Duration::from_secs(self.timeout_secs),
        };
        let reconciler = Reconciler::with_defaults(endpoints, options);
        let scope = match self.endpoint {
            Some(name) => SyncScope::Endpoint(name),
            None => SyncScope::All,
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start async runtime")?;
        let report = runtime
            .block_on(reconciler.run(&scope, self.dry_run))
            .with_context(|| format!("sync failed for '{}'", scope.label()))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize report")?
            );
        } else {
            print_report(&report);
        }

        let failed = report.failed();
        if failed > 0 {
            bail!("{failed} of {} endpoint(s) failed", report.endpoints.len());
        }
        Ok(())
    }
}

pub fn print_report(report: &PassReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    for endpoint in &report.endpoints {
        print_endpoint(prefix, endpoint);
    }
    println!(
        "{prefix}{} endpoint(s): {} ok, {} failed ({} ms)",
        report.endpoints.len(),
        report.succeeded(),
        report.failed(),
        report.duration_ms,
    );
}

fn print_endpoint(prefix: &str, report: &EndpointReport) {
    let name = &report.endpoint;
    match &report.outcome {
        EndpointOutcome::Synced(summary) => {
            println!(
                "{prefix}{} '{name}' synced ({})",
                "✓".green().bold(),
                counts(summary)
            );
            print_details(summary);
        }
        EndpointOutcome::Unchanged(summary) => {
            println!(
                "{prefix}{} '{name}' unchanged ({} orders)",
                "·".bright_black(),
                summary.orders
            );
            print_details(summary);
        }
        EndpointOutcome::DryRun(summary) => {
            println!(
                "{prefix}{} '{name}' would apply ({})",
                "~".yellow().bold(),
                counts(summary)
            );
            print_details(summary);
        }
        EndpointOutcome::Failed { step, error } => {
            println!(
                "{prefix}{} '{name}' failed at {step}: {error}",
                "✗".red().bold()
            );
        }
    }
}

fn counts(summary: &CycleSummary) -> String {
    format!(
        "{} actions, +{} -{}, {} orders",
        summary.actions, summary.added, summary.removed, summary.orders
    )
}

fn print_details(summary: &CycleSummary) {
    for path in &summary.bootstrapped {
        println!("  +  created {path}");
    }
    for rejected in &summary.rejected {
        println!(
            "  !  skipped action #{} '{}' ({})",
            rejected.index, rejected.kind, rejected.order_ids
        );
    }
}
