//! `ordersync endpoints`: show what the configuration resolves to.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use ordersync_core::config::load_endpoints_at;
use ordersync_core::Endpoint;

#[derive(Args, Debug)]
pub struct EndpointsArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled, Serialize)]
struct EndpointRow {
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "target")]
    target: String,
    #[tabled(rename = "user")]
    user: String,
    #[tabled(rename = "password")]
    password: String,
    #[tabled(rename = "orders")]
    orders_path: String,
    #[tabled(rename = "actions")]
    actions_path: String,
}

impl From<&Endpoint> for EndpointRow {
    fn from(e: &Endpoint) -> Self {
        Self {
            name: e.name.0.clone(),
            target: e.target.to_string(),
            user: e.user.clone(),
            password: e.password.to_string(),
            orders_path: e.orders_path.clone(),
            actions_path: e.actions_path.clone(),
        }
    }
}

impl EndpointsArgs {
    pub fn run(self, config: &Path) -> Result<()> {
        let endpoints = load_endpoints_at(config)
            .with_context(|| format!("failed to load endpoints from {}", config.display()))?;
        let rows: Vec<EndpointRow> = endpoints.iter().map(EndpointRow::from).collect();

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&rows).context("failed to serialize endpoints")?
            );
            return Ok(());
        }

        if rows.is_empty() {
            println!("No endpoints configured in {}.", config.display());
            return Ok(());
        }

        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
