//! Reconciliation pass across endpoints; shared by the CLI and the daemon.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use ordersync_core::{Endpoint, OrderResolver, PlaceholderResolver};
use ordersync_store::{Connector, TransportConnector};

use crate::reconcile::{reconcile_endpoint, EndpointReport, ReconcileOptions};
use crate::SyncError;

/// Scope for a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncScope {
    /// Every configured endpoint, in configuration order.
    All,
    /// A single endpoint by name.
    Endpoint(String),
}

impl SyncScope {
    pub fn label(&self) -> String {
        match self {
            SyncScope::All => "all".to_string(),
            SyncScope::Endpoint(name) => name.clone(),
        }
    }
}

/// Outcome of one pass.
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub scope: String,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub endpoints: Vec<EndpointReport>,
    pub duration_ms: u128,
}

impl PassReport {
    pub fn failed(&self) -> usize {
        self.endpoints
            .iter()
            .filter(|r| r.outcome.is_failure())
            .count()
    }

    pub fn succeeded(&self) -> usize {
        self.endpoints.len() - self.failed()
    }
}

/// Everything a pass needs, fixed at startup.
pub struct Reconciler {
    endpoints: Vec<Endpoint>,
    connector: Arc<dyn Connector>,
    resolver: Arc<dyn OrderResolver>,
    options: ReconcileOptions,
}

impl Reconciler {
    pub fn new(
        endpoints: Vec<Endpoint>,
        connector: Arc<dyn Connector>,
        resolver: Arc<dyn OrderResolver>,
        options: ReconcileOptions,
    ) -> Self {
        Self {
            endpoints,
            connector,
            resolver,
            options,
        }
    }

    /// Real transports and placeholder order resolution.
    pub fn with_defaults(endpoints: Vec<Endpoint>, options: ReconcileOptions) -> Self {
        Self::new(
            endpoints,
            Arc::new(TransportConnector::new(options.op_timeout)),
            Arc::new(PlaceholderResolver::new()),
            options,
        )
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// Run one pass over `scope`.
    ///
    /// Endpoints are processed one after another; a failed endpoint is
    /// recorded in the report and the pass moves on. The only error is a
    /// scope naming an endpoint that does not exist.
    pub async fn run(&self, scope: &SyncScope, dry_run: bool) -> Result<PassReport, SyncError> {
        let targets: Vec<&Endpoint> = match scope {
            SyncScope::All => self.endpoints.iter().collect(),
            SyncScope::Endpoint(name) => {
                let found = self.endpoints.iter().find(|e| e.name.0 == *name);
                vec![found.ok_or_else(|| SyncError::UnknownEndpoint { name: name.clone() })?]
            }
        };

        let options = ReconcileOptions {
            dry_run: dry_run || self.options.dry_run,
            ..self.options
        };
        let started_at = Utc::now();
        let started = Instant::now();

        let mut endpoints = Vec::with_capacity(targets.len());
        for endpoint in targets {
            let report = reconcile_endpoint(
                self.connector.as_ref(),
                endpoint,
                self.resolver.as_ref(),
                &options,
            )
            .await;
            endpoints.push(report);
        }

        let report = PassReport {
            scope: scope.label(),
            dry_run: options.dry_run,
            started_at,
            endpoints,
            duration_ms: started.elapsed().as_millis(),
        };
        tracing::info!(
            scope = %report.scope,
            endpoints = report.endpoints.len(),
            failed = report.failed(),
            duration_ms = report.duration_ms,
            "reconciliation pass finished",
        );
        Ok(report)
    }
}
