//! One reconciliation cycle for one endpoint.
//!
//! ## Steps
//!
//! 1. connect
//! 2. bootstrap orders, bootstrap actions (create `[]` when missing)
//! 3. parse orders, parse actions
//! 4. apply the queue to the list
//! 5. write the order list
//! 6. clear the action queue (write `[]`)
//! 7. disconnect
//!
//! The queue is cleared only after the order-list write returned. A crash
//! between 5 and 6 leaves consumed actions in the queue; re-applying them is
//! harmless because add and rm are idempotent.
//!
//! ## Error policy
//!
//! | failure                         | effect                              |
//! |---------------------------------|-------------------------------------|
//! | document missing at bootstrap   | recovered: `[]` written, continue   |
//! | unknown action kind             | reported, skipped, continue         |
//! | transport / timeout / malformed | this endpoint's cycle is aborted    |
//! | disconnect                      | logged; a finished cycle stays done |

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

use ordersync_core::apply::duplicate_ids;
use ordersync_core::{
    apply_actions, Action, Endpoint, EndpointName, Order, OrderResolver, RejectedAction,
};
use ordersync_store::{bounded, Connector, DocumentStore, DEFAULT_OP_TIMEOUT};

use crate::documents::{self, Bootstrap, EMPTY_DOCUMENT};
use crate::error::{store_err, SyncError};

// ---------------------------------------------------------------------------
// Steps and options
// ---------------------------------------------------------------------------

/// A distinct failure point of the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStep {
    Connect,
    BootstrapOrders,
    BootstrapActions,
    ParseOrders,
    ParseActions,
    WriteOrders,
    ClearActions,
    Disconnect,
}

impl fmt::Display for SyncStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SyncStep::Connect => "connect",
            SyncStep::BootstrapOrders => "bootstrap orders",
            SyncStep::BootstrapActions => "bootstrap actions",
            SyncStep::ParseOrders => "parse orders",
            SyncStep::ParseActions => "parse actions",
            SyncStep::WriteOrders => "write orders",
            SyncStep::ClearActions => "clear actions",
            SyncStep::Disconnect => "disconnect",
        };
        f.write_str(label)
    }
}

/// Knobs for a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Fetch and apply, but write nothing (missing documents are not created).
    pub dry_run: bool,
    /// Bound on every remote call, connect included.
    pub op_timeout: Duration,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Counters for a cycle that got as far as applying the queue.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CycleSummary {
    /// Documents that were missing (and created, unless dry run).
    pub bootstrapped: Vec<String>,
    /// Actions in the queue.
    pub actions: usize,
    pub added: usize,
    pub removed: usize,
    /// Ids named by an action that needed no change.
    pub unchanged: usize,
    pub rejected: Vec<RejectedAction>,
    /// Orders in the list after the cycle.
    pub orders: usize,
}

/// How one endpoint's cycle ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EndpointOutcome {
    /// The queue was applied and cleared.
    Synced(CycleSummary),
    /// The queue was empty; nothing was written besides bootstrap.
    Unchanged(CycleSummary),
    /// Dry run: what a real cycle would have done.
    DryRun(CycleSummary),
    /// The cycle was aborted.
    Failed { step: SyncStep, error: String },
}

impl EndpointOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, EndpointOutcome::Failed { .. })
    }

    pub fn summary(&self) -> Option<&CycleSummary> {
        match self {
            EndpointOutcome::Synced(s) | EndpointOutcome::Unchanged(s) | EndpointOutcome::DryRun(s) => {
                Some(s)
            }
            EndpointOutcome::Failed { .. } => None,
        }
    }
}

/// Outcome of reconciling a single endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointReport {
    pub endpoint: EndpointName,
    #[serde(flatten)]
    pub outcome: EndpointOutcome,
    pub duration_ms: u128,
}

// ---------------------------------------------------------------------------
// reconcile_endpoint
// ---------------------------------------------------------------------------

/// Run one full cycle against `endpoint`.
///
/// Never returns an error: failures are folded into
/// [`EndpointOutcome::Failed`] so the caller can move on to the next
/// endpoint.
pub async fn reconcile_endpoint(
    connector: &dyn Connector,
    endpoint: &Endpoint,
    resolver: &dyn OrderResolver,
    options: &ReconcileOptions,
) -> EndpointReport {
    let started = Instant::now();
    let outcome = match reconcile_scoped(connector, endpoint, resolver, options).await {
        Ok(outcome) => outcome,
        Err(err) => {
            let step = err.step().unwrap_or(SyncStep::Connect);
            tracing::error!(
                endpoint = %endpoint.name,
                step = %step,
                error = %err,
                "endpoint cycle failed",
            );
            EndpointOutcome::Failed {
                step,
                error: err.to_string(),
            }
        }
    };

    EndpointReport {
        endpoint: endpoint.name.clone(),
        outcome,
        duration_ms: started.elapsed().as_millis(),
    }
}

/// Connect, run the cycle, and always release the session.
async fn reconcile_scoped(
    connector: &dyn Connector,
    endpoint: &Endpoint,
    resolver: &dyn OrderResolver,
    options: &ReconcileOptions,
) -> Result<EndpointOutcome, SyncError> {
    let mut store = bounded(options.op_timeout, "connect", connector.connect(endpoint))
        .await
        .map_err(store_err(SyncStep::Connect))?;
    tracing::debug!(endpoint = %endpoint.name, target = %endpoint.target, "connected");

    let result = run_cycle(store.as_mut(), endpoint, resolver, options).await;

    if let Err(err) = bounded(options.op_timeout, "disconnect", store.disconnect()).await {
        tracing::warn!(
            endpoint = %endpoint.name,
            step = %SyncStep::Disconnect,
            error = %err,
            "disconnect failed",
        );
    }

    result
}

async fn run_cycle(
    store: &mut dyn DocumentStore,
    endpoint: &Endpoint,
    resolver: &dyn OrderResolver,
    options: &ReconcileOptions,
) -> Result<EndpointOutcome, SyncError> {
    let create_missing = !options.dry_run;
    let mut summary = CycleSummary::default();

    let orders_doc = documents::ensure_document(
        store,
        &endpoint.orders_path,
        create_missing,
        options.op_timeout,
    )
    .await
    .map_err(store_err(SyncStep::BootstrapOrders))?;
    note_bootstrap(&mut summary, &endpoint.orders_path, &orders_doc);

    let actions_doc = documents::ensure_document(
        store,
        &endpoint.actions_path,
        create_missing,
        options.op_timeout,
    )
    .await
    .map_err(store_err(SyncStep::BootstrapActions))?;
    note_bootstrap(&mut summary, &endpoint.actions_path, &actions_doc);

    let orders: Vec<Order> = documents::decode(
        orders_doc.content(),
        &endpoint.orders_path,
        SyncStep::ParseOrders,
    )?;
    let actions: Vec<Action> = documents::decode(
        actions_doc.content(),
        &endpoint.actions_path,
        SyncStep::ParseActions,
    )?;

    let dups = duplicate_ids(&orders);
    if !dups.is_empty() {
        tracing::warn!(
            endpoint = %endpoint.name,
            ids = ?dups,
            "order list already contains duplicate ids",
        );
    }

    summary.actions = actions.len();
    if actions.is_empty() {
        summary.orders = orders.len();
        tracing::debug!(endpoint = %endpoint.name, "action queue empty");
        return Ok(EndpointOutcome::Unchanged(summary));
    }

    let outcome = apply_actions(orders, &actions, resolver);
    for rejected in &outcome.rejected {
        tracing::warn!(
            endpoint = %endpoint.name,
            index = rejected.index,
            action = %rejected.kind,
            order_ids = %rejected.order_ids,
            "unknown action skipped",
        );
    }
    summary.added = outcome.added;
    summary.removed = outcome.removed;
    summary.unchanged = outcome.unchanged;
    summary.rejected = outcome.rejected.clone();
    summary.orders = outcome.orders.len();

    if options.dry_run {
        return Ok(EndpointOutcome::DryRun(summary));
    }

    // An unchanged list is already durable; only the queue needs clearing.
    if outcome.changed() {
        let bytes = documents::encode(&outcome.orders, &endpoint.orders_path, SyncStep::WriteOrders)?;
        documents::write_document(
            store,
            &endpoint.orders_path,
            bytes,
            SyncStep::WriteOrders,
            options.op_timeout,
        )
        .await?;
    }

    documents::write_document(
        store,
        &endpoint.actions_path,
        EMPTY_DOCUMENT.to_vec(),
        SyncStep::ClearActions,
        options.op_timeout,
    )
    .await?;

    tracing::info!(
        endpoint = %endpoint.name,
        actions = summary.actions,
        added = summary.added,
        removed = summary.removed,
        rejected = summary.rejected.len(),
        orders = summary.orders,
        "endpoint reconciled",
    );
    Ok(EndpointOutcome::Synced(summary))
}

fn note_bootstrap(summary: &mut CycleSummary, path: &str, doc: &Bootstrap) {
    if doc.was_missing() {
        summary.bootstrapped.push(path.to_string());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ordersync_core::{EndpointTarget, Password, PlaceholderResolver};
    use ordersync_store::MemoryConnector;

    fn endpoint(name: &str) -> Endpoint {
        Endpoint {
            name: EndpointName::from(name),
            target: EndpointTarget::Ftp {
                host: format!("{name}.example"),
                port: 21,
            },
            user: "u".to_string(),
            password: Password::new("p"),
            orders_path: "orders.json".to_string(),
            actions_path: "actions.json".to_string(),
        }
    }

    async fn run(connector: &MemoryConnector, ep: &Endpoint, dry_run: bool) -> EndpointReport {
        let options = ReconcileOptions {
            dry_run,
            ..ReconcileOptions::default()
        };
        reconcile_endpoint(connector, ep, &PlaceholderResolver::new(), &options).await
    }

    #[tokio::test]
    async fn fresh_endpoint_bootstraps_both_documents() {
        let connector = MemoryConnector::new();
        let ep = endpoint("fresh");

        let report = run(&connector, &ep, false).await;
        let EndpointOutcome::Unchanged(summary) = &report.outcome else {
            panic!("expected unchanged, got {:?}", report.outcome);
        };
        assert_eq!(summary.bootstrapped, vec!["orders.json", "actions.json"]);

        let backend = connector.backend(&ep.name).await;
        assert_eq!(backend.get("orders.json").await.as_deref(), Some(EMPTY_DOCUMENT));
        assert_eq!(backend.get("actions.json").await.as_deref(), Some(EMPTY_DOCUMENT));
    }

    #[tokio::test]
    async fn queue_is_applied_then_cleared() {
        let connector = MemoryConnector::new();
        let ep = endpoint("shop");
        let backend = connector.backend(&ep.name).await;
        backend.put("orders.json", b"[]".to_vec()).await;
        backend
            .put("actions.json", br#"[{"action":"add","order_ids":"A,B"}]"#.to_vec())
            .await;

        let report = run(&connector, &ep, false).await;
        let EndpointOutcome::Synced(summary) = &report.outcome else {
            panic!("expected synced, got {:?}", report.outcome);
        };
        assert_eq!(summary.added, 2);

        let orders: Vec<Order> =
            serde_json::from_slice(&backend.get("orders.json").await.expect("orders")).expect("json");
        let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(backend.get("actions.json").await.as_deref(), Some(EMPTY_DOCUMENT));
    }

    #[tokio::test]
    async fn dry_run_writes_nothing() {
        let connector = MemoryConnector::new();
        let ep = endpoint("shop");
        let backend = connector.backend(&ep.name).await;
        let queue = br#"[{"action":"add","order_ids":"A"}]"#.to_vec();
        backend.put("actions.json", queue.clone()).await;

        let report = run(&connector, &ep, true).await;
        let EndpointOutcome::DryRun(summary) = &report.outcome else {
            panic!("expected dry run, got {:?}", report.outcome);
        };
        assert_eq!(summary.added, 1);
        assert_eq!(summary.bootstrapped, vec!["orders.json"]);
        assert!(!backend.contains("orders.json").await, "dry run must not create");
        assert_eq!(backend.get("actions.json").await, Some(queue));
    }

    #[tokio::test]
    async fn malformed_orders_abort_without_touching_queue() {
        let connector = MemoryConnector::new();
        let ep = endpoint("shop");
        let backend = connector.backend(&ep.name).await;
        let queue = br#"[{"action":"rm","order_ids":"A"}]"#.to_vec();
        backend.put("orders.json", b"{oops".to_vec()).await;
        backend.put("actions.json", queue.clone()).await;

        let report = run(&connector, &ep, false).await;
        assert!(matches!(
            report.outcome,
            EndpointOutcome::Failed {
                step: SyncStep::ParseOrders,
                ..
            }
        ));
        assert_eq!(backend.get("actions.json").await, Some(queue));
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails_at_connect() {
        let connector = MemoryConnector::new();
        let ep = endpoint("down");
        connector.set_unreachable(&ep.name, true).await;

        let report = run(&connector, &ep, false).await;
        assert!(matches!(
            report.outcome,
            EndpointOutcome::Failed {
                step: SyncStep::Connect,
                ..
            }
        ));
        assert!(!connector.backend(&ep.name).await.contains("orders.json").await);
    }

    #[test]
    fn report_serializes_with_flat_outcome_tag() {
        let report = EndpointReport {
            endpoint: EndpointName::from("shop"),
            outcome: EndpointOutcome::Failed {
                step: SyncStep::WriteOrders,
                error: "boom".to_string(),
            },
            duration_ms: 12,
        };
        let json = serde_json::to_value(&report).expect("json");
        assert_eq!(json["endpoint"], "shop");
        assert_eq!(json["outcome"], "failed");
        assert_eq!(json["step"], "write_orders");
    }
}
