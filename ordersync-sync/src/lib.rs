//! # ordersync-sync
//!
//! Document bootstrap and reconciliation of an endpoint's action queue into
//! its order list.
//!
//! Call [`reconcile_endpoint`] for a single endpoint, or build a
//! [`Reconciler`] and [`Reconciler::run`] a pass over every configured one.

pub mod documents;
pub mod error;
pub mod pipeline;
pub mod reconcile;

pub use error::SyncError;
pub use pipeline::{PassReport, Reconciler, SyncScope};
pub use reconcile::{
    reconcile_endpoint, CycleSummary, EndpointOutcome, EndpointReport, ReconcileOptions, SyncStep,
};
