//! Bookkeeping reported by the `status` command.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use ordersync_sync::{EndpointOutcome, PassReport};

/// Condensed record of the most recent pass.
#[derive(Debug, Clone, Serialize)]
pub struct PassSummary {
    pub scope: String,
    pub source: String,
    pub finished_at_unix: u64,
    pub endpoints: usize,
    pub failed: usize,
    pub duration_ms: u128,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EndpointHealth {
    pub last_success_at_unix: Option<u64>,
    pub last_failure_at_unix: Option<u64>,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuntimeStatus {
    pub started_at_unix: u64,
    pub passes: u64,
    pub skipped_passes: u64,
    pub last_pass: Option<PassSummary>,
    pub endpoints: BTreeMap<String, EndpointHealth>,
}

impl RuntimeStatus {
    pub fn new(started_at_unix: u64) -> Self {
        Self {
            started_at_unix,
            passes: 0,
            skipped_passes: 0,
            last_pass: None,
            endpoints: BTreeMap::new(),
        }
    }

    pub fn record_pass(&mut self, report: &PassReport, source: &str, now: u64) {
        self.passes += 1;
        for endpoint in &report.endpoints {
            let health = self.endpoints.entry(endpoint.endpoint.0.clone()).or_default();
            match &endpoint.outcome {
                EndpointOutcome::Failed { step, error } => {
                    health.last_failure_at_unix = Some(now);
                    health.last_error = Some(format!("{step}: {error}"));
                }
                _ => health.last_success_at_unix = Some(now),
            }
        }
        self.last_pass = Some(PassSummary {
            scope: report.scope.clone(),
            source: source.to_string(),
            finished_at_unix: now,
            endpoints: report.endpoints.len(),
            failed: report.failed(),
            duration_ms: report.duration_ms,
        });
    }

    pub fn record_skip(&mut self) {
        self.skipped_passes += 1;
    }
}

pub(crate) fn unix_seconds_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ordersync_core::EndpointName;
    use ordersync_sync::{CycleSummary, EndpointReport, SyncStep};

    fn report(outcomes: Vec<(&str, EndpointOutcome)>) -> PassReport {
        PassReport {
            scope: "all".to_string(),
            dry_run: false,
            started_at: Utc::now(),
            endpoints: outcomes
                .into_iter()
                .map(|(name, outcome)| EndpointReport {
                    endpoint: EndpointName::from(name),
                    outcome,
                    duration_ms: 1,
                })
                .collect(),
            duration_ms: 5,
        }
    }

    #[test]
    fn failure_keeps_previous_success_timestamp() {
        let mut status = RuntimeStatus::new(100);
        status.record_pass(
            &report(vec![("shop", EndpointOutcome::Synced(CycleSummary::default()))]),
            "schedule",
            200,
        );
        status.record_pass(
            &report(vec![(
                "shop",
                EndpointOutcome::Failed {
                    step: SyncStep::Connect,
                    error: "refused".to_string(),
                },
            )]),
            "schedule",
            300,
        );

        let health = &status.endpoints["shop"];
        assert_eq!(health.last_success_at_unix, Some(200));
        assert_eq!(health.last_failure_at_unix, Some(300));
        assert_eq!(health.last_error.as_deref(), Some("connect: refused"));
        assert_eq!(status.passes, 2);
        let last = status.last_pass.as_ref().expect("last pass");
        assert_eq!(last.failed, 1);
        assert_eq!(last.finished_at_unix, 300);
    }

    #[test]
    fn skips_are_counted_separately() {
        let mut status = RuntimeStatus::new(0);
        status.record_skip();
        status.record_skip();
        assert_eq!(status.skipped_passes, 2);
        assert_eq!(status.passes, 0);
        assert!(status.last_pass.is_none());
    }
}
