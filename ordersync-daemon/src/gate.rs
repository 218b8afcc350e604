//! Skip-if-running guard for reconciliation passes.
//!
//! At most one pass runs at a time. A trigger that finds a pass in flight is
//! dropped rather than queued; the next scheduled tick picks the work up.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct PassGate {
    busy: Arc<AtomicBool>,
}

/// Held for the duration of one pass; releases the gate on drop.
#[derive(Debug)]
pub struct PassPermit {
    busy: Arc<AtomicBool>,
}

impl PassGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when a pass is already in flight.
    pub fn try_acquire(&self) -> Option<PassPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PassPermit {
                busy: self.busy.clone(),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for PassPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_until_release() {
        let gate = PassGate::new();
        let permit = gate.try_acquire().expect("first acquire");
        assert!(gate.is_busy());
        assert!(gate.try_acquire().is_none());
        drop(permit);
        assert!(!gate.is_busy());
        assert!(gate.try_acquire().is_some());
    }

    #[test]
    fn clones_share_state() {
        let gate = PassGate::new();
        let other = gate.clone();
        let _permit = gate.try_acquire().expect("acquire");
        assert!(other.try_acquire().is_none());
    }
}
