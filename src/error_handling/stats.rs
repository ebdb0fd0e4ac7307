//! Failure statistics tracking.
//!
//! Lock-free counters of channel failures per category, shared by all
//! workers of a batch.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::{FailureKind, LookupError};

/// Thread-safe failure counter, one `AtomicUsize` per [`FailureKind`].
///
/// Every kind is initialized to zero on creation so increments never need to
/// insert. Share it across workers with `Arc`.
pub struct FailureStats {
    failures: HashMap<FailureKind, AtomicUsize>,
}

impl Default for FailureStats {
    fn default() -> Self {
        Self::new()
    }
}

impl FailureStats {
    pub fn new() -> Self {
        let mut failures = HashMap::new();
        for kind in FailureKind::iter() {
            failures.insert(kind, AtomicUsize::new(0));
        }
        FailureStats { failures }
    }

    /// Increment the counter for a failure kind.
    pub fn increment(&self, kind: FailureKind) {
        if let Some(counter) = self.failures.get(&kind) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment failure counter for {:?} which is not in the map",
                kind
            );
        }
    }

    /// Record a lookup error under its category.
    pub fn record(&self, error: &LookupError) {
        self.increment(error.kind());
    }

    /// Get the count for a failure kind.
    pub fn get(&self, kind: FailureKind) -> usize {
        self.failures
            .get(&kind)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Total failures across all kinds.
    pub fn total(&self) -> usize {
        FailureKind::iter().map(|k| self.get(k)).sum()
    }
}
