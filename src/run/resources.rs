//! Shared batch state: the result table and the batch report.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::app::{compute_stats, ProgressStats};
use crate::error_handling::FailureStats;
use crate::whois::{DomainResult, SourceMode};

/// Type alias for the progress callback, invoked with every published result.
pub type ProgressCallback = Option<Arc<dyn Fn(&DomainResult) + Send + Sync>>;

/// Results of the current batch, keyed by domain.
///
/// Workers publish into the table as a domain moves from in-flight to
/// finished. Readers (statistics, export, a polling UI) may read it at any
/// time and see each domain's latest published state. Domains that are
/// still queued have no entry yet, but they count toward `stats().total`.
#[derive(Debug, Default)]
pub struct ResultTable {
    results: RwLock<HashMap<String, DomainResult>>,
    batch_size: AtomicUsize,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry for `result.domain`.
    pub fn publish(&self, result: DomainResult) {
        let mut results = self.results.write().unwrap_or_else(PoisonError::into_inner);
        results.insert(result.domain.clone(), result);
    }

    pub fn get(&self, domain: &str) -> Option<DomainResult> {
        self.results
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(domain)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.results.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empties the table for a new batch of `batch_size` domains.
    pub(crate) fn reset(&self, batch_size: usize) {
        let mut results = self.results.write().unwrap_or_else(PoisonError::into_inner);
        results.clear();
        self.batch_size.store(batch_size, Ordering::SeqCst);
    }

    /// Number of domains in the current batch, claimed or not.
    pub fn batch_size(&self) -> usize {
        self.batch_size.load(Ordering::SeqCst)
    }

    /// Copies every entry, in completion order.
    ///
    /// Finished results come first, ordered by `finished_at` and then by
    /// domain. In-flight results follow, ordered by domain.
    pub fn snapshot(&self) -> Vec<DomainResult> {
        let mut results: Vec<DomainResult> = self
            .results
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        results.sort_by(|a, b| match (a.finished_at, b.finished_at) {
            (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.domain.cmp(&b.domain)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.domain.cmp(&b.domain),
        });
        results
    }

    /// Progress statistics over the current batch.
    ///
    /// `total` is the batch size, so it stays fixed while workers are still
    /// claiming domains.
    pub fn stats(&self) -> ProgressStats {
        let results = self.results.read().unwrap_or_else(PoisonError::into_inner);
        let mut stats = compute_stats(results.values());
        stats.total = stats.total.max(self.batch_size());
        stats
    }
}

/// Outcome of a completed batch run.
#[derive(Clone)]
pub struct BatchReport {
    /// Source mode the batch ran under
    pub mode: SourceMode,
    /// Final results, in completion order
    pub results: Vec<DomainResult>,
    /// Statistics over `results`
    pub stats: ProgressStats,
    /// Channel failures counted during this batch
    pub failure_stats: Arc<FailureStats>,
    /// Wall-clock duration of the batch
    pub elapsed_seconds: f64,
}

impl std::fmt::Debug for BatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchReport")
            .field("mode", &self.mode)
            .field("stats", &self.stats)
            .field("failures", &self.failure_stats.total())
            .field("elapsed_seconds", &self.elapsed_seconds)
            .finish()
    }
}

impl BatchReport {
    /// Looks up the final result for `domain`.
    pub fn result(&self, domain: &str) -> Option<&DomainResult> {
        self.results.iter().find(|r| r.domain == domain)
    }
}
