//! Progress statistics and end-of-run summaries.

use log::info;
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::error_handling::{FailureKind, FailureStats};
use crate::whois::DomainResult;

/// Live progress over a result table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    /// Domains in the batch
    pub total: usize,
    /// Domains with `finished_at` set
    pub completed: usize,
    /// Completed domains with a `best` record
    pub success: usize,
    /// Completed domains without a `best` record
    pub failed: usize,
    /// Completed domains served from the cache
    pub cached: usize,
    /// Mean processing time over completed domains, in milliseconds
    pub avg_latency_ms: f64,
}

impl ProgressStats {
    /// Fraction of the batch that has completed (1.0 for an empty batch).
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Computes progress statistics in one read-only pass.
///
/// `total` counts every entry, in flight or not. A domain that has not been
/// claimed yet is simply absent from the table, so callers that know the
/// batch size should prefer it over `total` (see [`ProgressStats::progress`]).
pub fn compute_stats<'a, I>(results: I) -> ProgressStats
where
    I: IntoIterator<Item = &'a DomainResult>,
{
    let mut stats = ProgressStats::default();
    let mut latency_sum: i64 = 0;

    for result in results {
        stats.total += 1;
        let Some(latency) = result.latency_ms() else {
            continue;
        };
        stats.completed += 1;
        latency_sum += latency.max(0);
        if result.is_success() {
            stats.success += 1;
        }
        if result.from_cache {
            stats.cached += 1;
        }
    }

    stats.failed = stats.completed - stats.success;
    if stats.completed > 0 {
        stats.avg_latency_ms = latency_sum as f64 / stats.completed as f64;
    }
    stats
}

/// Logs the one-line summary of a finished batch.
pub fn print_summary(stats: &ProgressStats, elapsed_seconds: f64) {
    info!(
        "Looked up {} domain{} ({} succeeded, {} failed, {} from cache, avg {:.0} ms) in {:.1}s",
        stats.total,
        if stats.total == 1 { "" } else { "s" },
        stats.success,
        stats.failed,
        stats.cached,
        stats.avg_latency_ms,
        elapsed_seconds
    );
}

/// Logs the per-category channel failure counts, if any.
pub fn print_failure_statistics(failure_stats: &FailureStats) {
    let total = failure_stats.total();
    if total == 0 {
        return;
    }
    info!("Channel Failure Counts ({} total):", total);
    for kind in FailureKind::iter() {
        let count = failure_stats.get(kind);
        if count > 0 {
            info!("   {}: {}", kind.as_str(), count);
        }
    }
}
