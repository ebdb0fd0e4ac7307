//! Progress logging utilities.

use log::info;

use super::statistics::ProgressStats;

/// Logs progress of a running batch.
///
/// # Arguments
///
/// * `start_time` - When the batch started
/// * `batch_size` - Number of domains in the batch
/// * `stats` - Current statistics over the result table
pub fn log_progress(start_time: std::time::Instant, batch_size: usize, stats: &ProgressStats) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let rate = if elapsed_secs > 0.0 {
        stats.completed as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Looked up {}/{} domains in {:.2} seconds (~{:.2} domains/sec, {} failed)",
        stats.completed, batch_size, elapsed_secs, rate, stats.failed
    );
}
