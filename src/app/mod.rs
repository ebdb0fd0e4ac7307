//! Batch-level helpers: progress logging, shutdown and statistics.

pub mod logging;
pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use logging::log_progress;
pub use shutdown::shutdown_gracefully;
pub use statistics::{compute_stats, print_failure_statistics, print_summary, ProgressStats};
