//! Error handling and failure statistics.
//!
//! This module provides:
//! - The lookup error taxonomy (`LookupError`) and initialization errors
//! - Failure categories (`FailureKind`) and their classification
//! - Lock-free per-category failure counters (`FailureStats`)

mod stats;
mod types;

// Re-export public API
pub use stats::FailureStats;
pub use types::{
    categorize_io_error, categorize_reqwest_error, FailureKind, InitializationError, LookupError,
};
