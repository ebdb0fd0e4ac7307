//! Export types.

use clap::ValueEnum;

/// Export format options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// CSV format (flattened, one row per domain, for Excel/Sheets)
    Csv,
    /// JSON array (nulls for missing values, carries per-domain errors)
    Json,
}
