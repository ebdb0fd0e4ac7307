//! JSON export functionality.

use anyhow::{Context, Result};

use crate::whois::DomainResult;

use super::row::ExportRow;

/// Renders results as a pretty-printed JSON array.
///
/// Every object has the same keys; missing values are `null`.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(results: &[DomainResult]) -> Result<String> {
    let rows: Vec<ExportRow> = results.iter().map(ExportRow::from).collect();
    serde_json::to_string_pretty(&rows).context("Failed to serialize results as JSON")
}
