//! Export of batch results.
//!
//! This module renders a slice of results as CSV or JSON, and writes the
//! rendered text to a file or stdout.

mod csv;
mod json;
mod row;
mod types;

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::whois::DomainResult;

pub use csv::{to_csv, CSV_HEADER};
pub use json::to_json;
pub use row::ExportRow;
pub use types::ExportFormat;

/// Renders `results` in `format`.
pub fn render(format: ExportFormat, results: &[DomainResult]) -> Result<String> {
    match format {
        ExportFormat::Csv => to_csv(results),
        ExportFormat::Json => to_json(results),
    }
}

/// Renders `results` and writes them to `output`, or stdout if `None`.
///
/// Returns the number of exported domains.
pub fn write_export(
    format: ExportFormat,
    results: &[DomainResult],
    output: Option<&Path>,
) -> Result<usize> {
    let rendered = render(format, results)?;
    match output {
        Some(path) => std::fs::write(path, rendered.as_bytes())
            .with_context(|| format!("Failed to write export file: {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .context("Failed to write export to stdout")?;
            if !rendered.ends_with('\n') {
                stdout.write_all(b"\n").context("Failed to write export to stdout")?;
            }
        }
    }
    Ok(results.len())
}
