//! CSV export functionality.
//!
//! One row per domain. List fields (status, name servers) are joined with
//! `|`; missing values are empty cells.

use anyhow::{Context, Result};
use csv::Writer;

use crate::config::CSV_LIST_SEPARATOR;
use crate::whois::DomainResult;

use super::row::ExportRow;

/// CSV header, in column order.
pub const CSV_HEADER: [&str; 9] = [
    "domain",
    "source",
    "registrar",
    "registrant",
    "created",
    "expires",
    "updated",
    "status",
    "nameServers",
];

fn join_list(values: Option<Vec<String>>) -> String {
    values
        .map(|list| list.join(CSV_LIST_SEPARATOR))
        .unwrap_or_default()
}

/// Renders results as CSV text with a header row.
///
/// Quoting follows RFC 4180: fields containing a comma, a quote or a line
/// break are quoted, with embedded quotes doubled.
///
/// # Errors
///
/// Returns an error if the CSV writer fails (it writes to memory, so only
/// on malformed internal state).
pub fn to_csv(results: &[DomainResult]) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    writer
        .write_record(CSV_HEADER)
        .context("Failed to write CSV header")?;

    for result in results {
        let row = ExportRow::from(result);
        writer
            .write_record([
                row.domain,
                row.source.unwrap_or_default(),
                row.registrar.unwrap_or_default(),
                row.registrant.unwrap_or_default(),
                row.created.unwrap_or_default(),
                row.expires.unwrap_or_default(),
                row.updated.unwrap_or_default(),
                join_list(row.status),
                join_list(row.name_servers),
            ])
            .with_context(|| format!("Failed to write CSV row for {}", result.domain))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}
