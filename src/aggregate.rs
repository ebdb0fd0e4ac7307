//! Per-domain result aggregation.
//!
//! Picks the authoritative record among channel responses and folds channel
//! failures into a single message when nothing succeeded.

use chrono::{DateTime, Utc};

use crate::config::ERROR_SEPARATOR;
use crate::error_handling::LookupError;
use crate::whois::{DomainResult, ParsedRecord};

/// Selects the authoritative record.
///
/// The first record from a structured (RDAP) source wins; without one, the
/// first record in arrival order. Returns `None` for an empty slice.
pub fn pick_best(channels: &[ParsedRecord]) -> Option<ParsedRecord> {
    channels
        .iter()
        .find(|record| record.is_structured())
        .or_else(|| channels.first())
        .cloned()
}

/// Joins failure messages with `"; "`, or `None` if there are none.
pub fn join_errors(errors: &[LookupError]) -> Option<String> {
    if errors.is_empty() {
        return None;
    }
    Some(
        errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(ERROR_SEPARATOR),
    )
}

/// Completes an in-flight result.
///
/// Sets `best` from the gathered channels. The error message is only kept
/// when no record was found, so a partially failed `All` lookup still reads
/// as a clean success.
pub fn finalize(result: &mut DomainResult, errors: &[LookupError], finished_at: DateTime<Utc>) {
    result.best = pick_best(&result.channels);
    result.error = if result.best.is_some() {
        None
    } else {
        join_errors(errors).or_else(|| Some("no channel available for this domain".to_string()))
    };
    // Guard against wall-clock steps backwards between start and finish
    result.finished_at = Some(finished_at.max(result.started_at));
}
