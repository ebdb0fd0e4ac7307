//! Capped history of successful lookups.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::blob::{load_json, save_json, BlobStore};
use crate::config::{HISTORY_BLOB_KEY, HISTORY_MAX_ENTRIES};
use crate::whois::DomainResult;

/// One successful lookup as it looked when it was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// When the entry was appended
    pub recorded_at: DateTime<Utc>,
    /// Source mode key the lookup ran under
    pub mode: String,
    /// Snapshot of the finished result (always has `best`)
    pub result: DomainResult,
}

/// Append-only log of successful results, oldest first.
///
/// The log never holds more than `capacity` entries; appending past the cap
/// drops the oldest ones. Every append rewrites the whole log to the blob
/// store under the `"history"` key.
pub struct HistoryStore {
    entries: Mutex<VecDeque<HistoryEntry>>,
    store: Arc<dyn BlobStore>,
    capacity: usize,
}

impl HistoryStore {
    /// Loads the persisted history, starting empty if the blob is missing or corrupt.
    pub fn load(store: Arc<dyn BlobStore>) -> Self {
        Self::load_with_capacity(store, HISTORY_MAX_ENTRIES)
    }

    pub fn load_with_capacity(store: Arc<dyn BlobStore>, capacity: usize) -> Self {
        let mut entries: VecDeque<HistoryEntry> =
            load_json::<Vec<HistoryEntry>>(store.as_ref(), HISTORY_BLOB_KEY)
                .unwrap_or_default()
                .into();
        // A blob written with a larger cap is trimmed on load
        while entries.len() > capacity {
            entries.pop_front();
        }
        log::debug!("Loaded {} history entries", entries.len());
        HistoryStore {
            entries: Mutex::new(entries),
            store,
            capacity,
        }
    }

    /// Appends a successful result and persists the log.
    ///
    /// Results without `best` are refused (returns `false`); failures are
    /// never recorded.
    pub fn append(&self, mode: &str, result: &DomainResult) -> bool {
        if !result.is_success() {
            log::warn!(
                "Refusing to record failed lookup for {} in history",
                result.domain
            );
            return false;
        }

        let Ok(mut entries) = self.entries.lock() else {
            log::warn!("History lock poisoned, dropping entry for {}", result.domain);
            return false;
        };
        entries.push_back(HistoryEntry {
            recorded_at: Utc::now(),
            mode: mode.to_string(),
            result: result.clone(),
        });
        while entries.len() > self.capacity {
            entries.pop_front();
        }

        // Persist while holding the lock so concurrent appends land in order
        let (front, back) = entries.as_slices();
        let snapshot: Vec<&HistoryEntry> = front.iter().chain(back.iter()).collect();
        save_json(self.store.as_ref(), HISTORY_BLOB_KEY, &snapshot);
        true
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries
            .lock()
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
