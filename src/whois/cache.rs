//! Result cache keyed by domain and source mode.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{DomainResult, SourceMode};
use crate::config::{CACHE_BLOB_KEY, CACHE_TTL};
use crate::storage::{load_json, save_json, BlobStore};

/// A cached result and when it was stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CacheEntry {
    pub(crate) domain: String,
    pub(crate) mode: String,
    pub(crate) cached_at: DateTime<Utc>,
    pub(crate) result: DomainResult,
}

/// Outcome of a cache lookup that found an entry.
#[derive(Debug, Clone)]
pub struct CacheLookup {
    /// The cached result as stored
    pub result: DomainResult,
    /// Time since the entry was written
    pub age: Duration,
    /// Whether `age` is still below the TTL
    pub fresh: bool,
}

fn cache_key(domain: &str, mode: &SourceMode) -> (String, String) {
    (domain.to_string(), mode.key())
}

/// Time-to-live cache of successful lookups.
///
/// Entries are keyed by `(domain, mode)`, so a result obtained under one source
/// mode never answers a lookup under another. Staleness is checked lazily on
/// read; stale entries stay in place until the next successful `put` for the
/// same key overwrites them. Each `put` rewrites the whole cache to the blob
/// store under the `"cache"` key.
pub struct ResultCache {
    entries: Mutex<HashMap<(String, String), CacheEntry>>,
    store: Arc<dyn BlobStore>,
    ttl: Duration,
}

impl ResultCache {
    /// Loads the persisted cache with the default 24 hour TTL.
    pub fn load(store: Arc<dyn BlobStore>) -> Self {
        Self::load_with_ttl(store, CACHE_TTL)
    }

    /// Loads the persisted cache; a missing or corrupt blob yields an empty cache.
    pub fn load_with_ttl(store: Arc<dyn BlobStore>, ttl: Duration) -> Self {
        let entries: HashMap<_, _> = load_json::<Vec<CacheEntry>>(store.as_ref(), CACHE_BLOB_KEY)
            .unwrap_or_default()
            .into_iter()
            .map(|entry| ((entry.domain.clone(), entry.mode.clone()), entry))
            .collect();
        log::debug!("Loaded {} cache entries", entries.len());
        ResultCache {
            entries: Mutex::new(entries),
            store,
            ttl,
        }
    }

    /// Finds the entry for `(domain, mode)`, fresh or stale.
    pub fn lookup(&self, domain: &str, mode: &SourceMode) -> Option<CacheLookup> {
        let entries = self.entries.lock().ok()?;
        let entry = entries.get(&cache_key(domain, mode))?;
        // A timestamp from the future (clock change) counts as brand new
        let age = (Utc::now() - entry.cached_at).to_std().unwrap_or_default();
        Some(CacheLookup {
            result: entry.result.clone(),
            age,
            fresh: age < self.ttl,
        })
    }

    /// Returns the cached result only if it is still fresh.
    pub fn get(&self, domain: &str, mode: &SourceMode) -> Option<DomainResult> {
        match self.lookup(domain, mode) {
            Some(hit) if hit.fresh => {
                log::debug!("Cache hit for {} ({}), age {:?}", domain, mode, hit.age);
                Some(hit.result)
            }
            Some(hit) => {
                log::debug!("Stale cache entry for {} ({}), age {:?}", domain, mode, hit.age);
                None
            }
            None => None,
        }
    }

    /// Stores a successful result and persists the cache.
    ///
    /// Results without `best` are refused (returns `false`): failures are
    /// never cached.
    pub fn put(&self, domain: &str, mode: &SourceMode, result: &DomainResult) -> bool {
        self.put_at(domain, mode, result, Utc::now())
    }

    pub(crate) fn put_at(
        &self,
        domain: &str,
        mode: &SourceMode,
        result: &DomainResult,
        cached_at: DateTime<Utc>,
    ) -> bool {
        if !result.is_success() {
            log::warn!("Refusing to cache failed lookup for {}", domain);
            return false;
        }
        let Ok(mut entries) = self.entries.lock() else {
            log::warn!("Cache lock poisoned, not caching {}", domain);
            return false;
        };
        let (domain_key, mode_key) = cache_key(domain, mode);
        entries.insert(
            (domain_key.clone(), mode_key.clone()),
            CacheEntry {
                domain: domain_key,
                mode: mode_key,
                cached_at,
                result: result.clone(),
            },
        );

        // Persist under the lock so the last writer always wins with the full set
        let snapshot: Vec<&CacheEntry> = entries.values().collect();
        save_json(self.store.as_ref(), CACHE_BLOB_KEY, &snapshot);
        true
    }

    /// Number of entries held, fresh or stale.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBlobStore;
    use crate::whois::ParsedRecord;

    fn success(domain: &str) -> DomainResult {
        let now = Utc::now();
        let mut result = DomainResult::in_flight(domain, now);
        let mut record = ParsedRecord::new(domain, "rdap.org");
        record.registrar = Some("Example Registrar".into());
        result.channels.push(record.clone());
        result.best = Some(record);
        result.finished_at = Some(now);
        result
    }

    fn empty_cache() -> ResultCache {
        ResultCache::load(Arc::new(MemoryBlobStore::new()))
    }

    #[test]
    fn test_put_then_get_within_ttl() {
        let cache = empty_cache();
        let result = success("example.com");
        assert!(cache.put("example.com", &SourceMode::Auto, &result));
        assert_eq!(cache.get("example.com", &SourceMode::Auto), Some(result));
    }

    #[test]
    fn test_modes_are_isolated() {
        let cache = empty_cache();
        cache.put("example.com", &SourceMode::RdapOrg, &success("example.com"));

        assert!(cache.get("example.com", &SourceMode::RdapOrg).is_some());
        assert!(cache.get("example.com", &SourceMode::Auto).is_none());
        assert!(cache
            .get("example.com", &SourceMode::Server("whois.example".into()))
            .is_none());
    }

    #[test]
    fn test_failures_are_not_cached() {
        let cache = empty_cache();
        let mut failed = DomainResult::in_flight("bad.com", Utc::now());
        failed.error = Some("all channels failed".into());

        assert!(!cache.put("bad.com", &SourceMode::Auto, &failed));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_stale_entry_is_a_miss_but_kept() {
        let cache = empty_cache();
        let old = Utc::now() - chrono::Duration::hours(25);
        cache.put_at("example.com", &SourceMode::Auto, &success("example.com"), old);

        assert!(cache.get("example.com", &SourceMode::Auto).is_none());
        let lookup = cache
            .lookup("example.com", &SourceMode::Auto)
            .expect("stale entry still stored");
        assert!(!lookup.fresh);
        assert!(lookup.age >= Duration::from_secs(25 * 3600));
        assert_eq!(cache.len(), 1);

        // A fresh put overwrites the stale entry
        cache.put("example.com", &SourceMode::Auto, &success("example.com"));
        assert!(cache.get("example.com", &SourceMode::Auto).is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_future_timestamp_counts_as_fresh() {
        let cache = empty_cache();
        let future = Utc::now() + chrono::Duration::minutes(5);
        cache.put_at("example.com", &SourceMode::Auto, &success("example.com"), future);
        assert!(cache.get("example.com", &SourceMode::Auto).is_some());
    }

    #[test]
    fn test_cache_persists_across_loads() {
        let store: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
        let first = ResultCache::load(Arc::clone(&store));
        first.put("a.com", &SourceMode::Auto, &success("a.com"));
        first.put("b.com", &SourceMode::All, &success("b.com"));

        let second = ResultCache::load(store);
        assert_eq!(second.len(), 2);
        assert!(second.get("a.com", &SourceMode::Auto).is_some());
        assert!(second.get("b.com", &SourceMode::All).is_some());
    }

    #[test]
    fn test_corrupt_blob_loads_empty() {
        let store = Arc::new(MemoryBlobStore::new());
        store.save_blob(CACHE_BLOB_KEY, b"[{\"half\":").expect("save");
        assert!(ResultCache::load(store).is_empty());
    }
}
