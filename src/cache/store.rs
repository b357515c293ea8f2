//! Snapshot Store Module
//!
//! Main cache engine: named, TTL-bounded dataset snapshots in a HashMap with
//! sliding expiration and lazy cleanup. The store knows nothing about queries
//! or paging; it only hands out snapshots under generated keys.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::cache::{key, CacheEntry, Snapshot};

// == Cache Info ==
/// Diagnostic report for a single cache key.
///
/// Produced by [`SnapshotStore::get_info`], which deliberately never counts
/// as an access: asking about an entry must not keep it alive.
#[derive(Debug, Clone, Serialize)]
pub struct CacheInfo {
    /// Whether the key currently addresses a live snapshot
    pub valid: bool,
    /// Number of records in the snapshot
    pub total_items: Option<usize>,
    /// Seconds since the snapshot was cached
    pub age_seconds: Option<u64>,
    /// Seconds until expiry if the entry is never read again
    pub expires_in_seconds: Option<u64>,
}

impl CacheInfo {
    /// Report for a live entry.
    pub fn live(total_items: usize, age_seconds: u64, expires_in_seconds: u64) -> Self {
        Self {
            valid: true,
            total_items: Some(total_items),
            age_seconds: Some(age_seconds),
            expires_in_seconds: Some(expires_in_seconds),
        }
    }

    /// Report for an absent or expired key.
    pub fn invalid() -> Self {
        Self {
            valid: false,
            total_items: None,
            age_seconds: None,
            expires_in_seconds: None,
        }
    }
}

// == Cache Stats ==
/// Counters the store accumulates over its lifetime.
///
/// `hits` and `misses` count `get` outcomes; `expirations` counts entries
/// dropped because their inactivity window elapsed. `total_entries` is the
/// live population at the instant [`SnapshotStore::stats`] was called,
/// filled in there rather than maintained per mutation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub total_entries: usize,
}

impl CacheStats {
    /// Fraction of `get` calls answered from the cache; 0.0 before any call.
    pub fn hit_rate(&self) -> f64 {
        match self.hits + self.misses {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }
}

// == Snapshot Store ==
/// Snapshot storage with sliding TTL expiration.
///
/// Eviction happens in exactly two ways: lazily when the inactivity window
/// has elapsed, and explicitly via [`invalidate`](Self::invalidate). There is
/// no capacity bound; the population is bounded by concurrent pagination
/// sessions, not by dataset size.
#[derive(Debug)]
pub struct SnapshotStore {
    /// Key-entry storage
    entries: HashMap<String, CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
    /// TTL applied to every new entry
    default_ttl: Duration,
}

impl SnapshotStore {
    // == Constructor ==
    /// Creates a new SnapshotStore with the given default TTL.
    ///
    /// # Arguments
    /// * `default_ttl` - Inactivity window applied to every snapshot
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::default(),
            default_ttl,
        }
    }

    // == Create ==
    /// Stores a snapshot under a freshly generated key and returns the key.
    ///
    /// Always succeeds; expired entries are swept first so the map never
    /// grows from abandoned sessions.
    pub fn create(&mut self, snapshot: Snapshot) -> String {
        self.lazy_cleanup();

        let cache_key = key::generate();
        let entry = CacheEntry::new(snapshot, self.default_ttl);
        debug!(key = %cache_key, records = entry.snapshot.len(), "cached new snapshot");
        self.entries.insert(cache_key.clone(), entry);

        cache_key
    }

    // == Get ==
    /// Retrieves the snapshot stored under `key`, if it is still live.
    ///
    /// A successful read touches the entry, restarting its expiration window
    /// (sliding expiration). A miss, whether the key is absent, expired, or
    /// was never issued, is an ordinary `None`: the caller is expected to
    /// fetch fresh data, so there is no "invalid key" error.
    pub fn get(&mut self, key: &str) -> Option<Snapshot> {
        self.lazy_cleanup();

        if let Some(entry) = self.entries.get_mut(key) {
            if !entry.is_expired() {
                entry.touch();
                self.stats.hits += 1;
                return Some(entry.snapshot.clone());
            }
            // Expired in the instant since the sweep; drop it now
            self.entries.remove(key);
            self.stats.expirations += 1;
        }

        self.stats.misses += 1;
        None
    }

    // == Get Info ==
    /// Reports on `key` without counting as an access.
    ///
    /// Never touches the entry and never sweeps: an expired entry simply
    /// reports `valid: false` until a mutating call collects it. This is the
    /// one read path that must not extend a TTL window.
    pub fn get_info(&self, key: &str) -> CacheInfo {
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => CacheInfo::live(
                entry.snapshot.len(),
                entry.age_seconds(),
                entry.expires_in_seconds(),
            ),
            _ => CacheInfo::invalid(),
        }
    }

    // == Invalidate ==
    /// Removes the entry unconditionally.
    ///
    /// # Returns
    /// `true` if an entry was present under `key`, expired or not.
    pub fn invalidate(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Stats ==
    /// Returns current cache statistics, with the entry count taken now.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.entries.len(),
            ..self.stats.clone()
        }
    }

    // == Lazy Cleanup ==
    /// Removes all currently-expired entries.
    ///
    /// Runs at the start of every `create` and `get`, amortizing eviction
    /// across calls instead of paying for a background timer. Worst case one
    /// call absorbs an O(n) scan; typically there is nothing to do.
    fn lazy_cleanup(&mut self) {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        if expired_keys.is_empty() {
            return;
        }

        for key in &expired_keys {
            self.entries.remove(key);
        }
        self.stats.expirations += expired_keys.len() as u64;
        debug!(removed = expired_keys.len(), "swept expired snapshots");
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
