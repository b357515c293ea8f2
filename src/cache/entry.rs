//! Cache Entry Module
//!
//! Defines dataset snapshots and the cache entries that hold them, with
//! sliding-expiration support.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;

// == Snapshot ==
/// An immutable, cheaply clonable handle to one fetched dataset.
///
/// The records live behind an `Arc`, rooted as a JSON array so the query
/// evaluator can consume the whole dataset directly. The store hands the same
/// snapshot to concurrent evaluations without copying; nothing can mutate it
/// after creation.
#[derive(Debug, Clone)]
pub struct Snapshot {
    root: Arc<Value>,
}

impl Snapshot {
    /// Wraps an ordered sequence of records as an immutable snapshot.
    pub fn new(records: Vec<Value>) -> Self {
        Self {
            root: Arc::new(Value::Array(records)),
        }
    }

    /// The records in fetch order.
    pub fn records(&self) -> &[Value] {
        // The root is always an array by construction.
        match self.root.as_ref() {
            Value::Array(records) => records,
            _ => &[],
        }
    }

    /// The snapshot as a single JSON value, for query evaluation.
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Number of records in the snapshot.
    pub fn len(&self) -> usize {
        self.records().len()
    }

    /// Whether the snapshot holds no records.
    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }
}

impl From<Vec<Value>> for Snapshot {
    fn from(records: Vec<Value>) -> Self {
        Self::new(records)
    }
}

// == Cache Entry ==
/// Represents a single cached snapshot with expiration metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored dataset snapshot
    pub snapshot: Snapshot,
    /// When the snapshot was cached
    pub created_at: Instant,
    /// When the entry was last read; expiration is measured from here
    pub last_accessed: Instant,
    /// Inactivity window after which the entry expires
    pub ttl: Duration,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry holding `snapshot` with the given TTL.
    ///
    /// # Arguments
    /// * `snapshot` - The dataset snapshot to store
    /// * `ttl` - Inactivity window before the entry expires
    pub fn new(snapshot: Snapshot, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            snapshot,
            created_at: now,
            last_accessed: now,
            ttl,
        }
    }

    // == Touch ==
    /// Marks the entry as read, restarting the expiration window.
    ///
    /// Invariant: `last_accessed >= created_at` always holds, since touches
    /// only ever move the access time forward.
    pub fn touch(&mut self) {
        self.last_accessed = Instant::now();
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: expiration is sliding, measured from the last
    /// access rather than from creation, and trips only once strictly more
    /// than the TTL has elapsed since then. Frequent reads keep an entry
    /// alive indefinitely.
    pub fn is_expired(&self) -> bool {
        self.last_accessed.elapsed() > self.ttl
    }

    // == Diagnostics ==
    /// Seconds since the snapshot was cached.
    ///
    /// Age is reported for diagnostics only and never affects eviction.
    pub fn age_seconds(&self) -> u64 {
        self.created_at.elapsed().as_secs()
    }

    /// Seconds until the entry expires if it is never read again.
    ///
    /// # Returns
    /// - `0` once the inactivity window has fully elapsed
    /// - the remaining whole seconds otherwise
    pub fn expires_in_seconds(&self) -> u64 {
        self.ttl.saturating_sub(self.last_accessed.elapsed()).as_secs()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;

    fn sample_snapshot() -> Snapshot {
        Snapshot::new(vec![json!({"id": 1}), json!({"id": 2})])
    }

    #[test]
    fn test_snapshot_records() {
        let snapshot = sample_snapshot();

        assert_eq!(snapshot.len(), 2);
        assert!(!snapshot.is_empty());
        assert_eq!(snapshot.records()[0], json!({"id": 1}));
    }

    #[test]
    fn test_snapshot_as_value_is_array() {
        let snapshot = sample_snapshot();

        assert!(snapshot.as_value().is_array());
        assert_eq!(snapshot.as_value(), &json!([{"id": 1}, {"id": 2}]));
    }

    #[test]
    fn test_snapshot_clone_shares_records() {
        let snapshot = sample_snapshot();
        let clone = snapshot.clone();

        // Both handles point at the same allocation
        assert!(Arc::ptr_eq(&snapshot.root, &clone.root));
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Snapshot::new(Vec::new());

        assert_eq!(snapshot.len(), 0);
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new(sample_snapshot(), Duration::from_secs(300));

        assert!(!entry.is_expired());
        assert_eq!(entry.snapshot.len(), 2);
        assert!(entry.last_accessed >= entry.created_at);
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(sample_snapshot(), Duration::from_millis(40));

        assert!(!entry.is_expired());

        // Wait past the inactivity window
        sleep(Duration::from_millis(120));

        assert!(entry.is_expired());
    }

    #[test]
    fn test_touch_restarts_window() {
        let mut entry = CacheEntry::new(sample_snapshot(), Duration::from_millis(80));

        sleep(Duration::from_millis(50));
        entry.touch();
        sleep(Duration::from_millis(50));

        // 100ms since creation, but only 50ms since the last read
        assert!(!entry.is_expired());
        assert!(entry.last_accessed > entry.created_at);
    }

    #[test]
    fn test_age_ignores_touch() {
        let mut entry = CacheEntry::new(sample_snapshot(), Duration::from_secs(60));

        entry.touch();

        // Touching never rewinds the creation clock
        assert!(entry.age_seconds() < 2);
        assert!(entry.created_at <= entry.last_accessed);
    }

    #[test]
    fn test_expires_in_counts_down() {
        let entry = CacheEntry::new(sample_snapshot(), Duration::from_secs(10));

        let remaining = entry.expires_in_seconds();
        assert!(remaining <= 10);
        assert!(remaining >= 9);
    }

    #[test]
    fn test_expires_in_zero_after_expiry() {
        let entry = CacheEntry::new(sample_snapshot(), Duration::from_millis(30));

        sleep(Duration::from_millis(100));

        assert_eq!(entry.expires_in_seconds(), 0);
    }
}
