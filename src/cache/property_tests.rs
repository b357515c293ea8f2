//! Property-Based Tests for Cache Module
//!
//! Uses proptest to verify the snapshot lifecycle properties: key format and
//! uniqueness, round-trip integrity, invalidation, statistics accounting, and
//! the sliding-expiration timing rules.

use proptest::prelude::*;
use std::collections::HashSet;
use std::thread::sleep;
use std::time::{Duration, Instant};

use serde_json::{json, Value};

use crate::cache::{Snapshot, SnapshotStore, KEY_PREFIX, KEY_SUFFIX_LEN};

// == Test Configuration ==
const TEST_DEFAULT_TTL: u64 = 300;

// == Strategies ==
/// Generates small record sequences shaped like real fetched datasets
fn records_strategy() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(
        (any::<u32>(), "[a-z]{1,12}").prop_map(|(id, name)| json!({"id": id, "name": name})),
        0..40,
    )
}

/// Generates a sequence of store operations for model-based testing
#[derive(Debug, Clone)]
enum StoreOp {
    Create { records: usize },
    GetIssued { slot: usize },
    GetUnknown { key: String },
    Invalidate { slot: usize },
}

fn store_op_strategy() -> impl Strategy<Value = StoreOp> {
    prop_oneof![
        (0usize..20).prop_map(|records| StoreOp::Create { records }),
        (0usize..16).prop_map(|slot| StoreOp::GetIssued { slot }),
        // Keys the store can never have issued, so these always miss
        "miss_[0-9a-f]{8}".prop_map(|key| StoreOp::GetUnknown { key }),
        (0usize..16).prop_map(|slot| StoreOp::Invalidate { slot }),
    ]
}

fn numbered_records(n: usize) -> Vec<Value> {
    (0..n).map(|i| json!({"id": i})).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Every issued key carries the fixed prefix and an 8-char hex suffix,
    // and consecutive creates never collide.
    #[test]
    fn prop_key_format_and_uniqueness(count in 1usize..50) {
        let mut store = SnapshotStore::new(Duration::from_secs(TEST_DEFAULT_TTL));
        let mut seen = HashSet::new();

        for _ in 0..count {
            let key = store.create(Snapshot::new(Vec::new()));

            prop_assert!(key.starts_with(KEY_PREFIX), "Bad prefix: {}", key);
            prop_assert_eq!(key.len(), KEY_PREFIX.len() + KEY_SUFFIX_LEN);
            let suffix = &key[KEY_PREFIX.len()..];
            prop_assert!(
                suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()),
                "Suffix is not lowercase hex: {}", suffix
            );
            prop_assert!(seen.insert(key.clone()), "Duplicate key issued: {}", key);
        }

        prop_assert_eq!(store.len(), count);
    }

    // A snapshot read back before expiry is exactly the snapshot stored.
    #[test]
    fn prop_roundtrip_snapshot(records in records_strategy()) {
        let mut store = SnapshotStore::new(Duration::from_secs(TEST_DEFAULT_TTL));

        let key = store.create(Snapshot::new(records.clone()));
        let snapshot = store.get(&key);

        prop_assert!(snapshot.is_some(), "Fresh snapshot should be retrievable");
        let snapshot = snapshot.unwrap();
        prop_assert_eq!(snapshot.len(), records.len());
        prop_assert_eq!(snapshot.records(), records.as_slice());
    }

    // After invalidation a key misses, and invalidating again reports absence.
    #[test]
    fn prop_invalidate_removes_entry(records in records_strategy()) {
        let mut store = SnapshotStore::new(Duration::from_secs(TEST_DEFAULT_TTL));

        let key = store.create(Snapshot::new(records));

        prop_assert!(store.invalidate(&key), "First invalidate should report presence");
        prop_assert!(store.get(&key).is_none(), "Invalidated key should miss");
        prop_assert!(!store.invalidate(&key), "Second invalidate should report absence");
    }

    // For any operation sequence, hit/miss counters match a replayed model.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(store_op_strategy(), 1..60)) {
        let mut store = SnapshotStore::new(Duration::from_secs(TEST_DEFAULT_TTL));
        let mut issued: Vec<String> = Vec::new();
        let mut live: HashSet<String> = HashSet::new();
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                StoreOp::Create { records } => {
                    let key = store.create(Snapshot::new(numbered_records(records)));
                    live.insert(key.clone());
                    issued.push(key);
                }
                StoreOp::GetIssued { slot } => {
                    if issued.is_empty() {
                        continue;
                    }
                    let key = issued[slot % issued.len()].clone();
                    let got = store.get(&key);
                    if live.contains(&key) {
                        prop_assert!(got.is_some(), "Live key '{}' missed", key);
                        expected_hits += 1;
                    } else {
                        prop_assert!(got.is_none(), "Invalidated key '{}' hit", key);
                        expected_misses += 1;
                    }
                }
                StoreOp::GetUnknown { key } => {
                    prop_assert!(store.get(&key).is_none());
                    expected_misses += 1;
                }
                StoreOp::Invalidate { slot } => {
                    if issued.is_empty() {
                        continue;
                    }
                    let key = issued[slot % issued.len()].clone();
                    let removed = store.invalidate(&key);
                    prop_assert_eq!(removed, live.remove(&key));
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.total_entries, store.len(), "Total entries mismatch");
        prop_assert_eq!(store.len(), live.len(), "Live set mismatch");
    }
}

// Separate proptest block with fewer cases for time-sensitive TTL tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // Reads spaced well inside the window keep an entry alive even after the
    // total elapsed time exceeds the TTL; silence then expires it.
    #[test]
    fn prop_sliding_reads_keep_entry_alive(ttl_ms in 90u64..150) {
        let mut store = SnapshotStore::new(Duration::from_millis(ttl_ms));
        let key = store.create(Snapshot::new(numbered_records(3)));

        for _ in 0..4 {
            sleep(Duration::from_millis(ttl_ms / 3));
            prop_assert!(store.get(&key).is_some(), "Entry expired despite frequent reads");
        }

        sleep(Duration::from_millis(ttl_ms + 50));
        prop_assert!(store.get(&key).is_none(), "Entry survived past its window");
    }

    // Diagnostics polling is not an access: get_info alone never postpones
    // expiry.
    #[test]
    fn prop_get_info_never_extends_lifetime(ttl_ms in 60u64..100) {
        let mut store = SnapshotStore::new(Duration::from_millis(ttl_ms));
        let key = store.create(Snapshot::new(numbered_records(3)));

        let deadline = Instant::now() + Duration::from_millis(ttl_ms + 60);
        while Instant::now() < deadline {
            let _ = store.get_info(&key);
            sleep(Duration::from_millis(15));
        }

        prop_assert!(store.get(&key).is_none(), "get_info kept the entry alive");
    }
}

// == Property Test for Concurrent Session Correctness ==
// Concurrent sessions sharing one store via Arc<RwLock<_>> must each see
// their own snapshot whole, never torn or swapped.

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_concurrent_sessions_see_complete_snapshots(
        sizes in prop::collection::vec(1usize..30, 2..12)
    ) {
        use std::sync::Arc;
        use tokio::sync::RwLock;

        let rt = tokio::runtime::Runtime::new().unwrap();

        rt.block_on(async {
            let store = Arc::new(RwLock::new(SnapshotStore::new(Duration::from_secs(
                TEST_DEFAULT_TTL,
            ))));

            let mut handles = vec![];
            for n in sizes {
                let store = Arc::clone(&store);
                handles.push(tokio::spawn(async move {
                    let key = {
                        let mut cache = store.write().await;
                        cache.create(Snapshot::new(numbered_records(n)))
                    };

                    for _ in 0..3 {
                        let snapshot = {
                            let mut cache = store.write().await;
                            cache.get(&key)
                        };
                        let snapshot =
                            snapshot.ok_or_else(|| format!("snapshot '{}' vanished", key))?;
                        if snapshot.len() != n {
                            return Err(format!(
                                "expected {} records, got {}",
                                n,
                                snapshot.len()
                            ));
                        }
                        for (i, record) in snapshot.records().iter().enumerate() {
                            if record["id"] != json!(i) {
                                return Err(format!("record {} out of order", i));
                            }
                        }
                    }
                    Ok::<_, String>(())
                }));
            }

            for handle in handles {
                let result = handle.await.expect("Task should not panic");
                prop_assert!(result.is_ok(), "Concurrent session failed: {:?}", result);
            }

            let cache = store.read().await;
            let stats = cache.stats();
            prop_assert_eq!(stats.total_entries, cache.len());
            let hit_rate = stats.hit_rate();
            prop_assert!((0.0..=1.0).contains(&hit_rate), "Bad hit rate {}", hit_rate);

            Ok(())
        })?;
    }
}
