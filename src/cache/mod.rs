//! Cache Module
//!
//! Provides in-memory snapshot caching with sliding TTL expiration and lazy
//! cleanup. Snapshots are immutable datasets addressed by store-generated
//! keys; there is no capacity eviction, only TTL expiry and explicit
//! invalidation.

mod entry;
pub mod key;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{CacheEntry, Snapshot};
pub use key::{KEY_PREFIX, KEY_SUFFIX_LEN};
pub use store::{CacheInfo, CacheStats, SnapshotStore};
