//! Response DTOs for the pagination API
//!
//! Defines the structure of outgoing HTTP response bodies. Every page
//! request, successful or not, comes back in the same [`PageResponse`]
//! envelope so clients only parse one shape.

use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheInfo, CacheStats};
use crate::page::Page;

/// Response envelope for the page operation (POST /datasets/:name/page)
///
/// # Fields
/// - `success`: Whether the request produced a page
/// - `error`: Failure description, null on success
/// - `cache_key`: Key addressing the snapshot this page was cut from; empty
///   when no snapshot exists for the client to reuse
/// - `total`: Matches before windowing
/// - `has_more`: Whether records remain past this page
/// - `query_applied`: The query expression `data` was shaped by, null when
///   none was supplied
#[derive(Debug, Clone, Serialize)]
pub struct PageResponse {
    pub success: bool,
    pub error: Option<String>,
    pub cache_key: String,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
    pub has_more: bool,
    pub query_applied: Option<String>,
    pub data: Vec<Value>,
}

impl PageResponse {
    /// Creates the success envelope around an assembled page.
    pub fn ok(
        cache_key: impl Into<String>,
        query_applied: Option<String>,
        limit: usize,
        page: Page,
    ) -> Self {
        Self {
            success: true,
            error: None,
            cache_key: cache_key.into(),
            total: page.total,
            offset: page.offset,
            limit,
            has_more: page.has_more,
            query_applied,
            data: page.items,
        }
    }

    /// Creates the failure envelope. `cache_key` stays populated when a
    /// snapshot was resolved before the failure (a bad query does not lose
    /// the client's snapshot), and empty otherwise. `query_applied` echoes
    /// the expression that was attempted, when the failure came that far.
    /// No window materialized, so `offset` reports 0.
    pub fn failed(
        cache_key: impl Into<String>,
        query_applied: Option<String>,
        limit: usize,
        error: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            cache_key: cache_key.into(),
            total: 0,
            offset: 0,
            limit,
            has_more: false,
            query_applied,
            data: Vec::new(),
        }
    }
}

/// Response body for the snapshot info operation (GET /cache/:key)
#[derive(Debug, Clone, Serialize)]
pub struct CacheInfoResponse {
    /// The key that was asked about
    pub cache_key: String,
    /// Whether the key currently addresses a live snapshot
    pub valid: bool,
    /// Number of records in the snapshot
    pub total_items: Option<usize>,
    /// Seconds since the snapshot was cached
    pub age_seconds: Option<u64>,
    /// Seconds until expiry if the entry is never read again
    pub expires_in_seconds: Option<u64>,
}

impl CacheInfoResponse {
    /// Creates a new CacheInfoResponse from a store report
    pub fn new(cache_key: impl Into<String>, info: CacheInfo) -> Self {
        Self {
            cache_key: cache_key.into(),
            valid: info.valid,
            total_items: info.total_items,
            age_seconds: info.age_seconds,
            expires_in_seconds: info.expires_in_seconds,
        }
    }
}

/// Response body for the invalidate operation (DELETE /cache/:key)
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Whether an entry existed under the key
    pub invalidated: bool,
    /// The key that was invalidated
    pub cache_key: String,
}

impl InvalidateResponse {
    /// Creates a new InvalidateResponse
    pub fn new(cache_key: impl Into<String>, invalidated: bool) -> Self {
        Self {
            invalidated,
            cache_key: cache_key.into(),
        }
    }
}

/// Response body for the dataset listing (GET /datasets)
#[derive(Debug, Clone, Serialize)]
pub struct DatasetsResponse {
    /// Names servable under /datasets/:name/page
    pub datasets: Vec<String>,
}

impl DatasetsResponse {
    /// Creates a new DatasetsResponse
    pub fn new(datasets: Vec<String>) -> Self {
        Self { datasets }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of entries dropped because their TTL ran out
    pub expirations: u64,
    /// Current number of live snapshots
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(stats: &CacheStats) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
