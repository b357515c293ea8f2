//! Request DTOs for the pagination API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

fn default_limit() -> usize {
    50
}

/// Request body for the page operation (POST /datasets/:name/page)
///
/// # Fields
/// - `cache_key`: Key of a previously created snapshot; omitted or empty
///   means fetch fresh data
/// - `query`: Optional filter/projection expression applied to the snapshot
/// - `offset`: Zero-based index of the first record to return
/// - `limit`: Maximum records per page
#[derive(Debug, Clone, Deserialize)]
pub struct PageRequest {
    /// Snapshot key from an earlier response
    #[serde(default)]
    pub cache_key: Option<String>,
    /// Query expression, applied before windowing
    #[serde(default)]
    pub query: Option<String>,
    /// First record index
    #[serde(default)]
    pub offset: usize,
    /// Page size, 1 to 1000
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl PageRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.limit < 1 || self.limit > 1000 {
            return Some("limit must be between 1 and 1000".to_string());
        }
        None
    }

    /// The cache key to resume from, treating an empty string as omitted.
    pub fn requested_key(&self) -> Option<&str> {
        self.cache_key.as_deref().filter(|key| !key.is_empty())
    }

    /// The query to apply, treating an empty string as omitted.
    pub fn requested_query(&self) -> Option<&str> {
        self.query.as_deref().filter(|query| !query.is_empty())
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            cache_key: None,
            query: None,
            offset: 0,
            limit: default_limit(),
        }
    }
}
