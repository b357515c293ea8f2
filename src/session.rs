//! Session Orchestrator Module
//!
//! Runs one page request end to end: validate the window, resolve a
//! snapshot (reusing the client's key or fetching fresh records on a miss),
//! apply the query, cut the page, and wrap the outcome in the response
//! envelope. Failures become envelope fields here; the HTTP layer never
//! turns them into error statuses.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{Snapshot, SnapshotStore};
use crate::error::{Error, Result};
use crate::models::{PageRequest, PageResponse};
use crate::page;
use crate::query::{self, QueryResult};
use crate::source::DatasetSource;

/// Shared handle to the snapshot store.
pub type SharedStore = Arc<RwLock<SnapshotStore>>;

/// Coordinates the cache, the upstream source, and the query pipeline for
/// one dataset.
pub struct SessionOrchestrator<S> {
    store: SharedStore,
    source: S,
}

impl<S: DatasetSource> SessionOrchestrator<S> {
    /// Creates a new SessionOrchestrator over a shared store and the source
    /// to consult on cache misses.
    pub fn new(store: SharedStore, source: S) -> Self {
        Self { store, source }
    }

    /// Runs one page request, always producing an envelope.
    ///
    /// The pipeline is validate, resolve, query, paginate; it stops at the
    /// first failing stage. A query failure keeps the resolved `cache_key`
    /// in the envelope so the client can fix the expression and retry
    /// against the same snapshot.
    pub async fn page(&self, request: PageRequest) -> PageResponse {
        if let Some(message) = request.validate() {
            let error = Error::InvalidRequest(message);
            return PageResponse::failed("", None, request.limit, error.to_string());
        }

        let (cache_key, snapshot) = match self.resolve(request.requested_key()).await {
            Ok(resolved) => resolved,
            Err(err) => {
                warn!(error = %err, "snapshot resolution failed");
                return PageResponse::failed("", None, request.limit, err.to_string());
            }
        };

        // Echoed on every envelope that reached evaluation, failures included
        let query_applied = request.requested_query().map(String::from);

        // Evaluation runs on the snapshot clone, outside any store lock
        let result = match request.requested_query() {
            Some(expression) => match query::run(expression, snapshot.as_value()) {
                Ok(result) => result,
                Err(err) => {
                    let error = Error::Query(err);
                    debug!(%cache_key, error = %error, "query rejected");
                    return PageResponse::failed(
                        cache_key,
                        query_applied,
                        request.limit,
                        error.to_string(),
                    );
                }
            },
            None => QueryResult::Rows(snapshot.records().to_vec()),
        };

        let page = page::paginate(result, request.offset, request.limit);
        PageResponse::ok(cache_key, query_applied, request.limit, page)
    }

    /// Resolves the snapshot to serve: the client's key when it still
    /// addresses a live entry, otherwise a fresh fetch cached under a new
    /// key. A stale key is never revived.
    async fn resolve(&self, requested: Option<&str>) -> Result<(String, Snapshot)> {
        if let Some(key) = requested {
            // Write lock: a hit touches the sliding expiration window
            let mut store = self.store.write().await;
            if let Some(snapshot) = store.get(key) {
                debug!(cache_key = %key, "serving cached snapshot");
                return Ok((key.to_string(), snapshot));
            }
        }

        // Fetch outside the lock. Concurrent misses for the same dataset
        // each fetch and insert their own snapshot; at-least-once beats
        // serializing every request behind one fetch.
        let records = self.source.fetch().await?;
        let snapshot = Snapshot::new(records);
        let mut store = self.store.write().await;
        let key = store.create(snapshot.clone());
        info!(cache_key = %key, records = snapshot.len(), "cached fresh snapshot");
        Ok((key, snapshot))
    }
}
