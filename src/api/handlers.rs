//! API Handlers
//!
//! HTTP request handlers for each endpoint. The page handler never fails at
//! the HTTP level: every outcome, including fetch and query failures, is a
//! 200 carrying the response envelope.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use tokio::sync::RwLock;
use tracing::warn;

use crate::cache::SnapshotStore;
use crate::config::Config;
use crate::models::{
    CacheInfoResponse, DatasetsResponse, HealthResponse, InvalidateResponse, PageRequest,
    PageResponse, StatsResponse,
};
use crate::session::{SessionOrchestrator, SharedStore};
use crate::source::{self, FileSource};

/// Application state shared across all handlers.
///
/// Contains the snapshot store wrapped in Arc<RwLock<>> for thread-safe
/// access, plus the directory datasets are served from.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe snapshot store
    pub cache: SharedStore,
    /// Directory holding `<name>.json` dataset files
    pub data_dir: PathBuf,
}

impl AppState {
    /// Creates a new AppState over an existing store.
    pub fn new(store: SnapshotStore, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache: Arc::new(RwLock::new(store)),
            data_dir: data_dir.into(),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        let store = SnapshotStore::new(Duration::from_secs(config.default_ttl));
        Self::new(store, config.data_dir.clone())
    }
}

/// Handler for POST /datasets/:name/page
///
/// Resolves the dataset file and hands the request to the orchestrator. An
/// unusable dataset name surfaces as a fetch failure in the envelope.
pub async fn page_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<PageRequest>,
) -> Json<PageResponse> {
    let file_source = match FileSource::for_dataset(&state.data_dir, &name) {
        Ok(file_source) => file_source,
        Err(err) => {
            return Json(PageResponse::failed("", None, request.limit, err.to_string()));
        }
    };

    let orchestrator = SessionOrchestrator::new(state.cache.clone(), file_source);
    Json(orchestrator.page(request).await)
}

/// Handler for GET /datasets
///
/// Lists the dataset names currently servable. An unreadable data directory
/// degrades to an empty listing rather than an error.
pub async fn datasets_handler(State(state): State<AppState>) -> Json<DatasetsResponse> {
    let datasets = match source::list_datasets(&state.data_dir).await {
        Ok(datasets) => datasets,
        Err(err) => {
            warn!(error = %err, "dataset listing failed");
            Vec::new()
        }
    };

    Json(DatasetsResponse::new(datasets))
}

/// Handler for GET /cache/:key
///
/// Reports on a snapshot without counting as an access.
pub async fn cache_info_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<CacheInfoResponse> {
    // Read lock is enough: get_info never touches nor sweeps
    let cache = state.cache.read().await;
    let info = cache.get_info(&key);

    Json(CacheInfoResponse::new(key, info))
}

/// Handler for DELETE /cache/:key
///
/// Drops a snapshot immediately.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<InvalidateResponse> {
    // Acquire write lock
    let mut cache = state.cache.write().await;
    let invalidated = cache.invalidate(&key);

    Json(InvalidateResponse::new(key, invalidated))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    // Acquire read lock for stats
    let cache = state.cache.read().await;
    let stats = cache.stats();

    Json(StatsResponse::new(&stats))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn state_with_datasets(files: &[(&str, &str)]) -> (AppState, TempDir) {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        let state = AppState::new(SnapshotStore::new(Duration::from_secs(300)), dir.path());
        (state, dir)
    }

    #[tokio::test]
    async fn test_page_handler_round_trip() {
        let (state, _dir) =
            state_with_datasets(&[("parts.json", r#"[{"id": 1}, {"id": 2}, {"id": 3}]"#)]);

        let first = page_handler(
            State(state.clone()),
            Path("parts".to_string()),
            Json(PageRequest::default()),
        )
        .await;

        assert!(first.success);
        assert_eq!(first.total, 3);
        assert!(first.cache_key.starts_with("pb_"));

        // Second request reuses the snapshot under the same key
        let request = PageRequest {
            cache_key: Some(first.cache_key.clone()),
            ..PageRequest::default()
        };
        let second = page_handler(State(state), Path("parts".to_string()), Json(request)).await;

        assert_eq!(second.cache_key, first.cache_key);
    }

    #[tokio::test]
    async fn test_page_handler_rejects_traversal_names() {
        let (state, _dir) = state_with_datasets(&[]);

        let response = page_handler(
            State(state),
            Path("../secrets".to_string()),
            Json(PageRequest::default()),
        )
        .await;

        assert!(!response.success);
        let error = response.0.error.unwrap();
        assert!(error.starts_with("Upstream fetch failed:"));
        assert!(error.contains("invalid dataset name"));
    }

    #[tokio::test]
    async fn test_page_handler_unknown_dataset_is_fetch_failure() {
        let (state, _dir) = state_with_datasets(&[]);

        let response = page_handler(
            State(state),
            Path("missing".to_string()),
            Json(PageRequest::default()),
        )
        .await;

        assert!(!response.success);
        assert!(response
            .0
            .error
            .unwrap()
            .starts_with("Upstream fetch failed:"));
        assert_eq!(response.0.cache_key, "");
    }

    #[tokio::test]
    async fn test_cache_info_and_invalidate_handlers() {
        let (state, _dir) = state_with_datasets(&[("parts.json", r#"[{"id": 1}]"#)]);

        let page = page_handler(
            State(state.clone()),
            Path("parts".to_string()),
            Json(PageRequest::default()),
        )
        .await;
        let key = page.cache_key.clone();

        let info = cache_info_handler(State(state.clone()), Path(key.clone())).await;
        assert!(info.valid);
        assert_eq!(info.total_items, Some(1));
        assert_eq!(info.cache_key, key);

        let dropped = invalidate_handler(State(state.clone()), Path(key.clone())).await;
        assert!(dropped.invalidated);

        let info = cache_info_handler(State(state.clone()), Path(key.clone())).await;
        assert!(!info.valid);

        // Invalidating again reports that nothing was there
        let dropped = invalidate_handler(State(state), Path(key)).await;
        assert!(!dropped.invalidated);
    }

    #[tokio::test]
    async fn test_cache_info_unknown_key() {
        let (state, _dir) = state_with_datasets(&[]);

        let info = cache_info_handler(State(state), Path("pb_00000000".to_string())).await;

        assert!(!info.valid);
        assert_eq!(info.total_items, None);
    }

    #[tokio::test]
    async fn test_datasets_handler_lists_json_files() {
        let (state, _dir) = state_with_datasets(&[
            ("orders.json", "[]"),
            ("parts.json", "[]"),
            ("readme.txt", "ignored"),
        ]);

        let response = datasets_handler(State(state)).await;

        assert_eq!(
            response.datasets,
            vec!["orders".to_string(), "parts".to_string()]
        );
    }

    #[tokio::test]
    async fn test_datasets_handler_missing_dir_is_empty() {
        let state = AppState::new(
            SnapshotStore::new(Duration::from_secs(300)),
            "/nonexistent/data/dir",
        );

        let response = datasets_handler(State(state)).await;

        assert!(response.datasets.is_empty());
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let (state, _dir) = state_with_datasets(&[("parts.json", r#"[{"id": 1}]"#)]);

        let before = stats_handler(State(state.clone())).await;
        assert_eq!(before.hits, 0);
        assert_eq!(before.total_entries, 0);

        let page = page_handler(
            State(state.clone()),
            Path("parts".to_string()),
            Json(PageRequest::default()),
        )
        .await;
        let request = PageRequest {
            cache_key: Some(page.cache_key.clone()),
            ..PageRequest::default()
        };
        page_handler(State(state.clone()), Path("parts".to_string()), Json(request)).await;

        let after = stats_handler(State(state)).await;
        assert_eq!(after.hits, 1);
        assert_eq!(after.total_entries, 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;

        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_from_config_wires_data_dir() {
        let config = Config {
            data_dir: "demo_data".into(),
            default_ttl: 60,
            server_port: 0,
        };

        let state = AppState::from_config(&config);

        assert_eq!(state.data_dir, PathBuf::from("demo_data"));
    }

    #[tokio::test]
    async fn test_page_handler_aggregate_query() {
        let (state, _dir) =
            state_with_datasets(&[("parts.json", r#"[{"id": 1}, {"id": 2}]"#)]);

        let request = PageRequest {
            query: Some("length(@)".to_string()),
            ..PageRequest::default()
        };
        let response = page_handler(State(state), Path("parts".to_string()), Json(request)).await;

        assert!(response.success);
        assert_eq!(response.total, 1);
        assert_eq!(response.data, vec![json!(2)]);
    }
}
