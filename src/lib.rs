//! Pagebox - a queryable pagination cache
//!
//! Serves paged, filtered views of JSON datasets out of TTL-bounded
//! snapshots keyed by opaque client tokens.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod page;
pub mod query;
pub mod session;
pub mod source;

pub use api::AppState;
pub use config::Config;
pub use session::SessionOrchestrator;
