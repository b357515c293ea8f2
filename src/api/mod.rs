//! API Module
//!
//! HTTP handlers and routing for the pagination server REST API.
//!
//! # Endpoints
//! - `POST /datasets/:name/page` - Request one page of a dataset
//! - `GET /datasets` - List servable datasets
//! - `GET /cache/:key` - Inspect a snapshot without touching it
//! - `DELETE /cache/:key` - Invalidate a snapshot
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
