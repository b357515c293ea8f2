//! Request and Response models for the pagination API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::PageRequest;
pub use responses::{
    CacheInfoResponse, DatasetsResponse, HealthResponse, InvalidateResponse, PageResponse,
    StatsResponse,
};
