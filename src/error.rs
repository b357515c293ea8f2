//! Error types for the pagination cache
//!
//! Provides unified error handling using thiserror. Every variant here is
//! recovered at the session boundary and turned into a structured response
//! envelope; nothing propagates to the caller as an HTTP fault.

use thiserror::Error;

use crate::query::QueryError;

// == Session Error Enum ==
/// Unified error type for a pagination session.
///
/// A cache miss is deliberately absent: a miss is a defined trigger for a
/// fresh fetch, never an error.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller-supplied paging parameters failed validation
    #[error("{0}")]
    InvalidRequest(String),

    /// The query expression could not be parsed or evaluated
    #[error("Invalid query expression: {0}")]
    Query(#[from] QueryError),

    /// The upstream dataset source could not produce records
    #[error("Upstream fetch failed: {0}")]
    Source(String),
}

// == Result Type Alias ==
/// Convenience Result type for the pagination cache.
pub type Result<T> = std::result::Result<T, Error>;
