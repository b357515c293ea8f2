//! Pagination Module
//!
//! Cuts fixed windows out of query results. Pagination happens after the
//! query, so `total` always counts matches rather than raw records.

use serde_json::Value;

use crate::query::QueryResult;

/// One page of results plus the bookkeeping the response envelope reports.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Matches before windowing, or 1 for an aggregate
    pub total: usize,
    pub offset: usize,
    pub items: Vec<Value>,
    pub has_more: bool,
}

/// Assembles one page from a query result.
///
/// Rows are windowed by `offset` and `limit`. A single aggregate value
/// bypasses the window: it comes back as a one-element page with `total` 1
/// and offset 0, whatever offset was requested. An offset past the end
/// yields an empty page, not an error.
pub fn paginate(result: QueryResult, offset: usize, limit: usize) -> Page {
    match result {
        QueryResult::Rows(rows) => {
            let total = rows.len();
            let items: Vec<Value> = rows.into_iter().skip(offset).take(limit).collect();
            let has_more = offset + items.len() < total;
            Page {
                total,
                offset,
                items,
                has_more,
            }
        }
        QueryResult::Single(value) => Page {
            total: 1,
            offset: 0,
            items: vec![value],
            has_more: false,
        },
    }
}
