//! Search projection and full-text listing.
//!
//! # Responsibility
//! - Keep the `search_rows` projection in step with primary tables.
//! - Expose paged listing and keyword search backed by SQLite FTS5.

pub mod fts;
pub mod projection;

pub use fts::{
    count_rows, list_row, list_rows, search_all, ListFilter, SearchError, SearchQuery,
    SearchResult,
};
pub use projection::projection_exists;
