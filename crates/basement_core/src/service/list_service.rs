//! Paged listing use-case service.
//!
//! # Responsibility
//! - Compose `list_counter`, page math and `list_rows` into one page read.
//! - Apply the configured default page size.
//!
//! # Invariants
//! - The rows returned always belong to the clamped `current_page`.
//! - Service layer remains storage-agnostic.

use crate::model::entity::ParentRef;
use crate::model::summary::SummaryRow;
use crate::pagination::Pagination;
use crate::repo::error::RepoResult;
use crate::repo::ListSource;
use log::debug;

/// One rendered page of summary rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPage {
    /// Trimmed search text the page was filtered with.
    pub query: String,
    pub rows: Vec<SummaryRow>,
    pub pagination: Pagination,
}

/// Use-case service wrapper for paged listings of one entity kind.
pub struct ListService<S: ListSource> {
    source: S,
    default_page_size: u32,
}

impl<S: ListSource> ListService<S> {
    /// Creates a service over `source`; `default_page_size` of 0 is treated as 1.
    pub fn new(source: S, default_page_size: u32) -> Self {
        Self {
            source,
            default_page_size: default_page_size.max(1),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Reads one page of rows whose label starts with `search_query`.
    ///
    /// `limit` of `None` or 0 uses the default page size.
    pub fn list_page(
        &self,
        search_query: &str,
        limit: Option<u32>,
        page: u32,
    ) -> RepoResult<ListPage> {
        let query = search_query.trim();
        let count = self.source.list_counter(query)?;
        let pagination = Pagination::compute(count, self.page_size(limit), page);
        let rows = self
            .source
            .list_rows(query, pagination.limit, pagination.current_page)?;
        debug!(
            "event=list_page module=service status=ok kind={} count={count} page={}",
            S::KIND,
            pagination.current_page
        );
        Ok(ListPage {
            query: query.to_string(),
            rows,
            pagination,
        })
    }

    /// Reads one page of rows stored directly in `parent`.
    pub fn inner_list_page(
        &self,
        parent: ParentRef,
        search_query: &str,
        limit: Option<u32>,
        page: u32,
    ) -> RepoResult<ListPage> {
        let query = search_query.trim();
        let count = self.source.inner_list_counter(parent, query)?;
        let pagination = Pagination::compute(count, self.page_size(limit), page);
        let rows = self.source.inner_list_rows(
            parent,
            query,
            pagination.limit,
            pagination.current_page,
        )?;
        Ok(ListPage {
            query: query.to_string(),
            rows,
            pagination,
        })
    }

    fn page_size(&self, limit: Option<u32>) -> u32 {
        limit
            .filter(|value| *value > 0)
            .unwrap_or(self.default_page_size)
    }
}
