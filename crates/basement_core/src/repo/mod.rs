//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define one data access contract per entity kind.
//! - Isolate SQLite query details from service orchestration.
//! - Keep the search projection in step with every primary mutation.
//!
//! # Invariants
//! - Repository writes enforce `Entity::validate()` before persistence.
//! - Every mutation runs in one IMMEDIATE transaction covering primary and
//!   projection rows.
//! - Repository APIs return semantic errors (`NotFound`, `NotEmpty`,
//!   `InvalidMove`) in addition to DB transport errors.

pub mod area_repo;
pub mod box_repo;
pub mod containment;
pub mod error;
pub mod item_repo;
pub(crate) mod shared;
pub mod shelf_repo;

use crate::model::entity::{EntityId, EntityKind, ParentRef};
use crate::model::summary::SummaryRow;
use crate::search::fts::{self, ListFilter};
use error::{RepoError, RepoResult};
use rusqlite::Connection;

pub use area_repo::{AreaRepository, SqliteAreaRepository};
pub use box_repo::{BoxRepository, SqliteBoxRepository};
pub use containment::{move_entity, move_to};
pub use item_repo::{ItemRepository, SqliteItemRepository};
pub use shelf_repo::{ShelfRepository, SqliteShelfRepository};

/// Projection-backed listing shared by every repository.
///
/// `page` is 1-based; page 0 is treated as page 1.
pub trait ListSource {
    /// Kind of the rows this source lists.
    const KIND: EntityKind;

    fn connection(&self) -> &Connection;

    /// Lists rows whose label starts with the terms of `search_query`.
    fn list_rows(&self, search_query: &str, limit: u32, page: u32) -> RepoResult<Vec<SummaryRow>> {
        let filter = ListFilter::new(Self::KIND, search_query);
        Ok(fts::list_rows(self.connection(), &filter, limit, page)?)
    }

    /// Counts rows `list_rows` would page through for `search_query`.
    fn list_counter(&self, search_query: &str) -> RepoResult<u64> {
        let filter = ListFilter::new(Self::KIND, search_query);
        Ok(fts::count_rows(self.connection(), &filter)?)
    }

    /// Returns the projection row of one entity.
    fn list_row(&self, id: EntityId) -> RepoResult<SummaryRow> {
        fts::list_row(self.connection(), Self::KIND, id)?
            .ok_or_else(|| RepoError::not_found(Self::KIND, id))
    }

    /// Lists rows of this kind stored directly in `parent`.
    fn inner_list_rows(
        &self,
        parent: ParentRef,
        search_query: &str,
        limit: u32,
        page: u32,
    ) -> RepoResult<Vec<SummaryRow>> {
        let filter = ListFilter::inside(parent, Self::KIND, search_query);
        Ok(fts::list_rows(self.connection(), &filter, limit, page)?)
    }

    fn inner_list_counter(&self, parent: ParentRef, search_query: &str) -> RepoResult<u64> {
        let filter = ListFilter::inside(parent, Self::KIND, search_query);
        Ok(fts::count_rows(self.connection(), &filter)?)
    }
}

/// Every child of `kind` stored directly in `parent`, label ordered.
pub(crate) fn child_rows(
    conn: &Connection,
    parent: ParentRef,
    kind: EntityKind,
) -> RepoResult<Vec<SummaryRow>> {
    let filter = ListFilter::inside(parent, kind, "");
    Ok(fts::list_rows(conn, &filter, u32::MAX, 1)?)
}
