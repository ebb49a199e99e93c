//! Storage core for the Basement inventory.
//! This crate is the single source of truth for containment invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod pagination;
pub mod picture;
pub mod repo;
pub mod search;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::area::Area;
pub use model::entity::{
    BasicInfo, Entity, EntityId, EntityKind, EntityValidationError, ParentRef,
};
pub use model::item::Item;
pub use model::shelf::Shelf;
pub use model::storage_box::StorageBox;
pub use model::summary::{ParentSummary, SummaryRow};
pub use pagination::{ButtonRole, PageButton, Pagination};
pub use picture::{make_preview, PictureError};
pub use repo::error::{RepoError, RepoResult};
pub use repo::{
    move_to, AreaRepository, BoxRepository, ItemRepository, ListSource, ShelfRepository,
    SqliteAreaRepository, SqliteBoxRepository, SqliteItemRepository, SqliteShelfRepository,
};
pub use search::{projection_exists, search_all, SearchError, SearchQuery, SearchResult};
pub use service::list_service::{ListPage, ListService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
