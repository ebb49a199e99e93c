//! Item repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over canonical `items` storage.
//! - Keep the item projection row in step with every write.
//!
//! # Invariants
//! - Write paths call `Item::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::model::entity::{Entity, EntityId, EntityKind, ParentRef};
use crate::model::item::Item;
use crate::picture::DEFAULT_PREVIEW_MAX_PX;
use crate::repo::containment::{move_entity, validate_parent};
use crate::repo::error::{expect_single_row, RepoError, RepoResult};
use crate::repo::shared::{
    begin_immediate, delete_entity, ensure_absent, ensure_connection_ready, ensure_present,
    entity_exists, list_ids, parent_columns, parse_basic_info, parse_parent, picture_for_write,
    resolve_new_id,
};
use crate::repo::ListSource;
use crate::search::projection;
use log::info;
use rusqlite::{params, Connection, Row};

const ITEM_SELECT_SQL: &str = "SELECT
    id,
    label,
    description,
    picture,
    preview_picture,
    qr_code,
    quantity,
    weight,
    parent_kind,
    parent_id
FROM items";

/// Repository interface for item operations.
pub trait ItemRepository: ListSource {
    fn create_item(&self, item: &Item) -> RepoResult<EntityId>;
    fn item_exists(&self, id: EntityId) -> RepoResult<bool>;
    fn get_item(&self, id: EntityId) -> RepoResult<Item>;
    /// Replaces stored fields; picture columns stay untouched when
    /// `skip_picture` is set.
    fn update_item(&self, item: &Item, skip_picture: bool) -> RepoResult<()>;
    fn delete_item(&self, id: EntityId) -> RepoResult<()>;
    fn item_ids(&self) -> RepoResult<Vec<EntityId>>;
    fn move_item(&self, id: EntityId, target: Option<ParentRef>) -> RepoResult<()>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
    preview_max_px: u32,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self {
            conn,
            preview_max_px: DEFAULT_PREVIEW_MAX_PX,
        })
    }

    pub fn with_preview_max_px(mut self, preview_max_px: u32) -> Self {
        self.preview_max_px = preview_max_px;
        self
    }
}

impl ListSource for SqliteItemRepository<'_> {
    const KIND: EntityKind = EntityKind::Item;

    fn connection(&self) -> &Connection {
        self.conn
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn create_item(&self, item: &Item) -> RepoResult<EntityId> {
        item.validate()?;
        let id = resolve_new_id(item.id());

        let tx = begin_immediate(self.conn)?;
        ensure_absent(&tx, EntityKind::Item, id)?;
        validate_parent(&tx, EntityKind::Item, id, item.parent)?;

        let stored = picture_for_write(&item.info, self.preview_max_px);
        let (parent_kind, parent_id) = parent_columns(item.parent);
        tx.execute(
            "INSERT INTO items (
                id,
                label,
                description,
                picture,
                preview_picture,
                qr_code,
                quantity,
                weight,
                parent_kind,
                parent_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                id.to_string(),
                item.info.label.as_str(),
                item.info.description.as_deref(),
                stored.picture,
                stored.preview,
                item.info.qr_code.as_deref(),
                item.quantity,
                item.weight.as_str(),
                parent_kind,
                parent_id,
            ],
        )?;
        projection::insert_row(&tx, EntityKind::Item, id)?;

        tx.commit()?;
        info!("event=entity_create module=repo status=ok kind=item");
        Ok(id)
    }

    fn item_exists(&self, id: EntityId) -> RepoResult<bool> {
        entity_exists(self.conn, EntityKind::Item, id)
    }

    fn get_item(&self, id: EntityId) -> RepoResult<Item> {
        let mut stmt = self.conn.prepare(&format!("{ITEM_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return parse_item_row(row);
        }
        Err(RepoError::not_found(EntityKind::Item, id))
    }

    fn update_item(&self, item: &Item, skip_picture: bool) -> RepoResult<()> {
        item.validate()?;
        let id = item.id();

        let tx = begin_immediate(self.conn)?;
        ensure_present(&tx, EntityKind::Item, id)?;
        validate_parent(&tx, EntityKind::Item, id, item.parent)?;

        let stored = picture_for_write(&item.info, self.preview_max_px);
        let (parent_kind, parent_id) = parent_columns(item.parent);
        let affected = tx.execute(
            "UPDATE items
             SET
                label = ?2,
                description = ?3,
                qr_code = ?4,
                quantity = ?5,
                weight = ?6,
                parent_kind = ?7,
                parent_id = ?8,
                picture = CASE WHEN ?9 = 1 THEN picture ELSE ?10 END,
                preview_picture = CASE WHEN ?9 = 1 THEN preview_picture ELSE ?11 END,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                id.to_string(),
                item.info.label.as_str(),
                item.info.description.as_deref(),
                item.info.qr_code.as_deref(),
                item.quantity,
                item.weight.as_str(),
                parent_kind,
                parent_id,
                skip_picture,
                stored.picture,
                stored.preview,
            ],
        )?;
        expect_single_row(affected, "items", id, "update")?;
        projection::refresh_row(&tx, EntityKind::Item, id)?;

        tx.commit()?;
        info!("event=entity_update module=repo status=ok kind=item skip_picture={skip_picture}");
        Ok(())
    }

    fn delete_item(&self, id: EntityId) -> RepoResult<()> {
        delete_entity(self.conn, EntityKind::Item, id)
    }

    fn item_ids(&self) -> RepoResult<Vec<EntityId>> {
        list_ids(self.conn, EntityKind::Item)
    }

    fn move_item(&self, id: EntityId, target: Option<ParentRef>) -> RepoResult<()> {
        move_entity(self.conn, EntityKind::Item, id, target)
    }
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let item = Item {
        info: parse_basic_info(row, "items")?,
        quantity: row.get("quantity")?,
        weight: row.get("weight")?,
        parent: parse_parent(row, "items")?,
    };
    item.validate()?;
    Ok(item)
}
