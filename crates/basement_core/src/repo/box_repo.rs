//! Box repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over canonical `boxes` storage.
//! - Attach inner items, inner boxes and the parent summary on reads.
//!
//! # Invariants
//! - A box never ends up inside itself, directly or through other boxes.
//! - Label changes reach the `parent_label` of every child projection row.

use crate::model::entity::{Entity, EntityId, EntityKind, ParentRef};
use crate::model::storage_box::StorageBox;
use crate::picture::DEFAULT_PREVIEW_MAX_PX;
use crate::repo::containment::{move_entity, validate_parent};
use crate::repo::error::{expect_single_row, missing_projection_row, RepoError, RepoResult};
use crate::repo::shared::{
    begin_immediate, delete_entity, ensure_absent, ensure_connection_ready, ensure_present,
    entity_exists, list_ids, parent_columns, parse_basic_info, parse_parent, picture_for_write,
    resolve_new_id,
};
use crate::repo::{child_rows, ListSource};
use crate::search::{fts, projection};
use log::info;
use rusqlite::{params, Connection, Row};

const BOX_SELECT_SQL: &str = "SELECT
    id,
    label,
    description,
    picture,
    preview_picture,
    qr_code,
    parent_kind,
    parent_id
FROM boxes";

/// Repository interface for box operations.
pub trait BoxRepository: ListSource {
    fn create_box(&self, storage_box: &StorageBox) -> RepoResult<EntityId>;
    fn box_exists(&self, id: EntityId) -> RepoResult<bool>;
    /// Loads a box with its inner items, inner boxes and parent summary.
    fn get_box(&self, id: EntityId) -> RepoResult<StorageBox>;
    fn update_box(&self, storage_box: &StorageBox, skip_picture: bool) -> RepoResult<()>;
    /// Fails with `NotEmpty` while items or boxes remain inside.
    fn delete_box(&self, id: EntityId) -> RepoResult<()>;
    fn box_ids(&self) -> RepoResult<Vec<EntityId>>;
    fn move_box(&self, id: EntityId, target: Option<ParentRef>) -> RepoResult<()>;
}

/// SQLite-backed box repository.
pub struct SqliteBoxRepository<'conn> {
    conn: &'conn Connection,
    preview_max_px: u32,
}

impl<'conn> SqliteBoxRepository<'conn> {
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

impl ListSource for SqliteBoxRepository<'_> {
    const KIND: EntityKind = EntityKind::Box;

    fn connection(&self) -> &Connection {
        self.conn
    }
}

impl BoxRepository for SqliteBoxRepository<'_> {
    fn create_box(&self, storage_box: &StorageBox) -> RepoResult<EntityId> {
        storage_box.validate()?;
        let id = resolve_new_id(storage_box.id());

        let tx = begin_immediate(self.conn)?;
        ensure_absent(&tx, EntityKind::Box, id)?;
        validate_parent(&tx, EntityKind::Box, id, storage_box.parent)?;

        let stored = picture_for_write(&storage_box.info, self.preview_max_px);
        let (parent_kind, parent_id) = parent_columns(storage_box.parent);
        tx.execute(
            "INSERT INTO boxes (
                id,
                label,
                description,
                picture,
                preview_picture,
                qr_code,
                parent_kind,
                parent_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                id.to_string(),
                storage_box.info.label.as_str(),
                storage_box.info.description.as_deref(),
                stored.picture,
                stored.preview,
                storage_box.info.qr_code.as_deref(),
                parent_kind,
                parent_id,
            ],
        )?;
        projection::insert_row(&tx, EntityKind::Box, id)?;

        tx.commit()?;
        info!("event=entity_create module=repo status=ok kind=box");
        Ok(id)
    }

    fn box_exists(&self, id: EntityId) -> RepoResult<bool> {
        entity_exists(self.conn, EntityKind::Box, id)
    }

    fn get_box(&self, id: EntityId) -> RepoResult<StorageBox> {
        let mut storage_box = load_box(self.conn, id)?;

        let this = ParentRef::storage_box(id);
        storage_box.items = child_rows(self.conn, this, EntityKind::Item)?;
        storage_box.inner_boxes = child_rows(self.conn, this, EntityKind::Box)?;
        storage_box.parent_row = match storage_box.parent {
            Some(parent) => Some(
                fts::list_row(self.conn, parent.kind, parent.id)?.ok_or_else(|| {
                    missing_projection_row(parent.kind, parent.id, "parent summary read")
                })?,
            ),
            None => None,
        };
        Ok(storage_box)
    }

    fn update_box(&self, storage_box: &StorageBox, skip_picture: bool) -> RepoResult<()> {
        storage_box.validate()?;
        let id = storage_box.id();

        let tx = begin_immediate(self.conn)?;
        ensure_present(&tx, EntityKind::Box, id)?;
        validate_parent(&tx, EntityKind::Box, id, storage_box.parent)?;

        let stored = picture_for_write(&storage_box.info, self.preview_max_px);
        let (parent_kind, parent_id) = parent_columns(storage_box.parent);
        let affected = tx.execute(
            "UPDATE boxes
             SET
                label = ?2,
                description = ?3,
                qr_code = ?4,
                parent_kind = ?5,
                parent_id = ?6,
                picture = CASE WHEN ?7 = 1 THEN picture ELSE ?8 END,
                preview_picture = CASE WHEN ?7 = 1 THEN preview_picture ELSE ?9 END,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                id.to_string(),
                storage_box.info.label.as_str(),
                storage_box.info.description.as_deref(),
                storage_box.info.qr_code.as_deref(),
                parent_kind,
                parent_id,
                skip_picture,
                stored.picture,
                stored.preview,
            ],
        )?;
        expect_single_row(affected, "boxes", id, "update")?;
        projection::refresh_row(&tx, EntityKind::Box, id)?;

        tx.commit()?;
        info!("event=entity_update module=repo status=ok kind=box skip_picture={skip_picture}");
        Ok(())
    }

    fn delete_box(&self, id: EntityId) -> RepoResult<()> {
        delete_entity(self.conn, EntityKind::Box, id)
    }

    fn box_ids(&self) -> RepoResult<Vec<EntityId>> {
        list_ids(self.conn, EntityKind::Box)
    }

    fn move_box(&self, id: EntityId, target: Option<ParentRef>) -> RepoResult<()> {
        move_entity(self.conn, EntityKind::Box, id, target)
    }
}

fn load_box(conn: &Connection, id: EntityId) -> RepoResult<StorageBox> {
    let mut stmt = conn.prepare(&format!("{BOX_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_box_row(row);
    }
    Err(RepoError::not_found(EntityKind::Box, id))
}

fn parse_box_row(row: &Row<'_>) -> RepoResult<StorageBox> {
    let mut storage_box = StorageBox::from_info(parse_basic_info(row, "boxes")?);
    storage_box.parent = parse_parent(row, "boxes")?;
    storage_box.validate()?;
    Ok(storage_box)
}
