//! Shelf repository contract and SQLite implementation.

use crate::model::entity::{Entity, EntityId, EntityKind, ParentRef};
use crate::model::shelf::Shelf;
use crate::picture::DEFAULT_PREVIEW_MAX_PX;
use crate::repo::containment::{move_entity, validate_parent};
use crate::repo::error::{expect_single_row, RepoError, RepoResult};
use crate::repo::shared::{
    begin_immediate, delete_entity, ensure_absent, ensure_connection_ready, ensure_present,
    entity_exists, list_ids, parent_columns, parse_basic_info, parse_parent, picture_for_write,
    resolve_new_id,
};
use crate::repo::{child_rows, ListSource};
use crate::search::projection;
use log::info;
use rusqlite::{params, Connection, Row};

const SHELF_SELECT_SQL: &str = "SELECT
    id,
    label,
    description,
    picture,
    preview_picture,
    qr_code,
    height,
    width,
    depth,
    grid_rows,
    grid_cols,
    parent_kind,
    parent_id
FROM shelves";

/// Repository interface for shelf operations.
pub trait ShelfRepository: ListSource {
    fn create_shelf(&self, shelf: &Shelf) -> RepoResult<EntityId>;
    fn shelf_exists(&self, id: EntityId) -> RepoResult<bool>;
    /// Loads a shelf with the items and boxes stored directly on it.
    fn get_shelf(&self, id: EntityId) -> RepoResult<Shelf>;
    fn update_shelf(&self, shelf: &Shelf, skip_picture: bool) -> RepoResult<()>;
    fn delete_shelf(&self, id: EntityId) -> RepoResult<()>;
    fn shelf_ids(&self) -> RepoResult<Vec<EntityId>>;
    fn move_shelf(&self, id: EntityId, target: Option<ParentRef>) -> RepoResult<()>;
}

/// SQLite-backed shelf repository.
pub struct SqliteShelfRepository<'conn> {
    conn: &'conn Connection,
    preview_max_px: u32,
}

impl<'conn> SqliteShelfRepository<'conn> {
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

impl ListSource for SqliteShelfRepository<'_> {
    const KIND: EntityKind = EntityKind::Shelf;

    fn connection(&self) -> &Connection {
        self.conn
    }
}

impl ShelfRepository for SqliteShelfRepository<'_> {
    fn create_shelf(&self, shelf: &Shelf) -> RepoResult<EntityId> {
        shelf.validate()?;
        let id = resolve_new_id(shelf.id());

        let tx = begin_immediate(self.conn)?;
        ensure_absent(&tx, EntityKind::Shelf, id)?;
        validate_parent(&tx, EntityKind::Shelf, id, shelf.parent)?;

        let stored = picture_for_write(&shelf.info, self.preview_max_px);
        let (parent_kind, parent_id) = parent_columns(shelf.parent);
        tx.execute(
            "INSERT INTO shelves (
                id,
                label,
                description,
                picture,
                preview_picture,
                qr_code,
                height,
                width,
                depth,
                grid_rows,
                grid_cols,
                parent_kind,
                parent_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13);",
            params![
                id.to_string(),
                shelf.info.label.as_str(),
                shelf.info.description.as_deref(),
                stored.picture,
                stored.preview,
                shelf.info.qr_code.as_deref(),
                shelf.height,
                shelf.width,
                shelf.depth,
                shelf.rows,
                shelf.cols,
                parent_kind,
                parent_id,
            ],
        )?;
        projection::insert_row(&tx, EntityKind::Shelf, id)?;

        tx.commit()?;
        info!("event=entity_create module=repo status=ok kind=shelf");
        Ok(id)
    }

    fn shelf_exists(&self, id: EntityId) -> RepoResult<bool> {
        entity_exists(self.conn, EntityKind::Shelf, id)
    }

    fn get_shelf(&self, id: EntityId) -> RepoResult<Shelf> {
        let mut shelf = load_shelf(self.conn, id)?;

        let this = ParentRef::shelf(id);
        shelf.items = child_rows(self.conn, this, EntityKind::Item)?;
        shelf.boxes = child_rows(self.conn, this, EntityKind::Box)?;
        Ok(shelf)
    }

    fn update_shelf(&self, shelf: &Shelf, skip_picture: bool) -> RepoResult<()> {
        shelf.validate()?;
        let id = shelf.id();

        let tx = begin_immediate(self.conn)?;
        ensure_present(&tx, EntityKind::Shelf, id)?;
        validate_parent(&tx, EntityKind::Shelf, id, shelf.parent)?;

        let stored = picture_for_write(&shelf.info, self.preview_max_px);
        let (parent_kind, parent_id) = parent_columns(shelf.parent);
        let affected = tx.execute(
            "UPDATE shelves
             SET
                label = ?2,
                description = ?3,
                qr_code = ?4,
                height = ?5,
                width = ?6,
                depth = ?7,
                grid_rows = ?8,
                grid_cols = ?9,
                parent_kind = ?10,
                parent_id = ?11,
                picture = CASE WHEN ?12 = 1 THEN picture ELSE ?13 END,
                preview_picture = CASE WHEN ?12 = 1 THEN preview_picture ELSE ?14 END,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                id.to_string(),
                shelf.info.label.as_str(),
                shelf.info.description.as_deref(),
                shelf.info.qr_code.as_deref(),
                shelf.height,
                shelf.width,
                shelf.depth,
                shelf.rows,
                shelf.cols,
                parent_kind,
                parent_id,
                skip_picture,
                stored.picture,
                stored.preview,
            ],
        )?;
        expect_single_row(affected, "shelves", id, "update")?;
        projection::refresh_row(&tx, EntityKind::Shelf, id)?;

        tx.commit()?;
        info!("event=entity_update module=repo status=ok kind=shelf skip_picture={skip_picture}");
        Ok(())
    }

    fn delete_shelf(&self, id: EntityId) -> RepoResult<()> {
        delete_entity(self.conn, EntityKind::Shelf, id)
    }

    fn shelf_ids(&self) -> RepoResult<Vec<EntityId>> {
        list_ids(self.conn, EntityKind::Shelf)
    }

    fn move_shelf(&self, id: EntityId, target: Option<ParentRef>) -> RepoResult<()> {
        move_entity(self.conn, EntityKind::Shelf, id, target)
    }
}

fn load_shelf(conn: &Connection, id: EntityId) -> RepoResult<Shelf> {
    let mut stmt = conn.prepare(&format!("{SHELF_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_shelf_row(row);
    }
    Err(RepoError::not_found(EntityKind::Shelf, id))
}

fn parse_shelf_row(row: &Row<'_>) -> RepoResult<Shelf> {
    let mut shelf = Shelf::from_info(parse_basic_info(row, "shelves")?);
    shelf.height = row.get("height")?;
    shelf.width = row.get("width")?;
    shelf.depth = row.get("depth")?;
    shelf.rows = row.get("grid_rows")?;
    shelf.cols = row.get("grid_cols")?;
    shelf.parent = parse_parent(row, "shelves")?;
    shelf.validate()?;
    Ok(shelf)
}
