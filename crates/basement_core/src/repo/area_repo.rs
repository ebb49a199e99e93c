//! Area repository contract and SQLite implementation.
//!
//! Areas are the roots of the containment hierarchy and never carry a parent.

use crate::model::area::Area;
use crate::model::entity::{Entity, EntityId, EntityKind, ParentRef};
use crate::picture::DEFAULT_PREVIEW_MAX_PX;
use crate::repo::containment::move_entity;
use crate::repo::error::{expect_single_row, RepoError, RepoResult};
use crate::repo::shared::{
    begin_immediate, delete_entity, ensure_absent, ensure_connection_ready, ensure_present,
    entity_exists, list_ids, parse_basic_info, picture_for_write, resolve_new_id,
};
use crate::repo::{child_rows, ListSource};
use crate::search::projection;
use log::info;
use rusqlite::{params, Connection, Row};

const AREA_SELECT_SQL: &str = "SELECT
    id,
    label,
    description,
    picture,
    preview_picture,
    qr_code
FROM areas";

/// Repository interface for area operations.
pub trait AreaRepository: ListSource {
    fn create_area(&self, area: &Area) -> RepoResult<EntityId>;
    fn area_exists(&self, id: EntityId) -> RepoResult<bool>;
    /// Loads an area with the shelves, boxes and items stored directly in it.
    fn get_area(&self, id: EntityId) -> RepoResult<Area>;
    fn update_area(&self, area: &Area, skip_picture: bool) -> RepoResult<()>;
    fn delete_area(&self, id: EntityId) -> RepoResult<()>;
    fn area_ids(&self) -> RepoResult<Vec<EntityId>>;
    /// Only detaching (`None`) is accepted; areas have no parent kind.
    fn move_area(&self, id: EntityId, target: Option<ParentRef>) -> RepoResult<()>;
}

/// SQLite-backed area repository.
pub struct SqliteAreaRepository<'conn> {
    conn: &'conn Connection,
    preview_max_px: u32,
}

impl<'conn> SqliteAreaRepository<'conn> {
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

impl ListSource for SqliteAreaRepository<'_> {
    const KIND: EntityKind = EntityKind::Area;

    fn connection(&self) -> &Connection {
        self.conn
    }
}

impl AreaRepository for SqliteAreaRepository<'_> {
    fn create_area(&self, area: &Area) -> RepoResult<EntityId> {
        area.validate()?;
        let id = resolve_new_id(area.id());

        let tx = begin_immediate(self.conn)?;
        ensure_absent(&tx, EntityKind::Area, id)?;

        let stored = picture_for_write(&area.info, self.preview_max_px);
        tx.execute(
            "INSERT INTO areas (
                id,
                label,
                description,
                picture,
                preview_picture,
                qr_code
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                id.to_string(),
                area.info.label.as_str(),
                area.info.description.as_deref(),
                stored.picture,
                stored.preview,
                area.info.qr_code.as_deref(),
            ],
        )?;
        projection::insert_row(&tx, EntityKind::Area, id)?;

        tx.commit()?;
        info!("event=entity_create module=repo status=ok kind=area");
        Ok(id)
    }

    fn area_exists(&self, id: EntityId) -> RepoResult<bool> {
        entity_exists(self.conn, EntityKind::Area, id)
    }

    fn get_area(&self, id: EntityId) -> RepoResult<Area> {
        let mut area = load_area(self.conn, id)?;

        let this = ParentRef::area(id);
        area.shelves = child_rows(self.conn, this, EntityKind::Shelf)?;
        area.boxes = child_rows(self.conn, this, EntityKind::Box)?;
        area.items = child_rows(self.conn, this, EntityKind::Item)?;
        Ok(area)
    }

    fn update_area(&self, area: &Area, skip_picture: bool) -> RepoResult<()> {
        area.validate()?;
        let id = area.id();

        let tx = begin_immediate(self.conn)?;
        ensure_present(&tx, EntityKind::Area, id)?;

        let stored = picture_for_write(&area.info, self.preview_max_px);
        let affected = tx.execute(
            "UPDATE areas
             SET
                label = ?2,
                description = ?3,
                qr_code = ?4,
                picture = CASE WHEN ?5 = 1 THEN picture ELSE ?6 END,
                preview_picture = CASE WHEN ?5 = 1 THEN preview_picture ELSE ?7 END,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                id.to_string(),
                area.info.label.as_str(),
                area.info.description.as_deref(),
                area.info.qr_code.as_deref(),
                skip_picture,
                stored.picture,
                stored.preview,
            ],
        )?;
        expect_single_row(affected, "areas", id, "update")?;
        projection::refresh_row(&tx, EntityKind::Area, id)?;

        tx.commit()?;
        info!("event=entity_update module=repo status=ok kind=area skip_picture={skip_picture}");
        Ok(())
    }

    fn delete_area(&self, id: EntityId) -> RepoResult<()> {
        delete_entity(self.conn, EntityKind::Area, id)
    }

    fn area_ids(&self) -> RepoResult<Vec<EntityId>> {
        list_ids(self.conn, EntityKind::Area)
    }

    fn move_area(&self, id: EntityId, target: Option<ParentRef>) -> RepoResult<()> {
        move_entity(self.conn, EntityKind::Area, id, target)
    }
}

fn load_area(conn: &Connection, id: EntityId) -> RepoResult<Area> {
    let mut stmt = conn.prepare(&format!("{AREA_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_area_row(row);
    }
    Err(RepoError::not_found(EntityKind::Area, id))
}

fn parse_area_row(row: &Row<'_>) -> RepoResult<Area> {
    let area = Area::from_info(parse_basic_info(row, "areas")?);
    area.validate()?;
    Ok(area)
}
