//! Search projection sync.
//!
//! # Responsibility
//! - Mirror every primary row into one `search_rows` entry.
//! - Keep the denormalized `parent_label` in step with container labels.
//!
//! # Invariants
//! - Callers run these helpers inside the transaction of the primary write.
//! - Projection fields are always re-read from the primary row.
//! - Single-row projection writes that touch != 1 row abort the operation.

use crate::model::entity::{EntityId, EntityKind, ParentRef};
use crate::repo::error::{expect_single_row, RepoError, RepoResult};
use crate::repo::shared::parse_parent;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

const PROJECTION_TABLE: &str = "search_rows";

/// Primary-row fields copied into the projection.
#[derive(Debug)]
struct ProjectionSource {
    label: String,
    description: Option<String>,
    preview_picture: Option<String>,
    parent: Option<ParentRef>,
}

/// Inserts the projection row for a freshly created entity.
pub(crate) fn insert_row(conn: &Connection, kind: EntityKind, id: EntityId) -> RepoResult<()> {
    let source = load_source(conn, kind, id)?;
    let parent_label = parent_label(conn, source.parent)?;
    let affected = conn.execute(
        "INSERT INTO search_rows (
            entity_id,
            kind,
            label,
            description,
            preview_picture,
            parent_kind,
            parent_id,
            parent_label
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
        params![
            id.to_string(),
            kind.as_str(),
            source.label,
            source.description,
            source.preview_picture,
            source.parent.map(|parent| parent.kind.as_str()),
            source.parent.map(|parent| parent.id.to_string()),
            parent_label,
        ],
    )?;
    expect_single_row(affected, PROJECTION_TABLE, id, "projection insert")
}

/// Rewrites the projection row of `kind:id` from its primary row.
///
/// When the entity is a container whose label changed, every projection row
/// naming it as parent gets the new `parent_label`.
pub(crate) fn refresh_row(conn: &Connection, kind: EntityKind, id: EntityId) -> RepoResult<()> {
    let source = load_source(conn, kind, id)?;
    let previous_label: Option<String> = conn
        .query_row(
            "SELECT label FROM search_rows WHERE entity_id = ?1 AND kind = ?2;",
            params![id.to_string(), kind.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    let parent_label = parent_label(conn, source.parent)?;

    let affected = conn.execute(
        "UPDATE search_rows
         SET label = ?3,
             description = ?4,
             preview_picture = ?5,
             parent_kind = ?6,
             parent_id = ?7,
             parent_label = ?8
         WHERE entity_id = ?1
           AND kind = ?2;",
        params![
            id.to_string(),
            kind.as_str(),
            source.label,
            source.description,
            source.preview_picture,
            source.parent.map(|parent| parent.kind.as_str()),
            source.parent.map(|parent| parent.id.to_string()),
            parent_label,
        ],
    )?;
    expect_single_row(affected, PROJECTION_TABLE, id, "projection update")?;

    if kind.is_container() && previous_label.as_deref() != Some(source.label.as_str()) {
        let children = fan_out_parent_label(conn, ParentRef::new(kind, id), &source.label)?;
        debug!("event=projection_fan_out module=search status=ok kind={kind} rows={children}");
    }
    Ok(())
}

/// Removes the projection row of a deleted entity.
pub(crate) fn delete_row(conn: &Connection, kind: EntityKind, id: EntityId) -> RepoResult<()> {
    let affected = conn.execute(
        "DELETE FROM search_rows WHERE entity_id = ?1 AND kind = ?2;",
        params![id.to_string(), kind.as_str()],
    )?;
    expect_single_row(affected, PROJECTION_TABLE, id, "projection delete")
}

/// Returns whether a projection row exists for `kind:id`.
pub fn projection_exists(conn: &Connection, kind: EntityKind, id: EntityId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM search_rows WHERE entity_id = ?1 AND kind = ?2
        );",
        params![id.to_string(), kind.as_str()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn fan_out_parent_label(conn: &Connection, parent: ParentRef, label: &str) -> RepoResult<usize> {
    Ok(conn.execute(
        "UPDATE search_rows
         SET parent_label = ?3
         WHERE parent_kind = ?1
           AND parent_id = ?2;",
        params![parent.kind.as_str(), parent.id.to_string(), label],
    )?)
}

fn parent_label(conn: &Connection, parent: Option<ParentRef>) -> RepoResult<Option<String>> {
    let Some(parent) = parent else {
        return Ok(None);
    };
    let label = conn
        .query_row(
            &format!("SELECT label FROM {} WHERE id = ?1;", parent.kind.table()),
            [parent.id.to_string()],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    label
        .map(Some)
        .ok_or_else(|| RepoError::not_found(parent.kind, parent.id))
}

fn load_source(conn: &Connection, kind: EntityKind, id: EntityId) -> RepoResult<ProjectionSource> {
    let table = kind.table();
    let parent_columns = if kind == EntityKind::Area {
        "NULL AS parent_kind, NULL AS parent_id"
    } else {
        "parent_kind, parent_id"
    };
    let mut stmt = conn.prepare(&format!(
        "SELECT label, description, preview_picture, {parent_columns}
         FROM {table}
         WHERE id = ?1;"
    ))?;
    let mut rows = stmt.query([id.to_string()])?;
    let Some(row) = rows.next()? else {
        return Err(RepoError::not_found(kind, id));
    };
    Ok(ProjectionSource {
        label: row.get("label")?,
        description: row.get("description")?,
        preview_picture: row.get("preview_picture")?,
        parent: parse_parent(row, table)?,
    })
}
