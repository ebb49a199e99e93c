//! Helpers shared by the per-kind SQLite repositories.

use crate::db::migrations::latest_version;
use crate::db::{DbError, BUSY_TIMEOUT};
use crate::model::entity::{BasicInfo, EntityId, EntityKind, ParentRef};
use crate::picture::{prepare_picture, StoredPicture};
use crate::repo::containment::ensure_empty;
use crate::repo::error::{expect_single_row, RepoError, RepoResult};
use crate::search::projection;
use log::{info, warn};
use rusqlite::{Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

/// Opens the write transaction used by every mutation.
///
/// IMMEDIATE takes the write lock up front so validation reads and the
/// following writes see the same snapshot.
pub(crate) fn begin_immediate(conn: &Connection) -> RepoResult<Transaction<'_>> {
    Transaction::new_unchecked(conn, TransactionBehavior::Immediate).map_err(|err| {
        let err = DbError::from(err);
        if err.is_busy() {
            warn!(
                "event=tx_begin module=repo status=error reason=busy waited_ms={}",
                BUSY_TIMEOUT.as_millis()
            );
        }
        RepoError::Db(err)
    })
}

pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["areas", "shelves", "boxes", "items", "search_rows"] {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

/// Replaces a nil id with a freshly generated one.
pub(crate) fn resolve_new_id(id: EntityId) -> EntityId {
    if id.is_nil() {
        Uuid::new_v4()
    } else {
        id
    }
}

pub(crate) fn entity_exists(conn: &Connection, kind: EntityKind, id: EntityId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1);", kind.table()),
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn list_ids(conn: &Connection, kind: EntityKind) -> RepoResult<Vec<EntityId>> {
    let table = kind.table();
    let mut stmt = conn.prepare(&format!("SELECT id FROM {table} ORDER BY id ASC;"))?;
    let mut rows = stmt.query([])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        ids.push(parse_uuid(&value, &format!("{table}.id"))?);
    }
    Ok(ids)
}

/// Splits a parent reference into its `(parent_kind, parent_id)` columns.
pub(crate) fn parent_columns(parent: Option<ParentRef>) -> (Option<&'static str>, Option<String>) {
    match parent {
        Some(parent) => (Some(parent.kind.as_str()), Some(parent.id.to_string())),
        None => (None, None),
    }
}

pub(crate) fn parse_parent(row: &Row<'_>, table: &str) -> RepoResult<Option<ParentRef>> {
    let kind_text: Option<String> = row.get("parent_kind")?;
    let id_text: Option<String> = row.get("parent_id")?;
    match (kind_text, id_text) {
        (None, None) => Ok(None),
        (Some(kind_text), Some(id_text)) => {
            let kind = EntityKind::parse(&kind_text).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid parent kind `{kind_text}` in {table}.parent_kind"
                ))
            })?;
            let id = parse_uuid(&id_text, &format!("{table}.parent_id"))?;
            Ok(Some(ParentRef::new(kind, id)))
        }
        _ => Err(RepoError::InvalidData(format!(
            "half-set parent reference in {table}"
        ))),
    }
}

pub(crate) fn parse_basic_info(row: &Row<'_>, table: &str) -> RepoResult<BasicInfo> {
    let id_text: String = row.get("id")?;
    Ok(BasicInfo {
        id: parse_uuid(&id_text, &format!("{table}.id"))?,
        label: row.get("label")?,
        description: row.get("description")?,
        picture: row.get("picture")?,
        preview_picture: row.get("preview_picture")?,
        qr_code: row.get("qr_code")?,
    })
}

/// Derives the picture/preview pair to persist for `info`.
pub(crate) fn picture_for_write(info: &BasicInfo, preview_max_px: u32) -> StoredPicture {
    prepare_picture(info.picture.as_deref(), preview_max_px)
}

/// Rejects a create whose id is already used by a row of the same kind.
pub(crate) fn ensure_absent(conn: &Connection, kind: EntityKind, id: EntityId) -> RepoResult<()> {
    if entity_exists(conn, kind, id)? {
        return Err(RepoError::AlreadyExists { kind, id });
    }
    Ok(())
}

pub(crate) fn ensure_present(conn: &Connection, kind: EntityKind, id: EntityId) -> RepoResult<()> {
    if !entity_exists(conn, kind, id)? {
        return Err(RepoError::not_found(kind, id));
    }
    Ok(())
}

/// Deletes an empty entity together with its projection row.
pub(crate) fn delete_entity(conn: &Connection, kind: EntityKind, id: EntityId) -> RepoResult<()> {
    let tx = begin_immediate(conn)?;
    ensure_present(&tx, kind, id)?;
    ensure_empty(&tx, kind, id)?;

    let table = kind.table();
    let affected = tx.execute(
        &format!("DELETE FROM {table} WHERE id = ?1;"),
        [id.to_string()],
    )?;
    expect_single_row(affected, table, id, "delete")?;
    projection::delete_row(&tx, kind, id)?;

    tx.commit()?;
    info!("event=entity_delete module=repo status=ok kind={kind}");
    Ok(())
}
