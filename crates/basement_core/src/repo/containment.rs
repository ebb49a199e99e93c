//! Containment rules and reparenting.
//!
//! # Responsibility
//! - Validate that a parent reference is allowed for a child kind.
//! - Reject moves that would place a box inside itself or its descendants.
//! - Guard container deletion while children remain.
//!
//! # Invariants
//! - Validation and the parent write share one IMMEDIATE transaction.
//! - A failed move leaves both the primary row and its projection untouched.

use crate::model::entity::{EntityId, EntityKind, ParentRef};
use crate::repo::error::{expect_single_row, RepoError, RepoResult};
use crate::repo::shared::{begin_immediate, entity_exists, ensure_present, parent_columns};
use crate::search::projection;
use log::{info, warn};
use rusqlite::{params, Connection};

/// Moves `kind:id` under `target_kind:target_id`.
///
/// A nil `target_id` detaches the entity from its current parent.
pub fn move_to(
    conn: &Connection,
    kind: EntityKind,
    id: EntityId,
    target_kind: EntityKind,
    target_id: EntityId,
) -> RepoResult<()> {
    let target = if target_id.is_nil() {
        None
    } else {
        Some(ParentRef::new(target_kind, target_id))
    };
    move_entity(conn, kind, id, target)
}

/// Reparents one entity, or detaches it when `target` is `None`.
pub fn move_entity(
    conn: &Connection,
    kind: EntityKind,
    id: EntityId,
    target: Option<ParentRef>,
) -> RepoResult<()> {
    let tx = begin_immediate(conn)?;
    ensure_present(&tx, kind, id)?;
    if let Err(err) = validate_parent(&tx, kind, id, target) {
        warn!("event=entity_move module=containment status=error kind={kind} error={err}");
        return Err(err);
    }

    // Areas carry no parent columns; detaching one is a no-op.
    if kind == EntityKind::Area {
        tx.commit()?;
        return Ok(());
    }

    let table = kind.table();
    let (parent_kind, parent_id) = parent_columns(target);
    let affected = tx.execute(
        &format!(
            "UPDATE {table}
             SET parent_kind = ?2,
                 parent_id = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;"
        ),
        params![id.to_string(), parent_kind, parent_id],
    )?;
    expect_single_row(affected, table, id, "move")?;
    projection::refresh_row(&tx, kind, id)?;

    tx.commit()?;
    info!(
        "event=entity_move module=containment status=ok kind={kind} target_kind={}",
        target.map_or("none", |parent| parent.kind.as_str())
    );
    Ok(())
}

/// Checks that `target` may hold `kind:id`.
///
/// Checks run in order: allowed parent kind, target existence, cycles.
pub(crate) fn validate_parent(
    conn: &Connection,
    kind: EntityKind,
    id: EntityId,
    target: Option<ParentRef>,
) -> RepoResult<()> {
    let Some(target) = target else {
        return Ok(());
    };

    if !target.kind.can_contain(kind) {
        return Err(RepoError::invalid_move(
            kind,
            id,
            format!("a {kind} cannot be placed in a {}", target.kind),
        ));
    }

    if !entity_exists(conn, target.kind, target.id)? {
        return Err(RepoError::not_found(target.kind, target.id));
    }

    if target.kind == kind && target.id == id {
        return Err(RepoError::invalid_move(kind, id, "cannot contain itself"));
    }

    if kind == EntityKind::Box && target.kind == EntityKind::Box && box_is_within(conn, target.id, id)? {
        return Err(RepoError::invalid_move(
            kind,
            id,
            format!("target box {} is inside this box", target.id),
        ));
    }

    Ok(())
}

/// Returns whether `candidate` is `ancestor` or sits anywhere below it.
pub(crate) fn box_is_within(
    conn: &Connection,
    candidate: EntityId,
    ancestor: EntityId,
) -> RepoResult<bool> {
    // UNION (not UNION ALL) stops the walk if stored data already loops.
    let found: i64 = conn.query_row(
        "WITH RECURSIVE chain(id) AS (
            SELECT ?1
            UNION
            SELECT boxes.parent_id
            FROM boxes
            INNER JOIN chain ON boxes.id = chain.id
            WHERE boxes.parent_kind = 'box'
        )
        SELECT EXISTS(SELECT 1 FROM chain WHERE id = ?2);",
        params![candidate.to_string(), ancestor.to_string()],
        |row| row.get(0),
    )?;
    Ok(found == 1)
}

/// Fails with `NotEmpty` when any entity is stored directly in `kind:id`.
pub(crate) fn ensure_empty(conn: &Connection, kind: EntityKind, id: EntityId) -> RepoResult<()> {
    for child_kind in kind.allowed_children() {
        let occupied: i64 = conn.query_row(
            &format!(
                "SELECT EXISTS(
                    SELECT 1
                    FROM {}
                    WHERE parent_kind = ?1
                      AND parent_id = ?2
                );",
                child_kind.table()
            ),
            params![kind.as_str(), id.to_string()],
            |row| row.get(0),
        )?;
        if occupied == 1 {
            return Err(RepoError::NotEmpty { kind, id });
        }
    }
    Ok(())
}
