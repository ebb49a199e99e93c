use basement_core::db::open_db_in_memory;
use basement_core::{
    BoxRepository, EntityKind, Item, ItemRepository, ListSource, ParentRef, RepoError, Shelf,
    ShelfRepository, SqliteBoxRepository, SqliteItemRepository, SqliteShelfRepository,
    StorageBox,
};
use rusqlite::Connection;

#[test]
fn get_box_attaches_children_and_parent_summary() {
    let conn = open_db_in_memory().unwrap();
    let boxes = SqliteBoxRepository::try_new(&conn).unwrap();
    let items = SqliteItemRepository::try_new(&conn).unwrap();

    let shelf = Shelf::new("Metal rack");
    SqliteShelfRepository::try_new(&conn)
        .unwrap()
        .create_shelf(&shelf)
        .unwrap();

    let outer = StorageBox::new("Camping gear").inside(ParentRef::shelf(shelf.info.id));
    boxes.create_box(&outer).unwrap();
    let inner = StorageBox::new("Cutlery").inside(ParentRef::storage_box(outer.info.id));
    boxes.create_box(&inner).unwrap();
    for label in ["Tent", "Lantern"] {
        let item = Item::new(label).inside(ParentRef::storage_box(outer.info.id));
        items.create_item(&item).unwrap();
    }

    let loaded = boxes.get_box(outer.info.id).unwrap();
    assert_eq!(loaded.info.label, "Camping gear");
    assert_eq!(loaded.parent, Some(ParentRef::shelf(shelf.info.id)));

    let item_labels: Vec<&str> = loaded.items.iter().map(|row| row.label.as_str()).collect();
    assert_eq!(item_labels, vec!["Lantern", "Tent"]);
    assert!(loaded
        .items
        .iter()
        .all(|row| row.parent_label() == Some("Camping gear")));

    assert_eq!(loaded.inner_boxes.len(), 1);
    assert_eq!(loaded.inner_boxes[0].id, inner.info.id);
    assert_eq!(loaded.inner_boxes[0].kind, EntityKind::Box);

    let parent_row = loaded.parent_row.unwrap();
    assert_eq!(parent_row.id, shelf.info.id);
    assert_eq!(parent_row.kind, EntityKind::Shelf);
    assert_eq!(parent_row.label, "Metal rack");
}

#[test]
fn get_missing_box_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let boxes = SqliteBoxRepository::try_new(&conn).unwrap();
    let id = uuid::Uuid::new_v4();

    match boxes.get_box(id) {
        Err(RepoError::NotFound { kind, id: missing }) => {
            assert_eq!(kind, EntityKind::Box);
            assert_eq!(missing, id);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn update_box_rejects_unknown_id() {
    let conn = open_db_in_memory().unwrap();
    let boxes = SqliteBoxRepository::try_new(&conn).unwrap();

    let err = boxes
        .update_box(&StorageBox::new("Nowhere"), false)
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn delete_box_is_blocked_while_items_remain() {
    let conn = open_db_in_memory().unwrap();
    let boxes = SqliteBoxRepository::try_new(&conn).unwrap();
    let items = SqliteItemRepository::try_new(&conn).unwrap();

    let storage_box = StorageBox::new("Cables");
    boxes.create_box(&storage_box).unwrap();
    let item = Item::new("HDMI").inside(ParentRef::storage_box(storage_box.info.id));
    items.create_item(&item).unwrap();

    let err = boxes.delete_box(storage_box.info.id).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotEmpty { kind: EntityKind::Box, id } if id == storage_box.info.id
    ));
    assert!(boxes.box_exists(storage_box.info.id).unwrap());
    assert_eq!(projection_count(&conn), 2);

    items.delete_item(item.info.id).unwrap();
    boxes.delete_box(storage_box.info.id).unwrap();
    assert!(!boxes.box_exists(storage_box.info.id).unwrap());
    assert_eq!(projection_count(&conn), 0);
}

#[test]
fn delete_box_is_blocked_while_inner_box_remains() {
    let conn = open_db_in_memory().unwrap();
    let boxes = SqliteBoxRepository::try_new(&conn).unwrap();

    let outer = StorageBox::new("Outer");
    boxes.create_box(&outer).unwrap();
    let inner = StorageBox::new("Inner").inside(ParentRef::storage_box(outer.info.id));
    boxes.create_box(&inner).unwrap();

    assert!(matches!(
        boxes.delete_box(outer.info.id).unwrap_err(),
        RepoError::NotEmpty { .. }
    ));

    boxes.move_box(inner.info.id, None).unwrap();
    boxes.delete_box(outer.info.id).unwrap();
    assert_eq!(boxes.box_ids().unwrap(), vec![inner.info.id]);
}

#[test]
fn box_label_update_reaches_children() {
    let conn = open_db_in_memory().unwrap();
    let boxes = SqliteBoxRepository::try_new(&conn).unwrap();
    let items = SqliteItemRepository::try_new(&conn).unwrap();

    let mut storage_box = StorageBox::new("Winter");
    boxes.create_box(&storage_box).unwrap();
    let item = Item::new("Scarf").inside(ParentRef::storage_box(storage_box.info.id));
    items.create_item(&item).unwrap();

    storage_box.info.label = "Winter clothes".to_string();
    boxes.update_box(&storage_box, true).unwrap();

    let row = items.list_row(item.info.id).unwrap();
    assert_eq!(row.parent_label(), Some("Winter clothes"));
    assert_eq!(row.parent_id(), Some(storage_box.info.id));
}

#[test]
fn get_box_fails_when_parent_projection_is_missing() {
    let conn = open_db_in_memory().unwrap();
    let boxes = SqliteBoxRepository::try_new(&conn).unwrap();

    let outer = StorageBox::new("Attic trunk");
    boxes.create_box(&outer).unwrap();
    let inner = StorageBox::new("Letters").inside(ParentRef::storage_box(outer.info.id));
    boxes.create_box(&inner).unwrap();
    conn.execute(
        "DELETE FROM search_rows WHERE entity_id = ?1;",
        [outer.info.id.to_string()],
    )
    .unwrap();

    match boxes.get_box(inner.info.id) {
        Err(RepoError::UnexpectedRowCount {
            table, id, affected, ..
        }) => {
            assert_eq!(table, "search_rows");
            assert_eq!(id, outer.info.id);
            assert_eq!(affected, 0);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

fn projection_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM search_rows;", [], |row| row.get(0))
        .unwrap()
}
