use basement_core::db::open_db_in_memory;
use basement_core::{
    Area, AreaRepository, BoxRepository, EntityKind, Item, ItemRepository, ParentRef, RepoError,
    Shelf, ShelfRepository, SqliteAreaRepository, SqliteBoxRepository, SqliteItemRepository,
    SqliteShelfRepository, StorageBox,
};

#[test]
fn shelf_dimensions_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let shelves = SqliteShelfRepository::try_new(&conn).unwrap();

    let mut shelf = Shelf::new("Garage rack");
    shelf.height = 180.5;
    shelf.width = 90.0;
    shelf.depth = 40.25;
    shelf.rows = 5;
    shelf.cols = 2;
    shelf.info.description = Some("Left wall".to_string());
    let id = shelves.create_shelf(&shelf).unwrap();

    let loaded = shelves.get_shelf(id).unwrap();
    assert_eq!(loaded, shelf);

    shelf.rows = 6;
    shelf.depth = 45.0;
    shelves.update_shelf(&shelf, false).unwrap();
    let updated = shelves.get_shelf(id).unwrap();
    assert_eq!(updated.rows, 6);
    assert_eq!(updated.depth, 45.0);
}

#[test]
fn shelf_parent_must_be_an_area() {
    let conn = open_db_in_memory().unwrap();
    let shelves = SqliteShelfRepository::try_new(&conn).unwrap();
    let boxes = SqliteBoxRepository::try_new(&conn).unwrap();

    let storage_box = StorageBox::new("Crate");
    boxes.create_box(&storage_box).unwrap();

    let mut shelf = Shelf::new("Floating shelf");
    shelf.parent = Some(ParentRef::storage_box(storage_box.info.id));
    let err = shelves.create_shelf(&shelf).unwrap_err();
    assert!(matches!(
        err,
        RepoError::InvalidMove { kind: EntityKind::Shelf, .. }
    ));
    assert!(!shelves.shelf_exists(shelf.info.id).unwrap());
}

#[test]
fn get_shelf_lists_items_and_boxes() {
    let conn = open_db_in_memory().unwrap();
    let shelves = SqliteShelfRepository::try_new(&conn).unwrap();
    let boxes = SqliteBoxRepository::try_new(&conn).unwrap();
    let items = SqliteItemRepository::try_new(&conn).unwrap();

    let shelf = Shelf::new("Pantry");
    shelves.create_shelf(&shelf).unwrap();
    let on_shelf = ParentRef::shelf(shelf.info.id);
    boxes
        .create_box(&StorageBox::new("Spices").inside(on_shelf))
        .unwrap();
    items.create_item(&Item::new("Rice").inside(on_shelf)).unwrap();
    items.create_item(&Item::new("Flour").inside(on_shelf)).unwrap();

    let loaded = shelves.get_shelf(shelf.info.id).unwrap();
    let item_labels: Vec<&str> = loaded.items.iter().map(|row| row.label.as_str()).collect();
    assert_eq!(item_labels, vec!["Flour", "Rice"]);
    assert_eq!(loaded.boxes.len(), 1);
    assert_eq!(loaded.boxes[0].label, "Spices");
}

#[test]
fn get_area_lists_direct_children_only() {
    let conn = open_db_in_memory().unwrap();
    let areas = SqliteAreaRepository::try_new(&conn).unwrap();
    let shelves = SqliteShelfRepository::try_new(&conn).unwrap();
    let boxes = SqliteBoxRepository::try_new(&conn).unwrap();
    let items = SqliteItemRepository::try_new(&conn).unwrap();

    let area = Area::new("Basement");
    areas.create_area(&area).unwrap();
    let in_area = ParentRef::area(area.info.id);

    let shelf = Shelf::new("Rack").in_area(area.info.id);
    shelves.create_shelf(&shelf).unwrap();
    let storage_box = StorageBox::new("Tools").inside(in_area);
    boxes.create_box(&storage_box).unwrap();
    items.create_item(&Item::new("Bike").inside(in_area)).unwrap();
    items
        .create_item(&Item::new("Pliers").inside(ParentRef::storage_box(storage_box.info.id)))
        .unwrap();

    let loaded = areas.get_area(area.info.id).unwrap();
    assert!(!loaded.is_empty());
    assert_eq!(loaded.shelves.len(), 1);
    assert_eq!(loaded.shelves[0].id, shelf.info.id);
    assert_eq!(loaded.boxes.len(), 1);
    assert_eq!(loaded.items.len(), 1);
    assert_eq!(loaded.items[0].label, "Bike");
    assert_eq!(loaded.items[0].parent_label(), Some("Basement"));
}

#[test]
fn delete_area_requires_it_to_be_empty() {
    let conn = open_db_in_memory().unwrap();
    let areas = SqliteAreaRepository::try_new(&conn).unwrap();
    let shelves = SqliteShelfRepository::try_new(&conn).unwrap();

    let area = Area::new("Attic");
    areas.create_area(&area).unwrap();
    let shelf = Shelf::new("Bookcase").in_area(area.info.id);
    shelves.create_shelf(&shelf).unwrap();

    assert!(matches!(
        areas.delete_area(area.info.id).unwrap_err(),
        RepoError::NotEmpty { kind: EntityKind::Area, .. }
    ));

    shelves.delete_shelf(shelf.info.id).unwrap();
    areas.delete_area(area.info.id).unwrap();
    assert!(areas.area_ids().unwrap().is_empty());
}

#[test]
fn area_update_keeps_picture_when_skipped() {
    let conn = open_db_in_memory().unwrap();
    let areas = SqliteAreaRepository::try_new(&conn).unwrap();

    let mut area = Area::new("Shed");
    area.info.qr_code = Some("SHED1".to_string());
    areas.create_area(&area).unwrap();

    area.info.label = "Garden shed".to_string();
    area.info.qr_code = None;
    areas.update_area(&area, true).unwrap();

    let loaded = areas.get_area(area.info.id).unwrap();
    assert_eq!(loaded.info.label, "Garden shed");
    assert_eq!(loaded.info.qr_code, None);
    assert!(loaded.is_empty());
}

#[test]
fn area_update_of_missing_row_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let areas = SqliteAreaRepository::try_new(&conn).unwrap();

    assert!(areas
        .update_area(&Area::new("Nowhere"), false)
        .unwrap_err()
        .is_not_found());
    assert!(areas.delete_area(uuid::Uuid::new_v4()).unwrap_err().is_not_found());
}
