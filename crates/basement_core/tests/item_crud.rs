use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use basement_core::db::open_db_in_memory;
use basement_core::{
    BoxRepository, EntityKind, EntityValidationError, Item, ItemRepository, ParentRef, RepoError,
    SqliteBoxRepository, SqliteItemRepository, StorageBox,
};
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use uuid::Uuid;

fn png_base64(width: u32, height: u32) -> String {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, [10, 120, 200].into()));
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png).unwrap();
    STANDARD.encode(buffer.into_inner())
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let mut item = Item::new("Cordless drill");
    item.info.description = Some("18V, two batteries".to_string());
    item.info.qr_code = Some("DRILL01".to_string());
    item.quantity = 2;
    item.weight = "1.8".to_string();

    let id = repo.create_item(&item).unwrap();
    assert_eq!(id, item.info.id);
    assert!(repo.item_exists(id).unwrap());

    let loaded = repo.get_item(id).unwrap();
    assert_eq!(loaded, item);
}

#[test]
fn caller_values_are_stored_verbatim() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let mut item = Item::new("Paint roller");
    item.weight = " 2.5 ".to_string();
    item.info.picture = Some(format!(" {}\n", png_base64(20, 10)));
    repo.create_item(&item).unwrap();

    let stored = repo.get_item(item.info.id).unwrap();
    assert_eq!(stored.weight, " 2.5 ");
    assert_eq!(stored.info.picture, item.info.picture);
    assert!(stored.info.preview_picture.is_some());

    item.weight = "3 ".to_string();
    repo.update_item(&item, false).unwrap();
    let updated = repo.get_item(item.info.id).unwrap();
    assert_eq!(updated.weight, "3 ");
    assert_eq!(updated.info.picture, item.info.picture);
    assert_eq!(
        Item {
            info: basement_core::BasicInfo {
                preview_picture: None,
                ..updated.info.clone()
            },
            ..updated
        },
        item
    );
}

#[test]
fn nil_id_is_replaced_on_create() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let item = Item::with_id(Uuid::nil(), "Tape measure");
    let id = repo.create_item(&item).unwrap();

    assert!(!id.is_nil());
    assert_eq!(repo.get_item(id).unwrap().info.label, "Tape measure");
    assert_eq!(repo.item_ids().unwrap(), vec![id]);
}

#[test]
fn create_with_existing_id_fails() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    let item = Item::new("Hammer");
    repo.create_item(&item).unwrap();

    let err = repo.create_item(&item).unwrap_err();
    assert!(matches!(
        err,
        RepoError::AlreadyExists { kind: EntityKind::Item, id } if id == item.info.id
    ));
}

#[test]
fn create_rejects_invalid_fields_before_writing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let mut item = Item::new("Screws");
    item.quantity = -4;
    let err = repo.create_item(&item).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(EntityValidationError::NegativeQuantity(-4))
    ));

    let blank = Item::new("  ");
    assert!(matches!(
        repo.create_item(&blank).unwrap_err(),
        RepoError::Validation(EntityValidationError::EmptyLabel)
    ));
    assert!(repo.item_ids().unwrap().is_empty());
}

#[test]
fn create_inside_missing_parent_fails() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    let missing = Uuid::new_v4();

    let item = Item::new("Orphan").inside(ParentRef::storage_box(missing));
    let err = repo.create_item(&item).unwrap_err();

    assert!(matches!(
        err,
        RepoError::NotFound { kind: EntityKind::Box, id } if id == missing
    ));
    assert!(!repo.item_exists(item.info.id).unwrap());
}

#[test]
fn update_of_missing_item_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    let item = Item::new("Ghost");

    let err = repo.update_item(&item, false).unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
}

#[test]
fn update_replaces_fields_and_parent() {
    let conn = open_db_in_memory().unwrap();
    let items = SqliteItemRepository::try_new(&conn).unwrap();
    let boxes = SqliteBoxRepository::try_new(&conn).unwrap();
    let storage_box = StorageBox::new("Toolbox");
    boxes.create_box(&storage_box).unwrap();

    let mut item = Item::new("Wrench");
    items.create_item(&item).unwrap();

    item.info.label = "Adjustable wrench".to_string();
    item.quantity = 3;
    item.parent = Some(ParentRef::storage_box(storage_box.info.id));
    items.update_item(&item, true).unwrap();

    let loaded = items.get_item(item.info.id).unwrap();
    assert_eq!(loaded.info.label, "Adjustable wrench");
    assert_eq!(loaded.quantity, 3);
    assert_eq!(loaded.parent, Some(ParentRef::storage_box(storage_box.info.id)));
}

#[test]
fn picture_gets_preview_and_skip_picture_keeps_it() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let mut item = Item::new("Lamp");
    item.info.picture = Some(png_base64(200, 100));
    repo.create_item(&item).unwrap();

    let stored = repo.get_item(item.info.id).unwrap();
    assert_eq!(stored.info.picture, item.info.picture);
    let preview = stored.info.preview_picture.clone().unwrap();
    let decoded = image::load_from_memory(&STANDARD.decode(preview).unwrap()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (50, 25));

    item.info.picture = None;
    item.info.label = "Desk lamp".to_string();
    repo.update_item(&item, true).unwrap();
    let kept = repo.get_item(item.info.id).unwrap();
    assert_eq!(kept.info.picture, stored.info.picture);
    assert_eq!(kept.info.preview_picture, stored.info.preview_picture);

    repo.update_item(&item, false).unwrap();
    let cleared = repo.get_item(item.info.id).unwrap();
    assert_eq!(cleared.info.picture, None);
    assert_eq!(cleared.info.preview_picture, None);
}

#[test]
fn malformed_picture_is_stored_empty() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let mut item = Item::new("Broken photo");
    item.info.picture = Some("not-an-image".to_string());
    repo.create_item(&item).unwrap();

    let stored = repo.get_item(item.info.id).unwrap();
    assert_eq!(stored.info.picture, None);
    assert_eq!(stored.info.preview_picture, None);
}

#[test]
fn custom_preview_size_is_applied() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn)
        .unwrap()
        .with_preview_max_px(10);

    let mut item = Item::new("Poster");
    item.info.picture = Some(png_base64(40, 80));
    repo.create_item(&item).unwrap();

    let preview = repo.get_item(item.info.id).unwrap().info.preview_picture.unwrap();
    let decoded = image::load_from_memory(&STANDARD.decode(preview).unwrap()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (5, 10));
}

#[test]
fn delete_removes_item() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    let item = Item::new("Old paint");
    repo.create_item(&item).unwrap();

    repo.delete_item(item.info.id).unwrap();
    assert!(!repo.item_exists(item.info.id).unwrap());
    assert!(repo.get_item(item.info.id).unwrap_err().is_not_found());
    assert!(repo.delete_item(item.info.id).unwrap_err().is_not_found());
}
