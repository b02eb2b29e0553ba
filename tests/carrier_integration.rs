//! Integration tests for the carrier store

use carrierclip::clipboard::{CarrierStore, ImageData, CARRIER_NAME, KNOWN_IMAGE};
use carrierclip::library::{AssetLibrary, MemoryLibrary, SqliteLibrary};
use carrierclip::{ClipboardError, StoreFault};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tempfile::TempDir;

fn memory_store() -> CarrierStore<MemoryLibrary> {
    CarrierStore::new(MemoryLibrary::new())
}

fn sqlite_store() -> (CarrierStore<SqliteLibrary>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let library = SqliteLibrary::open(&temp_dir.path().join("pictures.db")).unwrap();
    (CarrierStore::new(library), temp_dir)
}

#[test]
fn test_set_text_on_empty_store() {
    let store = memory_store();
    assert!(!store.contains_text().unwrap());

    store.set_text("hello").unwrap();

    assert_eq!(store.get_text().unwrap(), "hello");
    assert!(store.contains_text().unwrap());
    assert!(!store.contains_image().unwrap());
}

#[test]
fn test_set_image_round_trip() {
    let store = memory_store();
    let image = ImageData::new(2, 1, vec![0, 0, 0, 255, 255, 255, 255, 255]).unwrap();

    store.set_image(&image).unwrap();

    let stored = store.get_image().unwrap().unwrap();
    assert_eq!(stored.width, 2);
    assert_eq!(stored.height, 1);
    assert_eq!(stored.bytes, vec![0, 0, 0, 255, 255, 255, 255, 255]);
    assert!(store.contains_image().unwrap());
    assert!(!store.contains_text().unwrap());
    assert_eq!(store.get_text().unwrap(), "");
}

#[test]
fn test_clear_on_empty_store() {
    let store = memory_store();
    store.clear().unwrap();

    assert!(!store.contains_text().unwrap());
    assert!(!store.contains_image().unwrap());
    assert_eq!(store.get_text().unwrap(), "");
    assert_eq!(store.get_image().unwrap(), None);
}

#[test]
fn test_clear_after_text_and_image() {
    let store = memory_store();
    store.set_text("gone soon").unwrap();
    store
        .set_image(&ImageData::new(1, 1, vec![1, 2, 3, 4]).unwrap())
        .unwrap();
    store.clear().unwrap();

    assert!(!store.contains_text().unwrap());
    assert!(!store.contains_image().unwrap());
    assert_eq!(store.get_image().unwrap(), None);
}

#[test]
fn test_empty_library_is_not_an_error() {
    let store = memory_store();
    assert!(!store.contains_text().unwrap());
    assert!(!store.contains_image().unwrap());
    assert_eq!(store.get_text().unwrap(), "");
    assert_eq!(store.get_image().unwrap(), None);
    assert!(store.content().unwrap().is_empty());
}

#[test]
fn test_foreign_asset_is_ignored() {
    let library = MemoryLibrary::new();

    // Another application saved an unrelated, small picture under the same name
    library.save(CARRIER_NAME, &KNOWN_IMAGE[..100]).unwrap();
    let store = CarrierStore::new(library);

    assert!(!store.contains_text().unwrap());
    assert!(!store.contains_image().unwrap());
    assert_eq!(store.get_text().unwrap(), "");
    assert_eq!(store.get_image().unwrap(), None);
}

#[test]
fn test_foreign_asset_hides_older_carrier() {
    let store = memory_store();
    store.set_text("before").unwrap();
    store.library().save(CARRIER_NAME, b"not ours").unwrap();

    assert!(!store.contains_text().unwrap());
    assert_eq!(store.get_text().unwrap(), "");
}

#[test]
fn test_every_write_adds_an_asset() {
    let store = memory_store();
    store.set_text("one").unwrap();
    store.set_text("two").unwrap();
    store.clear().unwrap();

    let assets = store.carrier_assets().unwrap();
    assert_eq!(assets.len(), 3);
    assert_eq!(assets[0].size, KNOWN_IMAGE.len() + 1 + 3);
    assert_eq!(assets[2].size, KNOWN_IMAGE.len() + 1);
    assert_eq!(store.library().write_count(), 3);
}

#[test]
fn test_disposed_library_is_unavailable() {
    let store = memory_store();
    store.library().dispose();

    let err = store.set_text("x").unwrap_err();
    assert_eq!(err.to_string(), "Unable to set clipboard text");
    assert!(matches!(
        err,
        ClipboardError::StoreUnavailable {
            source: StoreFault::Library(_),
            ..
        }
    ));

    let err = store.contains_text().unwrap_err();
    assert_eq!(err.to_string(), "Unable to check if clipboard contains text");
}

#[test]
fn test_invalid_image_is_rejected_before_writing() {
    let store = memory_store();
    let image = ImageData {
        width: 4,
        height: 4,
        bytes: vec![0; 10],
    };

    let err = store.set_image(&image).unwrap_err();
    assert!(matches!(
        err,
        ClipboardError::InvalidArgument { name: "image", .. }
    ));
    assert!(store.library().is_empty());
}

#[test]
fn test_sqlite_library_shared_between_stores() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("pictures.db");

    let writer = CarrierStore::new(SqliteLibrary::open(&path).unwrap());
    writer.set_text("from another app").unwrap();
    drop(writer);

    let reader = CarrierStore::new(SqliteLibrary::open(&path).unwrap());
    assert_eq!(reader.get_text().unwrap(), "from another app");
}

#[test]
fn test_sqlite_image_round_trip() {
    let (store, _temp_dir) = sqlite_store();
    let pixels: Vec<u8> = (0..=255).cycle().take(16 * 9 * 4).collect();
    let image = ImageData::new(16, 9, pixels).unwrap();

    store.set_image(&image).unwrap();
    assert_eq!(store.get_image().unwrap(), Some(image));
    assert_eq!(store.carrier_assets().unwrap().len(), 1);
}

proptest! {
    #[test]
    fn prop_text_round_trip(text in ".*") {
        let store = memory_store();
        store.set_text(&text).unwrap();

        prop_assert_eq!(store.get_text().unwrap(), text);
        prop_assert!(store.contains_text().unwrap());
        prop_assert!(!store.contains_image().unwrap());
    }

    #[test]
    fn prop_image_round_trip(
        (width, height, bytes) in (0usize..6, 0usize..6).prop_flat_map(|(w, h)| {
            (Just(w), Just(h), proptest::collection::vec(any::<u8>(), w * h * 4))
        })
    ) {
        let store = memory_store();
        let image = ImageData::new(width, height, bytes).unwrap();
        store.set_image(&image).unwrap();

        prop_assert_eq!(store.get_image().unwrap(), Some(image));
        prop_assert!(store.contains_image().unwrap());
        prop_assert!(!store.contains_text().unwrap());
    }
}
