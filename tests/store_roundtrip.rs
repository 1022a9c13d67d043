use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tempfile::TempDir;

use stepflow::document::{
    add_step_to_guide, create_guide, create_step, update_step, StepPatch,
};
use stepflow::models::{ActionType, CaptureSource, Guide, GuideSource, Screenshot};
use stepflow::storage::{safe_id, GuideStore};
use stepflow::Error;

const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nnot-a-real-image";

fn store_in(dir: &TempDir) -> GuideStore {
    let store = GuideStore::new(dir.path());
    store.initialize().unwrap();
    store
}

fn guide_with_screenshot() -> Guide {
    let guide = create_guide("Billing walkthrough", GuideSource::Chrome);
    let mut first = create_step(ActionType::Click, CaptureSource::Chrome);
    first.title = "Open billing".to_string();
    let second = create_step(ActionType::Input, CaptureSource::Chrome);

    let guide = add_step_to_guide(&guide, first.clone()).unwrap();
    let guide = add_step_to_guide(&guide, second).unwrap();
    update_step(
        &guide,
        &first.id,
        StepPatch {
            screenshot: Some(Screenshot::png_inline(BASE64.encode(FAKE_PNG))),
            ..StepPatch::default()
        },
    )
    .unwrap()
}

#[test]
fn save_extracts_images_and_load_embeds_them_losslessly() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let guide = guide_with_screenshot();

    store.save_guide(&guide, true).unwrap();

    let bundle = dir.path().join("guides").join(safe_id(&guide.id));
    assert!(bundle.join("guide.json").exists());
    assert!(dir.path().join("library.json").exists());

    let id8: String = guide.steps[0].id.chars().take(8).collect();
    let image_path = bundle.join("images").join(format!("step-1-{id8}.png"));
    assert_eq!(std::fs::read(&image_path).unwrap(), FAKE_PNG);

    // The metadata file holds only the reference, never the payload.
    let metadata = std::fs::read_to_string(bundle.join("guide.json")).unwrap();
    assert!(metadata.contains("screenshotPath"));
    assert!(!metadata.contains("screenshotBase64"));

    let loaded = store.load_guide(&guide.id, true).unwrap();
    assert_eq!(loaded, guide);
}

#[test]
fn repeated_round_trips_stay_lossless_and_do_not_duplicate() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let guide = guide_with_screenshot();

    store.save_guide(&guide, true).unwrap();
    let first_load = store.load_guide(&guide.id, true).unwrap();
    store.save_guide(&first_load, true).unwrap();
    let second_load = store.load_guide(&guide.id, true).unwrap();

    assert_eq!(second_load, guide);
    assert_eq!(store.list_guides().len(), 1);
}

#[test]
fn load_without_embedding_keeps_path_references() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let guide = guide_with_screenshot();
    store.save_guide(&guide, true).unwrap();

    let loaded = store.load_guide(&guide.id, false).unwrap();
    match &loaded.steps[0].screenshot {
        Some(Screenshot::OnDisk { path, mime }) => {
            assert!(path.starts_with("images/step-1-"));
            assert_eq!(mime, "image/png");
        }
        other => panic!("expected on-disk reference, got {other:?}"),
    }
}

#[test]
fn load_missing_guide_is_not_found() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    match store.load_guide("no-such-guide", true) {
        Err(Error::NotFound { guide_id }) => assert_eq!(guide_id, "no-such-guide"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn delete_missing_guide_is_noop_and_leaves_index_unchanged() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let guide = guide_with_screenshot();
    store.save_guide(&guide, true).unwrap();

    store.delete_guide("no-such-guide").unwrap();
    assert_eq!(store.list_guides().len(), 1);

    store.delete_guide(&guide.id).unwrap();
    assert!(store.list_guides().is_empty());
    assert!(!store.guide_exists(&guide.id));
}

#[test]
fn list_is_sorted_by_update_time_descending() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    let mut older = create_guide("Older", GuideSource::Chrome);
    let mut newer = create_guide("Newer", GuideSource::Chrome);
    older.updated_at = older.created_at;
    newer.created_at = older.created_at + chrono::Duration::minutes(5);
    newer.updated_at = newer.created_at;

    store.save_guide(&older, true).unwrap();
    store.save_guide(&newer, true).unwrap();

    let titles: Vec<String> = store.list_guides().into_iter().map(|g| g.title).collect();
    assert_eq!(titles, vec!["Newer", "Older"]);
}

#[test]
fn guide_exists_checks_metadata_only() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let guide = guide_with_screenshot();

    assert!(!store.guide_exists(&guide.id));
    store.save_guide(&guide, true).unwrap();
    assert!(store.guide_exists(&guide.id));
}

#[test]
fn export_import_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let guide = guide_with_screenshot();
    store.save_guide(&guide, true).unwrap();

    let export_path = dir.path().join("exported.json");
    store.export_guide_json(&guide.id, &export_path).unwrap();

    let other_dir = TempDir::new().unwrap();
    let other_store = store_in(&other_dir);
    let imported = other_store.import_guide_json(&export_path).unwrap();
    assert_eq!(imported, guide);
    assert!(other_store.guide_exists(&guide.id));
}

#[test]
fn safe_id_replaces_unfriendly_characters() {
    assert_eq!(safe_id("abc-123"), "abc-123");
    assert_eq!(safe_id("a/b\\c:d e"), "a_b_c_d_e");
}
