use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use stepflow::capture::{CaptureOptions, CaptureSession};
use stepflow::document::{add_step_to_guide, create_guide, create_step};
use stepflow::models::{ActionType, CaptureSource, Guide, GuideSource};
use stepflow::recovery::{AutosaveConfig, CrashRecovery, SessionKind};
use stepflow::storage::GuideStore;

fn setup(dir: &TempDir, interval: Duration) -> (Arc<GuideStore>, CrashRecovery) {
    let store = Arc::new(GuideStore::new(dir.path()));
    store.initialize().unwrap();
    let recovery = CrashRecovery::new(Arc::clone(&store), AutosaveConfig { interval });
    recovery.initialize().unwrap();
    (store, recovery)
}

fn sample_guide(title: &str) -> Guide {
    let guide = create_guide(title, GuideSource::Desktop);
    let step = create_step(ActionType::Click, CaptureSource::Desktop);
    add_step_to_guide(&guide, step).unwrap()
}

#[test]
fn save_list_and_clear_sessions() {
    let dir = TempDir::new().unwrap();
    let (_store, recovery) = setup(&dir, Duration::from_secs(30));

    let guide = sample_guide("Crashed capture");
    recovery.save_session(&guide, SessionKind::Capture).unwrap();

    let sessions = recovery.list_recoverable_sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].guide_id, guide.id);
    assert_eq!(sessions[0].kind, SessionKind::Capture);

    recovery.clear_session(&guide.id).unwrap();
    assert!(recovery.list_recoverable_sessions().is_empty());
    // Clearing again is a no-op.
    recovery.clear_session(&guide.id).unwrap();
}

#[test]
fn listing_skips_malformed_session_files() {
    let dir = TempDir::new().unwrap();
    let (_store, recovery) = setup(&dir, Duration::from_secs(30));

    let guide = sample_guide("Valid session");
    recovery.save_session(&guide, SessionKind::Editor).unwrap();
    std::fs::write(
        dir.path().join("autosave").join("session-junk.json"),
        "{ this is not a session",
    )
    .unwrap();

    let sessions = recovery.list_recoverable_sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].guide_id, guide.id);
}

#[test]
fn sessions_list_newest_first() {
    let dir = TempDir::new().unwrap();
    let (_store, recovery) = setup(&dir, Duration::from_secs(30));

    let first = sample_guide("First");
    let second = sample_guide("Second");
    recovery.save_session(&first, SessionKind::Capture).unwrap();
    std::thread::sleep(Duration::from_millis(10));
    recovery.save_session(&second, SessionKind::Capture).unwrap();

    let sessions = recovery.list_recoverable_sessions();
    assert_eq!(sessions[0].guide_id, second.id);
    assert_eq!(sessions[1].guide_id, first.id);
}

#[test]
fn recover_commits_to_store_and_delists() {
    let dir = TempDir::new().unwrap();
    let (store, recovery) = setup(&dir, Duration::from_secs(30));

    let guide = sample_guide("Crashed capture");
    recovery.save_session(&guide, SessionKind::Capture).unwrap();
    assert!(!store.guide_exists(&guide.id));

    let recovered = recovery.recover_session(&guide.id).unwrap().unwrap();
    assert_eq!(recovered.id, guide.id);
    assert!(store.guide_exists(&guide.id));
    assert!(recovery.list_recoverable_sessions().is_empty());

    // Nothing left to recover.
    assert!(recovery.recover_session(&guide.id).unwrap().is_none());
}

#[test]
fn recovering_a_corrupt_session_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let (store, recovery) = setup(&dir, Duration::from_secs(30));

    std::fs::write(
        dir.path().join("autosave").join("session-broken-id.json"),
        "{ this is not a session",
    )
    .unwrap();

    match recovery.recover_session("broken-id") {
        Err(stepflow::Error::MalformedSession { path }) => {
            assert!(path.ends_with("session-broken-id.json"));
        }
        other => panic!("expected MalformedSession, got {other:?}"),
    }
    // The corrupt file is left for inspection and nothing was committed.
    assert!(dir
        .path()
        .join("autosave")
        .join("session-broken-id.json")
        .exists());
    assert!(!store.guide_exists("broken-id"));
}

#[test]
fn recovered_version_overwrites_the_stored_guide() {
    let dir = TempDir::new().unwrap();
    let (store, recovery) = setup(&dir, Duration::from_secs(30));

    let stored = sample_guide("Stale stored copy");
    store.save_guide(&stored, true).unwrap();

    let mut in_progress = stored.clone();
    in_progress.title = "Fresh crashed copy".to_string();
    in_progress.updated_at = chrono::Utc::now();
    recovery
        .save_session(&in_progress, SessionKind::Editor)
        .unwrap();

    recovery.recover_session(&stored.id).unwrap().unwrap();
    let loaded = store.load_guide(&stored.id, true).unwrap();
    assert_eq!(loaded.title, "Fresh crashed copy");
}

#[tokio::test]
async fn autosave_tick_leaves_crash_evidence_until_recovered() {
    let dir = TempDir::new().unwrap();
    let (store, recovery) = setup(&dir, Duration::from_millis(25));

    let session = CaptureSession::new(
        "Live recording",
        CaptureOptions {
            source: CaptureSource::Desktop,
            mask_input: false,
        },
    );
    let guide_id = session.guide().id.clone();
    let handle = session.handle();

    recovery.start_autosave(move || handle.snapshot(), SessionKind::Capture);
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Simulated crash: the autosave task stops without clear_session.
    recovery.stop_autosave();

    let sessions = recovery.list_recoverable_sessions();
    assert!(sessions.iter().any(|s| s.guide_id == guide_id));

    let recovered = recovery.recover_session(&guide_id).unwrap().unwrap();
    assert_eq!(recovered.id, guide_id);
    assert!(store.guide_exists(&guide_id));
    assert!(recovery
        .list_recoverable_sessions()
        .iter()
        .all(|s| s.guide_id != guide_id));
}

#[tokio::test]
async fn accessor_returning_none_skips_the_tick() {
    let dir = TempDir::new().unwrap();
    let (_store, recovery) = setup(&dir, Duration::from_millis(25));

    recovery.start_autosave(|| None, SessionKind::Editor);
    tokio::time::sleep(Duration::from_millis(100)).await;
    recovery.stop_autosave();

    assert!(recovery.list_recoverable_sessions().is_empty());
}

#[test]
fn stop_autosave_is_idempotent_when_never_started() {
    let dir = TempDir::new().unwrap();
    let (_store, recovery) = setup(&dir, Duration::from_secs(30));
    recovery.stop_autosave();
    recovery.stop_autosave();
}
