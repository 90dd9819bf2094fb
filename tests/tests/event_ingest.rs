//! Filesystem events through ingest into the registry, and the full
//! watch-to-upload path on a real directory.

use std::sync::Arc;
use std::time::Duration;

use integration_tests::fixtures::{cam_path, fast_pipeline_config, recording_name, write_recording};
use integration_tests::{MockConnector, MockStore};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uploader_core::FileState;
use watcher::{DirectoryWatcher, FsEvent};
use worker::{EventIngest, FileRegistry, Pipeline};

async fn wait_until(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}

#[tokio::test]
async fn test_out_of_order_events_never_duplicate() {
    let registry = Arc::new(FileRegistry::new());
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = EventIngest::new(registry.clone(), ".mp4").spawn(rx);

    let a = cam_path("2021-11-20_10h00m00s.mp4");
    let b = cam_path("2021-11-20_11h00m00s.mp4");
    for event in [
        FsEvent::closed(&a),
        FsEvent::created(&a),
        FsEvent::created(&a),
        FsEvent::created(&b),
        FsEvent::closed(&a),
        FsEvent::closed(&a),
        FsEvent::other(&b, "Modify(Data(Any))"),
        FsEvent::created(cam_path("notes.txt")),
    ] {
        tx.send(event).unwrap();
    }
    drop(tx);
    handle.await.unwrap();

    let snapshot = registry.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].path, a);
    assert_eq!(snapshot[0].state, FileState::Closed);
    assert_eq!(snapshot[1].path, b);
    assert_eq!(snapshot[1].state, FileState::Created);

    // Only closed files can be claimed.
    assert_eq!(registry.claim_next_closed().unwrap().path, a);
    assert!(registry.claim_next_closed().is_none());
}

#[tokio::test]
async fn test_watched_recording_is_uploaded() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MockStore::new());
    let connector = Arc::new(MockConnector::new(store.clone()));
    let shutdown = CancellationToken::new();

    let (watcher, events) = DirectoryWatcher::start(dir.path()).unwrap();
    let pipeline = Pipeline::new(fast_pipeline_config(), connector, shutdown.clone());
    let registry = pipeline.registry();
    let handles = pipeline.start(events);

    let name = recording_name("2021-11-20", "14h00m00s");
    write_recording(dir.path(), &name);
    write_recording(dir.path(), "motion.log");

    let uploaded = wait_until(Duration::from_secs(10), || store.contains(&name)).await;
    assert!(uploaded, "recording was not uploaded");

    shutdown.cancel();
    let report = handles.supervisor.await.unwrap();
    watcher.stop();
    handles.ingest.await.unwrap();

    assert_eq!(report.uploaded, 1);
    assert!(registry.is_empty());
    assert_eq!(store.objects(), vec![name]);
}
