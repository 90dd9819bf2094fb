//! The `pending_files` gauge tracks ingest and uploads.
//!
//! Kept in its own test binary: the gauge is process-global.

use std::sync::Arc;

use integration_tests::fixtures::cam_path;
use integration_tests::{MockConnector, MockStore};
use telemetry::metrics;
use tokio_util::sync::CancellationToken;
use watcher::FsEvent;
use worker::{
    EventIngest, FileRegistry, PipelineSupervisor, SupervisorConfig, SupervisorState,
    UploadConfig,
};

#[tokio::test(start_paused = true)]
async fn test_pending_gauge_follows_ingest_and_uploads() {
    let registry = Arc::new(FileRegistry::new());
    let ingest = EventIngest::new(registry.clone(), ".mp4");
    let a = cam_path("2021-11-20_10h00m00s.mp4");
    let b = cam_path("2021-11-20_11h00m00s.mp4");

    ingest.handle(&FsEvent::created(&a));
    assert_eq!(metrics().pending_files.get(), 1);
    ingest.handle(&FsEvent::created(&b));
    ingest.handle(&FsEvent::created(&b));
    assert_eq!(metrics().pending_files.get(), 2);
    ingest.handle(&FsEvent::closed(&a));
    assert_eq!(metrics().pending_files.get(), 2);

    let store = Arc::new(MockStore::new());
    let shutdown = CancellationToken::new();
    let supervisor = PipelineSupervisor::new(
        registry.clone(),
        Arc::new(MockConnector::new(store.clone())),
        UploadConfig::default(),
        SupervisorConfig::default(),
        shutdown.clone(),
    );
    let mut state = supervisor.subscribe();
    let handle = tokio::spawn(supervisor.run());

    state
        .wait_for(|s| *s == SupervisorState::Idle)
        .await
        .unwrap();
    assert!(store.contains("2021-11-20_10h00m00s.mp4"));
    // b is still being written.
    assert_eq!(metrics().pending_files.get(), 1);

    shutdown.cancel();
    handle.await.unwrap();
}
