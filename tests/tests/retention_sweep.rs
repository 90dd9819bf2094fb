//! Retention sweep against an in-memory store.

use std::sync::Arc;

use chrono::NaiveDate;
use integration_tests::MockStore;
use uploader_core::{ErrorClass, RetentionPolicy, StorageError};
use worker::RetentionSweeper;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[tokio::test]
async fn test_sweep_deletes_only_expired_recordings() {
    let store = Arc::new(MockStore::with_objects(&[
        "2021-11-10_x.mp4",
        "2021-11-15_x.mp4",
        "2021-11-16_x.mp4",
        "2021-11-20_14h00m00s.mp4",
        "_videos",
    ]));
    let sweeper = RetentionSweeper::new(store.clone(), RetentionPolicy::new(5), ".mp4");

    let report = sweeper.run_for(day(2021, 11, 21)).await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.listed, 5);
    assert_eq!(report.candidates, strings(&["2021-11-10_x.mp4", "2021-11-15_x.mp4"]));
    assert_eq!(report.deleted, report.candidates);
    assert_eq!(
        store.objects(),
        strings(&["2021-11-16_x.mp4", "2021-11-20_14h00m00s.mp4", "_videos"])
    );
}

#[tokio::test]
async fn test_sweep_reports_undeleted_names() {
    let store = Arc::new(MockStore::with_objects(&[
        "2021-10-01_a.mp4",
        "2021-10-02_b.mp4",
        "2021-10-03_c.mp4",
    ]));
    store.refuse_delete("2021-10-02_b.mp4");
    let sweeper = RetentionSweeper::new(store.clone(), RetentionPolicy::new(5), ".mp4");

    let report = sweeper.run_for(day(2021, 11, 21)).await.unwrap();

    assert!(!report.is_success());
    assert_eq!(report.failed_names(), vec!["2021-10-02_b.mp4"]);
    assert_eq!(report.deleted, strings(&["2021-10-01_a.mp4", "2021-10-03_c.mp4"]));
    assert_eq!(store.objects(), strings(&["2021-10-02_b.mp4"]));
}

#[tokio::test]
async fn test_sweep_with_nothing_expired() {
    let store = Arc::new(MockStore::with_objects(&["2021-11-20_a.mp4"]));
    let sweeper = RetentionSweeper::new(store.clone(), RetentionPolicy::default(), ".mp4");

    let report = sweeper.run_for(day(2021, 11, 21)).await.unwrap();

    assert!(report.is_success());
    assert!(report.candidates.is_empty());
    assert_eq!(store.objects().len(), 1);
}

#[tokio::test]
async fn test_listing_failure_aborts_sweep() {
    let store = Arc::new(MockStore::with_objects(&["2021-10-01_a.mp4"]));
    store.fail_list(StorageError::unavailable("401 unauthorized"));
    let sweeper = RetentionSweeper::new(store.clone(), RetentionPolicy::new(5), ".mp4");

    let err = sweeper.run_for(day(2021, 11, 21)).await.unwrap_err();

    assert_eq!(err.class(), ErrorClass::Unavailable);
    assert_eq!(store.objects().len(), 1);
}
