//! Tests for the retention ledger, metrics log and purge scheduler.

use chrono::{Duration, Utc};
use fresco_core::{AssetId, Identity, UploadRecord};
use fresco_ledger::{MetricsLog, PurgeScheduler, RetentionLedger};
use std::collections::HashSet;
use std::sync::Arc;

#[test]
fn test_retention_law() {
    let ledger = RetentionLedger::in_memory();
    let window = Duration::days(7);
    let t = Utc::now();
    let id = AssetId::generate();

    ledger.tombstone(id, t);

    // One millisecond short of the window: still held
    let purged = ledger.purge_expired(t + window - Duration::milliseconds(1), window);
    assert!(purged.is_empty());
    assert!(ledger.contains(&id));

    // Exactly at the window: purged
    let purged = ledger.purge_expired(t + window, window);
    assert_eq!(purged, vec![id]);
    assert!(!ledger.contains(&id));
    assert!(ledger.is_empty());
}

#[test]
fn test_purge_only_removes_expired() {
    let ledger = RetentionLedger::in_memory();
    let window = Duration::hours(1);
    let now = Utc::now();

    let old = AssetId::generate();
    let fresh = AssetId::generate();
    ledger.tombstone(old, now - Duration::hours(2));
    ledger.tombstone(fresh, now);

    assert_eq!(ledger.purge_expired(now, window), vec![old]);
    assert_eq!(ledger.len(), 1);
    assert_eq!(*ledger.snapshot()[0].id(), fresh);
}

#[test]
fn test_purge_on_empty_ledger() {
    let ledger = RetentionLedger::in_memory();
    assert!(ledger.purge_expired(Utc::now(), Duration::zero()).is_empty());
}

#[test]
fn test_concurrent_tombstones_and_purges() {
    let ledger = RetentionLedger::in_memory();
    let now = Utc::now();
    let ids: Arc<Vec<AssetId>> = Arc::new((0..400).map(|_| AssetId::generate()).collect());

    let writers: Vec<_> = (0..4)
        .map(|chunk| {
            let ledger = ledger.clone();
            let ids = Arc::clone(&ids);
            std::thread::spawn(move || {
                for id in &ids[chunk * 100..(chunk + 1) * 100] {
                    ledger.tombstone(*id, now);
                }
            })
        })
        .collect();
    let purger = {
        let ledger = ledger.clone();
        std::thread::spawn(move || {
            let mut purged = Vec::new();
            for _ in 0..50 {
                purged.extend(ledger.purge_expired(now, Duration::zero()));
            }
            purged
        })
    };

    for writer in writers {
        writer.join().unwrap();
    }
    let mut purged: HashSet<AssetId> = purger.join().unwrap().into_iter().collect();
    purged.extend(ledger.purge_expired(now, Duration::zero()));

    // Every tombstone purged exactly once, none lost
    assert_eq!(purged.len(), 400);
    assert!(ledger.is_empty());
}

#[test]
fn test_metrics_log_appends_in_order() {
    let metrics = MetricsLog::in_memory();
    let first = AssetId::generate();
    let second = AssetId::generate();

    metrics.record(UploadRecord::new(
        first,
        1024,
        Identity::new("ops@example.com"),
        "image/png",
        Utc::now(),
    ));
    metrics.record(UploadRecord::new(
        second,
        2048,
        Identity::new("ops@example.com"),
        "image/jpeg",
        Utc::now(),
    ));

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(*snapshot[0].id(), first);
    assert_eq!(*snapshot[1].id(), second);
    assert_eq!(*snapshot[1].size(), 2048);
}

#[test]
fn test_run_once_purges_with_configured_window() {
    let ledger = RetentionLedger::in_memory();
    ledger.tombstone(AssetId::generate(), Utc::now() - Duration::days(8));
    ledger.tombstone(AssetId::generate(), Utc::now());

    let scheduler = PurgeScheduler::new(ledger.clone());
    assert_eq!(scheduler.run_once(), 1);
    assert_eq!(ledger.len(), 1);
}

#[tokio::test]
async fn test_scheduler_purges_on_tick_and_shuts_down() {
    let ledger = RetentionLedger::in_memory();
    ledger.tombstone(AssetId::generate(), Utc::now());

    let handle = PurgeScheduler::new(ledger.clone())
        .with_interval(std::time::Duration::from_millis(10))
        .with_window(std::time::Duration::ZERO)
        .spawn();

    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
    while !ledger.is_empty() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(ledger.is_empty());

    let token = handle.cancellation_token();
    handle.shutdown().await;
    assert!(token.is_cancelled());
}

#[tokio::test]
async fn test_scheduler_waits_one_interval_before_first_purge() {
    let ledger = RetentionLedger::in_memory();
    ledger.tombstone(AssetId::generate(), Utc::now() - Duration::days(30));

    let handle = PurgeScheduler::new(ledger.clone()).spawn();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    assert_eq!(ledger.len(), 1);
    assert!(!handle.is_finished());
    handle.shutdown().await;
}
