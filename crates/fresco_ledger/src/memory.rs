//! In-memory ledger stores.

use crate::{TombstoneStore, UploadLog};
use chrono::{DateTime, Duration, Utc};
use fresco_core::{Tombstone, UploadRecord};
use std::sync::{Mutex, MutexGuard};

// Critical sections never panic midway, so a poisoned lock still guards
// consistent data.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Mutex-guarded tombstone list.
#[derive(Debug, Default)]
pub struct MemoryTombstoneStore {
    tombstones: Mutex<Vec<Tombstone>>,
}

impl MemoryTombstoneStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TombstoneStore for MemoryTombstoneStore {
    fn insert(&self, tombstone: Tombstone) {
        lock(&self.tombstones).push(tombstone);
    }

    fn remove_expired(&self, now: DateTime<Utc>, window: Duration) -> Vec<Tombstone> {
        let mut tombstones = lock(&self.tombstones);
        let (expired, kept): (Vec<_>, Vec<_>) = tombstones
            .drain(..)
            .partition(|t| t.is_expired(now, window));
        *tombstones = kept;
        expired
    }

    fn snapshot(&self) -> Vec<Tombstone> {
        lock(&self.tombstones).clone()
    }

    fn len(&self) -> usize {
        lock(&self.tombstones).len()
    }
}

/// Mutex-guarded upload record list.
#[derive(Debug, Default)]
pub struct MemoryUploadLog {
    records: Mutex<Vec<UploadRecord>>,
}

impl MemoryUploadLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }
}

impl UploadLog for MemoryUploadLog {
    fn append(&self, record: UploadRecord) {
        lock(&self.records).push(record);
    }

    fn snapshot(&self) -> Vec<UploadRecord> {
        lock(&self.records).clone()
    }

    fn len(&self) -> usize {
        lock(&self.records).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fresco_core::{AssetId, Identity};

    #[test]
    fn remove_expired_keeps_order_of_survivors() {
        let store = MemoryTombstoneStore::new();
        let base = Utc::now();
        let ids: Vec<AssetId> = (0..4).map(|_| AssetId::generate()).collect();
        for (i, id) in ids.iter().enumerate() {
            store.insert(Tombstone::new(*id, base + Duration::hours(i as i64)));
        }

        let expired = store.remove_expired(base + Duration::hours(3), Duration::hours(2));
        let expired_ids: Vec<AssetId> = expired.iter().map(|t| *t.id()).collect();
        assert_eq!(expired_ids, ids[..2].to_vec());

        let kept: Vec<AssetId> = store.snapshot().iter().map(|t| *t.id()).collect();
        assert_eq!(kept, ids[2..].to_vec());
    }

    #[test]
    fn upload_log_snapshot_is_a_copy() {
        let log = MemoryUploadLog::new();
        log.append(UploadRecord::new(
            AssetId::generate(),
            10,
            Identity::new("a@example.com"),
            "image/png",
            Utc::now(),
        ));
        let snapshot = log.snapshot();
        log.append(UploadRecord::new(
            AssetId::generate(),
            20,
            Identity::new("b@example.com"),
            "image/gif",
            Utc::now(),
        ));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(log.len(), 2);
    }
}
