//! Storage traits behind the ledgers.

use chrono::{DateTime, Duration, Utc};
use fresco_core::{Tombstone, UploadRecord};

/// Backing store for deletion tombstones.
///
/// Implementations must tolerate concurrent inserts and purges.
pub trait TombstoneStore: Send + Sync {
    /// Append a tombstone.
    fn insert(&self, tombstone: Tombstone);

    /// Remove and return every tombstone expired as of `now`.
    fn remove_expired(&self, now: DateTime<Utc>, window: Duration) -> Vec<Tombstone>;

    /// Point-in-time copy of every held tombstone, in insertion order.
    fn snapshot(&self) -> Vec<Tombstone>;

    /// Number of held tombstones.
    fn len(&self) -> usize;

    /// Whether no tombstones are held.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Append-only backing store for upload records.
pub trait UploadLog: Send + Sync {
    /// Append a record.
    fn append(&self, record: UploadRecord);

    /// Point-in-time copy of every record, in append order.
    fn snapshot(&self) -> Vec<UploadRecord>;

    /// Number of records.
    fn len(&self) -> usize;

    /// Whether the log is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
