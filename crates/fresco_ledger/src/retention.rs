//! Deletion tombstones and the retention purge.

use crate::{MemoryTombstoneStore, TombstoneStore};
use chrono::{DateTime, Duration, Utc};
use fresco_core::{AssetId, Tombstone};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Records which assets were deleted and when, until the retention window
/// passes.
///
/// Cheap to clone; clones share the underlying store.
#[derive(Clone)]
pub struct RetentionLedger {
    store: Arc<dyn TombstoneStore>,
}

impl std::fmt::Debug for RetentionLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetentionLedger")
            .field("tombstones", &self.store.len())
            .finish()
    }
}

impl Default for RetentionLedger {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl RetentionLedger {
    /// Create a ledger over an injected store.
    pub fn new(store: Arc<dyn TombstoneStore>) -> Self {
        Self { store }
    }

    /// Create a ledger backed by a [`MemoryTombstoneStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTombstoneStore::new()))
    }

    /// Record that `id` was deleted at `at`.
    #[instrument(skip(self), fields(asset_id = %id))]
    pub fn tombstone(&self, id: AssetId, at: DateTime<Utc>) {
        self.store.insert(Tombstone::new(id, at));
        debug!("Recorded tombstone");
    }

    /// Remove every tombstone at least `window` old as of `now`.
    ///
    /// Returns the ids of the purged assets. Never fails.
    #[instrument(skip(self), fields(window_secs = window.num_seconds()))]
    pub fn purge_expired(&self, now: DateTime<Utc>, window: Duration) -> Vec<AssetId> {
        let purged: Vec<AssetId> = self
            .store
            .remove_expired(now, window)
            .into_iter()
            .map(|t| *t.id())
            .collect();
        debug!(purged = purged.len(), remaining = self.store.len(), "Purged tombstones");
        purged
    }

    /// Whether a tombstone is held for `id`.
    pub fn contains(&self, id: &AssetId) -> bool {
        self.store.snapshot().iter().any(|t| t.id() == id)
    }

    /// Number of held tombstones.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether no tombstones are held.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Point-in-time copy of every held tombstone.
    pub fn snapshot(&self) -> Vec<Tombstone> {
        self.store.snapshot()
    }
}
