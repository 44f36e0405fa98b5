//! Bookkeeping records written by uploads and deletes.

use crate::{AssetId, Identity};
use chrono::{DateTime, Duration, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// One completed upload, as reported by the operator metrics endpoint.
///
/// Serialized with the field names and epoch-millisecond timestamp the
/// metrics endpoint has always returned:
///
/// ```json
/// {"id": "...", "size": 1024, "uploadedBy": "ops@example.com", "type": "image/png", "timestamp": 1700000000000}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    id: AssetId,
    size: u64,
    uploaded_by: Identity,
    #[serde(rename = "type")]
    mime_type: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    timestamp: DateTime<Utc>,
}

impl UploadRecord {
    /// Create a record for an upload that finished at `timestamp`.
    pub fn new(
        id: AssetId,
        size: u64,
        uploaded_by: Identity,
        mime_type: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            size,
            uploaded_by,
            mime_type: mime_type.into(),
            timestamp,
        }
    }
}

/// Marker that every stored object of an asset has been deleted.
///
/// Kept until its age reaches the retention window, then purged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Tombstone {
    id: AssetId,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    deleted_at: DateTime<Utc>,
}

impl Tombstone {
    /// Create a tombstone for an asset deleted at `deleted_at`.
    pub fn new(id: AssetId, deleted_at: DateTime<Utc>) -> Self {
        Self { id, deleted_at }
    }

    /// Whether the tombstone has been retained for at least `window` as of `now`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{Duration, Utc};
    /// use fresco_core::{AssetId, Tombstone};
    ///
    /// let t = Utc::now();
    /// let tombstone = Tombstone::new(AssetId::generate(), t);
    /// assert!(!tombstone.is_expired(t + Duration::days(7) - Duration::milliseconds(1), Duration::days(7)));
    /// assert!(tombstone.is_expired(t + Duration::days(7), Duration::days(7)));
    /// ```
    pub fn is_expired(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now.signed_duration_since(self.deleted_at) >= window
    }
}
