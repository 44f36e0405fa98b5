//! Upload metrics log.

use crate::{MemoryUploadLog, UploadLog};
use fresco_core::UploadRecord;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Append-only log of completed uploads.
///
/// Cheap to clone; clones share the underlying log. Records are never
/// deleted or compacted.
#[derive(Clone)]
pub struct MetricsLog {
    log: Arc<dyn UploadLog>,
}

impl std::fmt::Debug for MetricsLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsLog")
            .field("records", &self.log.len())
            .finish()
    }
}

impl Default for MetricsLog {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl MetricsLog {
    /// Create a metrics log over an injected store.
    pub fn new(log: Arc<dyn UploadLog>) -> Self {
        Self { log }
    }

    /// Create a metrics log backed by a [`MemoryUploadLog`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryUploadLog::new()))
    }

    /// Append a record.
    #[instrument(skip(self, record), fields(asset_id = %record.id(), size = record.size()))]
    pub fn record(&self, record: UploadRecord) {
        self.log.append(record);
        debug!("Recorded upload");
    }

    /// Point-in-time copy of every record, oldest first.
    pub fn snapshot(&self) -> Vec<UploadRecord> {
        self.log.snapshot()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.log.len()
    }

    /// Whether no uploads have been recorded.
    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}
