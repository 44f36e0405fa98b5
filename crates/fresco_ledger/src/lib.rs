//! Bookkeeping for Fresco assets.
//!
//! Two append-style ledgers sit beside the blob store:
//!
//! - **[`RetentionLedger`]**: tombstones for deleted assets, purged once they
//!   age past the retention window
//! - **[`MetricsLog`]**: one [`UploadRecord`](fresco_core::UploadRecord) per
//!   completed upload, read back by the operator metrics endpoint
//!
//! Both are thin handles over injected store traits ([`TombstoneStore`],
//! [`UploadLog`]), so the in-memory defaults can be swapped for durable
//! backends without touching callers.
//!
//! The [`PurgeScheduler`] drives `purge_expired` on a fixed tick until it is
//! shut down.
//!
//! # Example
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use fresco_core::AssetId;
//! use fresco_ledger::RetentionLedger;
//!
//! let ledger = RetentionLedger::in_memory();
//! let id = AssetId::generate();
//! let deleted_at = Utc::now();
//!
//! ledger.tombstone(id, deleted_at);
//! assert!(ledger.purge_expired(deleted_at, Duration::days(7)).is_empty());
//! assert_eq!(ledger.purge_expired(deleted_at + Duration::days(7), Duration::days(7)), vec![id]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod memory;
mod metrics;
mod retention;
mod scheduler;
mod store;

pub use memory::{MemoryTombstoneStore, MemoryUploadLog};
pub use metrics::MetricsLog;
pub use retention::RetentionLedger;
pub use scheduler::{
    DEFAULT_PURGE_INTERVAL, DEFAULT_RETENTION_WINDOW, PurgeHandle, PurgeScheduler,
};
pub use store::{TombstoneStore, UploadLog};
