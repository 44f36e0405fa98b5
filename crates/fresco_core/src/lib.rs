//! Core data types for the Fresco image asset service.
//!
//! This crate provides the vocabulary shared by every Fresco component: asset
//! identifiers, the fixed rendition plan, the persisted object key layout, and
//! the bookkeeping records written by uploads and deletes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod asset_id;
mod identity;
mod key;
mod media;
mod plan;
mod record;
mod variant;

pub use asset_id::AssetId;
pub use identity::Identity;
pub use key::ObjectKey;
pub use media::{ImageMime, JPEG_CONTENT_TYPE};
pub use plan::{VariantPlan, VariantSpec};
pub use record::{Tombstone, UploadRecord};
pub use variant::Variant;
