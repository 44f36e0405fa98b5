//! Object key layout.
//!
//! The layout is a persisted-state contract and must stay stable:
//!
//! ```text
//! {id}/original
//! {id}/thumbnail.jpg
//! {id}/small.jpg
//! {id}/medium.jpg
//! {id}/large.jpg
//! ```

use crate::{AssetId, Variant, VariantPlan};

/// Key of one object in the blob store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
#[display("{}", _0)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Canonical key of a known variant.
    ///
    /// # Examples
    ///
    /// ```
    /// use fresco_core::{AssetId, ObjectKey, Variant};
    ///
    /// let id = AssetId::generate();
    /// assert_eq!(ObjectKey::new(&id, Variant::Original).as_str(), format!("{}/original", id));
    /// assert_eq!(ObjectKey::new(&id, Variant::Small).as_str(), format!("{}/small.jpg", id));
    /// ```
    pub fn new(id: &AssetId, variant: Variant) -> Self {
        if variant.is_original() {
            Self(format!("{}/original", id))
        } else {
            Self(format!("{}/{}.jpg", id, variant.as_str()))
        }
    }

    /// Key a read request resolves to.
    ///
    /// No name, or `"original"`, resolves to the original. Every other name
    /// resolves to `{id}/{name}.jpg` whether or not it is a known variant, so an
    /// unknown name is a lookup miss rather than a fallback. Returns `None` for
    /// names that are not a single safe path segment.
    pub fn for_request(id: &AssetId, name: Option<&str>) -> Option<Self> {
        match name {
            None | Some("original") => Some(Self::new(id, Variant::Original)),
            Some(name) if is_safe_segment(name) => Some(Self(format!("{}/{}.jpg", id, name))),
            Some(_) => None,
        }
    }

    /// Every canonical key under an asset, in plan order.
    pub fn all(id: &AssetId) -> Vec<Self> {
        VariantPlan::plan()
            .iter()
            .map(|spec| Self::new(id, spec.variant))
            .collect()
    }

    /// Wrap an arbitrary key string, as handed over by a blob store backend.
    pub fn from_raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Public URL of this key under a CDN base.
    pub fn public_url(&self, cdn_base_url: &str) -> String {
        format!("{}/{}", cdn_base_url.trim_end_matches('/'), self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_safe_segment(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && !name.contains("..")
        && !name.contains('/')
        && !name.contains('\\')
        && !name.chars().any(char::is_control)
}
