//! Rendition variants.

use serde::{Deserialize, Serialize};

/// One of the fixed renditions stored for every asset.
///
/// # Examples
///
/// ```
/// use fresco_core::Variant;
///
/// assert_eq!("medium".parse::<Variant>().unwrap(), Variant::Medium);
/// assert_eq!(Variant::Thumbnail.as_str(), "thumbnail");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Variant {
    /// The uploaded bytes, stored unmodified
    Original,
    /// 100px wide JPEG
    Thumbnail,
    /// 300px wide JPEG
    Small,
    /// 800px wide JPEG
    Medium,
    /// 1600px wide JPEG
    Large,
}

impl Variant {
    /// Name used in URLs and object keys.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Maximum output width, or `None` for the unmodified original.
    pub fn target_width(&self) -> Option<u32> {
        match self {
            Variant::Original => None,
            Variant::Thumbnail => Some(100),
            Variant::Small => Some(300),
            Variant::Medium => Some(800),
            Variant::Large => Some(1600),
        }
    }

    /// Whether this variant is the stored-as-is original.
    pub fn is_original(&self) -> bool {
        matches!(self, Variant::Original)
    }
}
