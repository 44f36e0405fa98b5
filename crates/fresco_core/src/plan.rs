//! The fixed rendition plan.

use crate::Variant;

/// A variant together with the width it must be rendered at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariantSpec {
    /// Which rendition this is
    pub variant: Variant,
    /// Maximum width in pixels; `None` means "store unmodified"
    pub target_width: Option<u32>,
}

impl VariantSpec {
    const fn new(variant: Variant, target_width: Option<u32>) -> Self {
        Self {
            variant,
            target_width,
        }
    }
}

const PLAN: [VariantSpec; 5] = [
    VariantSpec::new(Variant::Original, None),
    VariantSpec::new(Variant::Thumbnail, Some(100)),
    VariantSpec::new(Variant::Small, Some(300)),
    VariantSpec::new(Variant::Medium, Some(800)),
    VariantSpec::new(Variant::Large, Some(1600)),
];

/// Maps a logical asset to the renditions that must exist for it.
///
/// The plan is constant: the original first, then every rendition in
/// ascending width.
///
/// # Examples
///
/// ```
/// use fresco_core::{Variant, VariantPlan};
///
/// let plan = VariantPlan::plan();
/// assert_eq!(plan.len(), 5);
/// assert_eq!(plan[0].variant, Variant::Original);
/// assert_eq!(plan[0].target_width, None);
/// ```
pub struct VariantPlan;

impl VariantPlan {
    /// Every variant, original first.
    pub fn plan() -> &'static [VariantSpec] {
        &PLAN
    }

    /// The resized renditions only.
    pub fn renditions() -> &'static [VariantSpec] {
        &PLAN[1..]
    }

    /// Spec for a single variant.
    pub fn spec(variant: Variant) -> VariantSpec {
        VariantSpec::new(variant, variant.target_width())
    }
}
