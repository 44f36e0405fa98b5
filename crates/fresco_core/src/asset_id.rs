//! Asset identifiers.

use fresco_error::{AssetError, AssetErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of one uploaded asset.
///
/// Backed by a random (v4) UUID: 122 random bits, so collisions are
/// negligible and identifiers are never reused, even after delete.
///
/// # Examples
///
/// ```
/// use fresco_core::AssetId;
///
/// let id = AssetId::generate();
/// let parsed: AssetId = id.to_string().parse().unwrap();
/// assert_eq!(id, parsed);
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
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
#[display("{}", _0)]
pub struct AssetId(Uuid);

impl AssetId {
    /// Allocate a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::str::FromStr for AssetId {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| AssetError::new(AssetErrorKind::InvalidId(s.to_string())))
    }
}
