//! Authenticated caller identity.

use serde::{Deserialize, Serialize};

/// Identity of an authenticated caller, as returned by token verification.
///
/// Recorded verbatim as the uploader of an asset; carries no permissions.
#[derive(
    Debug,
    Clone,
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
pub struct Identity(String);

impl Identity {
    /// Create an identity from its string form.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
