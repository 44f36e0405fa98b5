//! Top-level error wrapper types.

use crate::{AssetError, AuthError, ConfigError, RenderError, ServerError, StorageError};

/// Every error condition a Fresco operation can surface.
///
/// # Examples
///
/// ```
/// use fresco_error::{FrescoError, StorageError, StorageErrorKind};
///
/// let storage_err = StorageError::new(StorageErrorKind::Unavailable("connection refused".into()));
/// let err: FrescoError = storage_err.into();
/// assert!(format!("{}", err).contains("Storage Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum FrescoErrorKind {
    /// Asset lifecycle error (validation, lookup, delete)
    #[from(AssetError)]
    Asset(AssetError),
    /// Blob store error
    #[from(StorageError)]
    Storage(StorageError),
    /// Rendition error
    #[from(RenderError)]
    Render(RenderError),
    /// Authentication error
    #[from(AuthError)]
    Auth(AuthError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// HTTP server error
    #[from(ServerError)]
    Server(ServerError),
}

/// Fresco error with kind discrimination.
///
/// # Examples
///
/// ```
/// use fresco_error::{ConfigError, FrescoErrorKind, FrescoResult};
///
/// fn might_fail() -> FrescoResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(matches!(err.kind(), FrescoErrorKind::Config(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Fresco Error: {}", _0)]
pub struct FrescoError(Box<FrescoErrorKind>);

impl FrescoError {
    /// Create a new error from a kind.
    pub fn new(kind: FrescoErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &FrescoErrorKind {
        &self.0
    }

    /// Asset error kind, if this is an asset error.
    pub fn asset_kind(&self) -> Option<&crate::AssetErrorKind> {
        match self.kind() {
            FrescoErrorKind::Asset(e) => Some(&e.kind),
            _ => None,
        }
    }
}

// Generic From implementation for any type that converts to FrescoErrorKind
impl<T> From<T> for FrescoError
where
    T: Into<FrescoErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Fresco operations.
pub type FrescoResult<T> = std::result::Result<T, FrescoError>;
