//! Asset lifecycle error types.

/// Kinds of asset lifecycle errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum AssetErrorKind {
    /// Declared MIME type is not one of the accepted image types
    #[display("Unsupported media type: {}", _0)]
    UnsupportedMediaType(String),
    /// Upload carried no file bytes
    #[display("No file uploaded")]
    MissingFile,
    /// Upload exceeds the configured size limit
    #[display("File of {} bytes exceeds the {} byte limit", size, limit)]
    TooLarge {
        /// Size of the rejected upload
        size: u64,
        /// Configured limit
        limit: u64,
    },
    /// Identifier is not a well-formed asset id
    #[display("Invalid asset id: {}", _0)]
    InvalidId(String),
    /// No object exists for the requested asset and variant
    #[display("Image not found: {}", _0)]
    NotFound(String),
    /// No variant of an upload could be stored
    #[display("Upload failed: {}", _0)]
    UploadFailed(String),
    /// The blob store was unreachable while deleting
    #[display("Delete failed: {}", _0)]
    DeleteFailed(String),
    /// The caller cancelled the operation before it completed
    #[display("Operation cancelled: {}", _0)]
    Cancelled(String),
}

impl AssetErrorKind {
    /// Whether this error is a request validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedMediaType(_)
                | Self::MissingFile
                | Self::TooLarge { .. }
                | Self::InvalidId(_)
        )
    }
}

/// Asset lifecycle error with location tracking.
///
/// # Examples
///
/// ```
/// use fresco_error::{AssetError, AssetErrorKind};
///
/// let err = AssetError::new(AssetErrorKind::UnsupportedMediaType("text/plain".into()));
/// assert!(err.kind.is_validation());
/// assert!(format!("{}", err).contains("text/plain"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Asset Error: {} at line {} in {}", kind, line, file)]
pub struct AssetError {
    /// The kind of error that occurred
    pub kind: AssetErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl AssetError {
    /// Create a new asset error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: AssetErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &AssetErrorKind {
        &self.kind
    }
}
