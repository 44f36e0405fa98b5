//! Blob store error types.

/// Kinds of blob store errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// No object exists under the key
    #[display("Object not found: {}", _0)]
    NotFound(String),
    /// The store could not be reached
    #[display("Storage unavailable: {}", _0)]
    Unavailable(String),
    /// The call did not complete within the configured timeout
    #[display("Storage call timed out: {}", _0)]
    Timeout(String),
    /// Failed to write an object
    #[display("Failed to write object: {}", _0)]
    Write(String),
    /// Failed to read an object
    #[display("Failed to read object: {}", _0)]
    Read(String),
    /// Failed to delete an object
    #[display("Failed to delete object: {}", _0)]
    Delete(String),
    /// Key is not a valid object key for this backend
    #[display("Invalid object key: {}", _0)]
    InvalidKey(String),
}

impl StorageErrorKind {
    /// Whether this failure means the store itself could not be reached.
    ///
    /// Deletes treat these as fatal for the whole call; every other kind is
    /// scoped to a single key.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout(_))
    }
}

/// Blob store error with location tracking.
///
/// # Examples
///
/// ```
/// use fresco_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::NotFound("abc/original".to_string()));
/// assert!(format!("{}", err).contains("not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StorageErrorKind {
        &self.kind
    }
}
