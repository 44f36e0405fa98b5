//! Error types for the Fresco image asset service.
//!
//! This crate provides the foundation error types used throughout the Fresco workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use fresco_error::{AssetError, AssetErrorKind, FrescoResult};
//!
//! fn lookup() -> FrescoResult<Vec<u8>> {
//!     Err(AssetError::new(AssetErrorKind::NotFound("abc/original".to_string())))?
//! }
//!
//! match lookup() {
//!     Ok(bytes) => println!("Got {} bytes", bytes.len()),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod asset;
mod auth;
mod config;
mod error;
mod render;
mod server;
mod storage;

pub use asset::{AssetError, AssetErrorKind};
pub use auth::{AuthError, AuthErrorKind};
pub use config::ConfigError;
pub use error::{FrescoError, FrescoErrorKind, FrescoResult};
pub use render::{RenderError, RenderErrorKind};
pub use server::{ServerError, ServerErrorKind};
pub use storage::{StorageError, StorageErrorKind};
