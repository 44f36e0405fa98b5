//! HTTP server for the Fresco image asset service.
//!
//! Wires configuration, logging, the blob store, the asset pipeline and the
//! retention purge loop behind an axum router.
//!
//! # Routes
//!
//! | Method | Path | Auth | Result |
//! |---|---|---|---|
//! | `GET` | `/` | no | banner |
//! | `POST` | `/upload` | yes | `{id, urls}` (200) or `{id, urls, failed}` (207) |
//! | `GET` | `/image/:id` | no | original bytes |
//! | `GET` | `/image/:id/:variant` | no | rendition bytes |
//! | `DELETE` | `/image/:id` | yes | `{message, id}` |
//! | `GET` | `/metrics/uploads` | yes | upload records |
//!
//! Authenticated routes expect `Authorization: Bearer <token>`, where the token
//! is either listed in `[auth.tokens]` or an HS256 JWT signed with
//! `auth.jwt_secret` whose `email` claim names the caller. Errors are
//! rendered as `{"error": "<message>"}`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod api;
mod config;
mod observability;
mod server;

pub use api::{ApiError, AppState, Authenticated, create_router};
pub use config::{
    AuthSection, FrescoConfig, RetentionSection, ServerSection, StorageBackend, StorageSection,
    UploadSection,
};
pub use observability::{LoggingConfig, init_logging};
pub use server::{FrescoServer, build_authenticator, build_pipeline, build_store};
