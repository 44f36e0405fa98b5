//! HTTP API over the asset pipeline.

use axum::{
    Router,
    body::Body,
    extract::{DefaultBodyLimit, FromRequestParts, Multipart, Path, State, multipart::MultipartError},
    http::{HeaderMap, HeaderValue, StatusCode, header, request::Parts},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use fresco_core::{AssetId, Identity};
use fresco_error::{AssetError, AssetErrorKind, AuthError, FrescoError, FrescoErrorKind};
use fresco_pipeline::{AssetPipeline, Authenticator, UploadRequest, bearer_token};
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Multipart framing allowance on top of the upload limit.
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Shared state of every request handler.
#[derive(Clone)]
pub struct AppState {
    pipeline: AssetPipeline,
    auth: Arc<dyn Authenticator>,
    shutdown: CancellationToken,
}

impl AppState {
    /// Create API state.
    ///
    /// Requests in flight are cancelled when `shutdown` fires.
    pub fn new(
        pipeline: AssetPipeline,
        auth: Arc<dyn Authenticator>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            pipeline,
            auth,
            shutdown,
        }
    }

    /// The asset pipeline behind the API.
    pub fn pipeline(&self) -> &AssetPipeline {
        &self.pipeline
    }
}

/// Creates the API router.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state
        .pipeline
        .max_upload_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    Router::new()
        .route("/", get(banner))
        .route("/upload", post(upload_image))
        .route("/image/:id", get(read_original).delete(delete_image))
        .route("/image/:id/:variant", get(read_variant))
        .route("/metrics/uploads", get(upload_metrics))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Error response rendered as `{"error": "<message>"}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// HTTP status of this error.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<FrescoError> for ApiError {
    fn from(err: FrescoError) -> Self {
        let (status, message) = match err.kind() {
            FrescoErrorKind::Asset(e) => {
                let status = match &e.kind {
                    AssetErrorKind::UnsupportedMediaType(_)
                    | AssetErrorKind::MissingFile
                    | AssetErrorKind::InvalidId(_) => StatusCode::BAD_REQUEST,
                    AssetErrorKind::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                    AssetErrorKind::NotFound(_) => StatusCode::NOT_FOUND,
                    AssetErrorKind::UploadFailed(_) | AssetErrorKind::DeleteFailed(_) => {
                        StatusCode::BAD_GATEWAY
                    }
                    AssetErrorKind::Cancelled(_) => StatusCode::SERVICE_UNAVAILABLE,
                };
                (status, e.kind.to_string())
            }
            FrescoErrorKind::Auth(e) => (StatusCode::UNAUTHORIZED, e.kind.to_string()),
            FrescoErrorKind::Storage(e) => (StatusCode::BAD_GATEWAY, e.kind.to_string()),
            FrescoErrorKind::Render(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.kind.to_string()),
            FrescoErrorKind::Config(_) | FrescoErrorKind::Server(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        if status.is_server_error() {
            error!(error = %err, %status, "Request failed");
        } else {
            debug!(error = %err, %status, "Request rejected");
        }
        Self { status, message }
    }
}

impl From<AssetError> for ApiError {
    fn from(err: AssetError) -> Self {
        FrescoError::from(err).into()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        FrescoError::from(err).into()
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        warn!(error = %err, "Malformed multipart body");
        Self {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Identity of a caller presenting a valid bearer token.
pub struct Authenticated(pub Identity);

#[axum::async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let token = bearer_token(header)?;
        let identity = state.auth.verify(token).await?;
        Ok(Self(identity))
    }
}

/// Service banner.
async fn banner() -> &'static str {
    "Fresco image API running (upload, read, delete, upload metrics)"
}

/// Upload an image from the multipart field `file`.
#[instrument(skip_all, fields(uploaded_by = %identity))]
async fn upload_image(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut file = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let mime_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        file = Some((bytes, mime_type));
        break;
    }

    let Some((bytes, mime_type)) = file else {
        return Err(AssetError::new(AssetErrorKind::MissingFile).into());
    };

    let cancel = state.shutdown.child_token();
    let outcome = state
        .pipeline
        .upload(UploadRequest::new(bytes, mime_type, identity), &cancel)
        .await?;

    let response = if outcome.is_complete() {
        (
            StatusCode::OK,
            Json(json!({
                "message": "Upload successful",
                "id": outcome.id(),
                "urls": outcome.urls(),
            })),
        )
    } else {
        (
            StatusCode::MULTI_STATUS,
            Json(json!({
                "message": "Upload partially failed",
                "id": outcome.id(),
                "urls": outcome.urls(),
                "failed": outcome.failures(),
            })),
        )
    };
    info!(asset_id = %outcome.id(), status = %response.0, "Upload handled");
    Ok(response.into_response())
}

/// Read the original of an asset.
async fn read_original(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    read_image(state, id, None).await
}

/// Read a named variant of an asset.
async fn read_variant(
    State(state): State<AppState>,
    Path((id, variant)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    read_image(state, id, Some(variant)).await
}

#[instrument(skip(state))]
async fn read_image(
    state: AppState,
    id: String,
    variant: Option<String>,
) -> Result<Response, ApiError> {
    // A malformed id can never name a stored object
    let id: AssetId = id
        .parse()
        .map_err(|_| AssetError::new(AssetErrorKind::NotFound(id.clone())))?;

    let cancel = state.shutdown.child_token();
    let object = state.pipeline.read(&id, variant.as_deref(), &cancel).await?;

    let mut headers = HeaderMap::new();
    let content_type = HeaderValue::from_str(&object.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    headers.insert(header::CONTENT_TYPE, content_type);
    if let Some(length) = object.content_length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    }

    Ok((StatusCode::OK, headers, Body::from_stream(object.body)).into_response())
}

/// Delete every object of an asset.
#[instrument(skip_all, fields(asset_id = %id, deleted_by = %identity))]
async fn delete_image(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id: AssetId = id.parse()?;
    let cancel = state.shutdown.child_token();
    let deleted = state.pipeline.delete(id, &cancel).await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Image deleted", "id": deleted.id() })),
    )
        .into_response())
}

/// Snapshot of every recorded upload.
#[instrument(skip_all, fields(requested_by = %identity))]
async fn upload_metrics(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
) -> Json<Vec<fresco_core::UploadRecord>> {
    Json(state.pipeline.metrics())
}
