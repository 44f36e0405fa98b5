//! Assembly of a running Fresco server from configuration.

use crate::{AppState, FrescoConfig, StorageBackend, create_router};
use fresco_error::{FrescoResult, ServerError, ServerErrorKind};
use fresco_ledger::{PurgeHandle, PurgeScheduler, RetentionLedger};
use fresco_pipeline::{
    AssetPipeline, AssetPipelineBuilder, AuthenticatorChain, JwtAuthenticator,
    StaticTokenAuthenticator,
};
use fresco_render::ImageRenderer;
use fresco_storage::{BlobStore, FileSystemBlobStore, MemoryBlobStore, S3BlobStore};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Open the blob store selected by the configuration.
///
/// # Errors
///
/// Returns an error if the filesystem backend's directory cannot be created
/// or the S3 backend is missing its bucket or credentials.
#[instrument(skip(config), fields(backend = %config.storage().backend()))]
pub fn build_store(config: &FrescoConfig) -> FrescoResult<Arc<dyn BlobStore>> {
    let store: Arc<dyn BlobStore> = match config.storage().backend() {
        StorageBackend::Memory => {
            warn!("Using in-memory blob store; objects are lost on restart");
            Arc::new(MemoryBlobStore::new())
        }
        StorageBackend::Filesystem => {
            Arc::new(FileSystemBlobStore::new(config.storage().path())?)
        }
        StorageBackend::S3 => Arc::new(S3BlobStore::new(config.storage().s3())?),
    };
    Ok(store)
}

/// Build the asset pipeline over `store` from the configuration.
///
/// # Errors
///
/// Returns a configuration error if the pipeline cannot be assembled.
pub fn build_pipeline(
    config: &FrescoConfig,
    store: Arc<dyn BlobStore>,
) -> FrescoResult<AssetPipeline> {
    let pipeline = AssetPipelineBuilder::default()
        .store(store)
        .renderer(Arc::new(ImageRenderer::new(*config.upload().jpeg_quality())))
        .retention(RetentionLedger::in_memory())
        .cdn_base_url(config.storage().cdn_base_url().clone())
        .max_upload_bytes(*config.upload().max_bytes())
        .store_timeout(config.upload().store_timeout())
        .build()?;
    Ok(pipeline)
}

/// Build the bearer-token verifier: the static token table first, then
/// JWTs when a secret is configured.
pub fn build_authenticator(config: &FrescoConfig) -> AuthenticatorChain {
    let mut chain = AuthenticatorChain::new();
    if !config.auth().tokens().is_empty() {
        chain = chain.with(Arc::new(StaticTokenAuthenticator::new(
            config.auth().tokens().clone(),
        )));
    }
    if let Some(secret) = config.auth().jwt_secret().as_deref().filter(|s| !s.is_empty()) {
        chain = chain.with(Arc::new(JwtAuthenticator::new(secret)));
    }
    info!(verifiers = chain.len(), "Configured authentication");
    chain
}

/// A configured server, ready to accept connections.
pub struct FrescoServer {
    listener: TcpListener,
    state: AppState,
    purge: PurgeHandle,
    shutdown: CancellationToken,
}

impl FrescoServer {
    /// Bind the listener and start background work.
    ///
    /// Spawns the retention purge loop on the current runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or the address cannot
    /// be bound.
    #[instrument(skip(config), fields(bind = %config.server().bind()))]
    pub async fn bind(config: &FrescoConfig) -> FrescoResult<Self> {
        let store = build_store(config)?;
        let pipeline = build_pipeline(config, store)?;
        let auth = build_authenticator(config);
        if auth.is_empty() {
            warn!("No auth tokens or JWT secret configured; upload, delete and metrics will reject every request");
        }

        let listener = TcpListener::bind(config.server().bind())
            .await
            .map_err(|e| {
                ServerError::new(ServerErrorKind::Bind(format!(
                    "{}: {}",
                    config.server().bind(),
                    e
                )))
            })?;

        let purge = PurgeScheduler::new(pipeline.retention().clone())
            .with_interval(config.retention().purge_interval())
            .with_window(config.retention().window())
            .spawn();

        let shutdown = CancellationToken::new();
        let state = AppState::new(pipeline, Arc::new(auth), shutdown.clone());

        Ok(Self {
            listener,
            state,
            purge,
            shutdown,
        })
    }

    /// Address the server is listening on.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket address cannot be read.
    pub fn local_addr(&self) -> FrescoResult<SocketAddr> {
        self.listener.local_addr().map_err(|e| {
            ServerError::new(ServerErrorKind::Bind(format!("local address: {}", e))).into()
        })
    }

    /// Shared handler state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serve requests until `signal` completes, then stop the purge loop.
    ///
    /// Requests still in flight when the signal fires are cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails while serving.
    pub async fn run_until<F>(self, signal: F) -> FrescoResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Self {
            listener,
            state,
            purge,
            shutdown,
        } = self;

        let app = create_router(state);
        let graceful = shutdown.clone();
        info!("Fresco server listening");

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                signal.await;
                info!("Shutdown signal received");
                graceful.cancel();
            })
            .await;

        shutdown.cancel();
        purge.shutdown().await;

        result.map_err(|e| ServerError::new(ServerErrorKind::Serve(e.to_string())).into())
    }
}
