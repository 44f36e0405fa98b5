//! Fresco server - image upload, rendition and delivery service.
//!
//! Loads configuration, installs logging, and serves the HTTP API until
//! interrupted.

use clap::Parser;
use fresco_server::{FrescoConfig, FrescoServer, LoggingConfig, init_logging};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{error, info};

/// Command-line arguments for the Fresco server.
#[derive(Parser, Debug)]
#[command(name = "fresco")]
#[command(about = "Fresco - image asset storage with automatic renditions")]
#[command(version)]
struct Args {
    /// Path to a configuration file layered over the defaults
    #[arg(short, long, env = "FRESCO_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the configuration
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = FrescoConfig::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config = config.with_bind(bind);
    }
    if args.verbose {
        config = config.with_log_level("debug");
    }

    init_logging(&LoggingConfig {
        log_level: config.server().log_level().clone(),
        json_logs: *config.server().json_logs(),
    })?;

    info!(
        bind = %config.server().bind(),
        backend = %config.storage().backend(),
        cdn_base_url = %config.storage().cdn_base_url(),
        max_upload_bytes = config.upload().max_bytes(),
        "Starting Fresco server"
    );

    let server = FrescoServer::bind(&config).await?;
    info!(addr = %server.local_addr()?, "Listening");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    };

    server.run_until(shutdown).await?;
    info!("Fresco server stopped");
    Ok(())
}
