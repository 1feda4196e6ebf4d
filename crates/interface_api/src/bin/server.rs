//! TPA Quote Core - API Server Binary
//!
//! Starts the HTTP API for vehicle service contract quoting.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration (no products loaded)
//! cargo run --bin tpa-quote-api
//!
//! # Run with a product catalog and JSON logs
//! API_CATALOG_PATH=./catalog.json API_LOG_JSON=true cargo run --bin tpa-quote-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_LOG_JSON` - Emit JSON log lines (default: false)
//! * `API_CATALOG_PATH` - Product catalog document
//! * `API_DEFAULT_TAX_PERCENT` - Replaces the catalog's default tax percentage
//! * `API_NUMBER_ATTEMPTS` - Number draws before giving up on a unique number (default: 3)

use anyhow::Context;
use interface_api::{build_service, config::ApiConfig, create_router};
use domain_quote::ProductCatalog;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Main entry point for the API server.
///
/// Loads configuration, initializes logging, loads and validates the product
/// catalog, then serves until Ctrl+C or SIGTERM.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid API_* configuration")?;

    init_tracing(&config.log_level, config.log_json);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting TPA Quote API Server"
    );

    let catalog = load_catalog(&config)?;
    let service = build_service(&config, catalog).context("invalid service configuration")?;

    let app = create_router(Arc::new(service), config.clone());

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid server address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads the catalog named in the configuration.
///
/// A missing path is allowed so the server can start for health checks, but
/// every quote request will then fail with product not found.
fn load_catalog(config: &ApiConfig) -> anyhow::Result<ProductCatalog> {
    match &config.catalog_path {
        Some(path) => ProductCatalog::from_file(path)
            .with_context(|| format!("failed to load product catalog {path}")),
        None => {
            tracing::warn!("API_CATALOG_PATH not set, starting with an empty product catalog");
            Ok(ProductCatalog::default())
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// In-flight requests are allowed to complete before the process exits. If a
/// handler cannot be installed the server keeps running on the other one.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
