//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own, without `.env` loading.
//!
//! ## Intended use
//! Useful for development and debugging. The workspace's main `cdss-run` binary serves the same
//! router and also reads a `.env` file.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use cdss_core::config::{data_dir_from_env_value, rest_addr_from_env_value};
use cdss_core::{CoreConfig, DocumentStore, PlanService};

/// Main entry point for the CDSS REST API server
///
/// # Environment Variables
/// - `PORT`: Port to listen on, all interfaces (default: 5000)
/// - `CDSS_DATA_DIR`: Document store directory (default: "cdss_data"), must exist
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the port or data directory is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("cdss_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = rest_addr_from_env_value(std::env::var("PORT").ok())?;
    let data_dir = data_dir_from_env_value(std::env::var("CDSS_DATA_DIR").ok());

    tracing::info!("-- Starting CDSS REST API on {}", addr);

    let cfg = Arc::new(CoreConfig::new(data_dir)?);
    let store = Arc::new(DocumentStore::open(cfg)?);
    tracing::info!("-- Document store ready at {}", store.config().data_dir().display());

    let app = router(AppState::new(PlanService::new(store)));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
