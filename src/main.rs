use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use cdss_core::config::{data_dir_from_env_value, rest_addr_from_env_value};
use cdss_core::{CoreConfig, DocumentStore, PlanService};

/// Main entry point for the CDSS application
///
/// Loads `.env`, opens the document store and serves the REST API until Ctrl-C.
///
/// The store is opened exactly once here and handed to the services; nothing below this
/// function reads the environment.
///
/// # Environment Variables
/// - `PORT`: REST port, bound on all interfaces (default: 5000)
/// - `CDSS_DATA_DIR`: Document store directory (default: "cdss_data"), must exist
///
/// # Returns
/// * `Ok(())` - If the server runs and shuts down cleanly
/// * `Err(anyhow::Error)` - If the store is unavailable or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cdss_run=info".parse()?)
                .add_directive("cdss_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = rest_addr_from_env_value(std::env::var("PORT").ok())?;
    let data_dir = data_dir_from_env_value(std::env::var("CDSS_DATA_DIR").ok());

    let cfg = match CoreConfig::new(data_dir) {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            tracing::error!("document store unavailable: {}", e);
            return Err(e.into());
        }
    };
    let store = Arc::new(DocumentStore::open(cfg)?);
    tracing::info!(
        "++ Document store connection established at {}",
        store.config().data_dir().display()
    );

    let app = router(AppState::new(PlanService::new(store)));

    tracing::info!("++ Starting CDSS REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("-- Shutting down");
        })
        .await?;

    Ok(())
}
