//! `dummy-bakalari`: mock Bakaláři API server.
//!
//! Usage:
//!   APP_ADDRESS=:8080 dummy-bakalari
//!
//! `BAKALARI_DIRECTORY_URL` overrides the directory sampled for version numbers.

use dummy_bakalari::{HttpDirectory, MemoryStore, ServerConfig, VersionCache, api};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let directory = HttpDirectory::try_new(config.directory_url.clone())?;
    let versions = VersionCache::start(directory);
    let app = api::router(versions, MemoryStore::new());

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!("Listening on: {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
