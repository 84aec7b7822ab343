//! AventuraBus portal server
//!
//! Serves the React bundle, the admin screens and the JSON endpoints in
//! front of the backend REST API.
//!
//! # Usage
//!
//! ```bash
//! # Backend running on localhost:8080
//! PORTAL_PORT=5000 cargo run --bin server
//! ```

use aventura_portal::metrics::register_business_metrics;
use aventura_portal::{build_router, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,aventura_portal=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting AventuraBus portal...");

    let config = Config::from_env();
    tracing::info!(
        backend = %config.backend.url,
        frontend = %config.frontend_dist.display(),
        google = config.google.client_id.is_some(),
        "Configuration loaded"
    );
    let addr = format!("{}:{}", config.server.host, config.server.port);

    register_business_metrics();
    let state = AppState::from_config(config).await?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Portal listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Portal stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down gracefully...");
}
