pub mod cors;
pub mod handlers;
pub mod refresher;
pub mod state;

use crate::config::{Config, ConfigError};
use axum::{
    Router,
    routing::{get, post},
};
use state::AppState;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Build the router for `config`, seeding the cache from disk when enabled
pub async fn build_router(config: Config) -> Result<Router, ConfigError> {
    let state = AppState::new(config)?;
    state.catalog.restore().await;
    Ok(router(state))
}

/// Routing table over an existing state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root_redirect))
        .route("/manifest.json", get(handlers::manifest::serve_manifest))
        .route(
            "/catalog/{kind}/{resource}",
            get(handlers::catalog::serve_catalog),
        )
        .route("/meta/{kind}/{resource}", get(handlers::meta::serve_meta))
        .route("/status", get(handlers::status::serve_status))
        .route("/refresh", post(handlers::refresh::trigger_refresh))
        .route("/metrics", get(handlers::manifest::serve_metrics))
        .fallback(handlers::not_found)
        .layer(cors::cors_layer())
        .with_state(state)
}

/// Start the Axum HTTP server
pub async fn start(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("0.0.0.0:{}", config.port);
    let background = config
        .background_refresh
        .then_some(config.background_check_interval);

    // Create shared application state
    let state = AppState::new(config)?;
    state.catalog.restore().await;

    let shutdown = CancellationToken::new();
    let refresher = background.map(|interval| {
        refresher::spawn_refresher(state.catalog.clone(), interval, shutdown.clone())
    });

    let app = router(state);

    // Bind TCP listener
    let listener = match tokio::net::TcpListener::bind(addr.as_str()).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to address {}: {}", addr, e);
            return Err(e.into());
        }
    };

    info!("🚀 Server listening on http://{}", addr);
    info!("📋 Manifest: http://{}/manifest.json", addr);

    let signal = shutdown.clone();
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
            signal.cancel();
        })
        .await;

    shutdown.cancel();
    if let Some(handle) = refresher
        && let Err(e) = handle.await
    {
        warn!("Background refresher ended abnormally: {}", e);
    }

    if let Err(e) = served {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
