use cinemanello::{config, server};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Setup logging
    tracing_subscriber::fmt::init();

    info!("🎬 Starting Cinemanello v{}", env!("CARGO_PKG_VERSION"));

    let config = match config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Catalog source: {:?}, cache TTL {}s",
        config.source,
        config.cache_ttl.as_secs()
    );
    if config.source == config::CatalogSourceType::Static && config.tmdb_api_key.is_none() {
        warn!("TMDB_API_KEY not set, serving the built-in static catalog");
    }
    match &config.cache_file {
        Some(path) => info!("Persisting catalog snapshot to {}", path.display()),
        None => warn!("CACHE_FILE not set, catalog snapshot lives in memory only"),
    }

    if let Err(e) = server::start(config).await {
        error!("Failed to start server: {}", e);
        std::process::exit(1);
    }
}
