use crate::{
    cache::{CacheSettings, CatalogCache, store::SnapshotStore},
    catalog::manifest::Manifest,
    clock::{Clock, SystemClock},
    config::{CatalogSourceType, Config, ConfigError},
    retry::RetryConfig,
    source::{CatalogSource, StaticSource, TmdbSettings, TmdbSource},
};
use metrics_exporter_prometheus::PrometheusHandle;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Owner of the catalog snapshot
    pub catalog: CatalogCache,
    /// Manifest served as-is on every request
    pub manifest: Arc<Manifest>,
    /// Prometheus render handle for `/metrics`
    pub metrics: PrometheusHandle,
    pub started_at: Instant,
}

impl AppState {
    /// Create state with the source selected by `config`
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let source: Arc<dyn CatalogSource> = match config.source {
            CatalogSourceType::Static => Arc::new(StaticSource::new()),
            CatalogSourceType::Tmdb => {
                let api_key = config
                    .tmdb_api_key
                    .clone()
                    .ok_or(ConfigError::MissingCredential("TMDB_API_KEY"))?;

                // Shared HTTP client for connection pooling
                let http_client = Client::builder()
                    .pool_idle_timeout(Duration::from_secs(90))
                    .pool_max_idle_per_host(10)
                    .timeout(config.fetch_timeout)
                    .build()
                    .unwrap_or_else(|e| {
                        warn!("Falling back to default HTTP client: {}", e);
                        Client::new()
                    });

                Arc::new(TmdbSource::new(
                    http_client,
                    TmdbSettings {
                        api_key,
                        api_base: config.tmdb_api_base.clone(),
                        image_base: config.tmdb_image_base.clone(),
                        language: config.tmdb_language.clone(),
                        region: config.tmdb_region.clone(),
                        release_types: config.tmdb_release_types.clone(),
                        days_back: config.days_back,
                        days_ahead: config.days_ahead,
                        max_items: config.max_items,
                    },
                    clock.clone(),
                ))
            }
        };

        Ok(Self::with_source(config, source, clock))
    }

    /// Create state around an explicit source and clock
    pub fn with_source(
        config: Config,
        source: Arc<dyn CatalogSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let settings = CacheSettings {
            ttl: config.cache_ttl,
            retry: RetryConfig {
                max_attempts: config.refresh_max_attempts,
                backoff: config.refresh_backoff,
                timeout: config.fetch_timeout,
            },
            store: config.cache_file.clone().map(SnapshotStore::new),
        };

        Self {
            catalog: CatalogCache::new(source, clock, settings),
            manifest: Arc::new(Manifest::new(config.contact_email.clone())),
            config: Arc::new(config),
            metrics: crate::metrics::init(),
            started_at: Instant::now(),
        }
    }
}
