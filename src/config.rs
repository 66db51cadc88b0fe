use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::cache::DEFAULT_TTL;
use crate::retry::{DEFAULT_BACKOFF_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT_SECS};

/// Catalog source selection
#[derive(Clone, Debug, PartialEq)]
pub enum CatalogSourceType {
    /// Built-in film list, no credential needed
    Static,
    /// Live TMDB discover queries
    Tmdb,
}

/// Fatal configuration problems detected at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required when CATALOG_SOURCE=tmdb")]
    MissingCredential(&'static str),

    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    /// Where catalog data comes from
    pub source: CatalogSourceType,
    /// TMDB v3 API key (required for the TMDB source)
    pub tmdb_api_key: Option<String>,
    pub tmdb_api_base: String,
    pub tmdb_image_base: String,
    pub tmdb_language: String,
    pub tmdb_region: String,
    /// TMDB `with_release_type` filter, e.g. `2|3`
    pub tmdb_release_types: String,
    /// Lower bound of the release window, in days before today
    pub days_back: i64,
    /// Upper bound of the release window, in days after today
    pub days_ahead: i64,
    /// Maximum catalog size
    pub max_items: usize,
    pub cache_ttl: Duration,
    /// Snapshot file; persistence is off when unset
    pub cache_file: Option<PathBuf>,
    /// Per-attempt upstream timeout
    pub fetch_timeout: Duration,
    pub refresh_max_attempts: u32,
    pub refresh_backoff: Duration,
    /// Refresh in the background instead of only on demand
    pub background_refresh: bool,
    pub background_check_interval: Duration,
    pub contact_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            source: CatalogSourceType::Static,
            tmdb_api_key: None,
            tmdb_api_base: "https://api.themoviedb.org/3".to_string(),
            tmdb_image_base: "https://image.tmdb.org/t/p/w500".to_string(),
            tmdb_language: "it-IT".to_string(),
            tmdb_region: "IT".to_string(),
            tmdb_release_types: "2|3".to_string(),
            days_back: 20,
            days_ahead: 7,
            max_items: 50,
            cache_ttl: DEFAULT_TTL,
            cache_file: None,
            fetch_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            refresh_max_attempts: DEFAULT_MAX_ATTEMPTS,
            refresh_backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
            background_refresh: false,
            background_check_interval: Duration::from_secs(300),
            contact_email: None,
        }
    }
}

/// Read a non-empty variable
fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a variable, falling back to `default` when unset
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var: name, value: raw }),
        None => Ok(default),
    }
}

/// Widest release window accepted on either side of today
pub const MAX_WINDOW_DAYS: i64 = 3650;

fn days_var(name: &'static str, default: i64) -> Result<i64, ConfigError> {
    let days = parse_var(name, default)?;
    if !(0..=MAX_WINDOW_DAYS).contains(&days) {
        return Err(ConfigError::InvalidValue {
            var: name,
            value: days.to_string(),
        });
    }
    Ok(days)
}

fn url_var(name: &'static str, default: String) -> Result<String, ConfigError> {
    let value = var(name).unwrap_or(default);
    match Url::parse(&value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            Ok(value.trim_end_matches('/').to_string())
        }
        _ => Err(ConfigError::InvalidValue { var: name, value }),
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Every variable has a default. `CATALOG_SOURCE=tmdb` requires
    /// `TMDB_API_KEY`; the default `auto` picks TMDB when a key is present
    /// and the static list otherwise.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let tmdb_api_key = var("TMDB_API_KEY");

        let source = match var("CATALOG_SOURCE")
            .unwrap_or_else(|| "auto".to_string())
            .to_lowercase()
            .as_str()
        {
            "tmdb" => {
                if tmdb_api_key.is_none() {
                    return Err(ConfigError::MissingCredential("TMDB_API_KEY"));
                }
                CatalogSourceType::Tmdb
            }
            "static" => CatalogSourceType::Static,
            "auto" => {
                if tmdb_api_key.is_some() {
                    CatalogSourceType::Tmdb
                } else {
                    CatalogSourceType::Static
                }
            }
            other => {
                return Err(ConfigError::InvalidValue {
                    var: "CATALOG_SOURCE",
                    value: other.to_string(),
                });
            }
        };

        let cache_ttl_ms = parse_var("CACHE_TTL_MS", defaults.cache_ttl.as_millis() as u64)?;
        if cache_ttl_ms == 0 {
            return Err(ConfigError::InvalidValue {
                var: "CACHE_TTL_MS",
                value: "0".to_string(),
            });
        }

        let fetch_timeout_secs =
            parse_var("FETCH_TIMEOUT_SECS", defaults.fetch_timeout.as_secs())?;
        if fetch_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                var: "FETCH_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }

        Ok(Config {
            port: parse_var("PORT", defaults.port)?,
            source,
            tmdb_api_key,
            tmdb_api_base: url_var("TMDB_API_BASE", defaults.tmdb_api_base)?,
            tmdb_image_base: url_var("TMDB_IMAGE_BASE", defaults.tmdb_image_base)?,
            tmdb_language: var("TMDB_LANGUAGE").unwrap_or(defaults.tmdb_language),
            tmdb_region: var("TMDB_REGION").unwrap_or(defaults.tmdb_region),
            tmdb_release_types: var("TMDB_RELEASE_TYPES").unwrap_or(defaults.tmdb_release_types),
            days_back: days_var("CATALOG_DAYS_BACK", defaults.days_back)?,
            days_ahead: days_var("CATALOG_DAYS_AHEAD", defaults.days_ahead)?,
            max_items: parse_var("CATALOG_MAX_ITEMS", defaults.max_items)?,
            cache_ttl: Duration::from_millis(cache_ttl_ms),
            cache_file: var("CACHE_FILE").map(PathBuf::from),
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            refresh_max_attempts: parse_var("REFRESH_MAX_ATTEMPTS", defaults.refresh_max_attempts)?,
            refresh_backoff: Duration::from_millis(parse_var(
                "REFRESH_BACKOFF_MS",
                defaults.refresh_backoff.as_millis() as u64,
            )?),
            background_refresh: parse_var("BACKGROUND_REFRESH", defaults.background_refresh)?,
            background_check_interval: Duration::from_secs(parse_var(
                "BACKGROUND_CHECK_SECS",
                defaults.background_check_interval.as_secs(),
            )?),
            contact_email: var("CONTACT_EMAIL"),
        })
    }
}
