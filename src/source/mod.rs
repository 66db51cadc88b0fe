pub mod static_list;
pub mod tmdb;

use crate::catalog::{CatalogItem, MetaRecord};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

pub use static_list::StaticSource;
pub use tmdb::{TmdbSettings, TmdbSource};

/// Failure talking to the upstream metadata provider
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider returned HTTP {0}")]
    Status(u16),

    #[error("malformed provider response: {0}")]
    Decode(String),

    #[error("provider did not answer within {0:?}")]
    Timeout(Duration),

    #[error("release window of -{days_back}/+{days_ahead} days is out of range")]
    InvalidWindow { days_back: i64, days_ahead: i64 },
}

/// Which kind of source backs the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Static,
    Tmdb,
}

/// Trait for catalog content providers
///
/// Sources are stateless: they return a fresh item list or fail, and never
/// touch cache state. Retries and timeouts belong to the caller.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the current catalog, in provider order, already normalized
    async fn fetch(&self) -> Result<Vec<CatalogItem>, UpstreamError>;

    /// Resolve one item by its catalog id
    ///
    /// Returns `Ok(None)` when the id is unknown to the provider.
    async fn meta(&self, id: &str) -> Result<Option<MetaRecord>, UpstreamError>;

    fn kind(&self) -> SourceKind;
}
