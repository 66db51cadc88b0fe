//! TMDB-backed catalog source.
//!
//! Lists movies released in a rolling window around today through the
//! `/discover/movie` endpoint and resolves single items through `/movie/{id}`.

use super::{CatalogSource, SourceKind, UpstreamError};
use crate::catalog::{self, CatalogItem, ContentType, MetaRecord};
use crate::clock::Clock;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use std::sync::Arc;
use tracing::{debug, info};

/// Query settings for the TMDB source
#[derive(Debug, Clone)]
pub struct TmdbSettings {
    pub api_key: String,
    /// API root, e.g. `https://api.themoviedb.org/3`
    pub api_base: String,
    /// Image root prepended to poster paths, e.g. `https://image.tmdb.org/t/p/w500`
    pub image_base: String,
    pub language: String,
    pub region: String,
    /// TMDB release type filter, `|`-separated (2 = limited theatrical, 3 = theatrical)
    pub release_types: String,
    pub days_back: i64,
    pub days_ahead: i64,
    pub max_items: usize,
}

#[derive(Debug, Deserialize)]
struct DiscoverPage {
    #[serde(default)]
    results: Vec<RawMovie>,
}

/// Movie record as returned by `/discover/movie`
#[derive(Debug, Clone, Deserialize)]
pub struct RawMovie {
    pub id: i64,
    pub title: Option<String>,
    pub release_date: Option<String>,
    pub poster_path: Option<String>,
    pub overview: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: i64,
}

#[derive(Debug, Deserialize)]
struct RawGenre {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawMovieDetail {
    #[serde(flatten)]
    movie: RawMovie,
    backdrop_path: Option<String>,
    runtime: Option<u32>,
    #[serde(default)]
    genres: Vec<RawGenre>,
}

/// Catalog source querying the TMDB v3 API
pub struct TmdbSource {
    client: Client,
    settings: TmdbSettings,
    clock: Arc<dyn Clock>,
}

impl TmdbSource {
    pub fn new(client: Client, settings: TmdbSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            settings,
            clock,
        }
    }

    /// Release-date window `(from, to)` relative to today
    ///
    /// Fails instead of panicking when the configured span leaves chrono's
    /// date range.
    pub fn date_window(&self) -> Result<(NaiveDate, NaiveDate), UpstreamError> {
        let today = self.clock.now().date_naive();
        let from = Duration::try_days(self.settings.days_back)
            .and_then(|back| today.checked_sub_signed(back));
        let to = Duration::try_days(self.settings.days_ahead)
            .and_then(|ahead| today.checked_add_signed(ahead));

        match (from, to) {
            (Some(from), Some(to)) => Ok((from, to)),
            _ => Err(UpstreamError::InvalidWindow {
                days_back: self.settings.days_back,
                days_ahead: self.settings.days_ahead,
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.api_base.trim_end_matches('/'), path)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, UpstreamError> {
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

/// Join an image root and a provider path
fn image_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// Map a raw provider record into a catalog item
///
/// Returns `None` for records without a title or without a poster.
pub fn normalize(raw: &RawMovie, image_base: &str) -> Option<CatalogItem> {
    let name = raw.title.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
    let poster_path = raw.poster_path.as_deref().filter(|p| !p.is_empty())?;
    let release = raw.release_date.as_deref().filter(|d| !d.is_empty());

    Some(CatalogItem {
        id: catalog::item_id(raw.id),
        kind: ContentType::Movie,
        name: name.to_string(),
        year: release.and_then(catalog::year_from_release_date),
        poster: image_url(image_base, poster_path),
        description: catalog::description(raw.overview.as_deref()),
        rating: catalog::rating(raw.vote_average, raw.vote_count),
        release_info: release.map(str::to_string),
    })
}

#[async_trait]
impl CatalogSource for TmdbSource {
    async fn fetch(&self) -> Result<Vec<CatalogItem>, UpstreamError> {
        let (from, to) = self.date_window()?;
        let from = from.format("%Y-%m-%d").to_string();
        let to = to.format("%Y-%m-%d").to_string();
        let s = &self.settings;

        info!("Querying TMDB discover for releases {} .. {}", from, to);

        let response = self
            .client
            .get(self.url("/discover/movie"))
            .query(&[
                ("api_key", s.api_key.as_str()),
                ("language", s.language.as_str()),
                ("region", s.region.as_str()),
                ("sort_by", "popularity.desc"),
                ("include_adult", "false"),
                ("primary_release_date.gte", from.as_str()),
                ("primary_release_date.lte", to.as_str()),
                ("with_release_type", s.release_types.as_str()),
                ("page", "1"),
            ])
            .send()
            .await?;

        let page: DiscoverPage = Self::decode(response).await?;
        let total = page.results.len();

        let items: Vec<CatalogItem> = page
            .results
            .iter()
            .filter_map(|raw| normalize(raw, &s.image_base))
            .take(s.max_items)
            .collect();

        debug!(
            "TMDB returned {} records, {} usable after filtering",
            total,
            items.len()
        );
        Ok(items)
    }

    async fn meta(&self, id: &str) -> Result<Option<MetaRecord>, UpstreamError> {
        let Some(provider_id) = catalog::provider_id(id) else {
            return Ok(None);
        };
        let s = &self.settings;

        let response = self
            .client
            .get(self.url(&format!("/movie/{}", provider_id)))
            .query(&[
                ("api_key", s.api_key.as_str()),
                ("language", s.language.as_str()),
            ])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let detail: RawMovieDetail = Self::decode(response).await?;

        // Same completeness rule as the catalog: no poster, no item
        let Some(item) = normalize(&detail.movie, &s.image_base) else {
            return Ok(None);
        };

        let mut meta = MetaRecord::from(&item);
        meta.background = detail
            .backdrop_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| image_url(&s.image_base, p));
        meta.runtime = detail
            .runtime
            .filter(|m| *m > 0)
            .map(|m| format!("{} min", m));
        meta.genres = detail.genres.into_iter().map(|g| g.name).collect();

        Ok(Some(meta))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Tmdb
    }
}
