//! Catalog data shapes served to clients.
//!
//! Every [`CatalogItem`] in a served catalog carries a real poster URL:
//! provider records without a poster are dropped before normalization,
//! never padded with a placeholder image.

pub mod manifest;

use serde::{Deserialize, Serialize};

/// Prefix of every item id produced by this service
pub const ID_PREFIX: &str = "tmdb:";

/// Description used when the provider has no overview
pub const DEFAULT_DESCRIPTION: &str = "Descrizione non disponibile";

/// Content type of a catalog or item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Movie,
    Series,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Movie => "movie",
            ContentType::Series => "series",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "movie" => Some(ContentType::Movie),
            "series" => Some(ContentType::Series),
            _ => None,
        }
    }
}

/// Normalized movie record as listed in a catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub name: String,
    pub year: Option<i32>,
    pub poster: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_info: Option<String>,
}

/// Detail record for a single item, resolved on demand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub name: String,
    pub year: Option<i32>,
    pub poster: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
}

impl From<&CatalogItem> for MetaRecord {
    fn from(item: &CatalogItem) -> Self {
        Self {
            id: item.id.clone(),
            kind: item.kind,
            name: item.name.clone(),
            year: item.year,
            poster: item.poster.clone(),
            background: None,
            description: item.description.clone(),
            release_info: item.release_info.clone(),
            rating: item.rating,
            runtime: None,
            genres: Vec::new(),
        }
    }
}

/// Build a catalog id from a provider id
pub fn item_id(provider_id: i64) -> String {
    format!("{}{}", ID_PREFIX, provider_id)
}

/// Extract the numeric provider id from an `tmdb:<n>` item id
pub fn provider_id(item_id: &str) -> Option<i64> {
    item_id
        .strip_prefix(ID_PREFIX)
        .filter(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|rest| rest.parse().ok())
}

/// Year from the leading four digits of a release date such as `2026-03-01`
pub fn year_from_release_date(date: &str) -> Option<i32> {
    let head = date.get(..4)?;
    if !head.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    head.parse().ok()
}

/// Provider vote average rounded to one decimal, `None` when nobody voted
pub fn rating(vote_average: f64, vote_count: i64) -> Option<f64> {
    if vote_count <= 0 || !vote_average.is_finite() {
        return None;
    }
    Some((vote_average.clamp(0.0, 10.0) * 10.0).round() / 10.0)
}

/// Overview text, or the fixed placeholder when blank
pub fn description(overview: Option<&str>) -> String {
    match overview.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => DEFAULT_DESCRIPTION.to_string(),
    }
}
