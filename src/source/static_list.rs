use super::{CatalogSource, SourceKind, UpstreamError};
use crate::catalog::{CatalogItem, ContentType, MetaRecord};
use async_trait::async_trait;

/// Hardcoded catalog used when no TMDB credential is configured
#[derive(Debug, Clone)]
pub struct StaticSource {
    items: Vec<CatalogItem>,
}

impl StaticSource {
    /// The built-in film list
    pub fn new() -> Self {
        Self::with_items(vec![
            film(
                939243,
                "People We Meet on Vacation",
                "/xzZaU0MN6L9oc1pl0RUXSB7hWwD.jpg",
                "Poppy's a free spirit. Alex loves a plan...",
            ),
            film(
                1315303,
                "Primate",
                "/5Q1zdYe9PYEXMGELzjfjyx8Eb7H.jpg",
                "Lucy, a college student, along with her friends...",
            ),
            film(
                533528,
                "Greenland 2: Migration",
                "/poster.jpg",
                "La continuazione di Greenland...",
            ),
        ])
    }

    pub fn with_items(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }
}

impl Default for StaticSource {
    fn default() -> Self {
        Self::new()
    }
}

fn film(id: i64, name: &str, poster_path: &str, description: &str) -> CatalogItem {
    CatalogItem {
        id: crate::catalog::item_id(id),
        kind: ContentType::Movie,
        name: name.to_string(),
        year: Some(2026),
        poster: format!("https://image.tmdb.org/t/p/w500{}", poster_path),
        description: description.to_string(),
        rating: None,
        release_info: None,
    }
}

#[async_trait]
impl CatalogSource for StaticSource {
    async fn fetch(&self) -> Result<Vec<CatalogItem>, UpstreamError> {
        Ok(self.items.clone())
    }

    async fn meta(&self, id: &str) -> Result<Option<MetaRecord>, UpstreamError> {
        Ok(self
            .items
            .iter()
            .find(|item| item.id == id)
            .map(MetaRecord::from))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Static
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_builtin_films() {
        let source = StaticSource::new();
        let items = source.fetch().await.unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].id, "tmdb:939243");
        assert!(items.iter().all(|i| i.poster.starts_with("https://")));
        assert!(items.iter().all(|i| i.kind == ContentType::Movie));
    }

    #[tokio::test]
    async fn meta_resolves_known_ids_only() {
        let source = StaticSource::new();

        let meta = source.meta("tmdb:1315303").await.unwrap().unwrap();
        assert_eq!(meta.name, "Primate");

        assert!(source.meta("tmdb:42").await.unwrap().is_none());
    }
}
