//! Static addon manifest and the catalog registry.

use serde::Serialize;

use super::{ContentType, ID_PREFIX};

/// Addon identifier advertised to clients
pub const MANIFEST_ID: &str = "org.cinema.cinemanello";

/// One entry of the catalog registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogDescriptor {
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub id: &'static str,
    pub name: &'static str,
}

/// Catalogs served by this addon, all backed by the shared snapshot
pub const CATALOGS: &[CatalogDescriptor] = &[CatalogDescriptor {
    kind: ContentType::Movie,
    id: "alcinema",
    name: "🍿 Al Cinema",
}];

/// Look up a catalog by its `{type, id}` pair
pub fn find_catalog(kind: &str, id: &str) -> Option<&'static CatalogDescriptor> {
    CATALOGS
        .iter()
        .find(|c| c.kind.as_str() == kind && c.id == id)
}

/// Addon descriptor returned by `/manifest.json`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: &'static str,
    pub version: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub types: Vec<ContentType>,
    pub catalogs: &'static [CatalogDescriptor],
    pub resources: Vec<&'static str>,
    pub id_prefixes: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
}

impl Manifest {
    pub fn new(contact_email: Option<String>) -> Self {
        Self {
            id: MANIFEST_ID,
            version: env!("CARGO_PKG_VERSION"),
            name: "🎬 Cinemanello",
            description: "Film in sala e streaming",
            types: vec![ContentType::Movie],
            catalogs: CATALOGS,
            resources: vec!["catalog", "meta"],
            id_prefixes: vec![ID_PREFIX],
            contact_email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_contains_movie_catalog() {
        let found = find_catalog("movie", "alcinema").expect("movie catalog registered");
        assert_eq!(found.kind, ContentType::Movie);
    }

    #[test]
    fn unknown_pairs_are_not_found() {
        assert!(find_catalog("series", "alcinema").is_none());
        assert!(find_catalog("movie", "top").is_none());
        assert!(find_catalog("", "").is_none());
    }

    #[test]
    fn manifest_serializes_expected_fields() {
        let json = serde_json::to_value(Manifest::new(None)).unwrap();
        assert_eq!(json["id"], MANIFEST_ID);
        assert_eq!(json["types"][0], "movie");
        assert_eq!(json["catalogs"][0]["type"], "movie");
        assert_eq!(json["catalogs"][0]["id"], "alcinema");
        assert_eq!(json["idPrefixes"][0], "tmdb:");
        assert!(json.get("contactEmail").is_none());
    }

    #[test]
    fn manifest_includes_contact_email_when_set() {
        let json = serde_json::to_value(Manifest::new(Some("ops@example.com".into()))).unwrap();
        assert_eq!(json["contactEmail"], "ops@example.com");
    }
}
