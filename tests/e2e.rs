//! End-to-end tests for the Cinemanello server
//!
//! Starts a real Axum server on a random port against a wiremock stand-in for
//! the TMDB API and exercises the HTTP surface with a real client.

use cinemanello::config::{CatalogSourceType, Config};
use cinemanello::server::build_router;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Test server helpers ───────────────────────────────────────────────────────

fn tmdb_config(api_base: &str, cache_file: Option<PathBuf>) -> Config {
    Config {
        port: 0,
        source: CatalogSourceType::Tmdb,
        tmdb_api_key: Some("e2e-key".to_string()),
        tmdb_api_base: api_base.to_string(),
        cache_file,
        ..Config::default()
    }
}

async fn start_server(config: Config) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().unwrap();

    let app = build_router(config).await.expect("router should build");

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

fn discover_body() -> Value {
    json!({
        "page": 1,
        "total_pages": 1,
        "results": [
            {
                "id": 939243,
                "title": "People We Meet on Vacation",
                "release_date": "2026-01-09",
                "poster_path": "/xzZaU0MN6L9oc1pl0RUXSB7hWwD.jpg",
                "overview": "Poppy's a free spirit.",
                "vote_average": 7.14,
                "vote_count": 210
            },
            {
                "id": 1,
                "title": "Posterless",
                "release_date": "2026-01-10",
                "poster_path": null
            },
            {
                "id": 1315303,
                "title": "Primate",
                "release_date": "2026-01-16",
                "poster_path": "/5Q1zdYe9PYEXMGELzjfjyx8Eb7H.jpg",
                "overview": ""
            }
        ]
    })
}

async fn get_json(client: &reqwest::Client, url: String) -> (u16, Value) {
    let resp = client.get(url).send().await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn tmdb_catalog_is_fetched_once_and_normalized() {
    let tmdb = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .and(query_param("api_key", "e2e-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(discover_body()))
        .expect(1)
        .mount(&tmdb)
        .await;

    let addr = start_server(tmdb_config(&tmdb.uri(), None)).await;
    let client = reqwest::Client::new();

    let (status, body) =
        get_json(&client, format!("http://{}/catalog/movie/alcinema.json", addr)).await;
    assert_eq!(status, 200);

    let metas = body["metas"].as_array().unwrap();
    assert_eq!(metas.len(), 2, "posterless record should be dropped");
    assert_eq!(metas[0]["id"], "tmdb:939243");
    assert_eq!(metas[0]["year"], 2026);
    assert_eq!(metas[0]["rating"], 7.1);
    assert_eq!(
        metas[0]["poster"],
        "https://image.tmdb.org/t/p/w500/xzZaU0MN6L9oc1pl0RUXSB7hWwD.jpg"
    );
    assert_eq!(metas[1]["description"], "Descrizione non disponibile");

    // Second request is served from the snapshot
    let (status, again) =
        get_json(&client, format!("http://{}/catalog/movie/alcinema.json", addr)).await;
    assert_eq!(status, 200);
    assert_eq!(again["metas"], body["metas"]);

    let (_, status_body) = get_json(&client, format!("http://{}/status", addr)).await;
    assert_eq!(status_body["source"], "tmdb");
    assert_eq!(status_body["films_count"], 2);
}

#[tokio::test]
async fn persisted_snapshot_survives_restart() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let cache_file = dir.path().join("catalog.json");
    let client = reqwest::Client::new();

    // First process: live upstream, snapshot written to disk
    let healthy = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(discover_body()))
        .expect(1)
        .mount(&healthy)
        .await;

    let first = start_server(tmdb_config(&healthy.uri(), Some(cache_file.clone()))).await;
    let (_, before) =
        get_json(&client, format!("http://{}/catalog/movie/alcinema.json", first)).await;
    assert!(cache_file.exists());

    // Second process: broken upstream that must not even be called
    let broken = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&broken)
        .await;

    let second = start_server(tmdb_config(&broken.uri(), Some(cache_file))).await;
    let (status, after) =
        get_json(&client, format!("http://{}/catalog/movie/alcinema.json", second)).await;

    assert_eq!(status, 200);
    assert_eq!(after["metas"], before["metas"]);
}

#[tokio::test]
async fn failing_upstream_without_snapshot_serves_empty_catalog() {
    let tmdb = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&tmdb)
        .await;

    let addr = start_server(tmdb_config(&tmdb.uri(), None)).await;
    let client = reqwest::Client::new();

    let (status, body) =
        get_json(&client, format!("http://{}/catalog/movie/alcinema.json", addr)).await;
    assert_eq!(status, 200);
    assert_eq!(body["metas"], json!([]));
    assert_eq!(body["cacheMaxAge"], 0);

    let resp = client
        .post(format!("http://{}/refresh", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let report: Value = resp.json().await.unwrap();
    assert_eq!(report["status"], "empty");
    assert_eq!(report["films_count"], 0);
}

#[tokio::test]
async fn tmdb_meta_lookup() {
    let tmdb = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/1315303"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1315303,
            "title": "Primate",
            "release_date": "2026-01-16",
            "poster_path": "/5Q1zdYe9PYEXMGELzjfjyx8Eb7H.jpg",
            "overview": "Lucy, a college student...",
            "runtime": 89,
            "genres": [{"id": 27, "name": "Horror"}]
        })))
        .mount(&tmdb)
        .await;
    Mock::given(method("GET"))
        .and(path("/movie/404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&tmdb)
        .await;

    let addr = start_server(tmdb_config(&tmdb.uri(), None)).await;
    let client = reqwest::Client::new();

    let (status, body) =
        get_json(&client, format!("http://{}/meta/movie/tmdb:1315303.json", addr)).await;
    assert_eq!(status, 200);
    assert_eq!(body["meta"]["name"], "Primate");
    assert_eq!(body["meta"]["runtime"], "89 min");
    assert_eq!(body["meta"]["genres"], json!(["Horror"]));

    let (status, body) =
        get_json(&client, format!("http://{}/meta/movie/tmdb:404.json", addr)).await;
    assert_eq!(status, 404);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn cors_headers_over_the_wire() {
    let addr = start_server(Config {
        port: 0,
        ..Config::default()
    })
    .await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("http://{}/manifest.json", addr))
        .header("Origin", "https://app.example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );

    let resp = client
        .request(reqwest::Method::OPTIONS, format!("http://{}/catalog/movie/alcinema.json", addr))
        .header("Origin", "https://app.example.com")
        .header("Access-Control-Request-Method", "GET")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("access-control-max-age").unwrap(),
        "86400"
    );
}
