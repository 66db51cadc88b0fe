pub mod catalog;
pub mod manifest;
pub mod meta;
pub mod refresh;
pub mod status;

use crate::error::CinemaError;
use axum::{
    http::{StatusCode, header},
    response::IntoResponse,
};

/// Strip the `.json` suffix from a path resource such as `alcinema.json`
pub(crate) fn strip_json(resource: &str) -> Option<&str> {
    resource
        .strip_suffix(".json")
        .filter(|stem| !stem.is_empty())
}

/// `/` points clients at the manifest
pub async fn root_redirect() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "/manifest.json")])
}

pub async fn not_found() -> CinemaError {
    CinemaError::NotFound("Not found".to_string())
}
