use super::strip_json;
use crate::{
    catalog::{CatalogItem, manifest::find_catalog},
    error::{CinemaError, Result},
    metrics,
    server::state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::time::Instant;
use tracing::info;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CatalogResponse<'a> {
    metas: &'a [CatalogItem],
    /// Seconds clients may cache this response
    cache_max_age: u64,
}

/// Serve a registered catalog from the snapshot cache
///
/// Unknown `{type, id}` pairs are a 404, never an empty 200. A known catalog
/// with nothing cached and a failing upstream answers with empty `metas`.
pub async fn serve_catalog(
    Path((kind, resource)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Response> {
    let start = Instant::now();

    let Some(descriptor) = strip_json(&resource).and_then(|id| find_catalog(&kind, id)) else {
        metrics::record_request("catalog", 404);
        return Err(CinemaError::NotFound("Catalog not found".to_string()));
    };

    info!(
        "Catalog requested: type={}, id={}",
        descriptor.kind.as_str(),
        descriptor.id
    );

    let snapshot = state.catalog.get_snapshot(false).await;
    let response = match &snapshot {
        Some(snapshot) => Json(CatalogResponse {
            metas: &snapshot.items,
            cache_max_age: state.catalog.remaining_secs(snapshot),
        })
        .into_response(),
        None => Json(CatalogResponse {
            metas: &[],
            cache_max_age: 0,
        })
        .into_response(),
    };

    metrics::record_request("catalog", 200);
    metrics::record_duration("catalog", start);
    Ok(response)
}
