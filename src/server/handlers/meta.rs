use super::strip_json;
use crate::{
    catalog::{ContentType, MetaRecord},
    error::{CinemaError, Result},
    metrics,
    retry::{RetryConfig, attempt_with_retry},
    server::state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Serialize)]
pub struct MetaResponse {
    meta: MetaRecord,
}

/// Resolve one item through the catalog source
///
/// When the provider is down, an item still present in the snapshot is
/// served in its short catalog form.
pub async fn serve_meta(
    Path((kind, resource)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<MetaResponse>> {
    let start = Instant::now();

    let id = match (ContentType::parse(&kind), strip_json(&resource)) {
        (Some(ContentType::Movie), Some(id)) => id,
        _ => {
            metrics::record_request("meta", 404);
            return Err(CinemaError::NotFound("Meta not found".to_string()));
        }
    };

    info!("Meta requested: type={}, id={}", kind, id);

    let lookup = RetryConfig {
        max_attempts: 1,
        timeout: state.config.fetch_timeout,
        ..RetryConfig::default()
    };
    let source = state.catalog.source();
    let result = attempt_with_retry(&lookup, "Meta lookup", || source.meta(id)).await;

    let meta = match result {
        Ok(Some(meta)) => meta,
        Ok(None) => {
            metrics::record_request("meta", 404);
            return Err(CinemaError::NotFound("Meta not found".to_string()));
        }
        Err(e) => {
            metrics::record_upstream_error();
            let cached = state
                .catalog
                .snapshot()
                .and_then(|s| s.items.iter().find(|item| item.id == id).map(MetaRecord::from));

            match cached {
                Some(meta) => {
                    warn!("Meta lookup for {} failed, serving cached item: {}", id, e);
                    meta
                }
                None => {
                    metrics::record_request("meta", 502);
                    return Err(e.into());
                }
            }
        }
    };

    metrics::record_request("meta", 200);
    metrics::record_duration("meta", start);
    Ok(Json(MetaResponse { meta }))
}
