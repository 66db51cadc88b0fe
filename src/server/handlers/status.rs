use crate::{server::state::AppState, source::SourceKind};
use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
pub struct StatusResponse {
    status: &'static str,
    version: &'static str,
    source: SourceKind,
    cache_age_seconds: Option<i64>,
    films_count: usize,
    expired: bool,
    last_update: Option<DateTime<Utc>>,
    next_refresh: Option<DateTime<Utc>>,
    ttl_seconds: u64,
    uptime_seconds: u64,
}

/// Cache diagnostics; never triggers a fetch
pub async fn serve_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let cache = state.catalog.status();

    Json(StatusResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        source: cache.source,
        cache_age_seconds: cache.age_seconds,
        films_count: cache.item_count,
        expired: cache.expired,
        last_update: cache.fetched_at,
        next_refresh: cache.next_refresh,
        ttl_seconds: cache.ttl_seconds,
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}
