use crate::{cache::RefreshReport, metrics, server::state::AppState};
use axum::{Json, extract::State};
use std::time::Instant;
use tracing::info;

/// Manual refresh: fetch now regardless of snapshot age
pub async fn trigger_refresh(State(state): State<AppState>) -> Json<RefreshReport> {
    let start = Instant::now();
    info!("Manual catalog refresh requested");

    let report = state.catalog.refresh().await;

    metrics::record_request("refresh", 200);
    metrics::record_duration("refresh", start);
    Json(report)
}
