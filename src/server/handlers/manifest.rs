use crate::server::state::AppState;
use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};

/// Serve the static addon manifest
pub async fn serve_manifest(State(state): State<AppState>) -> Response {
    Json(state.manifest.as_ref()).into_response()
}

/// Prometheus text exposition
pub async fn serve_metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}
