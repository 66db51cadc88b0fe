use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::source::UpstreamError;

/// Errors surfaced by HTTP handlers
#[derive(Debug, Error)]
pub enum CinemaError {
    #[error("{0}")]
    NotFound(String),

    #[error("Upstream provider error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CinemaError>;

impl IntoResponse for CinemaError {
    fn into_response(self) -> Response {
        // Client bodies stay short; details only go to the log
        let (status, message) = match &self {
            CinemaError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            CinemaError::Upstream(e) => {
                warn!("Upstream failure while serving request: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "Upstream provider unavailable".to_string(),
                )
            }
            CinemaError::Internal(detail) => {
                error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
