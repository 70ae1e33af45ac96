use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Request-level errors for the gateway.
///
/// The distinctions matter to the dashboard: a `Validation` failure means the
/// operator's input was wrong, `BackendUnavailable` means the engine is down,
/// and `NotFound` on a stop request is a normal "nothing to stop" outcome.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("search backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("search request failed: {0}")]
    SearchUnavailable(String),

    #[error("no active crawler for domain '{0}'")]
    NotFound(String),

    #[error("failed to spawn crawler worker: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::BackendUnavailable(_)
            | GatewayError::SearchUnavailable(_)
            | GatewayError::Spawn(_)
            | GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Stop on a non-active domain is a normal outcome, not an incident.
        match &self {
            GatewayError::NotFound(_) => tracing::debug!(error = %self, "request rejected"),
            GatewayError::Validation(_) => tracing::debug!(error = %self, "request rejected"),
            _ => tracing::error!(error = %self, "request failed"),
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
