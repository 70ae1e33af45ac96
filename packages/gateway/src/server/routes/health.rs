use axum::extract::Extension;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::server::app::AxumAppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    engine: EngineHealth,
    active_crawlers: usize,
}

#[derive(Serialize)]
pub struct EngineHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint
///
/// Returns 200 OK if the engine is reachable, 503 Service Unavailable
/// otherwise. Live worker count is informational either way.
pub async fn health_handler(
    Extension(state): Extension<AxumAppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let engine_health = match state.engine.ping().await {
        Ok(()) => EngineHealth {
            status: "ok".to_string(),
            error: None,
        },
        Err(e) => EngineHealth {
            status: "error".to_string(),
            error: Some(e.to_string()),
        },
    };

    let is_healthy = engine_health.status == "ok";
    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" }.to_string(),
            engine: engine_health,
            active_crawlers: state.supervisor.active_count(),
        }),
    )
}
