use axum::extract::Extension;
use axum::Json;
use std::collections::BTreeMap;

use crate::common::GatewayError;
use crate::domains::models::DashboardSnapshot;
use crate::server::app::AxumAppState;

/// GET /api/stats — freshly computed dashboard snapshot. Degrades to an
/// empty breakdown when only the aggregation side of the engine fails.
pub async fn stats_handler(
    Extension(state): Extension<AxumAppState>,
) -> Result<Json<DashboardSnapshot>, GatewayError> {
    let snapshot = state.stats.snapshot().await?;
    Ok(Json(snapshot))
}

/// GET /api/metrics — hourly crawl counts keyed by ISO-8601 timestamp.
pub async fn metrics_handler(
    Extension(state): Extension<AxumAppState>,
) -> Result<Json<BTreeMap<String, u64>>, GatewayError> {
    let buckets = state.stats.metrics().await?;
    Ok(Json(buckets))
}
