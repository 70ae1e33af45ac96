use axum::extract::{Extension, Path};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::common::GatewayError;
use crate::domains::models::DomainStatusRow;
use crate::server::app::AxumAppState;

#[derive(Deserialize)]
pub struct SubmitDomainsRequest {
    pub domains: Vec<String>,
}

#[derive(Serialize)]
pub struct SubmitDomainsResponse {
    pub message: String,
    pub domains: Vec<String>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /api/crawl/domains — track a batch of domains and ensure each has a
/// running worker. Resubmission of a tracked domain is accepted and only
/// restarts its worker if needed.
pub async fn submit_domains_handler(
    Extension(state): Extension<AxumAppState>,
    Json(request): Json<SubmitDomainsRequest>,
) -> Result<Json<SubmitDomainsResponse>, GatewayError> {
    let domains = state.registry.submit(&request.domains).await?;
    Ok(Json(SubmitDomainsResponse {
        message: format!("Crawling started for {} domain(s)", domains.len()),
        domains,
    }))
}

/// GET /api/crawl/domains/status — persisted records joined with liveness.
pub async fn domain_statuses_handler(
    Extension(state): Extension<AxumAppState>,
) -> Result<Json<Vec<DomainStatusRow>>, GatewayError> {
    let rows = state.registry.list_statuses().await?;
    Ok(Json(rows))
}

/// POST /api/crawl/domains/{domain}/stop — 404 when no worker is live.
pub async fn stop_domain_handler(
    Extension(state): Extension<AxumAppState>,
    Path(domain): Path<String>,
) -> Result<Json<MessageResponse>, GatewayError> {
    state.supervisor.stop(&domain)?;
    Ok(Json(MessageResponse {
        message: format!("Crawler for '{domain}' stopped"),
    }))
}
