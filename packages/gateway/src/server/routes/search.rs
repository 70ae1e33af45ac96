use axum::extract::{Extension, Query};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::common::GatewayError;
use crate::domains::models::SearchHit;
use crate::server::app::AxumAppState;

const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub size: Option<usize>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
}

/// GET /api/search?q=&size= — `q` is required; a blank query yields an empty
/// hit list without touching the engine.
pub async fn search_handler(
    Extension(state): Extension<AxumAppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, GatewayError> {
    let query = params
        .q
        .ok_or_else(|| GatewayError::Validation("query parameter 'q' is required".into()))?;
    let size = params.size.unwrap_or(DEFAULT_PAGE_SIZE);

    let hits = state.query_gateway.search(&query, size).await?;
    Ok(Json(SearchResponse { hits }))
}
