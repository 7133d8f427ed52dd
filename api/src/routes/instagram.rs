//! Image post search endpoint (/api/instagram/search)

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::AppState;
use crate::constants::QUERY_REQUIRED;
use crate::domain::instagram::{self, DisplayImagePost};
use crate::services::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct ImageSearchParams {
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSearchResponse {
    pub success: bool,
    pub query: String,
    pub total_results: usize,
    pub posts: Vec<DisplayImagePost>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/instagram/search", get(search_instagram))
}

/// GET /api/instagram/search - Run the scraper and return display records
async fn search_instagram(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ImageSearchParams>,
) -> ApiResult<Json<ImageSearchResponse>> {
    let query = params.query.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(ApiError::Validation(QUERY_REQUIRED.to_string()));
    }

    let items = state
        .instagram
        .search_image_posts(query)
        .await
        .map_err(ApiError::into_orchestrator_failure)?;

    let posts = instagram::normalize(&items);
    info!(query, raw = items.len(), returned = posts.len(), "Instagram search served");

    Ok(Json(ImageSearchResponse {
        success: true,
        query: query.to_string(),
        total_results: posts.len(),
        posts,
    }))
}
