use axum::{Json, Router, routing::get};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/health", get(health))
}

/// GET /api/health - Liveness probe
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Search proxy is running",
    })
}
