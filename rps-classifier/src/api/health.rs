//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    /// Loaded model description
    pub model: String,
    pub labels: Vec<String>,
    pub confidence_threshold: f32,
}

/// GET /health
///
/// Only reachable once the model has loaded, so "ok" implies the service can classify.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let classifier = &state.classifier;
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "rps-classifier".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: classifier.describe(),
        labels: classifier.labels().names().to_vec(),
        confidence_threshold: classifier.threshold(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
