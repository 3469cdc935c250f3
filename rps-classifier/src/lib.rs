//! rps-classifier library - rock/paper/scissors image classification service
//!
//! Loads a pre-trained ONNX model once at startup and serves predictions over HTTP.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod classifier;
pub mod cli;
pub mod error;

use classifier::Classifier;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded classification pipeline
    pub classifier: Arc<Classifier>,
    /// Largest accepted request body in bytes
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Create new application state
    pub fn new(classifier: Classifier, max_upload_bytes: usize) -> Self {
        Self {
            classifier: Arc::new(classifier),
            max_upload_bytes,
        }
    }
}

/// Build application router
///
/// `/predict` is also served with a trailing slash for clients posting to `/predict/`.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::post;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/predict", post(api::predict))
        .route("/predict/", post(api::predict))
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
