//! Image classification endpoint

use std::time::Instant;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::classifier::Prediction;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Multipart field carrying the image
pub const UPLOAD_FIELD: &str = "file";

/// POST /predict
///
/// Accepts `multipart/form-data` with the image in the `file` field and returns
/// `{"label": ..., "confidence": ...}`. Other fields are ignored.
/// Non-multipart requests get the JSON error body like every other failure.
pub async fn predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<Prediction>> {
    let request_id = Uuid::new_v4();

    let mut multipart = multipart.map_err(|rejection| {
        warn!(%request_id, "Rejected predict request: {}", rejection.body_text());
        ApiError::from(rejection)
    })?;

    let (file_name, bytes) = match read_upload(&mut multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => {
            warn!(%request_id, "Predict request without '{}' field", UPLOAD_FIELD);
            return Err(ApiError::BadRequest(format!(
                "No file uploaded (expected multipart field '{}')",
                UPLOAD_FIELD
            )));
        }
        Err(e) => {
            warn!(%request_id, "Failed to read upload: {}", e);
            return Err(e);
        }
    };

    let size = bytes.len();
    let started = Instant::now();
    let classifier = state.classifier.clone();

    // Decode, resize and forward pass are CPU bound
    let result = tokio::task::spawn_blocking(move || classifier.classify(&bytes))
        .await
        .map_err(|e| ApiError::Internal(format!("Classification task failed: {}", e)))?;

    match result {
        Ok(prediction) => {
            info!(
                %request_id,
                file = file_name.as_deref().unwrap_or("-"),
                size,
                label = %prediction.label,
                confidence = prediction.confidence,
                class_index = prediction.class_index,
                unknown = prediction.is_unknown(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Classified upload"
            );
            Ok(Json(prediction))
        }
        Err(e) => {
            warn!(
                %request_id,
                file = file_name.as_deref().unwrap_or("-"),
                size,
                "Classification failed: {}",
                e
            );
            Err(e.into())
        }
    }
}

/// Find the upload field and read it fully
async fn read_upload(multipart: &mut Multipart) -> ApiResult<Option<(Option<String>, Vec<u8>)>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            let file_name = field.file_name().map(str::to_string);
            let bytes = field.bytes().await?;
            return Ok(Some((file_name, bytes.to_vec())));
        }
    }
    Ok(None)
}
