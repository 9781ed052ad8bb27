use crate::classifier::{ClassificationResult, FabricClassifier};
use crate::error::FabricError;
use crate::model::LabelModel;
use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Name of the multipart field carrying the uploaded file.
pub const IMAGE_FIELD: &str = "image";

impl IntoResponse for FabricError {
    fn into_response(self) -> Response {
        let (status, message) = if matches!(self, FabricError::PayloadTooLarge(_)) {
            (StatusCode::PAYLOAD_TOO_LARGE, self.to_string())
        } else if self.is_client_error() {
            (StatusCode::BAD_REQUEST, self.to_string())
        } else if matches!(self, FabricError::ModelNotLoaded) {
            (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
        } else {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error processing image: {self}"),
            )
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Builds the HTTP surface: `POST /upload`, open to any origin.
pub fn router<M: LabelModel + Send + 'static>(
    classifier: Arc<FabricClassifier<M>>,
    max_upload_bytes: usize,
) -> Router {
    Router::new()
        .route("/upload", post(post_upload::<M>))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(classifier)
}

async fn post_upload<M: LabelModel + Send + 'static>(
    State(classifier): State<Arc<FabricClassifier<M>>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ClassificationResult>, FabricError> {
    if !classifier.is_ready() {
        log::warn!("Rejecting upload: model not loaded");
        return Err(FabricError::ModelNotLoaded);
    }

    let mut multipart = multipart.map_err(|e| FabricError::InvalidUpload(e.body_text()))?;
    let bytes = read_image_field(&mut multipart).await?;
    log::debug!("Received {} byte upload", bytes.len());

    let result = tokio::task::spawn_blocking(move || classifier.classify(&bytes))
        .await
        .map_err(|e| FabricError::TaskFailed(e.to_string()))?;

    match result {
        Ok(result) => {
            log::info!(
                "Classified upload as {:?} with colors {:?}",
                result.fabric_type,
                result
                    .dominant_colors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
            );
            Ok(Json(result))
        }
        Err(e) => {
            log::warn!("Failed to classify upload: {e}");
            Err(e)
        }
    }
}

/// Keeps the body limit distinct from other malformed uploads.
fn upload_error(e: MultipartError) -> FabricError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        FabricError::PayloadTooLarge(e.body_text())
    } else {
        FabricError::InvalidUpload(e.body_text())
    }
}

/// Returns the contents of the first `image` field, skipping any other fields.
async fn read_image_field(multipart: &mut Multipart) -> Result<Vec<u8>, FabricError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(upload_error)?
    {
        if field.name() == Some(IMAGE_FIELD) {
            let bytes = field.bytes().await.map_err(upload_error)?;
            return Ok(bytes.to_vec());
        }
    }

    log::warn!("Upload has no {IMAGE_FIELD:?} field");
    Err(FabricError::MissingInput)
}
