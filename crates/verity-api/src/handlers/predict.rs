//! Prediction handlers
//!
//! Both endpoints accept `multipart/form-data`. The single-image endpoint
//! fails the request on the first pipeline error; the multi-image endpoint
//! always answers 200 once at least one file part was selected, reporting
//! each file as `success` or `failed`.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::IntoResponse,
    Json,
};
use verity_core::models::{BatchPredictionResponse, PredictionResponse};

use crate::constants::{MULTI_FILE_FIELD, SINGLE_FILE_FIELD};
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::inference::ClientInfo;
use crate::state::AppState;
use crate::utils::upload::{extract_file_list, extract_single_file};

/// Classify one uploaded image
///
/// Expects the image in the `file` part. The record is committed before the
/// response is sent.
///
/// # Errors
/// - `AppError::BadRequest` - no `file` part, or it has no filename
/// - `AppError::Validation` - extension, content type, empty or oversized file
/// - `AppError::Decode` - bytes are not a decodable image
/// - `AppError::ModelUnavailable` - no classifier loaded, or inference failed
/// - `AppError::Storage` - raw bytes or record could not be saved
#[utoipa::path(
    post,
    path = "/predict",
    tag = "predictions",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image classified", body = PredictionResponse),
        (status = 400, description = "Missing or invalid upload", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse),
        (status = 500, description = "Decode, model or storage failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, client, multipart), fields(operation = "predict"))]
pub async fn predict(
    State(state): State<Arc<AppState>>,
    client: ClientInfo,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let file = extract_single_file(multipart?, SINGLE_FILE_FIELD).await?;
    let response = state.inference.predict_single(file, &client).await?;
    Ok(Json(response))
}

/// Classify several uploaded images in one request
///
/// Expects one or more `files` parts. Successful records are committed
/// together after every file has been processed.
#[utoipa::path(
    post,
    path = "/predict_multiple",
    tag = "predictions",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Per-file results", body = BatchPredictionResponse),
        (status = 400, description = "No files part, or no file selected", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, client, multipart), fields(operation = "predict_multiple"))]
pub async fn predict_multiple(
    State(state): State<Arc<AppState>>,
    client: ClientInfo,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let files = extract_file_list(multipart?, MULTI_FILE_FIELD).await?;
    let response = state.inference.predict_batch(files, &client).await;
    Ok(Json(response))
}
