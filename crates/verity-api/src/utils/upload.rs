//! Multipart file extraction for the prediction endpoints

use axum::extract::multipart::Field;
use axum::extract::Multipart;
use verity_core::AppError;

use crate::services::inference::UploadedFile;

async fn read_field(field: Field<'_>) -> Result<UploadedFile, AppError> {
    let filename = field.file_name().unwrap_or_default().to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read file data: {}", e)))?;

    Ok(UploadedFile {
        filename,
        content_type,
        data,
    })
}

/// First part named `field_name` that carries a filename.
///
/// Errors with "No file part" when the field is absent and "No selected file"
/// when it was sent without a filename.
pub async fn extract_single_file(
    mut multipart: Multipart,
    field_name: &str,
) -> Result<UploadedFile, AppError> {
    let mut seen_field = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some(field_name) {
            continue;
        }
        seen_field = true;

        let file = read_field(field).await?;
        if !file.filename.is_empty() {
            return Ok(file);
        }
    }

    if seen_field {
        Err(AppError::BadRequest("No selected file".to_string()))
    } else {
        Err(AppError::BadRequest("No file part".to_string()))
    }
}

/// Every part named `field_name`, in request order, including parts sent
/// without a filename.
///
/// Errors with "No files part" when the field is absent and "No selected
/// files" when none of the parts has a filename.
pub async fn extract_file_list(
    mut multipart: Multipart,
    field_name: &str,
) -> Result<Vec<UploadedFile>, AppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() == Some(field_name) {
            files.push(read_field(field).await?);
        }
    }

    if files.is_empty() {
        return Err(AppError::BadRequest("No files part".to_string()));
    }

    if files.iter().all(|f| f.filename.is_empty()) {
        return Err(AppError::BadRequest("No selected files".to_string()));
    }

    Ok(files)
}
