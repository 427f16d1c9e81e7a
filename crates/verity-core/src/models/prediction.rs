use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Durable audit row for one scored upload.
///
/// Built by the inference pipeline with its id and timestamp already assigned,
/// then inserted exactly once. Records are never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PredictionRecord {
    pub id: Uuid,
    /// Generated storage name (`{uuid}_{sanitized original name}`)
    pub filename: String,
    pub original_filename: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub upload_timestamp: DateTime<Utc>,
    pub prediction_result: Option<String>,
    pub confidence_score: f64,
    /// Seconds spent processing the upload
    pub processing_time: f64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Public view of a record, as listed by the upload history.
///
/// Storage path and client details stay internal.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PredictionSummary {
    pub id: Uuid,
    pub filename: String,
    pub original_filename: String,
    pub file_size: i64,
    pub mime_type: String,
    pub upload_timestamp: DateTime<Utc>,
    pub prediction_result: Option<String>,
    pub confidence_score: f64,
    pub processing_time: f64,
}

impl From<PredictionRecord> for PredictionSummary {
    fn from(record: PredictionRecord) -> Self {
        PredictionSummary {
            id: record.id,
            filename: record.filename,
            original_filename: record.original_filename,
            file_size: record.file_size,
            mime_type: record.mime_type,
            upload_timestamp: record.upload_timestamp,
            prediction_result: record.prediction_result,
            confidence_score: record.confidence_score,
            processing_time: record.processing_time,
        }
    }
}

/// Response of a single-image prediction.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PredictionResponse {
    /// Original client-supplied filename
    pub filename: String,
    /// Human-readable outcome message
    pub prediction: String,
    pub label: String,
    pub confidence: f64,
    pub processing_time: f64,
    pub upload_id: Uuid,
}

impl PredictionResponse {
    pub fn from_record(record: &PredictionRecord, message: &str) -> Self {
        PredictionResponse {
            filename: record.original_filename.clone(),
            prediction: message.to_string(),
            label: record.prediction_result.clone().unwrap_or_default(),
            confidence: record.confidence_score,
            processing_time: record.processing_time,
            upload_id: record.id,
        }
    }
}

/// Outcome of one file inside a batch request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BatchItemResult {
    Success {
        filename: String,
        prediction: String,
        label: String,
        confidence: f64,
        processing_time: f64,
        upload_id: Uuid,
    },
    Failed {
        filename: String,
        error: String,
    },
}

impl BatchItemResult {
    pub fn failed(filename: impl Into<String>, error: impl Into<String>) -> Self {
        BatchItemResult::Failed {
            filename: filename.into(),
            error: error.into(),
        }
    }

    pub fn filename(&self) -> &str {
        match self {
            BatchItemResult::Success { filename, .. } | BatchItemResult::Failed { filename, .. } => {
                filename
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BatchItemResult::Success { .. })
    }
}

impl From<PredictionResponse> for BatchItemResult {
    fn from(response: PredictionResponse) -> Self {
        BatchItemResult::Success {
            filename: response.filename,
            prediction: response.prediction,
            label: response.label,
            confidence: response.confidence,
            processing_time: response.processing_time,
            upload_id: response.upload_id,
        }
    }
}

/// Response of a multi-image prediction.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BatchPredictionResponse {
    /// Number of submitted file parts, including ones skipped for an empty filename
    pub total_files: usize,
    pub successful_predictions: usize,
    pub failed_predictions: usize,
    pub results: Vec<BatchItemResult>,
}

impl BatchPredictionResponse {
    pub fn new(total_files: usize, results: Vec<BatchItemResult>) -> Self {
        let successful_predictions = results.iter().filter(|r| r.is_success()).count();
        BatchPredictionResponse {
            total_files,
            successful_predictions,
            failed_predictions: results.len() - successful_predictions,
            results,
        }
    }
}
