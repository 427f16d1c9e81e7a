//! Inference pipeline
//!
//! Every upload goes through the same stages:
//! validate -> store raw bytes -> decode -> classify -> build record.
//! Single predictions commit their record immediately; batches stage every
//! successful record and commit them together once all files are processed.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;
use verity_core::models::{
    outcome_message, BatchItemResult, BatchPredictionResponse, LabelSet, PredictionRecord,
    PredictionResponse,
};
use verity_core::{AppError, PipelineError};
use verity_db::PredictionStore;
use verity_processing::{select_label, Classifier, ClassifierError, ImageCodec, UploadValidator};
use verity_storage::{storage_name_for, Storage};

/// Message for batch items whose records were lost when the batch commit failed
pub const BATCH_COMMIT_FAILED: &str = "Failed to save prediction results";

const SINGLE_COMMIT_FAILED: &str = "Failed to save prediction result";

/// One file part taken from a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Request provenance recorded with each prediction.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Result of running one upload through the pipeline, not yet committed.
struct ScoredUpload {
    record: PredictionRecord,
    message: &'static str,
}

impl ScoredUpload {
    fn response(&self) -> PredictionResponse {
        PredictionResponse::from_record(&self.record, self.message)
    }
}

pub struct InferenceOrchestrator {
    validator: UploadValidator,
    codec: ImageCodec,
    labels: Arc<LabelSet>,
    classifier: Arc<dyn Classifier>,
    storage: Arc<dyn Storage>,
    store: Arc<dyn PredictionStore>,
}

impl InferenceOrchestrator {
    pub fn new(
        validator: UploadValidator,
        codec: ImageCodec,
        labels: Arc<LabelSet>,
        classifier: Arc<dyn Classifier>,
        storage: Arc<dyn Storage>,
        store: Arc<dyn PredictionStore>,
    ) -> Self {
        Self {
            validator,
            codec,
            labels,
            classifier,
            storage,
            store,
        }
    }

    /// Run one upload through the pipeline and commit its record.
    ///
    /// Nothing is committed when any stage fails.
    #[tracing::instrument(skip(self, file, client), fields(filename = %file.filename, operation = "predict"))]
    pub async fn predict_single(
        &self,
        file: UploadedFile,
        client: &ClientInfo,
    ) -> Result<PredictionResponse, AppError> {
        let scored = self.process_one(file, client).await?;

        self.store.insert(&scored.record).await.map_err(|e| {
            tracing::error!(
                error = %e,
                upload_id = %scored.record.id,
                "Failed to commit prediction record"
            );
            AppError::Storage(SINGLE_COMMIT_FAILED.to_string())
        })?;

        Ok(scored.response())
    }

    /// Run every upload through the pipeline, then commit all successful
    /// records in one unit of work.
    ///
    /// Parts with an empty filename are skipped but still counted in
    /// `total_files`. Per-item failures never fail the request. When the
    /// commit fails nothing is persisted and every success is reported as
    /// failed.
    #[tracing::instrument(skip(self, files, client), fields(total_files = files.len(), operation = "predict_batch"))]
    pub async fn predict_batch(
        &self,
        files: Vec<UploadedFile>,
        client: &ClientInfo,
    ) -> BatchPredictionResponse {
        let total_files = files.len();
        let mut results = Vec::with_capacity(total_files);
        let mut staged = Vec::new();

        for file in files {
            if file.filename.is_empty() {
                continue;
            }

            let filename = file.filename.clone();
            match self.process_one(file, client).await {
                Ok(scored) => {
                    results.push(BatchItemResult::from(scored.response()));
                    staged.push(scored.record);
                }
                Err(e) => {
                    tracing::debug!(
                        filename = %filename,
                        kind = e.kind(),
                        reason = %e,
                        "Batch item failed"
                    );
                    results.push(BatchItemResult::failed(filename, e.reason()));
                }
            }
        }

        if !staged.is_empty() {
            if let Err(e) = self.store.insert_batch(&staged).await {
                tracing::error!(
                    error = %e,
                    staged = staged.len(),
                    "Batch commit failed, no records were persisted"
                );
                results = results
                    .into_iter()
                    .map(|item| match item {
                        BatchItemResult::Success { filename, .. } => {
                            BatchItemResult::failed(filename, BATCH_COMMIT_FAILED)
                        }
                        failed => failed,
                    })
                    .collect();
            }
        }

        let response = BatchPredictionResponse::new(total_files, results);
        tracing::info!(
            total_files = response.total_files,
            successful = response.successful_predictions,
            failed = response.failed_predictions,
            "Batch prediction completed"
        );
        response
    }

    /// Validate, store, decode and classify one upload.
    async fn process_one(
        &self,
        file: UploadedFile,
        client: &ClientInfo,
    ) -> Result<ScoredUpload, PipelineError> {
        let started = Instant::now();
        let upload_timestamp = Utc::now();

        self.validator
            .validate_all(&file.filename, &file.content_type, file.data.len())?;

        let file_size = file.data.len() as i64;
        let storage_name = storage_name_for(&file.filename);
        let (storage_name, file_path) = self
            .storage
            .upload(&storage_name, &file.content_type, file.data.clone())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, storage_name = %storage_name, "Failed to store upload");
                PipelineError::Storage("Failed to save uploaded file".to_string())
            })?;

        let scores = self.score(file.data).await?;
        let scored = select_label(&scores, &self.labels)?;

        let processing_time = started.elapsed().as_secs_f64();
        let message = outcome_message(&scored.label);

        let record = PredictionRecord {
            id: Uuid::new_v4(),
            filename: storage_name,
            original_filename: file.filename,
            file_path,
            file_size,
            mime_type: file.content_type,
            upload_timestamp,
            prediction_result: Some(scored.label),
            confidence_score: scored.confidence,
            processing_time,
            ip_address: client.ip_address.clone(),
            user_agent: client.user_agent.clone(),
        };

        tracing::info!(
            upload_id = %record.id,
            label = record.prediction_result.as_deref().unwrap_or_default(),
            confidence = record.confidence_score,
            processing_time = record.processing_time,
            "Prediction completed"
        );

        Ok(ScoredUpload { record, message })
    }

    /// Decode and classify on a blocking thread.
    async fn score(&self, data: Bytes) -> Result<Vec<f32>, PipelineError> {
        let codec = self.codec;
        let classifier = self.classifier.clone();

        tokio::task::spawn_blocking(move || -> Result<Vec<f32>, PipelineError> {
            let tensor = codec.encode(&data)?;
            if !classifier.is_available() {
                return Err(ClassifierError::Unavailable.into());
            }
            Ok(classifier.predict(&tensor)?)
        })
        .await
        .map_err(|e| {
            PipelineError::ModelUnavailable(
                ClassifierError::Inference(format!("worker task failed: {}", e)).to_string(),
            )
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verity_db::InMemoryPredictionStore;
    use verity_processing::{ImageTensor, UnavailableClassifier};
    use verity_storage::LocalStorage;

    struct FixedClassifier(Vec<f32>);

    impl Classifier for FixedClassifier {
        fn predict(&self, _tensor: &ImageTensor) -> Result<Vec<f32>, ClassifierError> {
            Ok(self.0.clone())
        }

        fn is_available(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn png_bytes() -> Bytes {
        let img = image::RgbImage::from_pixel(8, 8, image::Rgb([10, 20, 30]));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        Bytes::from(buf.into_inner())
    }

    fn upload(filename: &str, content_type: &str, data: Bytes) -> UploadedFile {
        UploadedFile {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            data,
        }
    }

    async fn orchestrator(
        classifier: Arc<dyn Classifier>,
        dir: &std::path::Path,
    ) -> (InferenceOrchestrator, Arc<InMemoryPredictionStore>) {
        let store = Arc::new(InMemoryPredictionStore::new());
        let storage = Arc::new(LocalStorage::new(dir).await.unwrap());
        let orchestrator = InferenceOrchestrator::new(
            UploadValidator::new(
                1024 * 1024,
                vec!["png".to_string(), "jpg".to_string()],
                vec!["image/png".to_string(), "image/jpeg".to_string()],
            ),
            ImageCodec::new(16, 16),
            Arc::new(LabelSet::new(["fake", "not_currency", "real"])),
            classifier,
            storage,
            store.clone(),
        );
        (orchestrator, store)
    }

    #[tokio::test]
    async fn test_predict_single_commits_record() {
        let dir = tempfile::tempdir().unwrap();
        let (orchestrator, store) =
            orchestrator(Arc::new(FixedClassifier(vec![0.1, 0.2, 0.7])), dir.path()).await;

        let response = orchestrator
            .predict_single(upload("note.png", "image/png", png_bytes()), &ClientInfo::default())
            .await
            .unwrap();

        assert_eq!(response.label, "real");
        assert_eq!(response.filename, "note.png");
        assert_eq!(response.prediction, outcome_message("real"));

        let records = store.all().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, response.upload_id);
        assert!(records[0].filename.ends_with("_note.png"));
        assert!(records[0].processing_time >= 0.0);
    }

    #[tokio::test]
    async fn test_predict_single_decode_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (orchestrator, store) =
            orchestrator(Arc::new(FixedClassifier(vec![0.1, 0.2, 0.7])), dir.path()).await;

        let err = orchestrator
            .predict_single(
                upload("note.png", "image/png", Bytes::from_static(b"not a png")),
                &ClientInfo::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Decode(_)));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_classifier_is_reported_after_decode() {
        let dir = tempfile::tempdir().unwrap();
        let (orchestrator, store) = orchestrator(Arc::new(UnavailableClassifier), dir.path()).await;

        let err = orchestrator
            .predict_single(upload("note.png", "image/png", png_bytes()), &ClientInfo::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ModelUnavailable(ref m) if m == "Model not loaded"));

        let err = orchestrator
            .predict_single(
                upload("note.png", "image/png", Bytes::from_static(b"garbage")),
                &ClientInfo::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_predict_batch_preserves_order_and_skips_empty_names() {
        let dir = tempfile::tempdir().unwrap();
        let (orchestrator, store) =
            orchestrator(Arc::new(FixedClassifier(vec![0.6, 0.3, 0.1])), dir.path()).await;

        let response = orchestrator
            .predict_batch(
                vec![
                    upload("a.png", "image/png", png_bytes()),
                    upload("", "image/png", png_bytes()),
                    upload("b.txt", "text/plain", Bytes::from_static(b"hello")),
                    upload("c.png", "image/png", png_bytes()),
                ],
                &ClientInfo::default(),
            )
            .await;

        assert_eq!(response.total_files, 4);
        assert_eq!(response.successful_predictions, 2);
        assert_eq!(response.failed_predictions, 1);
        let names: Vec<_> = response.results.iter().map(|r| r.filename()).collect();
        assert_eq!(names, vec!["a.png", "b.txt", "c.png"]);
        assert_eq!(store.count().await.unwrap(), 2);
    }
}
