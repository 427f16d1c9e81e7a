//! Per-upload failure taxonomy of the inference pipeline.
//!
//! Every stage of processing a single upload reports failures as a
//! `PipelineError`. Single-file requests turn it into an `AppError` response;
//! batch requests downgrade it to a `failed` entry carrying `reason()`.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// Upload rejected by admission checks (client-fixable).
    #[error("{0}")]
    Validation(String),

    /// Bytes passed validation but could not be decoded into an image.
    #[error("{0}")]
    Decode(String),

    /// No classifier loaded, or the classifier failed to score the image.
    #[error("{0}")]
    ModelUnavailable(String),

    /// Raw byte store or record store write failed.
    #[error("{0}")]
    Storage(String),
}

impl PipelineError {
    /// Human-readable reason, safe to return to clients.
    pub fn reason(&self) -> &str {
        match self {
            PipelineError::Validation(reason)
            | PipelineError::Decode(reason)
            | PipelineError::ModelUnavailable(reason)
            | PipelineError::Storage(reason) => reason,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Validation(_) => "validation",
            PipelineError::Decode(_) => "decode",
            PipelineError::ModelUnavailable(_) => "model_unavailable",
            PipelineError::Storage(_) => "storage",
        }
    }
}
