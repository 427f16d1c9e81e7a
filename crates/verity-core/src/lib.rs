//! Verity Core Library
//!
//! This crate provides the domain models, error types and configuration
//! shared by every Verity component.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline_error;

// Re-export commonly used types
pub use config::{BaseConfig, Config, InferenceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use pipeline_error::PipelineError;
// Note: Storage and StorageError live in verity-storage, Classifier in verity-processing.
