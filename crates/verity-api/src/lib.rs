//! Verity API Library
//!
//! This crate provides the HTTP handlers, the inference and statistics
//! services, and application setup.

mod api_doc;
mod handlers;
mod telemetry;
mod utils;

pub mod constants;
pub mod error;
pub mod services;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use services::inference::{ClientInfo, InferenceOrchestrator, UploadedFile};
pub use services::stats::StatsAggregator;
pub use state::AppState;
