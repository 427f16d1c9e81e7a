//! Data models for the application
//!
//! Each sub-module represents a specific feature area.

mod label;
mod prediction;
mod stats;

// Re-export all models for convenient imports
pub use label::*;
pub use prediction::*;
pub use stats::*;
