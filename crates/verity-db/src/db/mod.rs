//! Database repositories for data access layer
//!
//! Each repository is responsible for a specific domain entity and provides
//! insert and read/aggregate queries. Prediction records are immutable, so
//! no repository exposes updates.
//
// Prediction records (trait, PostgreSQL and in-memory implementations)
pub mod memory;
pub mod prediction;
//
// Transaction utilities
pub mod transaction;

pub use memory::InMemoryPredictionStore;
pub use prediction::{LabelAggregate, PgPredictionRepository, PredictionStore};
pub use transaction::TransactionGuard;
