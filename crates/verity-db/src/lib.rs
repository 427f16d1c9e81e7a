//! Verity Database Library
//!
//! Record store for prediction audit rows: the `PredictionStore` trait, its
//! PostgreSQL repository and an in-memory implementation.

pub mod db;

pub use db::*;
