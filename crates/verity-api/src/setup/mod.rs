//! Application setup and initialization
//!
//! Builds every collaborator once (database pool, byte store, classifier),
//! wires them into `AppState` and returns the router.

pub mod classifier;
pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use verity_core::Config;
use verity_db::PgPredictionRepository;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.log_format())
        .context("Failed to initialize telemetry")?;

    tracing::info!(
        service = %config.service_name(),
        version = %config.service_version(),
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    crate::error::configure_error_details(config.is_production());

    let pool = database::setup_database(&config).await?;
    let store = Arc::new(PgPredictionRepository::new(pool));

    let storage = storage::setup_storage(&config).await?;

    let classifier = classifier::setup_classifier(&config)?;

    let state = Arc::new(AppState::new(config.clone(), store, storage, classifier));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
