//! Health check handler.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::constants::HEALTH_CHECK_TIMEOUT;
use crate::state::AppState;

/// Run an async check with timeout; returns status string "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "healthy" when the model is loaded and the database answers, else "degraded"
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub model_loaded: bool,
    pub database_connected: bool,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "service",
    responses(
        (status = 200, description = "Service health", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let store = state.store.clone();
    let database = run_check(
        HEALTH_CHECK_TIMEOUT,
        async move { store.ping().await },
        "unhealthy",
    )
    .await;

    let database_connected = database == "healthy";
    if !database_connected {
        tracing::warn!(database = %database, "Database health check failed");
    }

    let model_loaded = state.model_loaded();

    Json(HealthResponse {
        status: if model_loaded && database_connected {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        timestamp: Utc::now(),
        model_loaded,
        database_connected,
    })
}
