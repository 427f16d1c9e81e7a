use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use verity_core::models::AggregateSnapshot;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Aggregate statistics over every stored prediction
#[utoipa::path(
    get,
    path = "/model_stats",
    tag = "history",
    responses(
        (status = 200, description = "Aggregate snapshot", body = AggregateSnapshot),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "model_stats"))]
pub async fn model_stats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let snapshot = state.stats.stats().await?;
    Ok(Json(snapshot))
}
