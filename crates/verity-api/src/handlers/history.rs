use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;
use verity_core::models::HistoryPage;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// 1-indexed page number (default 1)
    #[validate(range(min = 1))]
    pub page: Option<i64>,
    /// Page size (default 20, capped at 100)
    #[validate(range(min = 1))]
    pub per_page: Option<i64>,
}

/// List stored predictions, newest first
#[utoipa::path(
    get,
    path = "/upload_history",
    tag = "history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "One page of prediction records", body = HistoryPage),
        (status = 400, description = "Invalid paging parameters", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query), fields(operation = "upload_history"))]
pub async fn upload_history(
    State(state): State<Arc<AppState>>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Query(query) = query?;
    query.validate()?;

    let page = state.stats.history(query.page, query.per_page).await?;
    Ok(Json(page))
}
