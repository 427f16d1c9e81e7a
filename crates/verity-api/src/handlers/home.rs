use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::constants::{API_VERSION, SERVICE_TITLE};

/// Endpoint map advertised by the service root
#[derive(Debug, Serialize, ToSchema)]
pub struct EndpointMap {
    pub predict: String,
    pub predict_multiple: String,
    pub upload_history: String,
    pub model_stats: String,
    pub health: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HomeResponse {
    pub message: String,
    pub version: String,
    pub status: String,
    pub endpoints: EndpointMap,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "service",
    responses(
        (status = 200, description = "Service description and endpoint map", body = HomeResponse)
    )
)]
pub async fn home() -> Json<HomeResponse> {
    Json(HomeResponse {
        message: SERVICE_TITLE.to_string(),
        version: API_VERSION.to_string(),
        status: "active".to_string(),
        endpoints: EndpointMap {
            predict: "/predict (POST) - Upload single image for prediction".to_string(),
            predict_multiple: "/predict_multiple (POST) - Upload multiple images".to_string(),
            upload_history: "/upload_history (GET) - View upload history".to_string(),
            model_stats: "/model_stats (GET) - View model statistics".to_string(),
            health: "/health (GET) - Health check".to_string(),
        },
    })
}
