//! OpenAPI documentation.
//! API version is in `crate::constants::API_VERSION`; the document is served
//! at `/api/openapi.json` and rendered by RapiDoc at `/docs`.

use utoipa::OpenApi;

use crate::constants::API_VERSION;
use crate::error;
use crate::handlers;
use verity_core::models;

/// Returns the OpenAPI document with the running API version.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    let mut spec = ApiDoc::openapi();
    spec.info.version = API_VERSION.to_string();
    spec
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pakistani Currency Detection API",
        description = "Classifies uploaded images of Pakistani rupee notes as real, fake or not currency, and keeps an audit history of every prediction."
    ),
    paths(
        handlers::home::home,
        handlers::health::health_check,
        handlers::predict::predict,
        handlers::predict::predict_multiple,
        handlers::history::upload_history,
        handlers::stats::model_stats,
    ),
    components(schemas(
        error::ErrorResponse,
        models::PredictionResponse,
        models::BatchPredictionResponse,
        models::BatchItemResult,
        models::PredictionSummary,
        models::Pagination,
        models::HistoryPage,
        models::AggregateSnapshot,
        models::ModelStatus,
        handlers::home::HomeResponse,
        handlers::home::EndpointMap,
        handlers::health::HealthResponse,
    )),
    tags(
        (name = "service", description = "Service description and health"),
        (name = "predictions", description = "Image classification"),
        (name = "history", description = "Stored predictions and aggregate statistics"),
    )
)]
struct ApiDoc;
