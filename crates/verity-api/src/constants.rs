//! API constants

use std::time::Duration;

/// Version reported by `GET /` and the OpenAPI document
pub const API_VERSION: &str = "2.0";

/// Service title reported by `GET /`
pub const SERVICE_TITLE: &str = "Pakistani Currency Detection API";

/// Upper bound for each dependency probe in `GET /health`
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Multipart field carrying the image for `POST /predict`
pub const SINGLE_FILE_FIELD: &str = "file";

/// Repeated multipart field carrying the images for `POST /predict_multiple`
pub const MULTI_FILE_FIELD: &str = "files";
