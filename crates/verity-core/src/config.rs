//! Configuration module
//!
//! This module provides configuration structures for the API, including
//! database, storage, upload admission, model and history settings.

use std::collections::HashSet;
use std::env;

// Common constants
const SERVER_PORT: u16 = 5000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const HTTP_CONCURRENCY_LIMIT: usize = 1024;

/// Base configuration shared by the server and its collaborators
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
    pub service_name: String,
    pub service_version: String,
    /// "compact" (default) or "json"
    pub log_format: String,
    pub http_concurrency_limit: usize,
    /// Number of reverse proxies in front of the service (X-Forwarded-For handling)
    pub trusted_proxy_count: usize,
}

/// Inference service configuration
#[derive(Clone, Debug)]
pub struct InferenceConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Raw upload storage
    pub upload_folder: String,
    // Upload admission
    pub max_file_size_bytes: usize,
    pub max_request_size_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
    // Model
    pub model_path: Option<String>,
    /// Class labels in the index order of the classifier's score vector
    pub model_classes: Vec<String>,
    pub model_input_width: u32,
    pub model_input_height: u32,
    pub onnx_threads: usize,
    // History listing
    pub history_default_per_page: i64,
    pub history_max_per_page: i64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<InferenceConfig>);

impl Config {
    fn as_inference(&self) -> &InferenceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.as_inference().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = InferenceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_inference().validate()
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.as_inference().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_inference().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_inference().base.environment
    }

    pub fn service_name(&self) -> &str {
        &self.as_inference().base.service_name
    }

    pub fn service_version(&self) -> &str {
        &self.as_inference().base.service_version
    }

    pub fn log_format(&self) -> &str {
        &self.as_inference().base.log_format
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.as_inference().base.http_concurrency_limit
    }

    pub fn trusted_proxy_count(&self) -> usize {
        self.as_inference().base.trusted_proxy_count
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_inference().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_inference().base.db_timeout_seconds
    }

    pub fn database_url(&self) -> &str {
        &self.as_inference().database_url
    }

    pub fn upload_folder(&self) -> &str {
        &self.as_inference().upload_folder
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.as_inference().max_file_size_bytes
    }

    pub fn max_request_size_bytes(&self) -> usize {
        self.as_inference().max_request_size_bytes
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.as_inference().allowed_extensions
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.as_inference().allowed_content_types
    }

    pub fn model_path(&self) -> Option<&str> {
        self.as_inference().model_path.as_deref()
    }

    pub fn model_classes(&self) -> &[String] {
        &self.as_inference().model_classes
    }

    pub fn model_input_width(&self) -> u32 {
        self.as_inference().model_input_width
    }

    pub fn model_input_height(&self) -> u32 {
        self.as_inference().model_input_height
    }

    pub fn onnx_threads(&self) -> usize {
        self.as_inference().onnx_threads
    }

    pub fn history_default_per_page(&self) -> i64 {
        self.as_inference().history_default_per_page
    }

    pub fn history_max_per_page(&self) -> i64 {
        self.as_inference().history_max_per_page
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl InferenceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        const MAX_FILE_SIZE_MB: usize = 10;
        const MAX_REQUEST_SIZE_MB: usize = 100;
        const MODEL_INPUT_SIZE: u32 = 224;
        const ONNX_THREADS: usize = 1;
        const HISTORY_DEFAULT_PER_PAGE: i64 = 20;
        const HISTORY_MAX_PER_PAGE: i64 = 100;

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let max_request_size_mb = env::var("MAX_REQUEST_SIZE_MB")
            .unwrap_or_else(|_| MAX_REQUEST_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_REQUEST_SIZE_MB);

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| "verity-api".to_string()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "compact".to_string())
                .to_lowercase(),
            http_concurrency_limit: env::var("HTTP_CONCURRENCY_LIMIT")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(HTTP_CONCURRENCY_LIMIT)
                .max(1),
            trusted_proxy_count: env::var("TRUSTED_PROXY_COUNT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
        };

        let config = InferenceConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            upload_folder: env::var("UPLOAD_FOLDER").unwrap_or_else(|_| "uploads".to_string()),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            max_request_size_bytes: max_request_size_mb * 1024 * 1024,
            allowed_extensions: split_list(
                &env::var("ALLOWED_EXTENSIONS")
                    .unwrap_or_else(|_| "png,jpg,jpeg,gif,bmp,tiff".to_string()),
            ),
            allowed_content_types: split_list(&env::var("ALLOWED_CONTENT_TYPES").unwrap_or_else(
                |_| "image/png,image/jpeg,image/jpg,image/gif,image/bmp,image/tiff".to_string(),
            )),
            model_path: env::var("MODEL_PATH")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            model_classes: split_list(
                &env::var("MODEL_CLASSES").unwrap_or_else(|_| "fake,not_currency,real".to_string()),
            ),
            model_input_width: env::var("MODEL_INPUT_WIDTH")
                .unwrap_or_else(|_| MODEL_INPUT_SIZE.to_string())
                .parse()
                .unwrap_or(MODEL_INPUT_SIZE),
            model_input_height: env::var("MODEL_INPUT_HEIGHT")
                .unwrap_or_else(|_| MODEL_INPUT_SIZE.to_string())
                .parse()
                .unwrap_or(MODEL_INPUT_SIZE),
            onnx_threads: env::var("ONNX_THREADS")
                .unwrap_or_else(|_| ONNX_THREADS.to_string())
                .parse()
                .unwrap_or(ONNX_THREADS),
            history_default_per_page: env::var("HISTORY_DEFAULT_PER_PAGE")
                .unwrap_or_else(|_| HISTORY_DEFAULT_PER_PAGE.to_string())
                .parse()
                .unwrap_or(HISTORY_DEFAULT_PER_PAGE),
            history_max_per_page: env::var("HISTORY_MAX_PER_PAGE")
                .unwrap_or_else(|_| HISTORY_MAX_PER_PAGE.to_string())
                .parse()
                .unwrap_or(HISTORY_MAX_PER_PAGE),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.database_url.starts_with("postgresql://")
            || self.database_url.starts_with("postgres://"))
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.model_classes.is_empty() {
            return Err(anyhow::anyhow!("MODEL_CLASSES must name at least one label"));
        }

        let mut seen = HashSet::new();
        if let Some(duplicate) = self.model_classes.iter().find(|c| !seen.insert(*c)) {
            return Err(anyhow::anyhow!(
                "MODEL_CLASSES contains duplicate label '{}'",
                duplicate
            ));
        }

        if self.model_input_width == 0 || self.model_input_height == 0 {
            return Err(anyhow::anyhow!(
                "MODEL_INPUT_WIDTH and MODEL_INPUT_HEIGHT must be greater than zero"
            ));
        }

        if self.allowed_extensions.is_empty() || self.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_EXTENSIONS and ALLOWED_CONTENT_TYPES must not be empty"
            ));
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than zero"));
        }

        if self.max_request_size_bytes < self.max_file_size_bytes {
            return Err(anyhow::anyhow!(
                "MAX_REQUEST_SIZE_MB must be at least MAX_FILE_SIZE_MB"
            ));
        }

        if self.history_max_per_page < 1
            || self.history_default_per_page < 1
            || self.history_default_per_page > self.history_max_per_page
        {
            return Err(anyhow::anyhow!(
                "HISTORY_DEFAULT_PER_PAGE must be between 1 and HISTORY_MAX_PER_PAGE"
            ));
        }

        if self.upload_folder.trim().is_empty() {
            return Err(anyhow::anyhow!("UPLOAD_FOLDER must not be empty"));
        }

        Ok(())
    }
}
