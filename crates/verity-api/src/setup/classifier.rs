//! Classifier setup
//!
//! The model is loaded once here and shared read-only afterwards. A missing
//! or unloadable model does not stop the server: it starts with an
//! unavailable classifier and reports `model_loaded: false`.

use anyhow::Result;
use std::sync::Arc;
use verity_core::Config;
use verity_processing::{Classifier, UnavailableClassifier};

pub fn setup_classifier(config: &Config) -> Result<Arc<dyn Classifier>> {
    let Some(model_path) = config.model_path() else {
        tracing::warn!("MODEL_PATH not set, predictions are disabled");
        return Ok(Arc::new(UnavailableClassifier));
    };

    if !std::path::Path::new(model_path).exists() {
        tracing::warn!(model_path = %model_path, "Model file not found, predictions are disabled");
        return Ok(Arc::new(UnavailableClassifier));
    }

    load_model(config, model_path)
}

#[cfg(feature = "onnx")]
fn load_model(config: &Config, model_path: &str) -> Result<Arc<dyn Classifier>> {
    match verity_processing::OnnxClassifier::load(model_path, config.onnx_threads()) {
        Ok(classifier) => {
            tracing::info!(
                model = %classifier.name(),
                model_path = %model_path,
                labels = %config.model_classes().join(","),
                input_width = config.model_input_width(),
                input_height = config.model_input_height(),
                "Model loaded"
            );
            Ok(Arc::new(classifier))
        }
        Err(e) => {
            tracing::error!(model_path = %model_path, error = %e, "Failed to load model, predictions are disabled");
            Ok(Arc::new(UnavailableClassifier))
        }
    }
}

#[cfg(not(feature = "onnx"))]
fn load_model(_config: &Config, model_path: &str) -> Result<Arc<dyn Classifier>> {
    tracing::warn!(
        model_path = %model_path,
        "MODEL_PATH set but the onnx feature is not enabled, predictions are disabled"
    );
    Ok(Arc::new(UnavailableClassifier))
}
