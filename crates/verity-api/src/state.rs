//! Application state shared by every handler.

use std::sync::Arc;

use verity_core::models::LabelSet;
use verity_core::Config;
use verity_db::PredictionStore;
use verity_processing::{Classifier, ImageCodec, UploadValidator};
use verity_storage::Storage;

use crate::services::inference::InferenceOrchestrator;
use crate::services::stats::StatsAggregator;

pub struct AppState {
    pub config: Config,
    pub labels: Arc<LabelSet>,
    pub inference: InferenceOrchestrator,
    pub stats: StatsAggregator,
    pub store: Arc<dyn PredictionStore>,
    /// Loaded once at startup, read-only afterwards
    pub classifier: Arc<dyn Classifier>,
}

impl AppState {
    /// Wire the pipeline and read side over the given collaborators.
    pub fn new(
        config: Config,
        store: Arc<dyn PredictionStore>,
        storage: Arc<dyn Storage>,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        let labels = Arc::new(LabelSet::new(config.model_classes().iter().cloned()));

        let validator = UploadValidator::new(
            config.max_file_size_bytes(),
            config.allowed_extensions().to_vec(),
            config.allowed_content_types().to_vec(),
        );
        let codec = ImageCodec::new(config.model_input_width(), config.model_input_height());

        let inference = InferenceOrchestrator::new(
            validator,
            codec,
            labels.clone(),
            classifier.clone(),
            storage,
            store.clone(),
        );

        let stats = StatsAggregator::new(
            store.clone(),
            labels.clone(),
            classifier.clone(),
            config.history_default_per_page(),
            config.history_max_per_page(),
        );

        Self {
            config,
            labels,
            inference,
            stats,
            store,
            classifier,
        }
    }

    pub fn model_loaded(&self) -> bool {
        self.classifier.is_available()
    }
}
