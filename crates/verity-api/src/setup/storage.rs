//! Storage setup and initialization

use anyhow::{Context, Result};
use std::sync::Arc;
use verity_core::Config;
use verity_storage::{LocalStorage, Storage};

/// Setup the raw upload store rooted at `UPLOAD_FOLDER`, creating it if needed.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    let storage = LocalStorage::new(config.upload_folder())
        .await
        .with_context(|| format!("Failed to prepare upload folder '{}'", config.upload_folder()))?;

    tracing::info!(
        upload_folder = %storage.base_path().display(),
        "Local upload storage initialized"
    );

    Ok(Arc::new(storage))
}
