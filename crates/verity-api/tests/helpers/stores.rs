//! Record store doubles.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use verity_core::models::PredictionRecord;
use verity_core::AppError;
use verity_db::{InMemoryPredictionStore, LabelAggregate, PredictionStore};

/// Store whose writes always fail; reads go to an empty in-memory store.
#[derive(Default)]
pub struct FailingWriteStore {
    inner: InMemoryPredictionStore,
}

#[async_trait]
impl PredictionStore for FailingWriteStore {
    async fn insert(&self, _record: &PredictionRecord) -> Result<(), AppError> {
        Err(AppError::Database(sqlx::Error::PoolClosed))
    }

    async fn insert_batch(&self, _records: &[PredictionRecord]) -> Result<(), AppError> {
        Err(AppError::Database(sqlx::Error::PoolClosed))
    }

    async fn list_with_total(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PredictionRecord>, i64), AppError> {
        self.inner.list_with_total(limit, offset).await
    }

    async fn count(&self) -> Result<i64, AppError> {
        self.inner.count().await
    }

    async fn aggregate_by_label(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<LabelAggregate>, AppError> {
        self.inner.aggregate_by_label(since).await
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(AppError::Database(sqlx::Error::PoolClosed))
    }
}
