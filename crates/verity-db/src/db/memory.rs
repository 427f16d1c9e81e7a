use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use verity_core::models::PredictionRecord;
use verity_core::AppError;

use super::prediction::{LabelAggregate, PredictionStore};

/// Process-local record store for tests.
///
/// Same ordering and atomicity rules as the Postgres repository. The service
/// itself always runs against Postgres.
#[derive(Default)]
pub struct InMemoryPredictionStore {
    records: RwLock<Vec<PredictionRecord>>,
}

impl InMemoryPredictionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record in insertion order.
    pub async fn all(&self) -> Vec<PredictionRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait::async_trait]
impl PredictionStore for InMemoryPredictionStore {
    async fn insert(&self, record: &PredictionRecord) -> Result<(), AppError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn insert_batch(&self, records: &[PredictionRecord]) -> Result<(), AppError> {
        // Single write lock: readers see all of the batch or none of it.
        self.records.write().await.extend_from_slice(records);
        Ok(())
    }

    async fn list_with_total(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PredictionRecord>, i64), AppError> {
        let mut records = self.records.read().await.clone();
        let total = records.len() as i64;
        records.sort_by(|a, b| {
            b.upload_timestamp
                .cmp(&a.upload_timestamp)
                .then_with(|| b.id.cmp(&a.id))
        });

        let page = records
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();

        Ok((page, total))
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.records.read().await.len() as i64)
    }

    async fn aggregate_by_label(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<LabelAggregate>, AppError> {
        let records = self.records.read().await;
        let mut groups: BTreeMap<Option<String>, LabelAggregate> = BTreeMap::new();

        for record in records.iter() {
            let entry = groups
                .entry(record.prediction_result.clone())
                .or_insert_with(|| LabelAggregate {
                    label: record.prediction_result.clone(),
                    count: 0,
                    count_since: 0,
                    processing_time_sum: 0.0,
                });
            entry.count += 1;
            if record.upload_timestamp >= since {
                entry.count_since += 1;
            }
            entry.processing_time_sum += record.processing_time;
        }

        Ok(groups.into_values().collect())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn record(label: Option<&str>, at: DateTime<Utc>, processing_time: f64) -> PredictionRecord {
        let id = Uuid::new_v4();
        PredictionRecord {
            id,
            filename: format!("{}_note.png", id),
            original_filename: "note.png".to_string(),
            file_path: format!("uploads/{}_note.png", id),
            file_size: 128,
            mime_type: "image/png".to_string(),
            upload_timestamp: at,
            prediction_result: label.map(str::to_string),
            confidence_score: 0.8,
            processing_time,
            ip_address: Some("127.0.0.1".to_string()),
            user_agent: None,
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_paged() {
        let store = InMemoryPredictionStore::new();
        let now = Utc::now();
        for i in 0..5 {
            store
                .insert(&record(Some("real"), now - Duration::minutes(i), 0.1))
                .await
                .unwrap();
        }

        let (first, total) = store.list_with_total(2, 0).await.unwrap();
        let (second, _) = store.list_with_total(2, 2).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
        assert!(first[0].upload_timestamp > first[1].upload_timestamp);
        assert!(first[1].upload_timestamp > second[0].upload_timestamp);
        assert!(first.iter().all(|r| second.iter().all(|s| s.id != r.id)));

        let (past_end, total) = store.list_with_total(2, 10).await.unwrap();
        assert!(past_end.is_empty());
        assert_eq!(total, 5);
    }

    #[tokio::test]
    async fn test_list_with_total_is_a_single_snapshot() {
        let store = std::sync::Arc::new(InMemoryPredictionStore::new());
        let now = Utc::now();

        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                for i in 0..50 {
                    store
                        .insert(&record(Some("real"), now - Duration::seconds(i), 0.1))
                        .await
                        .unwrap();
                    tokio::task::yield_now().await;
                }
            })
        };

        for _ in 0..50 {
            let (page, total) = store.list_with_total(100, 0).await.unwrap();
            assert_eq!(page.len() as i64, total);
            tokio::task::yield_now().await;
        }
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_equal_timestamps_order_by_id_descending() {
        let store = InMemoryPredictionStore::new();
        let now = Utc::now();
        let batch: Vec<_> = (0..3).map(|_| record(Some("fake"), now, 0.1)).collect();
        store.insert_batch(&batch).await.unwrap();

        let (listed, _) = store.list_with_total(10, 0).await.unwrap();
        assert!(listed.windows(2).all(|w| w[0].id > w[1].id));
    }

    #[tokio::test]
    async fn test_aggregate_by_label() {
        let store = InMemoryPredictionStore::new();
        let now = Utc::now();
        let since = now - Duration::hours(1);
        store
            .insert_batch(&[
                record(Some("real"), now, 0.2),
                record(Some("real"), now - Duration::days(2), 0.4),
                record(Some("fake"), now, 0.3),
                record(None, now, 0.1),
            ])
            .await
            .unwrap();

        let groups = store.aggregate_by_label(since).await.unwrap();
        assert_eq!(groups.len(), 3);

        let real = groups
            .iter()
            .find(|g| g.label.as_deref() == Some("real"))
            .unwrap();
        assert_eq!(real.count, 2);
        assert_eq!(real.count_since, 1);
        assert!((real.processing_time_sum - 0.6).abs() < 1e-9);

        let total: i64 = groups.iter().map(|g| g.count).sum();
        assert_eq!(total, store.count().await.unwrap());
    }
}
