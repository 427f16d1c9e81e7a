//! Read side: paginated upload history and aggregate statistics.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use verity_core::models::{
    round_millis, AggregateSnapshot, HistoryPage, LabelSet, ModelStatus, Pagination,
    PredictionSummary,
};
use verity_core::AppError;
use verity_db::PredictionStore;
use verity_processing::Classifier;

/// Label under which records without a prediction are counted
const UNLABELED: &str = "unknown";

pub struct StatsAggregator {
    store: Arc<dyn PredictionStore>,
    labels: Arc<LabelSet>,
    classifier: Arc<dyn Classifier>,
    default_per_page: i64,
    max_per_page: i64,
}

impl StatsAggregator {
    pub fn new(
        store: Arc<dyn PredictionStore>,
        labels: Arc<LabelSet>,
        classifier: Arc<dyn Classifier>,
        default_per_page: i64,
        max_per_page: i64,
    ) -> Self {
        Self {
            store,
            labels,
            classifier,
            default_per_page,
            max_per_page,
        }
    }

    /// One page of records, newest first.
    ///
    /// `page` defaults to 1 and `per_page` to the configured default; values
    /// below 1 are rejected and `per_page` is capped at the configured maximum.
    #[tracing::instrument(skip(self))]
    pub async fn history(
        &self,
        page: Option<i64>,
        per_page: Option<i64>,
    ) -> Result<HistoryPage, AppError> {
        let page = page.unwrap_or(1);
        let per_page = per_page.unwrap_or(self.default_per_page);

        if page < 1 {
            return Err(AppError::InvalidInput("page must be at least 1".to_string()));
        }
        if per_page < 1 {
            return Err(AppError::InvalidInput(
                "per_page must be at least 1".to_string(),
            ));
        }
        let per_page = per_page.min(self.max_per_page);

        let offset = (page - 1).saturating_mul(per_page);
        let (records, total) = self.store.list_with_total(per_page, offset).await?;
        let pagination = Pagination::new(page, per_page, total);

        let uploads = records.into_iter().map(PredictionSummary::from).collect();

        Ok(HistoryPage {
            uploads,
            pagination,
        })
    }

    /// Aggregate snapshot over every stored record.
    #[tracing::instrument(skip(self))]
    pub async fn stats(&self) -> Result<AggregateSnapshot, AppError> {
        self.stats_at(Utc::now()).await
    }

    /// Aggregate snapshot with "today" taken as the UTC day containing `now`.
    pub async fn stats_at(&self, now: DateTime<Utc>) -> Result<AggregateSnapshot, AppError> {
        let day_start = start_of_utc_day(now);
        let groups = self.store.aggregate_by_label(day_start).await?;

        let mut predictions_distribution: BTreeMap<String, i64> = self
            .labels
            .iter()
            .map(|label| (label.to_string(), 0))
            .collect();

        let mut total_uploads = 0;
        let mut uploads_today = 0;
        let mut processing_time_sum = 0.0;

        for group in groups {
            total_uploads += group.count;
            uploads_today += group.count_since;
            processing_time_sum += group.processing_time_sum;

            let label = group.label.unwrap_or_else(|| UNLABELED.to_string());
            *predictions_distribution.entry(label).or_insert(0) += group.count;
        }

        let average_processing_time = if total_uploads > 0 {
            round_millis(processing_time_sum / total_uploads as f64)
        } else {
            0.0
        };

        Ok(AggregateSnapshot {
            total_uploads,
            uploads_today,
            predictions_distribution,
            average_processing_time,
            model_status: ModelStatus::from_available(self.classifier.is_available()),
        })
    }
}

fn start_of_utc_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now)
}
