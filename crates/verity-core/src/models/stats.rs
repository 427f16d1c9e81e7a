use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::prediction::PredictionSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    /// Derive page counts for a 1-indexed `page` of `per_page` items out of `total`.
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        let per_page = per_page.max(1);
        let total = total.max(0);
        let pages = total / per_page + i64::from(total % per_page != 0);
        Pagination {
            page,
            per_page,
            total,
            pages,
            has_next: page < pages,
            has_prev: page > 1,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0).saturating_mul(self.per_page)
    }
}

/// One page of the upload history, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryPage {
    pub uploads: Vec<PredictionSummary>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    Active,
    Inactive,
}

impl ModelStatus {
    pub fn from_available(available: bool) -> Self {
        if available {
            ModelStatus::Active
        } else {
            ModelStatus::Inactive
        }
    }
}

/// Aggregate view over every stored record, computed on demand.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AggregateSnapshot {
    pub total_uploads: i64,
    /// Records uploaded since 00:00 UTC today
    pub uploads_today: i64,
    /// Count per label; every configured label is present, zero when unused
    pub predictions_distribution: BTreeMap<String, i64>,
    /// Mean processing time in seconds, rounded to 3 decimals
    pub average_processing_time: f64,
    pub model_status: ModelStatus,
}

/// Round to 3 decimal places.
pub fn round_millis(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
