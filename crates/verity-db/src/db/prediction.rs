use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool, Postgres};
use verity_core::models::PredictionRecord;
use verity_core::AppError;

use super::transaction::TransactionGuard;

/// Per-label totals over the whole record store.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct LabelAggregate {
    pub label: Option<String>,
    pub count: i64,
    /// Records of this label with `upload_timestamp >= since`
    pub count_since: i64,
    /// Sum of processing_time (seconds) across the label's records
    pub processing_time_sum: f64,
}

/// Trait for prediction record store operations
///
/// Records are insert-only. `insert_batch` is a single unit of work: either
/// every record becomes visible or none does.
#[async_trait::async_trait]
pub trait PredictionStore: Send + Sync {
    async fn insert(&self, record: &PredictionRecord) -> Result<(), AppError>;

    async fn insert_batch(&self, records: &[PredictionRecord]) -> Result<(), AppError>;

    /// One page of records ordered by upload_timestamp descending, id
    /// descending on ties, with the total record count from the same snapshot.
    async fn list_with_total(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PredictionRecord>, i64), AppError>;

    async fn count(&self) -> Result<i64, AppError>;

    /// Grouped counts and processing-time sums, read from one consistent snapshot.
    async fn aggregate_by_label(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<LabelAggregate>, AppError>;

    /// Cheap liveness probe of the backing store.
    async fn ping(&self) -> Result<(), AppError>;
}

const SELECT_COLUMNS: &str = r#"
    id, filename, original_filename, file_path, file_size, mime_type,
    upload_timestamp, prediction_result, confidence_score, processing_time,
    ip_address, user_agent
"#;

#[derive(Clone)]
pub struct PgPredictionRepository {
    pool: PgPool,
}

impl PgPredictionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

async fn insert_record<'e, E>(executor: E, record: &PredictionRecord) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO prediction_records (
            id, filename, original_filename, file_path, file_size, mime_type,
            upload_timestamp, prediction_result, confidence_score, processing_time,
            ip_address, user_agent
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(record.id)
    .bind(&record.filename)
    .bind(&record.original_filename)
    .bind(&record.file_path)
    .bind(record.file_size)
    .bind(&record.mime_type)
    .bind(record.upload_timestamp)
    .bind(&record.prediction_result)
    .bind(record.confidence_score)
    .bind(record.processing_time)
    .bind(&record.ip_address)
    .bind(&record.user_agent)
    .execute(executor)
    .await
    .map(drop)
}

async fn count_records<'e, E>(executor: E) -> Result<i64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM prediction_records")
        .fetch_one(executor)
        .await
}

#[async_trait::async_trait]
impl PredictionStore for PgPredictionRepository {
    #[tracing::instrument(skip(self, record), fields(
        db.system = "postgresql",
        db.table = "prediction_records",
        db.operation = "insert",
        upload_id = %record.id
    ))]
    async fn insert(&self, record: &PredictionRecord) -> Result<(), AppError> {
        insert_record(&self.pool, record).await.map_err(|e| {
            tracing::error!(error = ?e, upload_id = %record.id, "Failed to insert prediction record");
            AppError::Database(e)
        })
    }

    #[tracing::instrument(skip(self, records), fields(
        db.system = "postgresql",
        db.table = "prediction_records",
        db.operation = "insert",
        batch_size = records.len()
    ))]
    async fn insert_batch(&self, records: &[PredictionRecord]) -> Result<(), AppError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut tx = TransactionGuard::begin(&self.pool).await?;

        for record in records {
            if let Err(e) = insert_record(&mut **tx, record).await {
                tracing::error!(
                    error = ?e,
                    upload_id = %record.id,
                    "Failed to insert prediction record, rolling back batch"
                );
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "Batch rollback failed");
                }
                return Err(AppError::Database(e));
            }
        }

        tx.commit().await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "prediction_records",
        db.operation = "select"
    ))]
    async fn list_with_total(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PredictionRecord>, i64), AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        // Both reads share one snapshot.
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut **tx)
            .await?;

        let total = count_records(&mut **tx).await?;

        let query = format!(
            "SELECT {} FROM prediction_records ORDER BY upload_timestamp DESC, id DESC LIMIT $1 OFFSET $2",
            SELECT_COLUMNS
        );
        let records = sqlx::query_as::<Postgres, PredictionRecord>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut **tx)
            .await?;

        tx.commit().await?;
        Ok((records, total))
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "prediction_records",
        db.operation = "count"
    ))]
    async fn count(&self) -> Result<i64, AppError> {
        Ok(count_records(&self.pool).await?)
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "prediction_records",
        db.operation = "aggregate"
    ))]
    async fn aggregate_by_label(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<LabelAggregate>, AppError> {
        let rows = sqlx::query_as::<Postgres, LabelAggregate>(
            r#"
            SELECT
                prediction_result AS label,
                COUNT(*)::BIGINT AS count,
                (COUNT(*) FILTER (WHERE upload_timestamp >= $1))::BIGINT AS count_since,
                COALESCE(SUM(processing_time), 0)::DOUBLE PRECISION AS processing_time_sum
            FROM prediction_records
            GROUP BY prediction_result
            ORDER BY prediction_result
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
