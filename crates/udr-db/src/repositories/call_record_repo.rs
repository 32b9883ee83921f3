//! Call record repository implementation
//!
//! Provides PostgreSQL-backed storage for call detail records with
//! participant and start-time window queries.
//! Uses runtime queries (not compile-time macros) to avoid requiring
//! database connection at build time.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgArguments, PgPool, Postgres, QueryBuilder};
use tracing::{debug, error, instrument};
use udr_core::{
    models::{CallRecord, CallType},
    traits::{CallRecordRepository, Repository},
    AppError, AppResult,
};

/// Rows per INSERT statement (5 bind parameters each)
const INSERT_CHUNK: usize = 1000;

/// PostgreSQL implementation of CallRecordRepository
pub struct PgCallRecordRepository {
    pool: PgPool,
}

impl PgCallRecordRepository {
    /// Create a new call record repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(
        &self,
        query: sqlx::query::QueryAs<'_, Postgres, CallRecordRow, PgArguments>,
    ) -> AppResult<Vec<CallRecord>> {
        let rows = query.fetch_all(&self.pool).await.map_err(|e| {
            error!("Database error fetching call records: {}", e);
            AppError::Database(format!("Failed to fetch call records: {}", e))
        })?;

        rows.into_iter().map(CallRecord::try_from).collect()
    }
}

const SELECT_COLUMNS: &str = "id, call_type, phone_one, phone_two, start_time, end_time";

#[async_trait]
impl Repository<CallRecord, i64> for PgCallRecordRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> AppResult<Option<CallRecord>> {
        debug!("Finding call record by id: {}", id);

        let query = format!("SELECT {} FROM call_records WHERE id = $1", SELECT_COLUMNS);

        let row = sqlx::query_as::<Postgres, CallRecordRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding call record {}: {}", id, e);
                AppError::Database(format!("Failed to find call record: {}", e))
            })?;

        row.map(CallRecord::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<CallRecord>> {
        debug!("Finding call records with limit {} offset {}", limit, offset);

        let query = format!(
            "SELECT {} FROM call_records ORDER BY start_time, id LIMIT $1 OFFSET $2",
            SELECT_COLUMNS
        );

        self.fetch(
            sqlx::query_as::<Postgres, CallRecordRow>(&query)
                .bind(limit)
                .bind(offset),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM call_records")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting call records: {}", e);
                AppError::Database(format!("Failed to count call records: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &CallRecord) -> AppResult<CallRecord> {
        let query = format!(
            r#"
            INSERT INTO call_records (call_type, phone_one, phone_two, start_time, end_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            SELECT_COLUMNS
        );

        let row = sqlx::query_as::<Postgres, CallRecordRow>(&query)
            .bind(entity.call_type.code())
            .bind(&entity.phone_one)
            .bind(&entity.phone_two)
            .bind(entity.start_time)
            .bind(entity.end_time)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error creating call record: {}", e);
                AppError::Database(format!("Failed to create call record: {}", e))
            })?;

        row.try_into()
    }
}

#[async_trait]
impl CallRecordRepository for PgCallRecordRepository {
    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn create_batch(&self, records: &[CallRecord]) -> AppResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;

        for chunk in records.chunks(INSERT_CHUNK) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO call_records (call_type, phone_one, phone_two, start_time, end_time) ",
            );
            builder.push_values(chunk, |mut row, record| {
                row.push_bind(record.call_type.code())
                    .push_bind(&record.phone_one)
                    .push_bind(&record.phone_two)
                    .push_bind(record.start_time)
                    .push_bind(record.end_time);
            });

            builder.build().execute(&mut *tx).await.map_err(|e| {
                error!("Database error inserting call record batch: {}", e);
                AppError::Database(format!("Failed to insert call records: {}", e))
            })?;
        }

        tx.commit().await?;

        debug!("Inserted {} call records", records.len());
        Ok(records.len())
    }

    #[instrument(skip(self))]
    async fn delete_all(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM call_records")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting call records: {}", e);
                AppError::Database(format!("Failed to delete call records: {}", e))
            })?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn find_by_participant(&self, msisdn: &str) -> AppResult<Vec<CallRecord>> {
        let query = format!(
            "SELECT {} FROM call_records WHERE phone_one = $1 OR phone_two = $1 ORDER BY start_time, id",
            SELECT_COLUMNS
        );

        self.fetch(sqlx::query_as::<Postgres, CallRecordRow>(&query).bind(msisdn))
            .await
    }

    #[instrument(skip(self))]
    async fn find_by_participant_and_range(
        &self,
        msisdn: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<CallRecord>> {
        let query = format!(
            r#"
            SELECT {} FROM call_records
            WHERE start_time >= $2 AND start_time < $3
              AND (phone_one = $1 OR phone_two = $1)
            ORDER BY start_time, id
            "#,
            SELECT_COLUMNS
        );

        self.fetch(
            sqlx::query_as::<Postgres, CallRecordRow>(&query)
                .bind(msisdn)
                .bind(start)
                .bind(end),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn find_all_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<CallRecord>> {
        let query = format!(
            "SELECT {} FROM call_records WHERE start_time >= $1 AND start_time < $2 ORDER BY start_time, id",
            SELECT_COLUMNS
        );

        self.fetch(
            sqlx::query_as::<Postgres, CallRecordRow>(&query)
                .bind(start)
                .bind(end),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn find_latest_end_time(&self) -> AppResult<Option<DateTime<Utc>>> {
        let result: (Option<DateTime<Utc>>,) =
            sqlx::query_as("SELECT MAX(end_time) FROM call_records")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error reading latest end time: {}", e);
                    AppError::Database(format!("Failed to read latest end time: {}", e))
                })?;

        Ok(result.0)
    }
}

/// Helper struct for mapping database rows to domain model
#[derive(Debug, sqlx::FromRow)]
struct CallRecordRow {
    id: i64,
    call_type: String,
    phone_one: String,
    phone_two: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

impl TryFrom<CallRecordRow> for CallRecord {
    type Error = AppError;

    fn try_from(row: CallRecordRow) -> Result<Self, Self::Error> {
        let call_type = CallType::from_code(row.call_type.trim()).ok_or_else(|| {
            AppError::Database(format!(
                "call record {} has unknown call type '{}'",
                row.id, row.call_type
            ))
        })?;

        Ok(Self {
            id: row.id,
            call_type,
            phone_one: row.phone_one,
            phone_two: row.phone_two,
            start_time: row.start_time,
            end_time: row.end_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(call_type: &str) -> CallRecordRow {
        let now = Utc::now();
        CallRecordRow {
            id: 7,
            call_type: call_type.to_string(),
            phone_one: "71111111111".to_string(),
            phone_two: "72222222222".to_string(),
            start_time: now,
            end_time: now,
        }
    }

    #[test]
    fn test_call_record_row_conversion() {
        let record = CallRecord::try_from(row("02")).unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.call_type, CallType::Incoming);
        assert_eq!(record.phone_one, "71111111111");
    }

    #[test]
    fn test_call_record_row_rejects_unknown_type() {
        assert!(matches!(
            CallRecord::try_from(row("09")),
            Err(AppError::Database(_))
        ));
    }
}
