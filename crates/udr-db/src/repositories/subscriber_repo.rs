//! Subscriber repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, error, instrument};
use udr_core::{
    models::Subscriber,
    traits::{Repository, SubscriberRepository},
    AppError, AppResult,
};

/// PostgreSQL implementation of SubscriberRepository
pub struct PgSubscriberRepository {
    pool: PgPool,
}

impl PgSubscriberRepository {
    /// Create a new subscriber repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Subscriber, i64> for PgSubscriberRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Subscriber>> {
        let row = sqlx::query_as::<Postgres, SubscriberRow>(
            "SELECT id, msisdn FROM subscribers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding subscriber {}: {}", id, e);
            AppError::Database(format!("Failed to find subscriber: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Subscriber>> {
        let rows = sqlx::query_as::<Postgres, SubscriberRow>(
            "SELECT id, msisdn FROM subscribers ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing subscribers: {}", e);
            AppError::Database(format!("Failed to list subscribers: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subscribers")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to count subscribers: {}", e)))?;

        Ok(result.0)
    }

    #[instrument(skip(self))]
    async fn create(&self, entity: &Subscriber) -> AppResult<Subscriber> {
        let row = sqlx::query_as::<Postgres, SubscriberRow>(
            "INSERT INTO subscribers (msisdn) VALUES ($1) RETURNING id, msisdn",
        )
        .bind(&entity.msisdn)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating subscriber: {}", e);
            AppError::Database(format!("Failed to create subscriber: {}", e))
        })?;

        Ok(row.into())
    }
}

#[async_trait]
impl SubscriberRepository for PgSubscriberRepository {
    #[instrument(skip(self, msisdns), fields(count = msisdns.len()))]
    async fn create_batch(&self, msisdns: &[String]) -> AppResult<Vec<Subscriber>> {
        if msisdns.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO subscribers (msisdn) ");
        builder.push_values(msisdns, |mut row, msisdn| {
            row.push_bind(msisdn);
        });
        builder.push(" RETURNING id, msisdn");

        let rows = builder
            .build_query_as::<SubscriberRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error inserting subscribers: {}", e);
                AppError::Database(format!("Failed to insert subscribers: {}", e))
            })?;

        debug!("Inserted {} subscribers", rows.len());
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> AppResult<Vec<Subscriber>> {
        let rows = sqlx::query_as::<Postgres, SubscriberRow>(
            "SELECT id, msisdn FROM subscribers ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing subscribers: {}", e);
            AppError::Database(format!("Failed to list subscribers: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriberRow {
    id: i64,
    msisdn: String,
}

impl From<SubscriberRow> for Subscriber {
    fn from(row: SubscriberRow) -> Self {
        Self {
            id: row.id,
            msisdn: row.msisdn,
        }
    }
}
