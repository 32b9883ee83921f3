//! Common traits for repositories
//!
//! Defines the storage abstractions the services are written against.

use crate::error::AppError;
use crate::models::{CallRecord, Subscriber};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Generic repository trait for basic entity access
#[async_trait]
pub trait Repository<T, ID>: Send + Sync {
    /// Find entity by ID
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, AppError>;

    /// Find all entities with pagination
    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<T>, AppError>;

    /// Count total entities
    async fn count(&self) -> Result<i64, AppError>;

    /// Create a new entity
    async fn create(&self, entity: &T) -> Result<T, AppError>;
}

/// Call record store
///
/// Time-window queries match on `start_time` with an inclusive start and an
/// exclusive end.
#[async_trait]
pub trait CallRecordRepository: Repository<CallRecord, i64> {
    /// Insert many records, returning how many were stored
    async fn create_batch(&self, records: &[CallRecord]) -> Result<usize, AppError>;

    /// Remove every record
    async fn delete_all(&self) -> Result<u64, AppError>;

    /// Records where `msisdn` is either participant
    async fn find_by_participant(&self, msisdn: &str) -> Result<Vec<CallRecord>, AppError>;

    /// Records where `msisdn` is either participant, started within `[start, end)`
    async fn find_by_participant_and_range(
        &self,
        msisdn: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CallRecord>, AppError>;

    /// All records started within `[start, end)`
    async fn find_all_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CallRecord>, AppError>;

    /// Latest `end_time` in the store
    async fn find_latest_end_time(&self) -> Result<Option<DateTime<Utc>>, AppError>;
}

/// Subscriber store
#[async_trait]
pub trait SubscriberRepository: Repository<Subscriber, i64> {
    /// Insert subscribers for the given MSISDNs
    async fn create_batch(&self, msisdns: &[String]) -> Result<Vec<Subscriber>, AppError>;

    /// Every stored subscriber
    async fn list_all(&self) -> Result<Vec<Subscriber>, AppError>;
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };

        Self {
            total,
            page,
            per_page,
            total_pages,
        }
    }
}
