//! In-memory repositories
//!
//! Process-local stores used when `storage.backend = "memory"` and by the
//! test suites. Ids are assigned from a per-store counter starting at 1.
//! Query results are ordered the same way as the PostgreSQL queries
//! (by start time, then id).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, instrument};
use udr_core::{
    models::{CallRecord, Subscriber},
    traits::{CallRecordRepository, Repository, SubscriberRepository},
    AppResult,
};

struct Table<T> {
    rows: Vec<T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Call records held in memory
#[derive(Default)]
pub struct InMemoryCallRecordRepository {
    table: RwLock<Table<CallRecord>>,
}

impl InMemoryCallRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `records`, assigning fresh ids
    pub fn with_records(records: impl IntoIterator<Item = CallRecord>) -> Self {
        let repo = Self::new();
        {
            let mut table = repo.table.write();
            for mut record in records {
                record.id = table.allocate_id();
                table.rows.push(record);
            }
        }
        repo
    }

    fn select<F>(&self, predicate: F) -> Vec<CallRecord>
    where
        F: Fn(&CallRecord) -> bool,
    {
        let mut matched: Vec<CallRecord> = self
            .table
            .read()
            .rows
            .iter()
            .filter(|record| predicate(record))
            .cloned()
            .collect();
        matched.sort_by(|a, b| (a.start_time, a.id).cmp(&(b.start_time, b.id)));
        matched
    }
}

fn in_window(record: &CallRecord, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    record.start_time >= start && record.start_time < end
}

#[async_trait]
impl Repository<CallRecord, i64> for InMemoryCallRecordRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<CallRecord>> {
        Ok(self
            .table
            .read()
            .rows
            .iter()
            .find(|record| record.id == id)
            .cloned())
    }

    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<CallRecord>> {
        let offset = usize::try_from(offset).unwrap_or(0);
        let limit = usize::try_from(limit).unwrap_or(0);

        Ok(self
            .select(|_| true)
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.table.read().rows.len() as i64)
    }

    async fn create(&self, entity: &CallRecord) -> AppResult<CallRecord> {
        let mut table = self.table.write();
        let mut record = entity.clone();
        record.id = table.allocate_id();
        table.rows.push(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl CallRecordRepository for InMemoryCallRecordRepository {
    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn create_batch(&self, records: &[CallRecord]) -> AppResult<usize> {
        let mut table = self.table.write();
        table.rows.reserve(records.len());
        for record in records {
            let mut stored = record.clone();
            stored.id = table.allocate_id();
            table.rows.push(stored);
        }
        debug!("Stored {} call records in memory", records.len());
        Ok(records.len())
    }

    async fn delete_all(&self) -> AppResult<u64> {
        let mut table = self.table.write();
        let removed = table.rows.len() as u64;
        table.rows.clear();
        Ok(removed)
    }

    async fn find_by_participant(&self, msisdn: &str) -> AppResult<Vec<CallRecord>> {
        Ok(self.select(|record| record.involves(msisdn)))
    }

    async fn find_by_participant_and_range(
        &self,
        msisdn: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<CallRecord>> {
        Ok(self.select(|record| record.involves(msisdn) && in_window(record, start, end)))
    }

    async fn find_all_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<CallRecord>> {
        Ok(self.select(|record| in_window(record, start, end)))
    }

    async fn find_latest_end_time(&self) -> AppResult<Option<DateTime<Utc>>> {
        Ok(self
            .table
            .read()
            .rows
            .iter()
            .map(|record| record.end_time)
            .max())
    }
}

/// Subscribers held in memory
#[derive(Default)]
pub struct InMemorySubscriberRepository {
    table: RwLock<Table<Subscriber>>,
}

impl InMemorySubscriberRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository<Subscriber, i64> for InMemorySubscriberRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Subscriber>> {
        Ok(self.table.read().rows.iter().find(|s| s.id == id).cloned())
    }

    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Subscriber>> {
        let offset = usize::try_from(offset).unwrap_or(0);
        let limit = usize::try_from(limit).unwrap_or(0);

        Ok(self
            .table
            .read()
            .rows
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.table.read().rows.len() as i64)
    }

    async fn create(&self, entity: &Subscriber) -> AppResult<Subscriber> {
        let mut table = self.table.write();
        let subscriber = Subscriber {
            id: table.allocate_id(),
            msisdn: entity.msisdn.clone(),
        };
        table.rows.push(subscriber.clone());
        Ok(subscriber)
    }
}

#[async_trait]
impl SubscriberRepository for InMemorySubscriberRepository {
    async fn create_batch(&self, msisdns: &[String]) -> AppResult<Vec<Subscriber>> {
        let mut table = self.table.write();
        let created: Vec<Subscriber> = msisdns
            .iter()
            .map(|msisdn| Subscriber {
                id: table.allocate_id(),
                msisdn: msisdn.clone(),
            })
            .collect();
        table.rows.extend(created.iter().cloned());
        Ok(created)
    }

    async fn list_all(&self) -> AppResult<Vec<Subscriber>> {
        Ok(self.table.read().rows.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use udr_core::models::CallType;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 10, day, hour, 0, 0).unwrap()
    }

    fn call(p1: &str, p2: &str, day: u32, hour: u32) -> CallRecord {
        CallRecord::new(
            CallType::Outgoing,
            p1,
            p2,
            at(day, hour),
            at(day, hour) + chrono::Duration::seconds(60),
        )
    }

    #[tokio::test]
    async fn test_create_batch_assigns_ids() {
        let repo = InMemoryCallRecordRepository::new();
        let stored = repo
            .create_batch(&[
                call("71111111111", "72222222222", 1, 10),
                call("72222222222", "73333333333", 2, 10),
            ])
            .await
            .unwrap();

        assert_eq!(stored, 2);
        assert_eq!(repo.count().await.unwrap(), 2);
        assert!(repo.find_by_id(1).await.unwrap().is_some());
        assert!(repo.find_by_id(2).await.unwrap().is_some());
        assert!(repo.find_by_id(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_participant_matches_either_side() {
        let repo = InMemoryCallRecordRepository::with_records([
            call("71111111111", "72222222222", 1, 10),
            call("73333333333", "71111111111", 2, 10),
            call("72222222222", "73333333333", 3, 10),
        ]);

        let found = repo.find_by_participant("71111111111").await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|r| r.involves("71111111111")));
    }

    #[tokio::test]
    async fn test_range_is_half_open() {
        let repo = InMemoryCallRecordRepository::with_records([
            call("71111111111", "72222222222", 1, 0),
            call("71111111111", "72222222222", 2, 0),
        ]);

        let found = repo.find_all_in_range(at(1, 0), at(2, 0)).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start_time, at(1, 0));

        let found = repo
            .find_by_participant_and_range("72222222222", at(1, 0), at(2, 1))
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_results_ordered_by_start_time() {
        let repo = InMemoryCallRecordRepository::with_records([
            call("71111111111", "72222222222", 5, 10),
            call("71111111111", "72222222222", 1, 10),
        ]);

        let all = repo.find_all(10, 0).await.unwrap();
        assert_eq!(all[0].start_time, at(1, 10));
        assert_eq!(all[1].start_time, at(5, 10));

        let page = repo.find_all(1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].start_time, at(5, 10));
    }

    #[tokio::test]
    async fn test_delete_all_and_latest_end_time() {
        let repo = InMemoryCallRecordRepository::with_records([
            call("71111111111", "72222222222", 1, 10),
            call("71111111111", "72222222222", 3, 10),
        ]);

        assert_eq!(
            repo.find_latest_end_time().await.unwrap(),
            Some(at(3, 10) + chrono::Duration::seconds(60))
        );
        assert_eq!(repo.delete_all().await.unwrap(), 2);
        assert_eq!(repo.count().await.unwrap(), 0);
        assert_eq!(repo.find_latest_end_time().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_subscriber_batch() {
        let repo = InMemorySubscriberRepository::new();
        assert_eq!(repo.count().await.unwrap(), 0);

        let created = repo
            .create_batch(&["71111111111".to_string(), "72222222222".to_string()])
            .await
            .unwrap();
        assert_eq!(created[0].id, 1);
        assert_eq!(created[1].id, 2);
        assert_eq!(repo.list_all().await.unwrap(), created);
    }
}
