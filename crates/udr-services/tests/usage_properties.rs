//! Usage aggregation properties and end-to-end scenarios over the in-memory store

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use udr_core::{
    models::{BillingMonth, CallRecord, CallType, Period},
    AppError,
};
use udr_db::InMemoryCallRecordRepository;
use udr_services::usage::aggregator::{summarize_all, summarize_subscriber};
use udr_services::UsageReportService;

const POOL: [&str; 4] = ["71111111111", "72222222222", "73333333333", "74444444444"];

fn october(offset_secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 10, 1, 0, 0, 0).unwrap() + Duration::seconds(offset_secs)
}

fn call_type(outgoing: bool) -> CallType {
    if outgoing {
        CallType::Outgoing
    } else {
        CallType::Incoming
    }
}

/// Records between distinct subscribers of `POOL`
fn records_strategy() -> impl Strategy<Value = Vec<CallRecord>> {
    prop::collection::vec(
        (0usize..4, 1usize..4, any::<bool>(), 0i64..28 * 86_400, 0i64..7_200),
        1..60,
    )
    .prop_map(|calls| {
        calls
            .into_iter()
            .map(|(caller, step, outgoing, offset, secs)| {
                let start = october(offset);
                CallRecord::new(
                    call_type(outgoing),
                    POOL[caller],
                    POOL[(caller + step) % POOL.len()],
                    start,
                    start + Duration::seconds(secs),
                )
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn outgoing_call_counts_equally_for_both_sides(
        caller in 0usize..4,
        step in 1usize..4,
        secs in 0i64..200_000,
    ) {
        let p1 = POOL[caller];
        let p2 = POOL[(caller + step) % POOL.len()];
        let record = CallRecord::new(
            CallType::Outgoing,
            p1,
            p2,
            october(0),
            october(secs),
        );

        let first = summarize_subscriber(p1, std::slice::from_ref(&record)).unwrap();
        let second = summarize_subscriber(p2, std::slice::from_ref(&record)).unwrap();

        prop_assert_eq!(first.outgoing.as_secs(), secs as u64);
        prop_assert_eq!(second.incoming.as_secs(), secs as u64);
        prop_assert_eq!(first.incoming.as_secs(), 0);
        prop_assert_eq!(second.outgoing.as_secs(), 0);
    }

    #[test]
    fn month_totals_are_linear_over_records(records in records_strategy()) {
        let summaries = summarize_all(&records).unwrap();

        for summary in &summaries {
            let mut incoming = 0u64;
            let mut outgoing = 0u64;
            for record in records.iter() {
                let secs = record.duration().num_seconds() as u64;
                match record.direction_for(&summary.msisdn) {
                    Some(CallType::Incoming) => incoming += secs,
                    Some(CallType::Outgoing) => outgoing += secs,
                    None => {}
                }
            }
            prop_assert_eq!(summary.incoming.as_secs(), incoming);
            prop_assert_eq!(summary.outgoing.as_secs(), outgoing);
        }

        let attributed: u64 = summaries.iter().map(|s| s.total().as_secs()).sum();
        let recorded: u64 = records
            .iter()
            .map(|r| r.duration().num_seconds() as u64)
            .sum();
        prop_assert_eq!(attributed, 2 * recorded);
    }

    #[test]
    fn month_summaries_are_unique_and_sorted(records in records_strategy()) {
        let summaries = summarize_all(&records).unwrap();
        let msisdns: Vec<&str> = summaries.iter().map(|s| s.msisdn.as_str()).collect();

        let mut expected = msisdns.clone();
        expected.sort_unstable();
        expected.dedup();
        prop_assert_eq!(msisdns, expected);
    }
}

fn service(records: Vec<CallRecord>) -> UsageReportService<InMemoryCallRecordRepository> {
    UsageReportService::new(Arc::new(InMemoryCallRecordRepository::with_records(records)))
}

fn minutes(call_type: CallType, p1: &str, p2: &str, start: DateTime<Utc>, mins: i64) -> CallRecord {
    CallRecord::new(call_type, p1, p2, start, start + Duration::minutes(mins))
}

#[tokio::test]
async fn month_window_includes_first_instant_and_excludes_next_month() {
    let (a, b) = (POOL[0], POOL[1]);
    let service = service(vec![
        minutes(CallType::Outgoing, a, b, Utc.with_ymd_and_hms(2023, 10, 1, 0, 0, 0).unwrap(), 1),
        minutes(CallType::Outgoing, a, b, Utc.with_ymd_and_hms(2023, 10, 31, 23, 59, 59).unwrap(), 2),
        minutes(CallType::Outgoing, a, b, Utc.with_ymd_and_hms(2023, 11, 1, 0, 0, 0).unwrap(), 4),
        minutes(CallType::Outgoing, a, b, Utc.with_ymd_and_hms(2023, 9, 30, 23, 59, 59).unwrap(), 8),
    ]);

    let october = Period::Month(BillingMonth::parse("2023-10").unwrap());
    let summary = service.usage_by_subscriber(a, october).await.unwrap();
    assert_eq!(summary.outgoing.as_secs(), 3 * 60);

    let all = service
        .usage_for_month(BillingMonth::parse("2023-11").unwrap())
        .await
        .unwrap();
    assert_eq!(all[0].outgoing.as_secs(), 4 * 60);
}

#[tokio::test]
async fn december_window_rolls_into_next_year() {
    let (a, b) = (POOL[0], POOL[1]);
    let service = service(vec![
        minutes(CallType::Incoming, a, b, Utc.with_ymd_and_hms(2023, 12, 31, 23, 0, 0).unwrap(), 5),
        minutes(CallType::Incoming, a, b, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), 7),
    ]);

    let december = Period::Month(BillingMonth::parse("2023-12").unwrap());
    let summary = service.usage_by_subscriber(a, december).await.unwrap();
    assert_eq!(summary.incoming.as_secs(), 5 * 60);
}

#[tokio::test]
async fn single_call_seen_from_both_sides() {
    let (a, b) = (POOL[0], POOL[1]);
    let service = service(vec![minutes(CallType::Outgoing, a, b, october(36_000), 5)]);

    let caller = service.usage_by_subscriber(a, Period::AllTime).await.unwrap();
    assert_eq!(caller.outgoing.to_string(), "00:05:00");
    assert_eq!(caller.incoming.to_string(), "00:00:00");

    let receiver = service.usage_by_subscriber(b, Period::AllTime).await.unwrap();
    assert_eq!(receiver.incoming.to_string(), "00:05:00");
    assert_eq!(receiver.outgoing.to_string(), "00:00:00");
}

#[tokio::test]
async fn month_report_applies_direction_table_per_record() {
    let (a, b) = (POOL[0], POOL[1]);
    let service = service(vec![
        minutes(CallType::Outgoing, a, b, october(3_600), 3),
        minutes(CallType::Incoming, b, a, october(7_200), 4),
    ]);

    let summaries = service
        .usage_for_month(BillingMonth::parse("2023-10").unwrap())
        .await
        .unwrap();

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].msisdn, a);
    assert_eq!(summaries[0].outgoing.as_secs(), 7 * 60);
    assert_eq!(summaries[0].incoming.as_secs(), 0);
    assert_eq!(summaries[1].msisdn, b);
    assert_eq!(summaries[1].incoming.as_secs(), 7 * 60);
    assert_eq!(summaries[1].outgoing.as_secs(), 0);
}

#[tokio::test]
async fn month_without_calls_is_no_data() {
    let service = service(vec![minutes(CallType::Outgoing, POOL[0], POOL[1], october(0), 1)]);

    let november = Period::Month(BillingMonth::parse("2023-11").unwrap());
    assert!(matches!(
        service.usage_by_subscriber(POOL[0], november).await,
        Err(AppError::NoData)
    ));
    assert!(matches!(
        service.usage_by_subscriber(POOL[2], Period::AllTime).await,
        Err(AppError::NoData)
    ));
    assert!(matches!(
        service
            .usage_for_month(BillingMonth::parse("2023-11").unwrap())
            .await,
        Err(AppError::NoData)
    ));
}

#[tokio::test]
async fn short_identifier_rejected_regardless_of_store() {
    let service = service(vec![minutes(CallType::Outgoing, POOL[0], POOL[1], october(0), 1)]);

    assert!(matches!(
        service.usage_by_subscriber("12345", Period::AllTime).await,
        Err(AppError::InvalidIdentifier(_))
    ));
}
