//! Usage aggregation
//!
//! Pure functions folding already-fetched call records into usage data
//! reports. Nothing here touches the store, so callers can run them on any
//! thread and as often as they like.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, warn};
use udr_core::{
    models::{CallRecord, Participant, UsageSummary},
    AppError, AppResult,
};

/// Talk time of a record, zero when its end precedes its start
fn talk_time(record: &CallRecord) -> Duration {
    match record.elapsed() {
        Some(elapsed) => elapsed,
        None => {
            warn!(
                record_id = record.id,
                start = %record.start_time,
                end = %record.end_time,
                "Call record ends before it starts, counting zero talk time"
            );
            Duration::ZERO
        }
    }
}

/// Summarize the records of one subscriber
///
/// Every record adds its duration to exactly one bucket of the summary,
/// chosen by the call type and the side of the call `msisdn` is on.
/// Records `msisdn` did not take part in are skipped.
///
/// # Errors
///
/// Returns `AppError::NoData` when `records` is empty.
pub fn summarize_subscriber(msisdn: &str, records: &[CallRecord]) -> AppResult<UsageSummary> {
    if records.is_empty() {
        return Err(AppError::NoData);
    }

    let mut summary = UsageSummary::new(msisdn);

    for record in records {
        match record.direction_for(msisdn) {
            Some(direction) => summary.record(direction, talk_time(record)),
            None => debug!(record_id = record.id, "Record does not involve {}", msisdn),
        }
    }

    Ok(summary)
}

/// Summarize every subscriber appearing in `records`
///
/// Each record is attributed to both participants: `phone_one` in the
/// direction of the call type, `phone_two` in the opposite one. The result
/// holds one summary per distinct MSISDN, sorted by MSISDN.
///
/// # Errors
///
/// Returns `AppError::NoData` when `records` is empty.
pub fn summarize_all(records: &[CallRecord]) -> AppResult<Vec<UsageSummary>> {
    let mut by_msisdn: HashMap<String, UsageSummary> = HashMap::new();

    for record in records {
        let elapsed = talk_time(record);

        for (msisdn, role) in [
            (&record.phone_one, Participant::PhoneOne),
            (&record.phone_two, Participant::PhoneTwo),
        ] {
            by_msisdn
                .entry(msisdn.clone())
                .or_insert_with(|| UsageSummary::new(msisdn.as_str()))
                .record(record.direction_of(role), elapsed);
        }
    }

    if by_msisdn.is_empty() {
        return Err(AppError::NoData);
    }

    let mut summaries: Vec<UsageSummary> = by_msisdn.into_values().collect();
    summaries.sort_by(|a, b| a.msisdn.cmp(&b.msisdn));
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use udr_core::models::CallType;

    const A: &str = "71111111111";
    const B: &str = "72222222222";
    const C: &str = "73333333333";

    fn ts(day: u32, h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 10, day, h, m, s).unwrap()
    }

    fn call(call_type: CallType, p1: &str, p2: &str, secs: i64) -> CallRecord {
        let start = ts(1, 10, 0, 0);
        CallRecord::new(call_type, p1, p2, start, start + chrono::Duration::seconds(secs))
    }

    #[test]
    fn test_single_outgoing_call() {
        let records = vec![CallRecord::new(
            CallType::Outgoing,
            A,
            B,
            ts(1, 10, 0, 0),
            ts(1, 10, 5, 0),
        )];

        let summary = summarize_subscriber(A, &records).unwrap();
        assert_eq!(summary.msisdn, A);
        assert_eq!(summary.incoming.to_string(), "00:00:00");
        assert_eq!(summary.outgoing.to_string(), "00:05:00");
    }

    #[test]
    fn test_direction_table_for_subscriber() {
        let records = vec![
            call(CallType::Outgoing, A, B, 10),
            call(CallType::Outgoing, B, A, 20),
            call(CallType::Incoming, A, B, 40),
            call(CallType::Incoming, B, A, 80),
        ];

        let summary = summarize_subscriber(A, &records).unwrap();
        assert_eq!(summary.outgoing.as_secs(), 10 + 80);
        assert_eq!(summary.incoming.as_secs(), 20 + 40);
    }

    #[test]
    fn test_totals_cross_day_boundary() {
        let records = vec![
            call(CallType::Incoming, A, B, 23 * 3600),
            call(CallType::Outgoing, B, A, 2 * 3600 + 15 * 60 + 3),
        ];

        let summary = summarize_subscriber(A, &records).unwrap();
        assert_eq!(summary.incoming.to_string(), "25:15:03");
    }

    #[test]
    fn test_empty_records_is_no_data() {
        assert!(matches!(summarize_subscriber(A, &[]), Err(AppError::NoData)));
        assert!(matches!(summarize_all(&[]), Err(AppError::NoData)));
    }

    #[test]
    fn test_negative_duration_counts_as_zero() {
        let records = vec![call(CallType::Outgoing, A, B, -120), call(CallType::Outgoing, A, B, 60)];

        let summary = summarize_subscriber(A, &records).unwrap();
        assert_eq!(summary.outgoing.as_secs(), 60);

        let all = summarize_all(&records).unwrap();
        assert_eq!(all[1].incoming.as_secs(), 60);
    }

    #[test]
    fn test_summarize_all_attributes_both_sides() {
        let records = vec![
            call(CallType::Outgoing, A, B, 100),
            call(CallType::Incoming, B, C, 30),
        ];

        let all = summarize_all(&records).unwrap();
        let msisdns: Vec<&str> = all.iter().map(|s| s.msisdn.as_str()).collect();
        assert_eq!(msisdns, vec![A, B, C]);

        assert_eq!(all[0].outgoing.as_secs(), 100);
        assert_eq!(all[0].incoming.as_secs(), 0);
        assert_eq!(all[1].incoming.as_secs(), 100 + 30);
        assert_eq!(all[1].outgoing.as_secs(), 0);
        assert_eq!(all[2].outgoing.as_secs(), 30);
        assert_eq!(all[2].incoming.as_secs(), 0);
    }

    #[test]
    fn test_summarize_all_matches_per_subscriber_view() {
        let records = vec![
            call(CallType::Outgoing, A, B, 100),
            call(CallType::Incoming, B, C, 30),
            call(CallType::Incoming, C, A, 45),
        ];

        for summary in summarize_all(&records).unwrap() {
            let own: Vec<CallRecord> = records
                .iter()
                .filter(|r| r.involves(&summary.msisdn))
                .cloned()
                .collect();
            let single = summarize_subscriber(&summary.msisdn, &own).unwrap();
            assert_eq!(single.incoming, summary.incoming);
            assert_eq!(single.outgoing, summary.outgoing);
        }
    }
}
