//! Benchmarks for usage aggregation
//!
//! Run with: cargo bench --package udr-services
//!
//! These benchmarks measure the in-memory fold only (no store queries).

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use udr_core::models::{CallRecord, CallType};
use udr_services::usage::aggregator::{summarize_all, summarize_subscriber};

/// Synthetic month of traffic between `subscribers` MSISDNs
fn create_records(count: usize, subscribers: usize) -> Vec<CallRecord> {
    let month_start = Utc.with_ymd_and_hms(2023, 10, 1, 0, 0, 0).unwrap();

    (0..count)
        .map(|i| {
            let caller = i % subscribers;
            let receiver = (i * 7 + 1) % subscribers;
            let receiver = if receiver == caller {
                (receiver + 1) % subscribers
            } else {
                receiver
            };
            let start = month_start + Duration::seconds((i as i64 * 97) % (30 * 86_400));

            CallRecord::new(
                if i % 2 == 0 {
                    CallType::Outgoing
                } else {
                    CallType::Incoming
                },
                format!("7{:010}", caller),
                format!("7{:010}", receiver),
                start,
                start + Duration::seconds(30 + (i as i64 % 570)),
            )
        })
        .collect()
}

fn bench_summarize_subscriber(c: &mut Criterion) {
    let records = create_records(1_000, 2);
    let msisdn = format!("7{:010}", 0);

    c.bench_function("summarize_subscriber_1000", |b| {
        b.iter(|| summarize_subscriber(black_box(&msisdn), black_box(&records)));
    });
}

fn bench_summarize_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("summarize_all");

    for size in [100, 1_000, 10_000].iter() {
        let records = create_records(*size, 21);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| summarize_all(black_box(&records)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_summarize_subscriber, bench_summarize_all);
criterion_main!(benches);
