//! CDR report export
//!
//! Writes the calls of one subscriber over a date range to a CSV file named
//! `<msisdn>_<uuid>.csv` in the reports directory.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::SecondsFormat;
use serde::Serialize;
use tracing::{debug, info, instrument};
use udr_core::{
    models::{CallRecord, Msisdn, ReportRange},
    traits::CallRecordRepository,
    AppError, AppResult,
};
use uuid::Uuid;

use crate::constants::REPORT_FILE_EXTENSION;

/// Written report
#[derive(Debug, Clone, Serialize)]
pub struct ReportReceipt {
    /// Identifier embedded in the file name
    pub report_id: Uuid,

    /// Location of the CSV file
    pub path: PathBuf,

    /// Number of call records in the file
    pub records: usize,
}

/// CSV exporter for per-subscriber CDRs
pub struct CdrReportExporter<R: CallRecordRepository + ?Sized> {
    records: Arc<R>,
    directory: PathBuf,
}

impl<R: CallRecordRepository + ?Sized> CdrReportExporter<R> {
    /// Create an exporter writing into `directory`
    pub fn new(records: Arc<R>, directory: impl Into<PathBuf>) -> Self {
        Self {
            records,
            directory: directory.into(),
        }
    }

    /// Export the calls of `msisdn` started within `range`
    ///
    /// The reports directory is created when missing.
    ///
    /// # Errors
    ///
    /// - `AppError::InvalidIdentifier` if `msisdn` is not 11 characters long
    /// - `AppError::NoData` if the subscriber has no calls in the range
    /// - `AppError::ReportWrite` if the file cannot be written
    #[instrument(skip(self))]
    pub async fn export(&self, msisdn: &str, range: ReportRange) -> AppResult<ReportReceipt> {
        let msisdn = Msisdn::parse(msisdn)?;
        let (start, end) = range.window();

        let records = self
            .records
            .find_by_participant_and_range(msisdn.as_str(), start, end)
            .await?;
        if records.is_empty() {
            return Err(AppError::NoData);
        }
        debug!("Exporting {} call records for {}", records.len(), msisdn);

        let report_id = Uuid::new_v4();
        let path = self.directory.join(format!(
            "{}_{}.{}",
            msisdn, report_id, REPORT_FILE_EXTENSION
        ));

        let csv = render_csv(&records)?;

        tokio::fs::create_dir_all(&self.directory).await?;
        tokio::fs::write(&path, csv).await?;

        info!(
            report_id = %report_id,
            records = records.len(),
            "CDR report written to {}",
            path.display()
        );

        Ok(ReportReceipt {
            report_id,
            path,
            records: records.len(),
        })
    }
}

/// One line per record: `call_type,phone_one,phone_two,start,end`
fn render_csv(records: &[CallRecord]) -> AppResult<Vec<u8>> {
    let mut out = Vec::with_capacity(records.len() * 64);

    for record in records {
        writeln!(
            out,
            "{},{},{},{},{}",
            record.call_type.code(),
            record.phone_one,
            record.phone_two,
            record.start_time.to_rfc3339_opts(SecondsFormat::Secs, true),
            record.end_time.to_rfc3339_opts(SecondsFormat::Secs, true),
        )
        .map_err(|e| AppError::ReportWrite(format!("Failed to render report: {}", e)))?;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use udr_core::models::CallType;
    use udr_db::InMemoryCallRecordRepository;

    const A: &str = "71111111111";
    const B: &str = "72222222222";

    fn call(day: u32, p1: &str, p2: &str) -> CallRecord {
        let start = Utc.with_ymd_and_hms(2023, 10, day, 9, 30, 0).unwrap();
        CallRecord::new(
            CallType::Outgoing,
            p1,
            p2,
            start,
            start + chrono::Duration::seconds(90),
        )
    }

    #[test]
    fn test_render_csv_lines() {
        let csv = render_csv(&[call(1, A, B)]).unwrap();
        assert_eq!(
            String::from_utf8(csv).unwrap(),
            "01,71111111111,72222222222,2023-10-01T09:30:00Z,2023-10-01T09:31:30Z\n"
        );
    }

    #[tokio::test]
    async fn test_export_writes_file_for_inclusive_range() {
        let dir = tempfile::tempdir().unwrap();
        let reports = dir.path().join("reports");
        let repo = Arc::new(InMemoryCallRecordRepository::with_records([
            call(1, A, B),
            call(3, B, A),
            call(4, A, B),
            call(3, B, "73333333333"),
        ]));
        let exporter = CdrReportExporter::new(repo, &reports);

        let range = ReportRange::parse("2023-10-01", "2023-10-03").unwrap();
        let receipt = exporter.export(A, range).await.unwrap();

        assert_eq!(receipt.records, 2);
        assert_eq!(
            receipt.path,
            reports.join(format!("{}_{}.csv", A, receipt.report_id))
        );

        let content = std::fs::read_to_string(&receipt.path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("01,71111111111,72222222222,2023-10-01"));
        assert!(lines[1].starts_with("01,72222222222,71111111111,2023-10-03"));
    }

    #[tokio::test]
    async fn test_export_without_records_is_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = CdrReportExporter::new(
            Arc::new(InMemoryCallRecordRepository::new()),
            dir.path(),
        );

        let range = ReportRange::parse("2023-10-01", "2023-10-31").unwrap();
        assert!(matches!(
            exporter.export(A, range).await,
            Err(AppError::NoData)
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_export_rejects_bad_msisdn() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = CdrReportExporter::new(
            Arc::new(InMemoryCallRecordRepository::with_records([call(1, A, B)])),
            dir.path(),
        );

        let range = ReportRange::parse("2023-10-01", "2023-10-31").unwrap();
        assert!(matches!(
            exporter.export("7111", range).await,
            Err(AppError::InvalidIdentifier(_))
        ));
    }

    #[tokio::test]
    async fn test_export_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();

        let exporter = CdrReportExporter::new(
            Arc::new(InMemoryCallRecordRepository::with_records([call(1, A, B)])),
            &blocker,
        );

        let range = ReportRange::parse("2023-10-01", "2023-10-31").unwrap();
        assert!(matches!(
            exporter.export(A, range).await,
            Err(AppError::ReportWrite(_))
        ));
    }
}
