//! CDR DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use udr_core::models::{CallRecord, CallType};
use udr_services::ReportReceipt;
use uuid::Uuid;

/// CDR response
#[derive(Debug, Clone, Serialize)]
pub struct CdrResponse {
    /// Record id
    pub id: i64,
    /// Call type code (`01` outgoing, `02` incoming) relative to `phone_one`
    pub call_type: CallType,
    /// First participant
    pub phone_one: String,
    /// Second participant
    pub phone_two: String,
    /// Call start
    pub start_time: DateTime<Utc>,
    /// Call end
    pub end_time: DateTime<Utc>,
    /// Call length in seconds
    pub duration_seconds: i64,
}

impl From<CallRecord> for CdrResponse {
    fn from(record: CallRecord) -> Self {
        let duration_seconds = record.duration().num_seconds();
        Self {
            id: record.id,
            call_type: record.call_type,
            phone_one: record.phone_one,
            phone_two: record.phone_two,
            start_time: record.start_time,
            end_time: record.end_time,
            duration_seconds,
        }
    }
}

/// CDR report request parameters
#[derive(Debug, Clone, Deserialize)]
pub struct ReportParams {
    /// Subscriber MSISDN
    pub msisdn: String,
    /// First day of the report, `YYYY-MM-DD`
    pub start: String,
    /// Last day of the report (inclusive), `YYYY-MM-DD`
    pub end: String,
}

/// Written CDR report
#[derive(Debug, Clone, Serialize)]
pub struct ReportResponse {
    /// Report UUID
    pub report_id: Uuid,
    /// Name of the CSV file in the reports directory
    pub file_name: String,
    /// Number of call records in the report
    pub records: usize,
}

impl From<ReportReceipt> for ReportResponse {
    fn from(receipt: ReportReceipt) -> Self {
        let file_name = receipt
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            report_id: receipt.report_id,
            file_name,
            records: receipt.records,
        }
    }
}
