//! Usage data report DTOs

use serde::{Deserialize, Serialize};
use udr_core::models::{TalkTime, UsageSummary};

/// Accumulated talk time in one direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallTimeResponse {
    /// `HH:MM:SS`, hours not capped at 23
    pub total_time: String,
    /// Same total in seconds
    pub total_seconds: u64,
}

impl From<TalkTime> for CallTimeResponse {
    fn from(time: TalkTime) -> Self {
        Self {
            total_time: time.to_string(),
            total_seconds: time.as_secs(),
        }
    }
}

/// Usage data report of one subscriber
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageReportResponse {
    /// Subscriber MSISDN
    pub msisdn: String,
    /// Talk time of received calls
    pub incoming_call: CallTimeResponse,
    /// Talk time of placed calls
    pub outgoing_call: CallTimeResponse,
}

impl From<UsageSummary> for UsageReportResponse {
    fn from(summary: UsageSummary) -> Self {
        Self {
            incoming_call: summary.incoming.into(),
            outgoing_call: summary.outgoing.into(),
            msisdn: summary.msisdn,
        }
    }
}

/// Query for one subscriber's usage
#[derive(Debug, Clone, Deserialize)]
pub struct UsageQuery {
    /// Subscriber MSISDN
    pub msisdn: String,
    /// Optional `YYYY-MM`; absent or empty means all time
    #[serde(default)]
    pub month: Option<String>,
}

/// Query for a whole month
#[derive(Debug, Clone, Deserialize)]
pub struct MonthQuery {
    /// `YYYY-MM`
    pub month: String,
}
