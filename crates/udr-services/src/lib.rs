//! Business logic services for UDR Billing
//!
//! This crate contains the services that turn stored call detail records
//! into usage data reports, generate synthetic traffic and export per
//! subscriber CDR files.
//!
//! # Architecture
//!
//! Services are written against the repository traits from `udr-core`:
//! - Each service owns its dependencies behind `Arc`
//! - Aggregation itself is pure and synchronous (see [`usage::aggregator`])
//! - All store-facing operations are instrumented with tracing
//!
//! # Services
//!
//! - `UsageReportService` - Usage data reports per subscriber or per month
//! - `CdrGenerator` - Synthetic CDR generation for a subscriber pool
//! - `CdrReportExporter` - CSV export of one subscriber's CDRs

pub mod generator;
pub mod report;
pub mod usage;

pub use generator::{CdrGenerator, GenerationSummary};
pub use report::{CdrReportExporter, ReportReceipt};
pub use usage::UsageReportService;

/// Business logic constants
pub mod constants {
    /// Leading digit of generated MSISDNs
    pub const MSISDN_PREFIX: char = '7';

    /// Random digits appended to the prefix
    pub const MSISDN_RANDOM_DIGITS: usize = 10;

    /// First year a generation run may start in when the store is empty
    pub const EARLIEST_START_YEAR: i32 = 1980;

    /// Last year a generation run may start in when the store is empty
    pub const LATEST_START_YEAR: i32 = 2024;

    /// Seconds in a day
    pub const SECONDS_PER_DAY: u32 = 86_400;

    /// Extension of exported report files
    pub const REPORT_FILE_EXTENSION: &str = "csv";
}
