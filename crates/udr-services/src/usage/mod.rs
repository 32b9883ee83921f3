//! Usage data reports

pub mod aggregator;
mod service;

pub use service::UsageReportService;
