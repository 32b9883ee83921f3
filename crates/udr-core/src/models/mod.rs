//! Domain models for UDR Billing
//!
//! This module contains all the core domain models used throughout the application.

pub mod cdr;
pub mod period;
pub mod subscriber;
pub mod usage;

pub use cdr::{CallRecord, CallType, Participant};
pub use period::{BillingMonth, Period, ReportRange};
pub use subscriber::{Msisdn, Subscriber, MSISDN_LENGTH};
pub use usage::{TalkTime, UsageSummary};
