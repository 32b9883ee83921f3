//! Billing periods and report date ranges
//!
//! All windows are half-open: the start instant is included and the end
//! instant is excluded.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc};
use std::fmt;

use crate::error::AppError;

/// Calendar month selected with a `YYYY-MM` string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BillingMonth {
    first_day: NaiveDate,
}

impl BillingMonth {
    /// Build from numeric year and month
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first_day| Self { first_day })
    }

    /// Parse a `YYYY-MM` string
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidMonthFormat` for anything else.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let invalid = || AppError::InvalidMonthFormat(raw.to_string());

        let bytes = raw.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return Err(invalid());
        }

        let first_day = NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d")
            .map_err(|_| invalid())?;

        Ok(Self { first_day })
    }

    #[inline]
    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    #[inline]
    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// `[first instant of the month, first instant of the next month)`
    pub fn window(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let next = self
            .first_day
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX);
        (start_of_day(self.first_day), start_of_day(next))
    }
}

impl fmt::Display for BillingMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// Query period for usage reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Month(BillingMonth),
    AllTime,
}

impl Period {
    /// Resolve an optional `month` query value; absent or empty means all time
    pub fn from_month_param(month: Option<&str>) -> Result<Self, AppError> {
        match month.map(str::trim) {
            None | Some("") => Ok(Self::AllTime),
            Some(raw) => BillingMonth::parse(raw).map(Self::Month),
        }
    }

    /// Time window, `None` for all time
    pub fn window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match self {
            Self::Month(month) => Some(month.window()),
            Self::AllTime => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Month(month) => fmt::Display::fmt(month, f),
            Self::AllTime => f.write_str("all-time"),
        }
    }
}

/// Inclusive date range for CDR report exports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportRange {
    /// Parse two `YYYY-MM-DD` dates
    ///
    /// # Errors
    ///
    /// `AppError::InvalidDateFormat` when either date is malformed,
    /// `AppError::InvalidInput` when `start` is after `end`.
    pub fn parse(start: &str, end: &str) -> Result<Self, AppError> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;

        if start > end {
            return Err(AppError::InvalidInput(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }

        Ok(Self { start, end })
    }

    /// `[start 00:00, day after end 00:00)`
    pub fn window(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let after_end = self
            .end
            .checked_add_days(Days::new(1))
            .unwrap_or(NaiveDate::MAX);
        (start_of_day(self.start), start_of_day(after_end))
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    if raw.len() != 10 {
        return Err(AppError::InvalidDateFormat(raw.to_string()));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidDateFormat(raw.to_string()))
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
