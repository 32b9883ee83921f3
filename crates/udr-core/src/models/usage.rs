//! Usage data report models
//!
//! A [`UsageSummary`] holds the accumulated incoming and outgoing talk time of
//! one subscriber over a query period. Totals routinely exceed a day for
//! monthly and all-time reports, so [`TalkTime`] never wraps.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::AddAssign;
use std::time::Duration;

use crate::models::CallType;

/// Accumulated talk time
///
/// Backed by an unsigned duration, so a total can never become negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct TalkTime(Duration);

impl TalkTime {
    /// Zero talk time
    pub const fn zero() -> Self {
        Self(Duration::ZERO)
    }

    /// Add elapsed time in place (saturating)
    pub fn add(&mut self, elapsed: Duration) {
        self.0 = self.0.saturating_add(elapsed);
    }

    /// Total elapsed time
    #[inline]
    pub fn value(&self) -> Duration {
        self.0
    }

    /// Total in whole seconds
    #[inline]
    pub fn as_secs(&self) -> u64 {
        self.0.as_secs()
    }
}

impl AddAssign<Duration> for TalkTime {
    fn add_assign(&mut self, rhs: Duration) {
        self.add(rhs);
    }
}

impl From<Duration> for TalkTime {
    fn from(value: Duration) -> Self {
        Self(value)
    }
}

/// Formats as `HH:MM:SS`; the hour field is not bounded to 23.
impl fmt::Display for TalkTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.as_secs();
        write!(
            f,
            "{:02}:{:02}:{:02}",
            secs / 3600,
            (secs % 3600) / 60,
            secs % 60
        )
    }
}

/// Usage data report for one subscriber
///
/// Two summaries are equal when they belong to the same MSISDN, whatever
/// their accumulated totals.
#[derive(Debug, Clone)]
pub struct UsageSummary {
    pub msisdn: String,
    pub incoming: TalkTime,
    pub outgoing: TalkTime,
}

impl UsageSummary {
    /// Create an empty summary
    pub fn new(msisdn: impl Into<String>) -> Self {
        Self {
            msisdn: msisdn.into(),
            incoming: TalkTime::zero(),
            outgoing: TalkTime::zero(),
        }
    }

    /// Add elapsed time to the bucket for `direction`
    pub fn record(&mut self, direction: CallType, elapsed: Duration) {
        match direction {
            CallType::Incoming => self.incoming.add(elapsed),
            CallType::Outgoing => self.outgoing.add(elapsed),
        }
    }

    /// Combined incoming and outgoing talk time
    pub fn total(&self) -> TalkTime {
        let mut total = self.incoming;
        total.add(self.outgoing.value());
        total
    }
}

impl PartialEq for UsageSummary {
    fn eq(&self, other: &Self) -> bool {
        self.msisdn == other.msisdn
    }
}

impl Eq for UsageSummary {}

impl Hash for UsageSummary {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.msisdn.hash(state);
    }
}
