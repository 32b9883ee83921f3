//! CDR (Call Detail Record) model
//!
//! Represents one logged call between two subscribers, with the call type
//! expressed from the perspective of the first participant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Call type, relative to `phone_one` of the record
///
/// Serialized with the two-character codes used by the CDR files and
/// the storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallType {
    /// `phone_one` placed the call
    #[serde(rename = "01")]
    Outgoing,
    /// `phone_one` received the call
    #[serde(rename = "02")]
    Incoming,
}

impl CallType {
    /// Two-character CDR code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Outgoing => "01",
            Self::Incoming => "02",
        }
    }

    /// Parse a two-character CDR code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "01" => Some(Self::Outgoing),
            "02" => Some(Self::Incoming),
            _ => None,
        }
    }

    /// The same call seen from the other participant
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Self::Outgoing => Self::Incoming,
            Self::Incoming => Self::Outgoing,
        }
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CallType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
            .ok_or_else(|| AppError::InvalidInput(format!("unknown call type code '{}'", s)))
    }
}

/// Role a subscriber plays in a call record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Participant {
    PhoneOne,
    PhoneTwo,
}

/// CDR (Call Detail Record)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Store-assigned identifier (0 before persistence)
    pub id: i64,

    /// Call type relative to `phone_one`
    pub call_type: CallType,

    /// First participant MSISDN
    pub phone_one: String,

    /// Second participant MSISDN
    pub phone_two: String,

    /// Call start timestamp
    pub start_time: DateTime<Utc>,

    /// Call end timestamp
    pub end_time: DateTime<Utc>,
}

impl CallRecord {
    /// Build an unsaved record
    pub fn new(
        call_type: CallType,
        phone_one: impl Into<String>,
        phone_two: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            call_type,
            phone_one: phone_one.into(),
            phone_two: phone_two.into(),
            start_time,
            end_time,
        }
    }

    /// Signed elapsed time between start and end
    #[inline]
    pub fn duration(&self) -> chrono::Duration {
        self.end_time - self.start_time
    }

    /// Elapsed time, or `None` when the end precedes the start
    pub fn elapsed(&self) -> Option<std::time::Duration> {
        self.duration().to_std().ok()
    }

    /// Role of `msisdn` in this call, if it took part
    pub fn role_of(&self, msisdn: &str) -> Option<Participant> {
        if self.phone_one == msisdn {
            Some(Participant::PhoneOne)
        } else if self.phone_two == msisdn {
            Some(Participant::PhoneTwo)
        } else {
            None
        }
    }

    /// Direction of this call as seen by the given participant
    pub fn direction_of(&self, role: Participant) -> CallType {
        match (self.call_type, role) {
            (CallType::Outgoing, Participant::PhoneOne) => CallType::Outgoing,
            (CallType::Outgoing, Participant::PhoneTwo) => CallType::Incoming,
            (CallType::Incoming, Participant::PhoneOne) => CallType::Incoming,
            (CallType::Incoming, Participant::PhoneTwo) => CallType::Outgoing,
        }
    }

    /// Direction of this call as seen by `msisdn`, if it took part
    pub fn direction_for(&self, msisdn: &str) -> Option<CallType> {
        self.role_of(msisdn).map(|role| self.direction_of(role))
    }

    /// Check if `msisdn` is either participant
    #[inline]
    pub fn involves(&self, msisdn: &str) -> bool {
        self.phone_one == msisdn || self.phone_two == msisdn
    }
}
