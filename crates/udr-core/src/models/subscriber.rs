//! Subscriber model and MSISDN validation

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AppError;

/// Required MSISDN length (country code + 10 digits)
pub const MSISDN_LENGTH: usize = 11;

/// Subscriber known to the CDR generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    /// Unique identifier
    pub id: i64,

    /// Subscriber phone number
    pub msisdn: String,
}

/// Validated subscriber identifier
///
/// Only the fixed length is checked; the content is not interpreted as a
/// phone number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Msisdn(String);

impl Msisdn {
    /// Validate a raw identifier
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidIdentifier` unless `raw` is exactly
    /// [`MSISDN_LENGTH`] characters long.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        if raw.chars().count() != MSISDN_LENGTH {
            return Err(AppError::InvalidIdentifier(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Msisdn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Msisdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
