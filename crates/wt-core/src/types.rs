//! Core type definitions with validation.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The hourly rate was negative.
    #[error("hourly rate cannot be negative, got {value}")]
    NegativeRate { value: Decimal },

    /// The hourly rate could not be parsed as a decimal.
    #[error("invalid hourly rate: {value}")]
    InvalidRate { value: String },

    /// Unknown enumeration value.
    #[error("invalid {field}: {value}")]
    UnknownVariant { field: &'static str, value: String },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated entry identifier.
    ///
    /// Entry IDs are assigned once at creation and never change.
    EntryId, "entry ID"
);

define_string_id!(
    /// A validated task identifier.
    TaskId, "task ID"
);

define_string_id!(
    /// A validated user identifier.
    UserId, "user ID"
);

define_string_id!(
    /// A validated project identifier.
    ProjectId, "project ID"
);

define_string_id!(
    /// A validated company identifier.
    CompanyId, "company ID"
);

/// A user's hourly rate, used to turn elapsed hours into a bill.
///
/// Rates are non-negative decimals. Deserialization rejects negative values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct HourlyRate(Decimal);

impl HourlyRate {
    /// A zero rate; entries still accumulate time but bill nothing.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new rate after validation.
    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        if value < Decimal::ZERO {
            return Err(ValidationError::NegativeRate { value });
        }
        Ok(Self(value))
    }

    /// Returns the inner decimal value.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }
}

impl Default for HourlyRate {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for HourlyRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<Decimal> for HourlyRate {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<HourlyRate> for Decimal {
    fn from(rate: HourlyRate) -> Self {
        rate.0
    }
}

impl FromStr for HourlyRate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(|_| ValidationError::InvalidRate {
            value: s.to_string(),
        })?;
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_id_rejects_empty() {
        assert!(EntryId::new("").is_err());
        assert!(EntryId::new("   ").is_err());
        assert!(EntryId::new("entry-1").is_ok());
    }

    #[test]
    fn task_id_serde_roundtrip() {
        let id = TaskId::new("task-123").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"task-123\"");
        let parsed: TaskId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn user_id_serde_rejects_empty() {
        let result: Result<UserId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn empty_id_error_names_field() {
        let err = ProjectId::new("").unwrap_err();
        assert_eq!(err.to_string(), "project ID cannot be empty");
    }

    #[test]
    fn hourly_rate_rejects_negative() {
        assert!(HourlyRate::new(Decimal::new(-1, 0)).is_err());
        assert!(HourlyRate::new(Decimal::ZERO).is_ok());
        assert!(HourlyRate::new(Decimal::new(1050, 2)).is_ok());
    }

    #[test]
    fn hourly_rate_parses_from_str() {
        let rate: HourlyRate = "42.50".parse().unwrap();
        assert_eq!(rate.value(), Decimal::new(4250, 2));
        assert!("abc".parse::<HourlyRate>().is_err());
        assert!("-3".parse::<HourlyRate>().is_err());
    }

    #[test]
    fn hourly_rate_displays_two_places() {
        let rate = HourlyRate::new(Decimal::new(10, 0)).unwrap();
        assert_eq!(rate.to_string(), "10.00");
    }

    #[test]
    fn hourly_rate_serde_rejects_negative() {
        let result: Result<HourlyRate, _> = serde_json::from_str("\"-5\"");
        assert!(result.is_err());
        let rate: HourlyRate = serde_json::from_str("\"12.5\"").unwrap();
        assert_eq!(rate.value(), Decimal::new(125, 1));
    }
}
