//! Wall-clock times and calendar-date keys used by availability and booking.
//!
//! Every `HH:MM` string that takes part in arithmetic goes through
//! [`ClockTime::parse`]; dates are only shape-checked and otherwise treated
//! as opaque keys.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("'{0}' is not in HH:MM format")]
    Format(String),

    #[error("'{0}' is not a valid time of day (hours 00-23, minutes 00-59)")]
    OutOfRange(String),

    #[error("'{0}' is not a valid YYYY-MM-DD date")]
    InvalidDate(String),
}

/// Time of day with minute precision, stored as minutes past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    /// Parses a zero-padded 24-hour `HH:MM` string.
    pub fn parse(value: &str) -> Result<Self, TimeParseError> {
        let bytes = value.as_bytes();
        let well_formed = bytes.len() == 5
            && bytes[2] == b':'
            && bytes[..2].iter().chain(&bytes[3..]).all(u8::is_ascii_digit);
        if !well_formed {
            return Err(TimeParseError::Format(value.to_string()));
        }

        let time = NaiveTime::parse_from_str(value, "%H:%M")
            .map_err(|_| TimeParseError::OutOfRange(value.to_string()))?;

        Ok(ClockTime((time.hour() * 60 + time.minute()) as u16))
    }

    /// `None` once the value would reach midnight of the next day.
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then(|| ClockTime(minutes as u16))
    }

    pub fn minutes(&self) -> u32 {
        u32::from(self.0)
    }

    pub fn hour(&self) -> u32 {
        self.minutes() / 60
    }

    pub fn minute(&self) -> u32 {
        self.minutes() % 60
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClockTime::parse(s)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = TimeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ClockTime::parse(&value)
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

/// Checks that `value` is a real `YYYY-MM-DD` calendar date.
///
/// The string itself stays the key; it is never converted to an instant.
pub fn validate_calendar_date(value: &str) -> Result<(), TimeParseError> {
    if value.len() != 10 {
        return Err(TimeParseError::InvalidDate(value.to_string()));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| TimeParseError::InvalidDate(value.to_string()))
}

/// Half-open interval overlap: touching endpoints do not overlap.
pub fn ranges_overlap(start: ClockTime, end: ClockTime, other_start: ClockTime, other_end: ClockTime) -> bool {
    start < other_end && end > other_start
}
