//! Reference calendar
//!
//! The single day-boundary rule applied to every event of one computation.
//! A calendar is a fixed UTC offset: midnight is the same instant for all
//! events in a run, no matter which log they came from.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ComputeError;

const MAX_OFFSET_SECONDS: i32 = 18 * 3600;

/// Fixed-offset calendar used to assign instants to calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceCalendar {
    offset: FixedOffset,
}

impl Default for ReferenceCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl ReferenceCalendar {
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    pub fn from_offset(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Build a calendar from an offset in seconds east of UTC
    pub fn from_offset_seconds(seconds: i32) -> Result<Self, ComputeError> {
        FixedOffset::east_opt(seconds)
            .map(Self::from_offset)
            .ok_or_else(|| ComputeError::InvalidTimezone(format!("{} seconds", seconds)))
    }

    /// Parse `UTC`, `Z`, `+HH:MM`, `-HHMM` or `+HH`
    pub fn parse(s: &str) -> Result<Self, ComputeError> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("utc") || trimmed.eq_ignore_ascii_case("z") {
            return Ok(Self::utc());
        }

        let invalid = || ComputeError::InvalidTimezone(s.to_string());

        let (sign, rest) = match trimmed.as_bytes().first() {
            Some(b'+') => (1, &trimmed[1..]),
            Some(b'-') => (-1, &trimmed[1..]),
            _ => return Err(invalid()),
        };

        if !rest.is_ascii() {
            return Err(invalid());
        }
        // Accepted shapes: HH, HHMM, HH:MM
        let (hours, minutes) = match (rest.len(), rest.as_bytes().get(2)) {
            (2, _) => (rest, "00"),
            (4, _) => (&rest[..2], &rest[2..]),
            (5, Some(b':')) => (&rest[..2], &rest[3..]),
            _ => return Err(invalid()),
        };
        if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if minutes >= 60 {
            return Err(invalid());
        }

        let seconds = sign * (hours * 3600 + minutes * 60);
        if seconds.abs() > MAX_OFFSET_SECONDS {
            return Err(invalid());
        }
        Self::from_offset_seconds(seconds)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Calendar day an instant falls on under this calendar
    pub fn day_of(&self, instant: &DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Today's calendar day for a supplied "now".
    ///
    /// The clock is always passed in; nothing here reads system time.
    pub fn today(&self, now: &DateTime<Utc>) -> NaiveDate {
        self.day_of(now)
    }
}

impl fmt::Display for ReferenceCalendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.offset)
    }
}

impl FromStr for ReferenceCalendar {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ReferenceCalendar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ReferenceCalendar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Parse a `YYYY-MM-DD` calendar day
pub fn parse_day(s: &str) -> Result<NaiveDate, ComputeError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| ComputeError::DateParseError(format!("{}: {}", s, e)))
}
