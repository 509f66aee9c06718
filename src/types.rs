//! Core types for the streak engine
//!
//! This module defines the data that flows through each stage of the
//! engine: activity events, per-day buckets, the qualified day set and
//! the streak output.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Kind of logged activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// One completed strength set (a `workout_logs` row)
    StrengthSet,
    /// One saved cardio session (a `cardio_logs` row)
    CardioSession,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::StrengthSet => "strength_set",
            ActivityKind::CardioSession => "cardio_session",
        }
    }
}

/// A single logged activity. Events are append-only and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub kind: ActivityKind,
    /// Instant the activity was logged (UTC)
    pub occurred_at: DateTime<Utc>,
}

impl ActivityEvent {
    pub fn strength_set(occurred_at: DateTime<Utc>) -> Self {
        Self {
            kind: ActivityKind::StrengthSet,
            occurred_at,
        }
    }

    pub fn cardio_session(occurred_at: DateTime<Utc>) -> Self {
        Self {
            kind: ActivityKind::CardioSession,
            occurred_at,
        }
    }
}

/// Activity counts for one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBucket {
    pub calendar_day: NaiveDate,
    pub strength_set_count: u32,
    pub cardio_session_count: u32,
}

impl DayBucket {
    pub fn empty(calendar_day: NaiveDate) -> Self {
        Self {
            calendar_day,
            strength_set_count: 0,
            cardio_session_count: 0,
        }
    }

    pub fn cardio_session_present(&self) -> bool {
        self.cardio_session_count > 0
    }

    pub(crate) fn record(&mut self, kind: ActivityKind) {
        match kind {
            ActivityKind::StrengthSet => self.strength_set_count += 1,
            ActivityKind::CardioSession => self.cardio_session_count += 1,
        }
    }
}

/// Calendar days that met the qualification rule
pub type QualifiedDaySet = BTreeSet<NaiveDate>;

/// Current streak as of a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakResult {
    pub count: u32,
    pub as_of_day: NaiveDate,
}

/// One cell of the qualification calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStatus {
    pub day: NaiveDate,
    pub strength_set_count: u32,
    pub cardio_session_count: u32,
    pub qualified: bool,
}

/// Dashboard-facing output of one engine run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakReport {
    pub streak: StreakResult,
    /// Horizon the walk was bounded by; streaks longer than this are undercounted
    pub horizon_days: u32,
    /// UTC offset that defined the day boundary, e.g. "+02:00"
    pub utc_offset: String,
    /// Oldest day first, ending at `streak.as_of_day`
    pub calendar: Vec<DayStatus>,
    pub qualified_days_in_window: u32,
}
