//! Streak walking
//!
//! Walks backward from today over the qualified day set and counts
//! consecutive qualifying days.
//!
//! Today is a grace day: if it has not qualified yet the walk moves on to
//! yesterday without counting or breaking, since the user may still train
//! later today. Any other non-qualifying day ends the streak.
//!
//! The walk is capped at `horizon_days`. A streak longer than the horizon is
//! reported as exactly `horizon_days` rather than computed unbounded.

use chrono::{Days, NaiveDate};

use crate::config::DEFAULT_HORIZON_DAYS;
use crate::types::QualifiedDaySet;

/// Streak walker over a qualified day set
pub struct StreakWalker;

impl StreakWalker {
    /// Walk with the default 365-day horizon
    pub fn walk_default(qualified_days: &QualifiedDaySet, today: NaiveDate) -> u32 {
        Self::walk(qualified_days, today, DEFAULT_HORIZON_DAYS)
    }

    /// Count consecutive qualifying days ending at or just before `today`
    pub fn walk(qualified_days: &QualifiedDaySet, today: NaiveDate, horizon_days: u32) -> u32 {
        let mut count = 0;

        for i in 0..horizon_days {
            let Some(day) = today.checked_sub_days(Days::new(u64::from(i))) else {
                break;
            };

            if qualified_days.contains(&day) {
                count += 1;
            } else if is_grace_day(i) {
                continue;
            } else {
                break;
            }
        }

        count
    }
}

/// Today not qualifying yet does not break the streak
fn is_grace_day(offset_from_today: u32) -> bool {
    offset_from_today == 0
}
