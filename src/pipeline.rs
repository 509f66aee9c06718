//! Pipeline orchestration
//!
//! This module provides the public API for liftstreak.
//! It runs the three engine stages over a fully materialized event set:
//! EventNormalizer → DayQualifier → StreakWalker.

use chrono::{Days, NaiveDate};
use std::collections::BTreeMap;

use crate::calendar::{parse_day, ReferenceCalendar};
use crate::config::EngineConfig;
use crate::error::ComputeError;
use crate::normalizer::EventNormalizer;
use crate::qualifier::DayQualifier;
use crate::schema::ActivityLogAdapter;
use crate::types::{
    ActivityEvent, DayBucket, DayStatus, QualifiedDaySet, StreakReport, StreakResult,
};
use crate::walker::StreakWalker;

/// Supplier of a user's complete activity history.
///
/// Implementations wrap the external data store. A load must either
/// return the full history or fail; the engine never runs on a partial set.
pub trait EventSource {
    fn load_events(&self, user_id: &str) -> Result<Vec<ActivityEvent>, ComputeError>;
}

/// Compute the current streak with the default configuration.
///
/// # Arguments
/// * `events` - Every strength-set and cardio event of the user, any order
/// * `calendar` - Reference calendar defining midnight
/// * `today` - Current calendar day in that calendar
///
/// # Example
/// ```ignore
/// let streak = compute_streak(&events, &ReferenceCalendar::utc(), today);
/// ```
pub fn compute_streak(
    events: &[ActivityEvent],
    calendar: &ReferenceCalendar,
    today: NaiveDate,
) -> StreakResult {
    let config = EngineConfig {
        calendar: *calendar,
        ..EngineConfig::default()
    };
    StreakEngine { config }.streak(events, today)
}

/// Convert a store activity-log JSON document into a streak report JSON.
///
/// # Arguments
/// * `log_json` - `{"workout_logs": [...], "cardio_logs": [...]}`
/// * `utc_offset` - Reference calendar, e.g. "UTC" or "+02:00"
/// * `today` - Current day as `YYYY-MM-DD`
pub fn activity_log_to_report(
    log_json: String,
    utc_offset: String,
    today: String,
) -> Result<String, ComputeError> {
    let calendar = ReferenceCalendar::parse(&utc_offset)?;
    let today = parse_day(&today)?;

    let log = ActivityLogAdapter::parse_log(&log_json)?;
    let events = ActivityLogAdapter::to_events(&log)?;

    let engine = StreakEngine::with_calendar(calendar);
    let report = engine.report(&events, today);
    Ok(serde_json::to_string(&report)?)
}

/// Streak engine bound to one configuration.
///
/// Stateless between calls: every computation starts from the events it is
/// given, so repeated or concurrent calls never interfere.
#[derive(Debug, Clone, Default)]
pub struct StreakEngine {
    config: EngineConfig,
}

impl StreakEngine {
    /// Create an engine with the default policy, 365-day horizon and UTC
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_calendar(calendar: ReferenceCalendar) -> Self {
        Self {
            config: EngineConfig {
                calendar,
                ..EngineConfig::default()
            },
        }
    }

    /// Create an engine from a configuration, rejecting invalid ones
    pub fn with_config(config: EngineConfig) -> Result<Self, ComputeError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Stage 1: bucket events by day
    pub fn bucket(&self, events: &[ActivityEvent]) -> BTreeMap<NaiveDate, DayBucket> {
        EventNormalizer::bucket(events, &self.config.calendar)
    }

    /// Stages 1 and 2: the set of qualifying days
    pub fn qualified_days(&self, events: &[ActivityEvent]) -> QualifiedDaySet {
        let buckets = self.bucket(events);
        DayQualifier::qualify(&buckets, &self.config.policy)
    }

    /// Run all three stages and return the current streak
    pub fn streak(&self, events: &[ActivityEvent], today: NaiveDate) -> StreakResult {
        let qualified = self.qualified_days(events);
        let count = StreakWalker::walk(&qualified, today, self.config.horizon_days);

        tracing::debug!(
            events = events.len(),
            qualified_days = qualified.len(),
            streak = count,
            %today,
            "Computed streak"
        );

        StreakResult {
            count,
            as_of_day: today,
        }
    }

    /// Streak plus the qualification calendar for the trailing window
    pub fn report(&self, events: &[ActivityEvent], today: NaiveDate) -> StreakReport {
        let buckets = self.bucket(events);
        let qualified = DayQualifier::qualify(&buckets, &self.config.policy);
        let count = StreakWalker::walk(&qualified, today, self.config.horizon_days);

        let calendar = self.calendar_window(&buckets, &qualified, today);
        let qualified_days_in_window = calendar.iter().filter(|d| d.qualified).count() as u32;

        tracing::debug!(
            events = events.len(),
            bucketed_days = buckets.len(),
            qualified_days = qualified.len(),
            streak = count,
            %today,
            "Built streak report"
        );

        StreakReport {
            streak: StreakResult {
                count,
                as_of_day: today,
            },
            horizon_days: self.config.horizon_days,
            utc_offset: self.config.calendar.to_string(),
            calendar,
            qualified_days_in_window,
        }
    }

    /// Load a user's history and compute the streak.
    ///
    /// Any load failure is returned as-is and no streak is computed.
    pub fn compute_from_source(
        &self,
        source: &dyn EventSource,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<StreakReport, ComputeError> {
        let events = source.load_events(user_id).map_err(|e| {
            tracing::warn!(user_id, error = %e, "Event source failed, streak not computed");
            e
        })?;
        Ok(self.report(&events, today))
    }

    fn calendar_window(
        &self,
        buckets: &BTreeMap<NaiveDate, DayBucket>,
        qualified: &QualifiedDaySet,
        today: NaiveDate,
    ) -> Vec<DayStatus> {
        let mut window: Vec<DayStatus> = (0..self.config.calendar_days)
            .map_while(|i| today.checked_sub_days(Days::new(u64::from(i))))
            .map(|day| {
                let bucket = buckets
                    .get(&day)
                    .copied()
                    .unwrap_or_else(|| DayBucket::empty(day));
                DayStatus {
                    day,
                    strength_set_count: bucket.strength_set_count,
                    cardio_session_count: bucket.cardio_session_count,
                    qualified: qualified.contains(&day),
                }
            })
            .collect();
        window.reverse();
        window
    }
}
