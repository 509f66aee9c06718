//! Event normalization
//!
//! This module buckets activity events into calendar days.
//! - One reference calendar per call, shared by both logs
//! - Strength sets are counted, cardio sessions are counted and OR-ed
//! - Duplicates are kept; each event lands in exactly one bucket

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::calendar::ReferenceCalendar;
use crate::types::{ActivityEvent, DayBucket};

/// Normalizer for converting activity events to day buckets
pub struct EventNormalizer;

impl EventNormalizer {
    /// Bucket events by calendar day.
    ///
    /// Input order does not matter. Every `occurred_at` must already be a
    /// valid instant; rejecting malformed records is the producer's job.
    pub fn bucket(
        events: &[ActivityEvent],
        calendar: &ReferenceCalendar,
    ) -> BTreeMap<NaiveDate, DayBucket> {
        let mut buckets: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();

        for event in events {
            let day = calendar.day_of(&event.occurred_at);
            buckets
                .entry(day)
                .or_insert_with(|| DayBucket::empty(day))
                .record(event.kind);
        }

        buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn at(day: u32, hour: u32, minute: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, hour, minute, 0).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    #[test]
    fn test_empty_input() {
        assert!(EventNormalizer::bucket(&[], &ReferenceCalendar::utc()).is_empty());
    }

    #[test]
    fn test_counts_per_day() {
        let events = vec![
            ActivityEvent::strength_set(at(3, 8, 0)),
            ActivityEvent::strength_set(at(3, 8, 5)),
            ActivityEvent::cardio_session(at(3, 18, 0)),
            ActivityEvent::strength_set(at(4, 9, 0)),
        ];

        let buckets = EventNormalizer::bucket(&events, &ReferenceCalendar::utc());

        assert_eq!(buckets.len(), 2);
        assert_eq!(
            buckets[&date(3)],
            DayBucket {
                calendar_day: date(3),
                strength_set_count: 2,
                cardio_session_count: 1,
            }
        );
        assert_eq!(buckets[&date(4)].strength_set_count, 1);
        assert!(!buckets[&date(4)].cardio_session_present());
    }

    #[test]
    fn test_duplicates_both_count() {
        let instant = at(5, 12, 0);
        let events = vec![
            ActivityEvent::strength_set(instant),
            ActivityEvent::strength_set(instant),
        ];

        let buckets = EventNormalizer::bucket(&events, &ReferenceCalendar::utc());
        assert_eq!(buckets[&date(5)].strength_set_count, 2);
    }

    #[test]
    fn test_both_logs_share_the_day_boundary() {
        // 22:30 UTC is already the next day at +02:00, for both kinds
        let events = vec![
            ActivityEvent::strength_set(at(7, 22, 30)),
            ActivityEvent::cardio_session(at(7, 22, 45)),
        ];
        let calendar = ReferenceCalendar::parse("+02:00").unwrap();

        let buckets = EventNormalizer::bucket(&events, &calendar);

        assert_eq!(buckets.keys().copied().collect::<Vec<_>>(), vec![date(8)]);
        assert_eq!(buckets[&date(8)].strength_set_count, 1);
        assert!(buckets[&date(8)].cardio_session_present());
    }

    #[test]
    fn test_every_event_lands_in_one_bucket() {
        let events: Vec<_> = (0..48)
            .map(|i| ActivityEvent::strength_set(at(10 + i / 24, i % 24, 0)))
            .collect();

        let buckets = EventNormalizer::bucket(&events, &ReferenceCalendar::parse("-07:00").unwrap());
        let total: u32 = buckets.values().map(|b| b.strength_set_count).sum();
        assert_eq!(total as usize, events.len());
    }
}
