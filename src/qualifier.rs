//! Day qualification
//!
//! Applies the per-activity thresholds to each day's bucket independently.
//! There is no cross-day aggregation at this stage.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::types::{DayBucket, QualifiedDaySet};

/// Strength sets needed on one day for it to qualify
pub const DEFAULT_MIN_STRENGTH_SETS: u32 = 2;

/// Cardio sessions needed on one day for it to qualify
pub const DEFAULT_MIN_CARDIO_SESSIONS: u32 = 1;

/// Threshold policy for a qualifying day.
///
/// A day qualifies when it reaches either threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualificationPolicy {
    pub min_strength_sets: u32,
    pub min_cardio_sessions: u32,
}

impl Default for QualificationPolicy {
    fn default() -> Self {
        Self {
            min_strength_sets: DEFAULT_MIN_STRENGTH_SETS,
            min_cardio_sessions: DEFAULT_MIN_CARDIO_SESSIONS,
        }
    }
}

impl QualificationPolicy {
    pub fn is_qualified(&self, bucket: &DayBucket) -> bool {
        bucket.strength_set_count >= self.min_strength_sets
            || bucket.cardio_session_count >= self.min_cardio_sessions
    }
}

/// Day qualifier for turning buckets into the qualified day set
pub struct DayQualifier;

impl DayQualifier {
    /// Return every bucketed day that meets `policy`.
    ///
    /// Days missing from `buckets` had no activity and never qualify.
    pub fn qualify(
        buckets: &BTreeMap<NaiveDate, DayBucket>,
        policy: &QualificationPolicy,
    ) -> QualifiedDaySet {
        buckets
            .iter()
            .filter(|(_, bucket)| policy.is_qualified(bucket))
            .map(|(day, _)| *day)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn bucket(d: u32, sets: u32, cardio: u32) -> (NaiveDate, DayBucket) {
        (
            day(d),
            DayBucket {
                calendar_day: day(d),
                strength_set_count: sets,
                cardio_session_count: cardio,
            },
        )
    }

    #[test]
    fn test_default_thresholds() {
        let policy = QualificationPolicy::default();
        assert_eq!(policy.min_strength_sets, 2);
        assert_eq!(policy.min_cardio_sessions, 1);
    }

    #[test]
    fn test_qualification_rule() {
        let buckets: BTreeMap<_, _> = vec![
            bucket(1, 0, 0),
            bucket(2, 1, 0),
            bucket(3, 2, 0),
            bucket(4, 0, 1),
            bucket(5, 1, 1),
            bucket(6, 7, 3),
        ]
        .into_iter()
        .collect();

        let qualified = DayQualifier::qualify(&buckets, &QualificationPolicy::default());

        assert_eq!(
            qualified.into_iter().collect::<Vec<_>>(),
            vec![day(3), day(4), day(5), day(6)]
        );
    }

    #[test]
    fn test_single_set_never_qualifies_by_default() {
        let buckets: BTreeMap<_, _> = vec![bucket(10, 1, 0)].into_iter().collect();
        assert!(DayQualifier::qualify(&buckets, &QualificationPolicy::default()).is_empty());
    }

    #[test]
    fn test_custom_policy() {
        let policy = QualificationPolicy {
            min_strength_sets: 5,
            min_cardio_sessions: 2,
        };
        let buckets: BTreeMap<_, _> = vec![bucket(1, 4, 1), bucket(2, 5, 0), bucket(3, 0, 2)]
            .into_iter()
            .collect();

        let qualified = DayQualifier::qualify(&buckets, &policy);
        assert_eq!(qualified.into_iter().collect::<Vec<_>>(), vec![day(2), day(3)]);
    }

    #[test]
    fn test_more_activity_never_unqualifies() {
        let policy = QualificationPolicy::default();
        let mut b = bucket(1, 2, 0).1;
        assert!(policy.is_qualified(&b));
        b.strength_set_count += 10;
        b.cardio_session_count += 1;
        assert!(policy.is_qualified(&b));
    }

    #[test]
    fn test_partial_policy_json_uses_defaults() {
        let policy: QualificationPolicy =
            serde_json::from_str(r#"{"min_strength_sets": 3}"#).unwrap();
        assert_eq!(policy.min_strength_sets, 3);
        assert_eq!(policy.min_cardio_sessions, DEFAULT_MIN_CARDIO_SESSIONS);
    }
}
