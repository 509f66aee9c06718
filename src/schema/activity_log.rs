//! Store row definitions for `workout_logs` and `cardio_logs`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ActivityEvent;

/// Table name of strength-set rows
pub const WORKOUT_LOGS_TABLE: &str = "workout_logs";

/// Table name of cardio-session rows
pub const CARDIO_LOGS_TABLE: &str = "cardio_logs";

/// One completed strength set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutLogRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Exercise the set belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_id: Option<Uuid>,
    pub logged_at: DateTime<Utc>,
    #[serde(default)]
    pub reps_completed: i64,
    /// Load in kilograms
    #[serde(default)]
    pub weight_used: f64,
}

impl WorkoutLogRecord {
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.reps_completed < 0 {
            return Err(RecordValidationError::NegativeReps(self.reps_completed));
        }
        if !self.weight_used.is_finite() || self.weight_used < 0.0 {
            return Err(RecordValidationError::InvalidWeight(self.weight_used));
        }
        Ok(())
    }

    pub fn to_event(&self) -> ActivityEvent {
        ActivityEvent::strength_set(self.logged_at)
    }
}

/// One saved cardio session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardioLogRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Machine or activity, e.g. "treadmill", "bike", "stairs", "elliptical"
    pub activity: String,
    #[serde(default)]
    pub duration_seconds: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub logged_at: DateTime<Utc>,
}

impl CardioLogRecord {
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.activity.trim().is_empty() {
            return Err(RecordValidationError::EmptyActivity);
        }
        if self.duration_seconds < 0 {
            return Err(RecordValidationError::NegativeDuration(self.duration_seconds));
        }
        if let Some(distance) = self.distance_km {
            if !distance.is_finite() || distance < 0.0 {
                return Err(RecordValidationError::InvalidDistance(distance));
            }
        }
        Ok(())
    }

    pub fn to_event(&self) -> ActivityEvent {
        ActivityEvent::cardio_session(self.logged_at)
    }
}

/// Full activity history of one user, as fetched from the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    #[serde(default)]
    pub workout_logs: Vec<WorkoutLogRecord>,
    #[serde(default)]
    pub cardio_logs: Vec<CardioLogRecord>,
}

impl ActivityLog {
    pub fn len(&self) -> usize {
        self.workout_logs.len() + self.cardio_logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workout_logs.is_empty() && self.cardio_logs.is_empty()
    }
}

/// Validation errors for individual store rows
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordValidationError {
    #[error("reps_completed must not be negative, got {0}")]
    NegativeReps(i64),

    #[error("weight_used must be a finite non-negative number, got {0}")]
    InvalidWeight(f64),

    #[error("activity must not be empty")]
    EmptyActivity,

    #[error("duration_seconds must not be negative, got {0}")]
    NegativeDuration(i64),

    #[error("distance_km must be a finite non-negative number, got {0}")]
    InvalidDistance(f64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActivityKind;

    #[test]
    fn test_deserialize_store_rows() {
        let json = r#"{
            "workout_logs": [{
                "id": "5f1c3c1e-8f9a-4c43-9d1a-1f0e6b7c2a10",
                "exercise_id": "0b7a4a52-52a4-4d8e-bb7e-3f6a4b0c9d21",
                "logged_at": "2024-01-15T07:45:12.345678+00:00",
                "reps_completed": 10,
                "weight_used": 62.5,
                "user_id": "ignored"
            }],
            "cardio_logs": [{
                "activity": "treadmill",
                "duration_seconds": 1800,
                "distance_km": 4.2,
                "logged_at": "2024-01-15T18:00:00Z"
            }]
        }"#;

        let log: ActivityLog = serde_json::from_str(json).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.workout_logs[0].reps_completed, 10);
        assert!(log.workout_logs[0].id.is_some());
        assert_eq!(log.cardio_logs[0].distance_km, Some(4.2));
        assert_eq!(log.cardio_logs[0].to_event().kind, ActivityKind::CardioSession);
    }

    #[test]
    fn test_missing_tables_default_to_empty() {
        let log: ActivityLog = serde_json::from_str("{}").unwrap();
        assert!(log.is_empty());
    }

    #[test]
    fn test_bad_timestamp_fails_to_parse() {
        let json = r#"{"workout_logs": [{"logged_at": "yesterday"}]}"#;
        assert!(serde_json::from_str::<ActivityLog>(json).is_err());
    }

    #[test]
    fn test_workout_validation() {
        let mut record: WorkoutLogRecord =
            serde_json::from_str(r#"{"logged_at": "2024-01-15T07:45:00Z", "reps_completed": 8}"#)
                .unwrap();
        assert!(record.validate().is_ok());

        record.reps_completed = -1;
        assert_eq!(record.validate(), Err(RecordValidationError::NegativeReps(-1)));

        record.reps_completed = 5;
        record.weight_used = f64::NAN;
        assert!(matches!(
            record.validate(),
            Err(RecordValidationError::InvalidWeight(_))
        ));
    }

    #[test]
    fn test_cardio_validation() {
        let mut record: CardioLogRecord = serde_json::from_str(
            r#"{"activity": "bike", "duration_seconds": 0, "logged_at": "2024-01-15T07:45:00Z"}"#,
        )
        .unwrap();
        // Any session counts regardless of duration
        assert!(record.validate().is_ok());

        record.activity = "  ".to_string();
        assert_eq!(record.validate(), Err(RecordValidationError::EmptyActivity));

        record.activity = "stairs".to_string();
        record.duration_seconds = -30;
        assert_eq!(
            record.validate(),
            Err(RecordValidationError::NegativeDuration(-30))
        );

        record.duration_seconds = 60;
        record.distance_km = Some(-1.0);
        assert_eq!(
            record.validate(),
            Err(RecordValidationError::InvalidDistance(-1.0))
        );
    }
}
