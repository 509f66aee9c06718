//! Adapter for converting store rows and event streams into `ActivityEvent`s

use crate::error::ComputeError;
use crate::schema::activity_log::*;
use crate::types::ActivityEvent;

/// Adapter for converting activity logs to engine events
pub struct ActivityLogAdapter;

impl ActivityLogAdapter {
    /// Parse a JSON document with `workout_logs` and `cardio_logs` arrays
    pub fn parse_log(json: &str) -> Result<ActivityLog, ComputeError> {
        let log: ActivityLog = serde_json::from_str(json)?;
        Ok(log)
    }

    /// Parse a JSON array of `ActivityEvent`s
    pub fn parse_array(json: &str) -> Result<Vec<ActivityEvent>, ComputeError> {
        let events: Vec<ActivityEvent> = serde_json::from_str(json)?;
        Ok(events)
    }

    /// Parse NDJSON (newline-delimited JSON) containing `ActivityEvent`s
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<ActivityEvent>, ComputeError> {
        let mut events = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<ActivityEvent>(trimmed) {
                Ok(event) => events.push(event),
                Err(e) => {
                    return Err(ComputeError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(events)
    }

    /// Convert every row of both tables into engine events.
    ///
    /// The first invalid row aborts the conversion; the engine never runs
    /// on a partially converted history.
    pub fn to_events(log: &ActivityLog) -> Result<Vec<ActivityEvent>, ComputeError> {
        let mut events = Vec::with_capacity(log.len());

        for (index, record) in log.workout_logs.iter().enumerate() {
            record.validate().map_err(|source| {
                reject(WORKOUT_LOGS_TABLE, index, source)
            })?;
            events.push(record.to_event());
        }

        for (index, record) in log.cardio_logs.iter().enumerate() {
            record.validate().map_err(|source| {
                reject(CARDIO_LOGS_TABLE, index, source)
            })?;
            events.push(record.to_event());
        }

        tracing::debug!(
            strength_sets = log.workout_logs.len(),
            cardio_sessions = log.cardio_logs.len(),
            "Converted activity log to events"
        );

        Ok(events)
    }

    /// Validate every row and collect the failures
    pub fn validate_log(log: &ActivityLog) -> Vec<RecordIssue> {
        let workout = log
            .workout_logs
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                record.validate().err().map(|error| RecordIssue {
                    table: WORKOUT_LOGS_TABLE,
                    index,
                    record_id: record.id.map(|id| id.to_string()),
                    error,
                })
            });

        let cardio = log
            .cardio_logs
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                record.validate().err().map(|error| RecordIssue {
                    table: CARDIO_LOGS_TABLE,
                    index,
                    record_id: record.id.map(|id| id.to_string()),
                    error,
                })
            });

        workout.chain(cardio).collect()
    }
}

/// A row that failed validation
#[derive(Debug, Clone, PartialEq)]
pub struct RecordIssue {
    pub table: &'static str,
    pub index: usize,
    pub record_id: Option<String>,
    pub error: RecordValidationError,
}

fn reject(table: &'static str, index: usize, source: RecordValidationError) -> ComputeError {
    tracing::warn!(table, index, error = %source, "Rejected activity record");
    ComputeError::InvalidRecord {
        table,
        index,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActivityKind;
    use pretty_assertions::assert_eq;

    fn sample_log_json() -> &'static str {
        r#"{
            "workout_logs": [
                {"logged_at": "2024-01-15T07:45:00Z", "reps_completed": 10, "weight_used": 60.0},
                {"logged_at": "2024-01-15T07:50:00Z", "reps_completed": 9, "weight_used": 60.0}
            ],
            "cardio_logs": [
                {"activity": "elliptical", "duration_seconds": 900, "logged_at": "2024-01-16T19:00:00Z"}
            ]
        }"#
    }

    #[test]
    fn test_log_to_events() {
        let log = ActivityLogAdapter::parse_log(sample_log_json()).unwrap();
        let events = ActivityLogAdapter::to_events(&log).unwrap();

        assert_eq!(events.len(), 3);
        let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ActivityKind::StrengthSet,
                ActivityKind::StrengthSet,
                ActivityKind::CardioSession
            ]
        );
    }

    #[test]
    fn test_invalid_row_aborts_conversion() {
        let json = r#"{
            "workout_logs": [
                {"logged_at": "2024-01-15T07:45:00Z", "reps_completed": 10},
                {"logged_at": "2024-01-15T07:50:00Z", "reps_completed": -3}
            ]
        }"#;
        let log = ActivityLogAdapter::parse_log(json).unwrap();

        match ActivityLogAdapter::to_events(&log) {
            Err(ComputeError::InvalidRecord { table, index, source }) => {
                assert_eq!(table, WORKOUT_LOGS_TABLE);
                assert_eq!(index, 1);
                assert_eq!(source, RecordValidationError::NegativeReps(-3));
            }
            other => panic!("expected InvalidRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_log_collects_all_issues() {
        let json = r#"{
            "workout_logs": [
                {"logged_at": "2024-01-15T07:45:00Z", "weight_used": -5.0}
            ],
            "cardio_logs": [
                {"activity": "", "logged_at": "2024-01-15T08:00:00Z"},
                {"activity": "bike", "logged_at": "2024-01-15T09:00:00Z"},
                {"activity": "bike", "duration_seconds": -1, "logged_at": "2024-01-15T10:00:00Z"}
            ]
        }"#;
        let log = ActivityLogAdapter::parse_log(json).unwrap();
        let issues = ActivityLogAdapter::validate_log(&log);

        let located: Vec<_> = issues.iter().map(|i| (i.table, i.index)).collect();
        assert_eq!(
            located,
            vec![
                (WORKOUT_LOGS_TABLE, 0),
                (CARDIO_LOGS_TABLE, 0),
                (CARDIO_LOGS_TABLE, 2)
            ]
        );
    }

    #[test]
    fn test_parse_ndjson() {
        let ndjson = r#"
{"kind": "strength_set", "occurred_at": "2024-01-15T07:45:00Z"}

{"kind": "cardio_session", "occurred_at": "2024-01-15T18:00:00+02:00"}
"#;
        let events = ActivityLogAdapter::parse_ndjson(ndjson).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].kind, ActivityKind::CardioSession);
        assert_eq!(events[1].occurred_at.to_rfc3339(), "2024-01-15T16:00:00+00:00");
    }

    #[test]
    fn test_parse_ndjson_reports_line() {
        let ndjson = "{\"kind\": \"strength_set\", \"occurred_at\": \"2024-01-15T07:45:00Z\"}\n{\"kind\": \"yoga\"}";
        match ActivityLogAdapter::parse_ndjson(ndjson) {
            Err(ComputeError::ParseError(msg)) => assert!(msg.contains("line 2")),
            other => panic!("expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_array() {
        let json = r#"[{"kind": "strength_set", "occurred_at": "2024-01-15T07:45:00Z"}]"#;
        assert_eq!(ActivityLogAdapter::parse_array(json).unwrap().len(), 1);
        assert!(ActivityLogAdapter::parse_array("not json").is_err());
    }
}
