//! Engine configuration
//!
//! Thresholds, horizon and reference calendar for one engine instance.
//! Loadable from JSON so a deployment can pin its policy in a file.

use serde::{Deserialize, Serialize};

use crate::calendar::ReferenceCalendar;
use crate::error::ComputeError;
use crate::qualifier::QualificationPolicy;

/// Default number of days walked backward from today
pub const DEFAULT_HORIZON_DAYS: u32 = 365;

/// Default number of days shown in the qualification calendar
pub const DEFAULT_CALENDAR_DAYS: u32 = 28;

/// Largest qualification calendar a report may request
pub const MAX_CALENDAR_DAYS: u32 = 366;

/// Configuration for a `StreakEngine`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub policy: QualificationPolicy,
    /// Safety cap on the backward walk; streaks beyond it are undercounted
    pub horizon_days: u32,
    pub calendar_days: u32,
    pub calendar: ReferenceCalendar,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            policy: QualificationPolicy::default(),
            horizon_days: DEFAULT_HORIZON_DAYS,
            calendar_days: DEFAULT_CALENDAR_DAYS,
            calendar: ReferenceCalendar::utc(),
        }
    }
}

impl EngineConfig {
    /// Reject configurations the engine cannot give a meaningful answer for
    pub fn validate(&self) -> Result<(), ComputeError> {
        if self.policy.min_strength_sets == 0 {
            return Err(ComputeError::InvalidConfig(
                "min_strength_sets must be at least 1".to_string(),
            ));
        }
        if self.policy.min_cardio_sessions == 0 {
            return Err(ComputeError::InvalidConfig(
                "min_cardio_sessions must be at least 1".to_string(),
            ));
        }
        if self.horizon_days == 0 {
            return Err(ComputeError::InvalidConfig(
                "horizon_days must be at least 1".to_string(),
            ));
        }
        if self.calendar_days > MAX_CALENDAR_DAYS {
            return Err(ComputeError::InvalidConfig(format!(
                "calendar_days must be at most {}, got {}",
                MAX_CALENDAR_DAYS, self.calendar_days
            )));
        }
        Ok(())
    }

    /// Load and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_dashboard_policy() {
        let config = EngineConfig::default();
        assert_eq!(config.horizon_days, 365);
        assert_eq!(config.policy, QualificationPolicy::default());
        assert_eq!(config.calendar, ReferenceCalendar::utc());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_partial_json() {
        let config = EngineConfig::from_json(r#"{"horizon_days": 30, "calendar": "+09:00"}"#)
            .unwrap();
        assert_eq!(config.horizon_days, 30);
        assert_eq!(config.calendar, ReferenceCalendar::parse("+09:00").unwrap());
        assert_eq!(config.policy, QualificationPolicy::default());
    }

    #[test]
    fn test_round_trip() {
        let mut config = EngineConfig::default();
        config.policy.min_strength_sets = 4;
        let loaded = EngineConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_rejects_zero_values() {
        assert!(matches!(
            EngineConfig::from_json(r#"{"horizon_days": 0}"#),
            Err(ComputeError::InvalidConfig(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"policy": {"min_strength_sets": 0}}"#),
            Err(ComputeError::InvalidConfig(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"policy": {"min_cardio_sessions": 0}}"#),
            Err(ComputeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_calendar_days_bounds() {
        assert!(matches!(
            EngineConfig::from_json(r#"{"calendar_days": 4294967295}"#),
            Err(ComputeError::InvalidConfig(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"calendar_days": 3000000, "horizon_days": 5}"#),
            Err(ComputeError::InvalidConfig(_))
        ));

        let config = EngineConfig::from_json(r#"{"calendar_days": 366}"#).unwrap();
        assert_eq!(config.calendar_days, MAX_CALENDAR_DAYS);
        let empty = EngineConfig::from_json(r#"{"calendar_days": 0}"#).unwrap();
        assert_eq!(empty.calendar_days, 0);
    }

    #[test]
    fn test_rejects_bad_calendar() {
        assert!(EngineConfig::from_json(r#"{"calendar": "Europe/Paris"}"#).is_err());
    }
}
