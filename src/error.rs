//! Error types for liftstreak

use thiserror::Error;

use crate::plan::PlanValidationError;
use crate::schema::RecordValidationError;

/// Errors that can occur around the streak computation.
///
/// The engine stages themselves are total; these errors come from the
/// boundaries that feed them (parsing, configuration, event retrieval).
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid UTC offset: {0}")]
    InvalidTimezone(String),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid {table} record at index {index}: {source}")]
    InvalidRecord {
        table: &'static str,
        index: usize,
        #[source]
        source: RecordValidationError,
    },

    #[error("Event source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Generated plan failed validation ({} problem(s))", .0.len())]
    InvalidPlan(Vec<PlanValidationError>),

    #[error("Plan generation failed: {0}")]
    GatewayError(String),
}
