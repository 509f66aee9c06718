//! Parsing and validation of generated plans

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::ComputeError;
use crate::plan::request::{GatewayFailure, PlanRequest, MUSCLE_GROUPS};

/// Largest set count accepted for one exercise
pub const MAX_SETS: u32 = 10;

/// Largest suggested rep count accepted for one exercise
pub const MAX_SUGGESTED_REPS: u32 = 100;

/// A workout plan as returned by the generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPlan {
    pub name: String,
    pub sessions: Vec<GeneratedSession>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSession {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    pub sort_order: i32,
    pub exercises: Vec<GeneratedExercise>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedExercise {
    pub name: String,
    pub muscle_group: String,
    pub sets: u32,
    pub suggested_reps: u32,
}

/// One shape violation in a generated plan
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanValidationError {
    #[error("plan name is empty")]
    EmptyPlanName,

    #[error("expected {expected} sessions, got {actual}")]
    SessionCount { expected: usize, actual: usize },

    #[error("session {session}: name is empty")]
    EmptySessionName { session: usize },

    #[error("session {session}: sort_order {sort_order} is used more than once")]
    DuplicateSortOrder { session: usize, sort_order: i32 },

    #[error("session {session}: has no exercises")]
    NoExercises { session: usize },

    #[error("session {session}, exercise {exercise}: name is empty")]
    EmptyExerciseName { session: usize, exercise: usize },

    #[error("session {session}, exercise {exercise}: unknown muscle group {muscle_group:?}")]
    UnknownMuscleGroup {
        session: usize,
        exercise: usize,
        muscle_group: String,
    },

    #[error("session {session}, exercise {exercise}: sets must be 1-{max}, got {sets}")]
    SetsOutOfRange {
        session: usize,
        exercise: usize,
        sets: u32,
        max: u32,
    },

    #[error("session {session}, exercise {exercise}: suggested_reps must be 1-{max}, got {reps}")]
    RepsOutOfRange {
        session: usize,
        exercise: usize,
        reps: u32,
        max: u32,
    },
}

#[derive(Deserialize)]
struct CompletionEnvelope {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Pull the generated text out of a chat-completion reply.
///
/// Falls back to treating `raw` as the generated text itself when it is
/// not a completion envelope.
pub fn extract_content(raw: &str) -> String {
    match serde_json::from_str::<CompletionEnvelope>(raw) {
        Ok(envelope) => envelope
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default(),
        Err(_) => raw.to_string(),
    }
}

/// Remove Markdown code fences around generated JSON
pub fn strip_code_fences(content: &str) -> String {
    content
        .replace("```json\n", "")
        .replace("```json", "")
        .replace("```\n", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Parse a gateway reply into a plan without checking it
pub fn parse_plan_response(raw: &str) -> Result<GeneratedPlan, ComputeError> {
    let content = strip_code_fences(&extract_content(raw));
    if content.is_empty() {
        return Err(ComputeError::ParseError(
            "generator returned no content".to_string(),
        ));
    }
    serde_json::from_str(&content).map_err(|e| {
        tracing::warn!(error = %e, "Generated plan is not valid JSON");
        ComputeError::ParseError(format!("generated plan is not valid JSON: {}", e))
    })
}

/// Parse a gateway reply and validate it against the request it answers
pub fn parse_and_validate(
    raw: &str,
    request: Option<&PlanRequest>,
) -> Result<GeneratedPlan, ComputeError> {
    let plan = parse_plan_response(raw)?;
    let problems = plan.validate(request.map(PlanRequest::expected_session_count));
    if problems.is_empty() {
        tracing::debug!(plan = %plan.name, sessions = plan.sessions.len(), "Accepted generated plan");
        Ok(plan)
    } else {
        tracing::warn!(problems = problems.len(), "Rejected generated plan");
        Err(ComputeError::InvalidPlan(problems))
    }
}

/// Handle a complete gateway exchange: the HTTP status first, then the body.
///
/// A 429, 402 or other non-success status is returned as
/// `ComputeError::GatewayError` without looking at the body.
pub fn accept_gateway_reply(
    status: u16,
    raw: &str,
    request: Option<&PlanRequest>,
) -> Result<GeneratedPlan, ComputeError> {
    if let Some(failure) = GatewayFailure::from_status(status) {
        tracing::warn!(status, relayed = failure.status(), "Plan generator request failed");
        return Err(failure.into());
    }
    parse_and_validate(raw, request)
}

impl GeneratedPlan {
    /// Check the plan's shape and collect every problem found
    pub fn validate(&self, expected_sessions: Option<usize>) -> Vec<PlanValidationError> {
        let mut problems = Vec::new();

        if self.name.trim().is_empty() {
            problems.push(PlanValidationError::EmptyPlanName);
        }

        if let Some(expected) = expected_sessions {
            if self.sessions.len() != expected {
                problems.push(PlanValidationError::SessionCount {
                    expected,
                    actual: self.sessions.len(),
                });
            }
        }

        let mut seen_orders = HashSet::new();
        for (s, session) in self.sessions.iter().enumerate() {
            if session.name.trim().is_empty() {
                problems.push(PlanValidationError::EmptySessionName { session: s });
            }
            if !seen_orders.insert(session.sort_order) {
                problems.push(PlanValidationError::DuplicateSortOrder {
                    session: s,
                    sort_order: session.sort_order,
                });
            }
            if session.exercises.is_empty() {
                problems.push(PlanValidationError::NoExercises { session: s });
            }

            for (e, exercise) in session.exercises.iter().enumerate() {
                validate_exercise(s, e, exercise, &mut problems);
            }
        }

        problems
    }
}

fn validate_exercise(
    session: usize,
    index: usize,
    exercise: &GeneratedExercise,
    problems: &mut Vec<PlanValidationError>,
) {
    if exercise.name.trim().is_empty() {
        problems.push(PlanValidationError::EmptyExerciseName {
            session,
            exercise: index,
        });
    }
    if !MUSCLE_GROUPS.contains(&exercise.muscle_group.as_str()) {
        problems.push(PlanValidationError::UnknownMuscleGroup {
            session,
            exercise: index,
            muscle_group: exercise.muscle_group.clone(),
        });
    }
    if exercise.sets == 0 || exercise.sets > MAX_SETS {
        problems.push(PlanValidationError::SetsOutOfRange {
            session,
            exercise: index,
            sets: exercise.sets,
            max: MAX_SETS,
        });
    }
    if exercise.suggested_reps == 0 || exercise.suggested_reps > MAX_SUGGESTED_REPS {
        problems.push(PlanValidationError::RepsOutOfRange {
            session,
            exercise: index,
            reps: exercise.suggested_reps,
            max: MAX_SUGGESTED_REPS,
        });
    }
}
