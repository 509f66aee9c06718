//! Plan generation request and prompt

use serde::{Deserialize, Serialize};

use crate::error::ComputeError;

/// Muscle groups a generated exercise may target
pub const MUSCLE_GROUPS: [&str; 11] = [
    "Chest",
    "Back",
    "Shoulders",
    "Biceps",
    "Triceps",
    "Quadriceps",
    "Hamstrings",
    "Glutes",
    "Calves",
    "Forearms",
    "Core",
];

/// System message sent ahead of the coach prompt
pub const SYSTEM_MESSAGE: &str = "You are a fitness expert. Return only valid JSON, no markdown.";

const MALE_SPLIT: &str = "Session A - Chest, Triceps & Shoulders
Session B - Back & Biceps
Session C - Full Legs (Quadriceps, Hamstrings, Calves)";

const FEMALE_SPLIT: &str = "Session A - Quadriceps
Session B - Chest, Triceps & Shoulders
Session C - Back & Biceps
Session D - Hamstrings & Glutes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingGoal {
    FatBurning,
    Hypertrophy,
}

impl TrainingGoal {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingGoal::FatBurning => "fat_burning",
            TrainingGoal::Hypertrophy => "hypertrophy",
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            TrainingGoal::FatBurning => "fat burning",
            TrainingGoal::Hypertrophy => "hypertrophy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
        }
    }
}

/// Payload sent to the plan generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub goal: TrainingGoal,
    pub gender: Gender,
    /// Current body weight in kilograms
    #[serde(rename = "weight")]
    pub weight_kg: f64,
    pub level: ExperienceLevel,
}

impl PlanRequest {
    pub fn validate(&self) -> Result<(), ComputeError> {
        if !self.weight_kg.is_finite() || self.weight_kg <= 0.0 {
            return Err(ComputeError::ParseError(format!(
                "weight must be a positive number of kilograms, got {}",
                self.weight_kg
            )));
        }
        Ok(())
    }

    /// Number of sessions the split for this request has
    pub fn expected_session_count(&self) -> usize {
        match self.gender {
            Gender::Male => 3,
            Gender::Female => 4,
        }
    }

    fn split(&self) -> &'static str {
        match self.gender {
            Gender::Male => MALE_SPLIT,
            Gender::Female => FEMALE_SPLIT,
        }
    }

    /// Coach prompt asking for a plan in the exact JSON shape we parse
    pub fn build_prompt(&self) -> String {
        format!(
            r#"You are a professional fitness coach. Generate a {goal} workout plan for a {level} {gender} weighing {weight}kg.

Use this split structure:
{split}

Rules:
- Each session should have 5-7 exercises
- Minimum 10 reps per exercise suggested
- For fat burning: higher reps (12-15), shorter rest, include supersets
- For hypertrophy: moderate reps (10-12), progressive overload focus
- Include compound and isolation movements
- Sets should be 3-4 per exercise

Return ONLY valid JSON in this exact format:
{{
  "name": "Plan name here",
  "sessions": [
    {{
      "name": "A",
      "label": "Muscle groups here",
      "sort_order": 0,
      "exercises": [
        {{
          "name": "Exercise Name",
          "muscle_group": "Chest",
          "sets": 3,
          "suggested_reps": 12
        }}
      ]
    }}
  ]
}}

Valid muscle_group values: {groups}

Generate exactly {count} sessions."#,
            goal = self.goal.describe(),
            level = self.level.as_str(),
            gender = self.gender.as_str(),
            weight = self.weight_kg,
            split = self.split(),
            groups = MUSCLE_GROUPS.join(", "),
            count = self.expected_session_count(),
        )
    }

    /// System and user messages for an OpenAI-compatible chat completion
    pub fn chat_messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage {
                role: "system".to_string(),
                content: SYSTEM_MESSAGE.to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: self.build_prompt(),
            },
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Non-success reply from the generation gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayFailure {
    RateLimited,
    CreditsExhausted,
    Failed(u16),
}

impl GatewayFailure {
    /// Map an HTTP status to a failure, `None` for success statuses
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            200..=299 => None,
            429 => Some(GatewayFailure::RateLimited),
            402 => Some(GatewayFailure::CreditsExhausted),
            other => Some(GatewayFailure::Failed(other)),
        }
    }

    /// Status to relay to the client
    pub fn status(&self) -> u16 {
        match self {
            GatewayFailure::RateLimited => 429,
            GatewayFailure::CreditsExhausted => 402,
            GatewayFailure::Failed(_) => 500,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            GatewayFailure::RateLimited => "Rate limit exceeded. Please try again in a moment.",
            GatewayFailure::CreditsExhausted => "AI credits exhausted. Please add credits.",
            GatewayFailure::Failed(_) => "AI generation failed",
        }
    }
}

impl From<GatewayFailure> for ComputeError {
    fn from(failure: GatewayFailure) -> Self {
        ComputeError::GatewayError(failure.user_message().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(gender: Gender) -> PlanRequest {
        PlanRequest {
            goal: TrainingGoal::Hypertrophy,
            gender,
            weight_kg: 82.5,
            level: ExperienceLevel::Intermediate,
        }
    }

    #[test]
    fn test_prompt_uses_gender_split() {
        let male = request(Gender::Male).build_prompt();
        assert!(male.contains("Session C - Full Legs"));
        assert!(!male.contains("Session D"));
        assert!(male.contains("Generate exactly 3 sessions."));

        let female = request(Gender::Female).build_prompt();
        assert!(female.contains("Session D - Hamstrings & Glutes"));
        assert!(female.contains("Generate exactly 4 sessions."));
    }

    #[test]
    fn test_prompt_describes_request() {
        let mut req = request(Gender::Male);
        req.goal = TrainingGoal::FatBurning;
        let prompt = req.build_prompt();

        assert!(prompt.contains("Generate a fat burning workout plan for a intermediate male weighing 82.5kg."));
        assert!(prompt.contains("\"suggested_reps\": 12"));
        assert!(prompt.contains("Chest, Back, Shoulders, Biceps, Triceps, Quadriceps, Hamstrings, Glutes, Calves, Forearms, Core"));
    }

    #[test]
    fn test_chat_messages() {
        let messages = request(Gender::Female).chat_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, SYSTEM_MESSAGE);
        assert_eq!(messages[1].role, "user");
    }

    #[test]
    fn test_request_json_shape() {
        let req: PlanRequest = serde_json::from_str(
            r#"{"goal": "fat_burning", "gender": "female", "weight": 61.0, "level": "beginner"}"#,
        )
        .unwrap();
        assert_eq!(req.goal, TrainingGoal::FatBurning);
        assert_eq!(req.expected_session_count(), 4);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_request_rejects_bad_weight() {
        let mut req = request(Gender::Male);
        req.weight_kg = 0.0;
        assert!(req.validate().is_err());
        req.weight_kg = f64::INFINITY;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_gateway_status_mapping() {
        assert_eq!(GatewayFailure::from_status(200), None);
        assert_eq!(GatewayFailure::from_status(429), Some(GatewayFailure::RateLimited));
        assert_eq!(
            GatewayFailure::from_status(402),
            Some(GatewayFailure::CreditsExhausted)
        );
        assert_eq!(GatewayFailure::from_status(503), Some(GatewayFailure::Failed(503)));
        assert_eq!(GatewayFailure::Failed(503).status(), 500);
        assert_eq!(GatewayFailure::RateLimited.status(), 429);
    }
}
