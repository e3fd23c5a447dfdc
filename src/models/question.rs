// src/models/question.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::validate_url_string;

/// One answer choice of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOption {
    pub text: String,
    pub is_correct: bool,
}

/// Represents the 'questions' table in the database.
///
/// Options are kept in order; exactly one of them is correct.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,

    /// The prompt shown to the player.
    pub text: String,

    pub options: Vec<QuestionOption>,

    /// Shown after the question is resolved.
    pub explanation: Option<String>,

    pub image_url: Option<String>,

    /// Difficulty tag: 'easy', 'medium' or 'hard'.
    pub difficulty: String,

    pub category: Option<String>,

    pub sport_id: i64,
    pub game_mode_id: i64,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Question {
    /// Returns the correct option, if the question is well formed.
    pub fn correct_option(&self) -> Option<&QuestionOption> {
        let mut correct = self.options.iter().filter(|o| o.is_correct);
        match (correct.next(), correct.next()) {
            (Some(option), None) => Some(option),
            _ => None,
        }
    }
}

/// DTO for creating a new question.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub text: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<QuestionOption>,
    #[validate(length(max = 2000))]
    pub explanation: Option<String>,
    #[validate(length(max = 500), custom(function = validate_url_string))]
    pub image_url: Option<String>,
    #[validate(custom(function = validate_difficulty))]
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[validate(length(max = 50))]
    pub category: Option<String>,
    pub sport_id: i64,
    pub game_mode_id: i64,
}

fn default_difficulty() -> String {
    "medium".to_string()
}

fn validate_options(options: &[QuestionOption]) -> Result<(), validator::ValidationError> {
    if options.is_empty() {
        return Err(validator::ValidationError::new("options_cannot_be_empty"));
    }
    for opt in options {
        if opt.text.is_empty() || opt.text.len() > 500 {
            return Err(validator::ValidationError::new("invalid_option_text"));
        }
    }
    if options.iter().filter(|o| o.is_correct).count() != 1 {
        return Err(validator::ValidationError::new(
            "exactly_one_option_must_be_correct",
        ));
    }
    Ok(())
}

fn validate_difficulty(difficulty: &str) -> Result<(), validator::ValidationError> {
    match difficulty {
        "easy" | "medium" | "hard" => Ok(()),
        _ => Err(validator::ValidationError::new("unknown_difficulty")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(text: &str, is_correct: bool) -> QuestionOption {
        QuestionOption {
            text: text.to_string(),
            is_correct,
        }
    }

    fn request(options: Vec<QuestionOption>) -> CreateQuestionRequest {
        CreateQuestionRequest {
            text: "Which NBA team has won the most championships?".to_string(),
            options,
            explanation: None,
            image_url: None,
            difficulty: "easy".to_string(),
            category: Some("history".to_string()),
            sport_id: 1,
            game_mode_id: 1,
        }
    }

    #[test]
    fn test_single_correct_option_is_valid() {
        let req = request(vec![option("Lakers", false), option("Celtics", true)]);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_no_correct_option_is_rejected() {
        let req = request(vec![option("Lakers", false), option("Celtics", false)]);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_two_correct_options_are_rejected() {
        let req = request(vec![option("Lakers", true), option("Celtics", true)]);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_empty_options_are_rejected() {
        assert!(request(vec![]).validate().is_err());
    }

    #[test]
    fn test_unknown_difficulty_is_rejected() {
        let mut req = request(vec![option("Celtics", true)]);
        req.difficulty = "legendary".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_bad_image_url_is_rejected() {
        let mut req = request(vec![option("Celtics", true)]);
        req.image_url = Some("not a url".to_string());
        assert!(req.validate().is_err());
    }
}
