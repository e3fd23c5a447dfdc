// src/models/game_history.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// How one question of a session was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    #[serde(rename = "question")]
    pub question_id: i64,

    /// Text of the selected option. `None` when the question timed out.
    pub user_answer: Option<String>,

    pub is_correct: bool,

    /// Seconds taken to resolve the question.
    pub time_to_answer: u32,
}

/// Represents the 'game_history' table in the database.
/// One row per completed session, never updated.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameHistory {
    pub id: i64,
    pub user_id: i64,
    pub sport_id: i64,
    pub game_mode_id: i64,
    pub score: i64,
    pub correct_answers: i64,
    pub total_questions: i64,
    pub time_spent: i64,
    pub completed: bool,
    pub answers: Vec<AnswerRecord>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A history row ready to be appended.
#[derive(Debug, Clone)]
pub struct NewGameHistory {
    pub user_id: i64,
    pub sport_id: i64,
    pub game_mode_id: i64,
    pub score: i64,
    pub correct_answers: i64,
    pub total_questions: i64,
    pub time_spent: i64,
    pub completed: bool,
    pub answers: Vec<AnswerRecord>,
}

/// DTO for submitting a finished session.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitGameRequest {
    #[validate(required(message = "sport is required"))]
    pub sport: Option<i64>,
    #[validate(required(message = "gameMode is required"))]
    pub game_mode: Option<i64>,
    #[validate(range(min = 0))]
    pub score: i64,
    #[validate(range(min = 0))]
    pub correct_answers: i64,
    #[validate(range(min = 0))]
    pub total_questions: i64,
    #[validate(range(min = 0))]
    pub time_spent: i64,
    #[serde(default = "default_completed")]
    pub completed: bool,
    #[serde(default)]
    pub answers: Vec<AnswerRecord>,
}

fn default_completed() -> bool {
    true
}

impl SubmitGameRequest {
    /// Builds the history row for `user_id`. Returns `None` if an id is missing.
    pub fn into_history(self, user_id: i64) -> Option<NewGameHistory> {
        Some(NewGameHistory {
            user_id,
            sport_id: self.sport?,
            game_mode_id: self.game_mode?,
            score: self.score,
            correct_answers: self.correct_answers,
            total_questions: self.total_questions,
            time_spent: self.time_spent,
            completed: self.completed,
            answers: self.answers,
        })
    }
}
