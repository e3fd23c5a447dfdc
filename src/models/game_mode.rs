// src/models/game_mode.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Represents the 'game_modes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameMode {
    pub id: i64,

    /// The sport this mode belongs to.
    pub sport_id: i64,

    /// Display name (e.g., "Quick Trivia").
    pub name: String,

    pub description: String,

    pub rules: Option<String>,

    /// Seconds allowed per question. 0 means unlimited.
    pub time_limit: i32,

    pub points_per_correct_answer: i32,

    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for creating or updating a game mode, keyed by (sport, name).
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertGameModeRequest {
    pub sport_id: i64,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub description: String,
    #[validate(length(max = 5000))]
    pub rules: Option<String>,
    #[validate(range(min = 0, max = 3600))]
    #[serde(default)]
    pub time_limit: i32,
    #[validate(range(min = 1, max = 1000))]
    pub points_per_correct_answer: i32,
}
