// src/models/achievement.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::validate_url_string;

/// Represents the 'achievements' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    /// Human-readable unlock condition, e.g. "Score 100+ in a Basketball game".
    pub criteria: String,
    pub points: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for defining a new achievement.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAchievementRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 1000))]
    pub description: String,
    #[validate(length(max = 500), custom(function = validate_url_string))]
    pub image_url: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub criteria: String,
    #[validate(range(min = 0, max = 10000))]
    #[serde(default)]
    pub points: i32,
}
