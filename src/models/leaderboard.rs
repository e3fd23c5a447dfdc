// src/models/leaderboard.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Represents the 'leaderboard' table in the database.
/// At most one row per (user, sport, game mode).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: i64,
    pub user_id: i64,
    pub sport_id: i64,
    pub game_mode_id: i64,

    /// Best score seen for the key triple.
    pub score: i64,

    /// 1-based position within the game-mode partition. `None` until first ranked.
    pub rank: Option<i32>,

    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Identifies one leaderboard row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryKey {
    pub user_id: i64,
    pub sport_id: i64,
    pub game_mode_id: i64,
}

/// Id and display name of a referenced entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NamedRef {
    pub id: i64,
    pub name: String,
}

/// Leaderboard row as served to clients: names resolved, missing references null.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardView {
    pub id: i64,
    pub user: Option<NamedRef>,
    pub sport: Option<NamedRef>,
    pub game_mode: Option<NamedRef>,
    pub score: i64,
    pub rank: Option<i32>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
