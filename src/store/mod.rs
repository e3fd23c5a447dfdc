// src/store/mod.rs

pub mod memory;
pub mod postgres;

use std::error::Error;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    achievement::{Achievement, CreateAchievementRequest},
    game_history::{GameHistory, NewGameHistory},
    game_mode::{GameMode, UpsertGameModeRequest},
    leaderboard::{EntryKey, LeaderboardEntry},
    question::{CreateQuestionRequest, Question},
    sport::{Sport, UpsertSportRequest},
    user::{User, UserChanges},
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    #[error("conflict: {0}")]
    Conflict(String),
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: impl Into<String>, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message: message.into(),
            source: Box::new(source),
        }
    }
}

/// Restricts a listing to a sport or a game mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Sport(i64),
    GameMode(i64),
}

/// Persistence for every entity the service owns.
///
/// Leaderboard listings come back ordered by score descending, then by
/// current rank (unranked last), then by id.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_sports(&self) -> StorageResult<Vec<Sport>>;
    async fn find_sport(&self, id: i64) -> StorageResult<Option<Sport>>;
    /// Inserts, or updates the existing sport with the same name.
    async fn upsert_sport(&self, sport: UpsertSportRequest) -> StorageResult<Sport>;

    async fn list_game_modes(&self, sport_id: Option<i64>) -> StorageResult<Vec<GameMode>>;
    async fn find_game_mode(&self, id: i64) -> StorageResult<Option<GameMode>>;
    /// Inserts, or updates the existing mode with the same sport and name.
    async fn upsert_game_mode(&self, mode: UpsertGameModeRequest) -> StorageResult<GameMode>;

    async fn list_questions(&self, scope: Scope) -> StorageResult<Vec<Question>>;
    async fn find_question(&self, id: i64) -> StorageResult<Option<Question>>;
    async fn insert_question(&self, question: CreateQuestionRequest) -> StorageResult<Question>;
    /// Returns false if nothing was deleted.
    async fn delete_question(&self, id: i64) -> StorageResult<bool>;

    async fn find_user(&self, id: i64) -> StorageResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StorageResult<Option<User>>;
    /// Fails with `StorageError::Conflict` if the username is taken.
    async fn insert_user(&self, username: &str, password_hash: &str, role: &str)
    -> StorageResult<User>;
    /// Applies the set fields. `None` if the user does not exist; a taken
    /// username fails with `StorageError::Conflict`.
    async fn update_user(&self, id: i64, changes: UserChanges) -> StorageResult<Option<User>>;

    async fn find_achievement(&self, id: i64) -> StorageResult<Option<Achievement>>;
    /// Fails with `StorageError::Conflict` if the name is taken.
    async fn insert_achievement(
        &self,
        achievement: CreateAchievementRequest,
    ) -> StorageResult<Achievement>;
    /// Unlocks an achievement for a user. Unlocking twice is a no-op.
    async fn grant_achievement(&self, user_id: i64, achievement_id: i64) -> StorageResult<()>;
    /// In unlock order.
    async fn achievements_for_user(&self, user_id: i64) -> StorageResult<Vec<Achievement>>;

    async fn insert_history(&self, history: NewGameHistory) -> StorageResult<GameHistory>;
    /// Newest first.
    async fn history_for_user(&self, user_id: i64) -> StorageResult<Vec<GameHistory>>;

    async fn find_leaderboard_entry(&self, key: EntryKey)
    -> StorageResult<Option<LeaderboardEntry>>;
    async fn insert_leaderboard_entry(
        &self,
        key: EntryKey,
        score: i64,
    ) -> StorageResult<LeaderboardEntry>;
    async fn update_leaderboard_score(&self, id: i64, score: i64) -> StorageResult<()>;
    /// `limit = None` returns the whole scope.
    async fn list_leaderboard(
        &self,
        scope: Scope,
        limit: Option<i64>,
    ) -> StorageResult<Vec<LeaderboardEntry>>;
    /// Writes `(entry id, rank)` pairs.
    async fn update_leaderboard_ranks(&self, ranks: &[(i64, i32)]) -> StorageResult<()>;
}
