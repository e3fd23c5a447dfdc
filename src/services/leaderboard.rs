// src/services/leaderboard.rs

use std::{collections::HashMap, sync::Arc};

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        game_history::{GameHistory, SubmitGameRequest},
        leaderboard::{EntryKey, LeaderboardEntry, LeaderboardView, NamedRef},
    },
    store::{Scope, Store},
};

/// Rows returned by leaderboard reads.
pub const LEADERBOARD_LIMIT: i64 = 100;

/// One lock per game mode. Rank recomputation reads the whole partition and
/// rewrites it, so writers to the same partition take turns.
#[derive(Default)]
pub struct PartitionLocks {
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl PartitionLocks {
    pub async fn lock(&self, game_mode_id: i64) -> OwnedMutexGuard<()> {
        let lock = self.locks.entry(game_mode_id).or_default().clone();
        lock.lock_owned().await
    }
}

/// Result of folding a new score into the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreChange {
    Created,
    Improved { previous: i64 },
    Unchanged,
}

/// Orders a partition by score descending, keeping prior rank order for ties
/// (unranked rows after ranked ones, then by id), and returns the
/// `(entry id, rank)` pairs whose rank differs from the stored one.
pub fn recompute_ranks(mut entries: Vec<LeaderboardEntry>) -> Vec<(i64, i32)> {
    entries.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.rank.unwrap_or(i32::MAX).cmp(&b.rank.unwrap_or(i32::MAX)))
            .then_with(|| a.id.cmp(&b.id))
    });

    entries
        .iter()
        .zip(1..)
        .filter(|(entry, rank)| entry.rank != Some(*rank))
        .map(|(entry, rank)| (entry.id, rank))
        .collect()
}

/// Records a finished session for `user_id`.
///
/// * Appends the history row unconditionally.
/// * Creates the (user, sport, game mode) entry, or raises its score on a strict improvement.
/// * Re-ranks the game-mode partition whenever the entry was created or improved.
///
/// If re-ranking fails the score change is already stored; ranks stay stale until
/// the next successful submission to the partition.
pub async fn submit_result(
    store: &dyn Store,
    partitions: &PartitionLocks,
    user_id: i64,
    req: SubmitGameRequest,
) -> Result<GameHistory, AppError> {
    if let Err(validation_errors) = req.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let score = req.score;
    let history = req
        .into_history(user_id)
        .ok_or_else(|| AppError::BadRequest("sport and gameMode are required".to_string()))?;

    let key = EntryKey {
        user_id,
        sport_id: history.sport_id,
        game_mode_id: history.game_mode_id,
    };

    let history = store.insert_history(history).await?;

    let _guard = partitions.lock(key.game_mode_id).await;

    let change = match store.find_leaderboard_entry(key).await? {
        None => {
            store.insert_leaderboard_entry(key, score).await?;
            ScoreChange::Created
        }
        Some(entry) if score > entry.score => {
            store.update_leaderboard_score(entry.id, score).await?;
            ScoreChange::Improved {
                previous: entry.score,
            }
        }
        Some(_) => ScoreChange::Unchanged,
    };

    tracing::info!(
        user_id,
        game_mode_id = key.game_mode_id,
        score,
        ?change,
        "game result recorded"
    );

    if change != ScoreChange::Unchanged {
        let partition = store
            .list_leaderboard(Scope::GameMode(key.game_mode_id), None)
            .await?;
        let ranks = recompute_ranks(partition);
        store.update_leaderboard_ranks(&ranks).await?;
    }

    Ok(history)
}

/// Reads the top of the leaderboard for `scope` with names resolved.
///
/// A user, sport or game mode that no longer exists comes back as `null`
/// instead of failing the read.
pub async fn read_leaderboard(
    store: &dyn Store,
    scope: Scope,
) -> Result<Vec<LeaderboardView>, AppError> {
    let entries = store.list_leaderboard(scope, Some(LEADERBOARD_LIMIT)).await?;

    let mut users: HashMap<i64, Option<NamedRef>> = HashMap::new();
    let mut sports: HashMap<i64, Option<NamedRef>> = HashMap::new();
    let mut modes: HashMap<i64, Option<NamedRef>> = HashMap::new();

    let mut views = Vec::with_capacity(entries.len());
    for entry in entries {
        if !users.contains_key(&entry.user_id) {
            let user = store.find_user(entry.user_id).await?.map(|u| NamedRef {
                id: u.id,
                name: u.username,
            });
            users.insert(entry.user_id, user);
        }
        if !sports.contains_key(&entry.sport_id) {
            let sport = store.find_sport(entry.sport_id).await?.map(|s| NamedRef {
                id: s.id,
                name: s.name,
            });
            sports.insert(entry.sport_id, sport);
        }
        if !modes.contains_key(&entry.game_mode_id) {
            let mode = store.find_game_mode(entry.game_mode_id).await?.map(|m| NamedRef {
                id: m.id,
                name: m.name,
            });
            modes.insert(entry.game_mode_id, mode);
        }

        views.push(LeaderboardView {
            id: entry.id,
            user: users[&entry.user_id].clone(),
            sport: sports[&entry.sport_id].clone(),
            game_mode: modes[&entry.game_mode_id].clone(),
            score: entry.score,
            rank: entry.rank,
            updated_at: entry.updated_at,
        });
    }

    Ok(views)
}
