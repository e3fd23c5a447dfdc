// src/store/memory.rs

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    models::{
        achievement::{Achievement, CreateAchievementRequest},
        game_history::{GameHistory, NewGameHistory},
        game_mode::{GameMode, UpsertGameModeRequest},
        leaderboard::{EntryKey, LeaderboardEntry},
        question::{CreateQuestionRequest, Question},
        sport::{Sport, UpsertSportRequest},
        user::{User, UserChanges},
    },
    store::{Scope, StorageError, StorageResult, Store},
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    sports: Vec<Sport>,
    game_modes: Vec<GameMode>,
    questions: Vec<Question>,
    users: Vec<User>,
    history: Vec<GameHistory>,
    leaderboard: Vec<LeaderboardEntry>,
    achievements: Vec<Achievement>,
    /// `(user id, achievement id)` in unlock order.
    unlocked: Vec<(i64, i64)>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

fn in_scope(scope: Scope, sport_id: i64, game_mode_id: i64) -> bool {
    match scope {
        Scope::All => true,
        Scope::Sport(id) => sport_id == id,
        Scope::GameMode(id) => game_mode_id == id,
    }
}

/// In-process store used when no database is configured, and by the tests.
/// Contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_sports(&self) -> StorageResult<Vec<Sport>> {
        let tables = self.tables.read().await;
        let mut sports = tables.sports.clone();
        sports.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sports)
    }

    async fn find_sport(&self, id: i64) -> StorageResult<Option<Sport>> {
        let tables = self.tables.read().await;
        Ok(tables.sports.iter().find(|s| s.id == id).cloned())
    }

    async fn upsert_sport(&self, sport: UpsertSportRequest) -> StorageResult<Sport> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();

        if let Some(existing) = tables.sports.iter_mut().find(|s| s.name == sport.name) {
            existing.description = sport.description;
            existing.image_url = sport.image_url;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let created = Sport {
            id: tables.next_id(),
            name: sport.name,
            description: sport.description,
            image_url: sport.image_url,
            created_at: now,
            updated_at: now,
        };
        tables.sports.push(created.clone());
        Ok(created)
    }

    async fn list_game_modes(&self, sport_id: Option<i64>) -> StorageResult<Vec<GameMode>> {
        let tables = self.tables.read().await;
        Ok(tables
            .game_modes
            .iter()
            .filter(|m| sport_id.is_none_or(|id| m.sport_id == id))
            .cloned()
            .collect())
    }

    async fn find_game_mode(&self, id: i64) -> StorageResult<Option<GameMode>> {
        let tables = self.tables.read().await;
        Ok(tables.game_modes.iter().find(|m| m.id == id).cloned())
    }

    async fn upsert_game_mode(&self, mode: UpsertGameModeRequest) -> StorageResult<GameMode> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();

        if let Some(existing) = tables
            .game_modes
            .iter_mut()
            .find(|m| m.sport_id == mode.sport_id && m.name == mode.name)
        {
            existing.description = mode.description;
            existing.rules = mode.rules;
            existing.time_limit = mode.time_limit;
            existing.points_per_correct_answer = mode.points_per_correct_answer;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let created = GameMode {
            id: tables.next_id(),
            sport_id: mode.sport_id,
            name: mode.name,
            description: mode.description,
            rules: mode.rules,
            time_limit: mode.time_limit,
            points_per_correct_answer: mode.points_per_correct_answer,
            created_at: now,
            updated_at: now,
        };
        tables.game_modes.push(created.clone());
        Ok(created)
    }

    async fn list_questions(&self, scope: Scope) -> StorageResult<Vec<Question>> {
        let tables = self.tables.read().await;
        Ok(tables
            .questions
            .iter()
            .filter(|q| in_scope(scope, q.sport_id, q.game_mode_id))
            .cloned()
            .collect())
    }

    async fn find_question(&self, id: i64) -> StorageResult<Option<Question>> {
        let tables = self.tables.read().await;
        Ok(tables.questions.iter().find(|q| q.id == id).cloned())
    }

    async fn insert_question(&self, question: CreateQuestionRequest) -> StorageResult<Question> {
        let mut tables = self.tables.write().await;
        let created = Question {
            id: tables.next_id(),
            text: question.text,
            options: question.options,
            explanation: question.explanation,
            image_url: question.image_url,
            difficulty: question.difficulty,
            category: question.category,
            sport_id: question.sport_id,
            game_mode_id: question.game_mode_id,
            created_at: Utc::now(),
        };
        tables.questions.push(created.clone());
        Ok(created)
    }

    async fn delete_question(&self, id: i64) -> StorageResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.questions.len();
        tables.questions.retain(|q| q.id != id);
        Ok(tables.questions.len() < before)
    }

    async fn find_user(&self, id: i64) -> StorageResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
        role: &str,
    ) -> StorageResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == username) {
            return Err(StorageError::Conflict(format!(
                "Username '{}' already exists",
                username
            )));
        }

        let created = User {
            id: tables.next_id(),
            username: username.to_string(),
            password: password_hash.to_string(),
            role: role.to_string(),
            favorite_sports: Vec::new(),
            created_at: Utc::now(),
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> StorageResult<Option<User>> {
        let mut tables = self.tables.write().await;
        if let Some(username) = &changes.username {
            if tables.users.iter().any(|u| u.id != id && &u.username == username) {
                return Err(StorageError::Conflict(format!(
                    "Username '{}' already exists",
                    username
                )));
            }
        }

        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password = password_hash;
        }
        if let Some(favorite_sports) = changes.favorite_sports {
            user.favorite_sports = favorite_sports;
        }
        Ok(Some(user.clone()))
    }

    async fn find_achievement(&self, id: i64) -> StorageResult<Option<Achievement>> {
        let tables = self.tables.read().await;
        Ok(tables.achievements.iter().find(|a| a.id == id).cloned())
    }

    async fn insert_achievement(
        &self,
        achievement: CreateAchievementRequest,
    ) -> StorageResult<Achievement> {
        let mut tables = self.tables.write().await;
        if tables.achievements.iter().any(|a| a.name == achievement.name) {
            return Err(StorageError::Conflict(format!(
                "Achievement '{}' already exists",
                achievement.name
            )));
        }

        let created = Achievement {
            id: tables.next_id(),
            name: achievement.name,
            description: achievement.description,
            image_url: achievement.image_url,
            criteria: achievement.criteria,
            points: achievement.points,
            created_at: Utc::now(),
        };
        tables.achievements.push(created.clone());
        Ok(created)
    }

    async fn grant_achievement(&self, user_id: i64, achievement_id: i64) -> StorageResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.unlocked.contains(&(user_id, achievement_id)) {
            tables.unlocked.push((user_id, achievement_id));
        }
        Ok(())
    }

    async fn achievements_for_user(&self, user_id: i64) -> StorageResult<Vec<Achievement>> {
        let tables = self.tables.read().await;
        Ok(tables
            .unlocked
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .filter_map(|(_, id)| tables.achievements.iter().find(|a| a.id == *id).cloned())
            .collect())
    }

    async fn insert_history(&self, history: NewGameHistory) -> StorageResult<GameHistory> {
        let mut tables = self.tables.write().await;
        let created = GameHistory {
            id: tables.next_id(),
            user_id: history.user_id,
            sport_id: history.sport_id,
            game_mode_id: history.game_mode_id,
            score: history.score,
            correct_answers: history.correct_answers,
            total_questions: history.total_questions,
            time_spent: history.time_spent,
            completed: history.completed,
            answers: history.answers,
            created_at: Utc::now(),
        };
        tables.history.push(created.clone());
        Ok(created)
    }

    async fn history_for_user(&self, user_id: i64) -> StorageResult<Vec<GameHistory>> {
        let tables = self.tables.read().await;
        // Ids grow with insertion, so reverse id order is newest first.
        let mut rows: Vec<GameHistory> = tables
            .history
            .iter()
            .filter(|h| h.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows)
    }

    async fn find_leaderboard_entry(
        &self,
        key: EntryKey,
    ) -> StorageResult<Option<LeaderboardEntry>> {
        let tables = self.tables.read().await;
        Ok(tables
            .leaderboard
            .iter()
            .find(|e| {
                e.user_id == key.user_id
                    && e.sport_id == key.sport_id
                    && e.game_mode_id == key.game_mode_id
            })
            .cloned())
    }

    async fn insert_leaderboard_entry(
        &self,
        key: EntryKey,
        score: i64,
    ) -> StorageResult<LeaderboardEntry> {
        let mut tables = self.tables.write().await;
        let exists = tables.leaderboard.iter().any(|e| {
            e.user_id == key.user_id
                && e.sport_id == key.sport_id
                && e.game_mode_id == key.game_mode_id
        });
        if exists {
            return Err(StorageError::Conflict(
                "Leaderboard entry already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let created = LeaderboardEntry {
            id: tables.next_id(),
            user_id: key.user_id,
            sport_id: key.sport_id,
            game_mode_id: key.game_mode_id,
            score,
            rank: None,
            created_at: now,
            updated_at: now,
        };
        tables.leaderboard.push(created.clone());
        Ok(created)
    }

    async fn update_leaderboard_score(&self, id: i64, score: i64) -> StorageResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(entry) = tables.leaderboard.iter_mut().find(|e| e.id == id) {
            entry.score = score;
            entry.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn list_leaderboard(
        &self,
        scope: Scope,
        limit: Option<i64>,
    ) -> StorageResult<Vec<LeaderboardEntry>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<LeaderboardEntry> = tables
            .leaderboard
            .iter()
            .filter(|e| in_scope(scope, e.sport_id, e.game_mode_id))
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.rank.unwrap_or(i32::MAX).cmp(&b.rank.unwrap_or(i32::MAX)))
                .then_with(|| a.id.cmp(&b.id))
        });

        if let Some(limit) = limit {
            rows.truncate(usize::try_from(limit).unwrap_or(0));
        }
        Ok(rows)
    }

    async fn update_leaderboard_ranks(&self, ranks: &[(i64, i32)]) -> StorageResult<()> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        for &(id, rank) in ranks {
            if let Some(entry) = tables.leaderboard.iter_mut().find(|e| e.id == id) {
                entry.rank = Some(rank);
                entry.updated_at = now;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sport(name: &str, description: &str) -> UpsertSportRequest {
        UpsertSportRequest {
            name: name.to_string(),
            description: description.to_string(),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_sport_keeps_one_row_per_name() {
        let store = MemoryStore::new();

        let first = store.upsert_sport(sport("NBA", "old")).await.unwrap();
        let second = store
            .upsert_sport(sport("NBA", "National Basketball Association"))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        let sports = store.list_sports().await.unwrap();
        assert_eq!(sports.len(), 1);
        assert_eq!(sports[0].description, "National Basketball Association");
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let store = MemoryStore::new();
        store.insert_user("jordan", "hash", "user").await.unwrap();

        let err = store.insert_user("jordan", "hash", "user").await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_user_applies_only_set_fields() {
        let store = MemoryStore::new();
        let user = store.insert_user("jordan", "hash", "user").await.unwrap();
        store.insert_user("pippen", "hash", "user").await.unwrap();

        let changes = UserChanges {
            favorite_sports: Some(vec![3, 1]),
            ..Default::default()
        };
        let updated = store.update_user(user.id, changes).await.unwrap().unwrap();
        assert_eq!(updated.username, "jordan");
        assert_eq!(updated.password, "hash");
        assert_eq!(updated.favorite_sports, vec![3, 1]);

        let taken = UserChanges {
            username: Some("pippen".to_string()),
            ..Default::default()
        };
        let err = store.update_user(user.id, taken).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));

        let keep_own = UserChanges {
            username: Some("jordan".to_string()),
            ..Default::default()
        };
        assert!(store.update_user(user.id, keep_own).await.unwrap().is_some());
        assert!(store.update_user(999, UserChanges::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_granting_twice_unlocks_once() {
        let store = MemoryStore::new();
        let rookie = store
            .insert_achievement(CreateAchievementRequest {
                name: "Sports Rookie".to_string(),
                description: "Complete your first game".to_string(),
                image_url: None,
                criteria: "Finish one game".to_string(),
                points: 10,
            })
            .await
            .unwrap();

        store.grant_achievement(1, rookie.id).await.unwrap();
        store.grant_achievement(1, rookie.id).await.unwrap();

        let unlocked = store.achievements_for_user(1).await.unwrap();
        assert_eq!(unlocked.len(), 1);
        assert_eq!(unlocked[0].name, "Sports Rookie");
        assert!(store.achievements_for_user(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_leaderboard_orders_by_score_then_rank() {
        let store = MemoryStore::new();
        let key = |user_id| EntryKey {
            user_id,
            sport_id: 1,
            game_mode_id: 2,
        };

        let a = store.insert_leaderboard_entry(key(1), 50).await.unwrap();
        let b = store.insert_leaderboard_entry(key(2), 50).await.unwrap();
        let c = store.insert_leaderboard_entry(key(3), 90).await.unwrap();
        store.update_leaderboard_ranks(&[(b.id, 1), (a.id, 2)]).await.unwrap();

        let rows = store.list_leaderboard(Scope::GameMode(2), None).await.unwrap();
        let ids: Vec<i64> = rows.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);

        let top = store.list_leaderboard(Scope::All, Some(1)).await.unwrap();
        assert_eq!(top.len(), 1);
        assert!(store.list_leaderboard(Scope::Sport(9), None).await.unwrap().is_empty());
    }
}
