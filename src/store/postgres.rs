// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, types::Json};

use crate::{
    models::{
        achievement::{Achievement, CreateAchievementRequest},
        game_history::{AnswerRecord, GameHistory, NewGameHistory},
        game_mode::{GameMode, UpsertGameModeRequest},
        leaderboard::{EntryKey, LeaderboardEntry},
        question::{CreateQuestionRequest, Question, QuestionOption},
        sport::{Sport, UpsertSportRequest},
        user::{User, UserChanges},
    },
    store::{Scope, StorageError, StorageResult, Store},
};

const QUESTION_COLUMNS: &str = "id, text, options, explanation, image_url, difficulty, category, \
     sport_id, game_mode_id, created_at";

const HISTORY_COLUMNS: &str = "id, user_id, sport_id, game_mode_id, score, correct_answers, \
     total_questions, time_spent, completed, answers, created_at";

const LEADERBOARD_COLUMNS: &str =
    "id, user_id, sport_id, game_mode_id, score, rank, created_at, updated_at";

/// Row shape of the 'questions' table; options are stored as JSONB.
#[derive(FromRow)]
struct QuestionRow {
    id: i64,
    text: String,
    options: Json<Vec<QuestionOption>>,
    explanation: Option<String>,
    image_url: Option<String>,
    difficulty: String,
    category: Option<String>,
    sport_id: i64,
    game_mode_id: i64,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<QuestionRow> for Question {
    fn from(row: QuestionRow) -> Self {
        Question {
            id: row.id,
            text: row.text,
            options: row.options.0,
            explanation: row.explanation,
            image_url: row.image_url,
            difficulty: row.difficulty,
            category: row.category,
            sport_id: row.sport_id,
            game_mode_id: row.game_mode_id,
            created_at: row.created_at,
        }
    }
}

/// Row shape of the 'game_history' table; answers are stored as JSONB.
#[derive(FromRow)]
struct HistoryRow {
    id: i64,
    user_id: i64,
    sport_id: i64,
    game_mode_id: i64,
    score: i64,
    correct_answers: i64,
    total_questions: i64,
    time_spent: i64,
    completed: bool,
    answers: Json<Vec<AnswerRecord>>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<HistoryRow> for GameHistory {
    fn from(row: HistoryRow) -> Self {
        GameHistory {
            id: row.id,
            user_id: row.user_id,
            sport_id: row.sport_id,
            game_mode_id: row.game_mode_id,
            score: row.score,
            correct_answers: row.correct_answers,
            total_questions: row.total_questions,
            time_spent: row.time_spent,
            completed: row.completed,
            answers: row.answers.0,
            created_at: row.created_at,
        }
    }
}

fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> StorageError {
    move |e| {
        tracing::error!("{}: {:?}", context, e);
        StorageError::unavailable(context, e)
    }
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_sports(&self) -> StorageResult<Vec<Sport>> {
        sqlx::query_as::<_, Sport>("SELECT * FROM sports ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list sports"))
    }

    async fn find_sport(&self, id: i64) -> StorageResult<Option<Sport>> {
        sqlx::query_as::<_, Sport>("SELECT * FROM sports WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch sport"))
    }

    async fn upsert_sport(&self, sport: UpsertSportRequest) -> StorageResult<Sport> {
        sqlx::query_as::<_, Sport>(
            r#"
            INSERT INTO sports (name, description, image_url)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE SET
                description = EXCLUDED.description,
                image_url = EXCLUDED.image_url,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(&sport.name)
        .bind(&sport.description)
        .bind(&sport.image_url)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to upsert sport"))
    }

    async fn list_game_modes(&self, sport_id: Option<i64>) -> StorageResult<Vec<GameMode>> {
        sqlx::query_as::<_, GameMode>(
            r#"
            SELECT * FROM game_modes
            WHERE ($1::BIGINT IS NULL OR sport_id = $1)
            ORDER BY id
            "#,
        )
        .bind(sport_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list game modes"))
    }

    async fn find_game_mode(&self, id: i64) -> StorageResult<Option<GameMode>> {
        sqlx::query_as::<_, GameMode>("SELECT * FROM game_modes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch game mode"))
    }

    async fn upsert_game_mode(&self, mode: UpsertGameModeRequest) -> StorageResult<GameMode> {
        sqlx::query_as::<_, GameMode>(
            r#"
            INSERT INTO game_modes
                (sport_id, name, description, rules, time_limit, points_per_correct_answer)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (sport_id, name) DO UPDATE SET
                description = EXCLUDED.description,
                rules = EXCLUDED.rules,
                time_limit = EXCLUDED.time_limit,
                points_per_correct_answer = EXCLUDED.points_per_correct_answer,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(mode.sport_id)
        .bind(&mode.name)
        .bind(&mode.description)
        .bind(&mode.rules)
        .bind(mode.time_limit)
        .bind(mode.points_per_correct_answer)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to upsert game mode"))
    }

    async fn list_questions(&self, scope: Scope) -> StorageResult<Vec<Question>> {
        let (sport_id, game_mode_id) = match scope {
            Scope::All => (None, None),
            Scope::Sport(id) => (Some(id), None),
            Scope::GameMode(id) => (None, Some(id)),
        };

        let sql = format!(
            "SELECT {QUESTION_COLUMNS} FROM questions \
             WHERE ($1::BIGINT IS NULL OR sport_id = $1) \
               AND ($2::BIGINT IS NULL OR game_mode_id = $2) \
             ORDER BY id"
        );

        let rows = sqlx::query_as::<_, QuestionRow>(&sql)
            .bind(sport_id)
            .bind(game_mode_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list questions"))?;

        Ok(rows.into_iter().map(Question::from).collect())
    }

    async fn find_question(&self, id: i64) -> StorageResult<Option<Question>> {
        let sql = format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1");
        let row = sqlx::query_as::<_, QuestionRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch question"))?;

        Ok(row.map(Question::from))
    }

    async fn insert_question(&self, question: CreateQuestionRequest) -> StorageResult<Question> {
        let sql = format!(
            "INSERT INTO questions \
                (text, options, explanation, image_url, difficulty, category, sport_id, game_mode_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {QUESTION_COLUMNS}"
        );

        let row = sqlx::query_as::<_, QuestionRow>(&sql)
            .bind(&question.text)
            .bind(Json(&question.options))
            .bind(&question.explanation)
            .bind(&question.image_url)
            .bind(&question.difficulty)
            .bind(&question.category)
            .bind(question.sport_id)
            .bind(question.game_mode_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to insert question"))?;

        Ok(row.into())
    }

    async fn delete_question(&self, id: i64) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete question"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_user(&self, id: i64) -> StorageResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch user"))
    }

    async fn find_user_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch user"))
    }

    async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
        role: &str,
    ) -> StorageResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password, role)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let unique = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            if unique {
                StorageError::Conflict(format!("Username '{}' already exists", username))
            } else {
                db_error("Failed to insert user")(e)
            }
        })
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> StorageResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                username = COALESCE($2, username),
                password = COALESCE($3, password),
                favorite_sports = COALESCE($4::BIGINT[], favorite_sports)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.username)
        .bind(&changes.password_hash)
        .bind(&changes.favorite_sports)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            let unique = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            if unique {
                StorageError::Conflict("Username already exists".to_string())
            } else {
                db_error("Failed to update user")(e)
            }
        })
    }

    async fn find_achievement(&self, id: i64) -> StorageResult<Option<Achievement>> {
        sqlx::query_as::<_, Achievement>("SELECT * FROM achievements WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch achievement"))
    }

    async fn insert_achievement(
        &self,
        achievement: CreateAchievementRequest,
    ) -> StorageResult<Achievement> {
        sqlx::query_as::<_, Achievement>(
            r#"
            INSERT INTO achievements (name, description, image_url, criteria, points)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&achievement.name)
        .bind(&achievement.description)
        .bind(&achievement.image_url)
        .bind(&achievement.criteria)
        .bind(achievement.points)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let unique = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            if unique {
                StorageError::Conflict(format!(
                    "Achievement '{}' already exists",
                    achievement.name
                ))
            } else {
                db_error("Failed to insert achievement")(e)
            }
        })
    }

    async fn grant_achievement(&self, user_id: i64, achievement_id: i64) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_achievements (user_id, achievement_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, achievement_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(achievement_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to grant achievement"))?;
        Ok(())
    }

    async fn achievements_for_user(&self, user_id: i64) -> StorageResult<Vec<Achievement>> {
        sqlx::query_as::<_, Achievement>(
            r#"
            SELECT a.*
            FROM user_achievements ua
            JOIN achievements a ON a.id = ua.achievement_id
            WHERE ua.user_id = $1
            ORDER BY ua.unlocked_at, a.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to fetch achievements"))
    }

    async fn insert_history(&self, history: NewGameHistory) -> StorageResult<GameHistory> {
        let sql = format!(
            "INSERT INTO game_history \
                (user_id, sport_id, game_mode_id, score, correct_answers, total_questions, \
                 time_spent, completed, answers) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {HISTORY_COLUMNS}"
        );

        let row = sqlx::query_as::<_, HistoryRow>(&sql)
            .bind(history.user_id)
            .bind(history.sport_id)
            .bind(history.game_mode_id)
            .bind(history.score)
            .bind(history.correct_answers)
            .bind(history.total_questions)
            .bind(history.time_spent)
            .bind(history.completed)
            .bind(Json(&history.answers))
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to insert game history"))?;

        Ok(row.into())
    }

    async fn history_for_user(&self, user_id: i64) -> StorageResult<Vec<GameHistory>> {
        let sql = format!(
            "SELECT {HISTORY_COLUMNS} FROM game_history \
             WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );

        let rows = sqlx::query_as::<_, HistoryRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to fetch game history"))?;

        Ok(rows.into_iter().map(GameHistory::from).collect())
    }

    async fn find_leaderboard_entry(
        &self,
        key: EntryKey,
    ) -> StorageResult<Option<LeaderboardEntry>> {
        let sql = format!(
            "SELECT {LEADERBOARD_COLUMNS} FROM leaderboard \
             WHERE user_id = $1 AND sport_id = $2 AND game_mode_id = $3"
        );

        sqlx::query_as::<_, LeaderboardEntry>(&sql)
            .bind(key.user_id)
            .bind(key.sport_id)
            .bind(key.game_mode_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch leaderboard entry"))
    }

    async fn insert_leaderboard_entry(
        &self,
        key: EntryKey,
        score: i64,
    ) -> StorageResult<LeaderboardEntry> {
        let sql = format!(
            "INSERT INTO leaderboard (user_id, sport_id, game_mode_id, score) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {LEADERBOARD_COLUMNS}"
        );

        sqlx::query_as::<_, LeaderboardEntry>(&sql)
            .bind(key.user_id)
            .bind(key.sport_id)
            .bind(key.game_mode_id)
            .bind(score)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let unique = e
                    .as_database_error()
                    .is_some_and(|db| db.is_unique_violation());
                if unique {
                    StorageError::Conflict("Leaderboard entry already exists".to_string())
                } else {
                    db_error("Failed to insert leaderboard entry")(e)
                }
            })
    }

    async fn update_leaderboard_score(&self, id: i64, score: i64) -> StorageResult<()> {
        sqlx::query("UPDATE leaderboard SET score = $1, updated_at = NOW() WHERE id = $2")
            .bind(score)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to update leaderboard score"))?;
        Ok(())
    }

    async fn list_leaderboard(
        &self,
        scope: Scope,
        limit: Option<i64>,
    ) -> StorageResult<Vec<LeaderboardEntry>> {
        let (sport_id, game_mode_id) = match scope {
            Scope::All => (None, None),
            Scope::Sport(id) => (Some(id), None),
            Scope::GameMode(id) => (None, Some(id)),
        };

        // LIMIT NULL is LIMIT ALL in Postgres.
        let sql = format!(
            "SELECT {LEADERBOARD_COLUMNS} FROM leaderboard \
             WHERE ($1::BIGINT IS NULL OR sport_id = $1) \
               AND ($2::BIGINT IS NULL OR game_mode_id = $2) \
             ORDER BY score DESC, rank ASC NULLS LAST, id ASC \
             LIMIT $3"
        );

        sqlx::query_as::<_, LeaderboardEntry>(&sql)
            .bind(sport_id)
            .bind(game_mode_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list leaderboard"))
    }

    async fn update_leaderboard_ranks(&self, ranks: &[(i64, i32)]) -> StorageResult<()> {
        if ranks.is_empty() {
            return Ok(());
        }

        let (ids, values): (Vec<i64>, Vec<i32>) = ranks.iter().copied().unzip();

        sqlx::query(
            r#"
            UPDATE leaderboard AS l
            SET rank = r.rank, updated_at = NOW()
            FROM UNNEST($1::BIGINT[], $2::INT[]) AS r(id, rank)
            WHERE l.id = r.id
            "#,
        )
        .bind(&ids)
        .bind(&values)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update leaderboard ranks"))?;

        Ok(())
    }
}
