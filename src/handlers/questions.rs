// src/handlers/questions.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::question::Question,
    store::{Scope, Store},
};

/// Lists every question.
#[utoipa::path(
    get,
    path = "/api/questions",
    tag = "questions",
    responses((status = 200, description = "All questions", body = [Question]))
)]
pub async fn list_questions(
    State(store): State<Arc<dyn Store>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(store.list_questions(Scope::All).await?))
}

/// Retrieves a single question by ID.
#[utoipa::path(
    get,
    path = "/api/questions/{id}",
    tag = "questions",
    params(("id" = i64, Path, description = "Question id")),
    responses(
        (status = 200, description = "Question found", body = Question),
        (status = 404, description = "Question not found")
    )
)]
pub async fn get_question(
    State(store): State<Arc<dyn Store>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let question = store
        .find_question(id)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    Ok(Json(question))
}

/// Lists the questions of a sport.
#[utoipa::path(
    get,
    path = "/api/questions/sport/{sport_id}",
    tag = "questions",
    params(("sport_id" = i64, Path, description = "Sport id")),
    responses(
        (status = 200, description = "Questions of the sport", body = [Question]),
        (status = 404, description = "No questions found for this sport")
    )
)]
pub async fn list_questions_by_sport(
    State(store): State<Arc<dyn Store>>,
    Path(sport_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let questions = store.list_questions(Scope::Sport(sport_id)).await?;
    if questions.is_empty() {
        return Err(AppError::NotFound(
            "No questions found for this sport".to_string(),
        ));
    }

    Ok(Json(questions))
}

/// Lists the questions of a game mode. This is the list a session is played from.
#[utoipa::path(
    get,
    path = "/api/questions/gamemode/{game_mode_id}",
    tag = "questions",
    params(("game_mode_id" = i64, Path, description = "Game mode id")),
    responses(
        (status = 200, description = "Questions of the game mode", body = [Question]),
        (status = 404, description = "No questions found for this game mode")
    )
)]
pub async fn list_questions_by_game_mode(
    State(store): State<Arc<dyn Store>>,
    Path(game_mode_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let questions = store.list_questions(Scope::GameMode(game_mode_id)).await?;
    if questions.is_empty() {
        return Err(AppError::NotFound(
            "No questions found for this game mode".to_string(),
        ));
    }

    Ok(Json(questions))
}
