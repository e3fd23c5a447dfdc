// src/handlers/admin.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        achievement::{Achievement, CreateAchievementRequest},
        game_mode::{GameMode, UpsertGameModeRequest},
        question::{CreateQuestionRequest, Question},
        sport::{Sport, UpsertSportRequest},
    },
    store::Store,
    utils::html::{clean_html, clean_optional},
};

/// Creates a sport, or updates the one with the same name.
/// Admin only.
#[utoipa::path(
    post,
    path = "/api/admin/sports",
    tag = "admin",
    request_body = UpsertSportRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Sport stored", body = Sport),
        (status = 400, description = "Invalid sport data"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn upsert_sport(
    State(store): State<Arc<dyn Store>>,
    payload: Result<Json<UpsertSportRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(mut payload) = payload?;
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    payload.description = clean_html(&payload.description);

    let sport = store.upsert_sport(payload).await?;
    tracing::info!(sport_id = sport.id, name = %sport.name, "sport upserted");
    Ok(Json(sport))
}

/// Creates a game mode, or updates the one with the same sport and name.
/// Admin only.
#[utoipa::path(
    post,
    path = "/api/admin/gamemodes",
    tag = "admin",
    request_body = UpsertGameModeRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Game mode stored", body = GameMode),
        (status = 400, description = "Invalid game mode data"),
        (status = 404, description = "Sport not found")
    )
)]
pub async fn upsert_game_mode(
    State(store): State<Arc<dyn Store>>,
    payload: Result<Json<UpsertGameModeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(mut payload) = payload?;
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    store
        .find_sport(payload.sport_id)
        .await?
        .ok_or(AppError::NotFound("Sport not found".to_string()))?;

    payload.description = clean_html(&payload.description);
    payload.rules = clean_optional(payload.rules);

    let mode = store.upsert_game_mode(payload).await?;
    tracing::info!(game_mode_id = mode.id, name = %mode.name, "game mode upserted");
    Ok(Json(mode))
}

/// Adds a question to a game mode.
/// Admin only.
#[utoipa::path(
    post,
    path = "/api/admin/questions",
    tag = "admin",
    request_body = CreateQuestionRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Question created", body = Question),
        (status = 400, description = "Invalid question data"),
        (status = 404, description = "Game mode not found")
    )
)]
pub async fn create_question(
    State(store): State<Arc<dyn Store>>,
    payload: Result<Json<CreateQuestionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(mut payload) = payload?;
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mode = store
        .find_game_mode(payload.game_mode_id)
        .await?
        .ok_or(AppError::NotFound("Game mode not found".to_string()))?;
    if mode.sport_id != payload.sport_id {
        return Err(AppError::BadRequest(
            "Game mode does not belong to this sport".to_string(),
        ));
    }

    payload.text = clean_html(&payload.text);
    payload.explanation = clean_optional(payload.explanation);
    for option in &mut payload.options {
        option.text = clean_html(&option.text);
    }

    let question = store.insert_question(payload).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

/// Deletes a question.
/// Admin only.
#[utoipa::path(
    delete,
    path = "/api/admin/questions/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "Question id")),
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Question deleted"),
        (status = 404, description = "Question not found")
    )
)]
pub async fn delete_question(
    State(store): State<Arc<dyn Store>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !store.delete_question(id).await? {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Defines a new achievement.
/// Admin only.
#[utoipa::path(
    post,
    path = "/api/admin/achievements",
    tag = "admin",
    request_body = CreateAchievementRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Achievement created", body = Achievement),
        (status = 400, description = "Invalid achievement data"),
        (status = 409, description = "Name taken")
    )
)]
pub async fn create_achievement(
    State(store): State<Arc<dyn Store>>,
    payload: Result<Json<CreateAchievementRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(mut payload) = payload?;
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    payload.description = clean_html(&payload.description);
    payload.criteria = clean_html(&payload.criteria);

    let achievement = store.insert_achievement(payload).await?;
    Ok((StatusCode::CREATED, Json(achievement)))
}

/// Unlocks an achievement for a user. Granting it again changes nothing.
/// Admin only.
#[utoipa::path(
    post,
    path = "/api/admin/users/{user_id}/achievements/{achievement_id}",
    tag = "admin",
    params(
        ("user_id" = i64, Path, description = "User id"),
        ("achievement_id" = i64, Path, description = "Achievement id")
    ),
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Achievement unlocked"),
        (status = 404, description = "User or achievement not found")
    )
)]
pub async fn grant_achievement(
    State(store): State<Arc<dyn Store>>,
    Path((user_id, achievement_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    store
        .find_user(user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;
    store
        .find_achievement(achievement_id)
        .await?
        .ok_or(AppError::NotFound("Achievement not found".to_string()))?;

    store.grant_achievement(user_id, achievement_id).await?;
    tracing::info!(user_id, achievement_id, "achievement unlocked");
    Ok(StatusCode::NO_CONTENT)
}
