// src/handlers/games.rs

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{
        game_history::{GameHistory, SubmitGameRequest},
        game_mode::GameMode,
    },
    services::leaderboard,
    state::AppState,
    utils::jwt::Claims,
};

/// Lists all game modes.
#[utoipa::path(
    get,
    path = "/api/games",
    tag = "games",
    responses((status = 200, description = "All game modes", body = [GameMode]))
)]
pub async fn list_game_modes(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.store.list_game_modes(None).await?))
}

/// Retrieves a game mode by ID.
#[utoipa::path(
    get,
    path = "/api/games/{id}",
    tag = "games",
    params(("id" = i64, Path, description = "Game mode id")),
    responses(
        (status = 200, description = "Game mode found", body = GameMode),
        (status = 404, description = "Game mode not found")
    )
)]
pub async fn get_game_mode(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mode = state
        .store
        .find_game_mode(id)
        .await?
        .ok_or(AppError::NotFound("Game mode not found".to_string()))?;

    Ok(Json(mode))
}

/// Submits a finished session.
///
/// * Always appends a game history row.
/// * Keeps the user's best score for the (sport, game mode) pair.
/// * Re-ranks the game mode's leaderboard when that best score changes.
#[utoipa::path(
    post,
    path = "/api/games/submit",
    tag = "games",
    request_body = SubmitGameRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Result recorded", body = GameHistory),
        (status = 400, description = "Invalid game data"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn submit_game(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<SubmitGameRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let user_id = claims.user_id()?;

    let history =
        leaderboard::submit_result(state.store.as_ref(), &state.partitions, user_id, req).await?;

    Ok((StatusCode::CREATED, Json(history)))
}

/// Lists the current user's past games, newest first.
#[utoipa::path(
    get,
    path = "/api/games/history",
    tag = "games",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Game history", body = [GameHistory]),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn my_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    Ok(Json(state.store.history_for_user(user_id).await?))
}
