// src/handlers/leaderboard.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::leaderboard::LeaderboardView,
    services::leaderboard::read_leaderboard,
    store::{Scope, Store},
};

/// Retrieves the top 100 scores across all sports and game modes.
#[utoipa::path(
    get,
    path = "/api/leaderboard",
    tag = "leaderboard",
    responses((status = 200, description = "Global leaderboard", body = [LeaderboardView]))
)]
pub async fn get_leaderboard(
    State(store): State<Arc<dyn Store>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(read_leaderboard(store.as_ref(), Scope::All).await?))
}

/// Retrieves the top 100 scores of a sport.
#[utoipa::path(
    get,
    path = "/api/leaderboard/sport/{sport_id}",
    tag = "leaderboard",
    params(("sport_id" = i64, Path, description = "Sport id")),
    responses(
        (status = 200, description = "Leaderboard of the sport", body = [LeaderboardView]),
        (status = 404, description = "No leaderboard entries found for this sport")
    )
)]
pub async fn get_leaderboard_by_sport(
    State(store): State<Arc<dyn Store>>,
    Path(sport_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let views = read_leaderboard(store.as_ref(), Scope::Sport(sport_id)).await?;
    if views.is_empty() {
        return Err(AppError::NotFound(
            "No leaderboard entries found for this sport".to_string(),
        ));
    }

    Ok(Json(views))
}

/// Retrieves the top 100 scores of a game mode, in rank order.
#[utoipa::path(
    get,
    path = "/api/leaderboard/gamemode/{game_mode_id}",
    tag = "leaderboard",
    params(("game_mode_id" = i64, Path, description = "Game mode id")),
    responses(
        (status = 200, description = "Leaderboard of the game mode", body = [LeaderboardView]),
        (status = 404, description = "No leaderboard entries found for this game mode")
    )
)]
pub async fn get_leaderboard_by_game_mode(
    State(store): State<Arc<dyn Store>>,
    Path(game_mode_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let views = read_leaderboard(store.as_ref(), Scope::GameMode(game_mode_id)).await?;
    if views.is_empty() {
        return Err(AppError::NotFound(
            "No leaderboard entries found for this game mode".to_string(),
        ));
    }

    Ok(Json(views))
}
