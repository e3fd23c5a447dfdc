// src/handlers/sports.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{
        game_mode::GameMode,
        sport::{Sport, SportDetail},
    },
    store::Store,
};

/// Lists all sports.
#[utoipa::path(
    get,
    path = "/api/sports",
    tag = "sports",
    responses((status = 200, description = "All sports", body = [Sport]))
)]
pub async fn list_sports(
    State(store): State<Arc<dyn Store>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(store.list_sports().await?))
}

/// Retrieves a sport together with its game modes.
#[utoipa::path(
    get,
    path = "/api/sports/{id}",
    tag = "sports",
    params(("id" = i64, Path, description = "Sport id")),
    responses(
        (status = 200, description = "Sport found", body = SportDetail),
        (status = 404, description = "Sport not found")
    )
)]
pub async fn get_sport(
    State(store): State<Arc<dyn Store>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let sport = store
        .find_sport(id)
        .await?
        .ok_or(AppError::NotFound("Sport not found".to_string()))?;
    let game_modes = store.list_game_modes(Some(id)).await?;

    Ok(Json(SportDetail { sport, game_modes }))
}

/// Lists the game modes of a sport.
#[utoipa::path(
    get,
    path = "/api/sports/{id}/gamemodes",
    tag = "sports",
    params(("id" = i64, Path, description = "Sport id")),
    responses(
        (status = 200, description = "Game modes of the sport", body = [GameMode]),
        (status = 404, description = "No game modes found for this sport")
    )
)]
pub async fn list_sport_game_modes(
    State(store): State<Arc<dyn Store>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let game_modes = store.list_game_modes(Some(id)).await?;
    if game_modes.is_empty() {
        return Err(AppError::NotFound(
            "No game modes found for this sport".to_string(),
        ));
    }

    Ok(Json(game_modes))
}
