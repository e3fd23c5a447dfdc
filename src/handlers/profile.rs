// src/handlers/profile.rs

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{ProfileUpdated, UpdateProfileRequest, UserChanges, UserProfile},
    state::AppState,
    utils::{hash::hash_password, jwt::{Claims, sign_jwt}},
};

/// Get the current user's profile.
///
/// Favourite sports are resolved to sport records; ids whose sport no longer
/// exists are skipped.
#[utoipa::path(
    get,
    path = "/api/users/profile",
    tag = "users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile of the current user", body = UserProfile),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let user = state
        .store
        .find_user(user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let mut favorite_sports = Vec::with_capacity(user.favorite_sports.len());
    for sport_id in &user.favorite_sports {
        if let Some(sport) = state.store.find_sport(*sport_id).await? {
            favorite_sports.push(sport);
        }
    }

    let achievements = state.store.achievements_for_user(user_id).await?;

    Ok(Json(UserProfile {
        id: user.id,
        username: user.username,
        role: user.role,
        created_at: user.created_at,
        favorite_sports,
        achievements,
    }))
}

/// Update the current user's username, password or favourite sports.
/// Returns the stored user and a freshly signed token.
#[utoipa::path(
    put,
    path = "/api/users/profile",
    tag = "users",
    request_body = UpdateProfileRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile updated", body = ProfileUpdated),
        (status = 400, description = "Invalid profile data"),
        (status = 401, description = "Missing or invalid token"),
        (status = 409, description = "Username taken")
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    let user_id = claims.user_id()?;

    let password_hash = payload
        .password
        .as_deref()
        .map(hash_password)
        .transpose()?;

    // Keep the first occurrence of each id.
    let favorite_sports = payload.favorite_sports.map(|ids| {
        let mut unique = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        unique
    });

    let changes = UserChanges {
        username: payload.username,
        password_hash,
        favorite_sports,
    };
    let user = state
        .store
        .update_user(user_id, changes)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let token = sign_jwt(
        user.id,
        &user.role,
        &state.config.jwt_secret,
        state.config.jwt_expiration,
    )?;

    tracing::info!(user_id = user.id, "profile updated");
    Ok(Json(ProfileUpdated { user, token }))
}
