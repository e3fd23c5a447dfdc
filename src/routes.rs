// src/routes.rs

use axum::{
    Json, Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::{
    docs::ApiDoc,
    handlers::{admin, auth, games, leaderboard, profile, questions, sports},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (users, sports, questions, games, leaderboard, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (store, config, partition locks).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let user_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        // Protected profile routes
        .merge(
            Router::new()
                .route(
                    "/profile",
                    get(profile::get_profile).put(profile::update_profile),
                )
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        );

    let sport_routes = Router::new()
        .route("/", get(sports::list_sports))
        .route("/{id}", get(sports::get_sport))
        .route("/{id}/gamemodes", get(sports::list_sport_game_modes));

    let question_routes = Router::new()
        .route("/", get(questions::list_questions))
        .route("/{id}", get(questions::get_question))
        .route("/sport/{sport_id}", get(questions::list_questions_by_sport))
        .route(
            "/gamemode/{game_mode_id}",
            get(questions::list_questions_by_game_mode),
        );

    let game_routes = Router::new()
        .route("/", get(games::list_game_modes))
        .route("/{id}", get(games::get_game_mode))
        // Protected game routes
        .merge(
            Router::new()
                .route("/submit", post(games::submit_game))
                .route("/history", get(games::my_history))
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        );

    let leaderboard_routes = Router::new()
        .route("/", get(leaderboard::get_leaderboard))
        .route("/sport/{sport_id}", get(leaderboard::get_leaderboard_by_sport))
        .route(
            "/gamemode/{game_mode_id}",
            get(leaderboard::get_leaderboard_by_game_mode),
        );

    let admin_routes = Router::new()
        .route("/sports", post(admin::upsert_sport))
        .route("/gamemodes", post(admin::upsert_game_mode))
        .route("/questions", post(admin::create_question))
        .route("/questions/{id}", delete(admin::delete_question))
        .route("/achievements", post(admin::create_achievement))
        .route(
            "/users/{user_id}/achievements/{achievement_id}",
            post(admin::grant_achievement),
        )
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/", get(|| async { "API is running..." }))
        .route("/api-doc/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/api/users", user_routes)
        .nest("/api/sports", sport_routes)
        .nest("/api/questions", question_routes)
        .nest("/api/games", game_routes)
        .nest("/api/leaderboard", leaderboard_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
