// src/docs.rs

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

/// Aggregated OpenAPI specification, served at `/api-doc/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::profile::get_profile,
        crate::handlers::profile::update_profile,
        crate::handlers::sports::list_sports,
        crate::handlers::sports::get_sport,
        crate::handlers::sports::list_sport_game_modes,
        crate::handlers::questions::list_questions,
        crate::handlers::questions::get_question,
        crate::handlers::questions::list_questions_by_sport,
        crate::handlers::questions::list_questions_by_game_mode,
        crate::handlers::games::list_game_modes,
        crate::handlers::games::get_game_mode,
        crate::handlers::games::submit_game,
        crate::handlers::games::my_history,
        crate::handlers::leaderboard::get_leaderboard,
        crate::handlers::leaderboard::get_leaderboard_by_sport,
        crate::handlers::leaderboard::get_leaderboard_by_game_mode,
        crate::handlers::admin::upsert_sport,
        crate::handlers::admin::upsert_game_mode,
        crate::handlers::admin::create_question,
        crate::handlers::admin::delete_question,
        crate::handlers::admin::create_achievement,
        crate::handlers::admin::grant_achievement,
    ),
    components(
        schemas(
            crate::models::sport::Sport,
            crate::models::sport::SportDetail,
            crate::models::sport::UpsertSportRequest,
            crate::models::game_mode::GameMode,
            crate::models::game_mode::UpsertGameModeRequest,
            crate::models::question::Question,
            crate::models::question::QuestionOption,
            crate::models::question::CreateQuestionRequest,
            crate::models::game_history::AnswerRecord,
            crate::models::game_history::GameHistory,
            crate::models::game_history::SubmitGameRequest,
            crate::models::leaderboard::LeaderboardEntry,
            crate::models::leaderboard::LeaderboardView,
            crate::models::leaderboard::NamedRef,
            crate::models::user::User,
            crate::models::user::CreateUserRequest,
            crate::models::user::LoginRequest,
            crate::models::user::TokenResponse,
            crate::models::user::UpdateProfileRequest,
            crate::models::user::UserProfile,
            crate::models::user::ProfileUpdated,
            crate::models::achievement::Achievement,
            crate::models::achievement::CreateAchievementRequest,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "users", description = "Registration, login and profiles"),
        (name = "sports", description = "Sports catalogue"),
        (name = "questions", description = "Trivia questions"),
        (name = "games", description = "Game modes and result submission"),
        (name = "leaderboard", description = "Best scores and ranks"),
        (name = "admin", description = "Catalogue management"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
