// tests/leaderboard_tests.rs

use std::sync::Arc;

use serde_json::{Value, json};
use sports_arena::{
    config::Config,
    models::{game_mode::GameMode, question::Question},
    routes,
    services::seed::seed_sample_data,
    session::{GameModeConfig, Outcome, QuizSession, SessionEvent},
    state::AppState,
    store::MemoryStore,
};

/// Helper function to spawn the app on a random port for testing.
async fn spawn_app() -> String {
    let store = Arc::new(MemoryStore::new());
    seed_sample_data(store.as_ref())
        .await
        .expect("Failed to seed sample data");

    let config = Config {
        database_url: None,
        jwt_secret: "test_secret_for_leaderboard_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        port: 0,
        admin_username: None,
        admin_password: None,
        seed_sample_data: false,
    };

    let app = routes::create_router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let address = format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

/// Registers `username` and returns a bearer token for it.
async fn register_and_login(client: &reqwest::Client, address: &str, username: &str) -> String {
    let credentials = json!({ "username": username, "password": "password123" });

    let response = client
        .post(format!("{}/api/users/register", address))
        .json(&credentials)
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(response.status().as_u16(), 201);

    let body: Value = client
        .post(format!("{}/api/users/login", address))
        .json(&credentials)
        .send()
        .await
        .expect("Failed to login")
        .json()
        .await
        .unwrap();
    body["token"].as_str().unwrap().to_string()
}

/// First game mode of the NBA sample sport.
async fn nba_quick_trivia(client: &reqwest::Client, address: &str) -> GameMode {
    let sports: Vec<Value> = client
        .get(format!("{}/api/sports", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let nba = sports
        .iter()
        .find(|s| s["name"] == "NBA")
        .expect("NBA sample sport");

    let modes: Vec<GameMode> = client
        .get(format!("{}/api/sports/{}/gamemodes", address, nba["id"]))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    modes.into_iter().next().expect("NBA game mode")
}

async fn submit(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    mode: &GameMode,
    score: i64,
) -> reqwest::Response {
    client
        .post(format!("{}/api/games/submit", address))
        .bearer_auth(token)
        .json(&json!({
            "sport": mode.sport_id,
            "gameMode": mode.id,
            "score": score,
            "correctAnswers": score / 10,
            "totalQuestions": 10,
            "timeSpent": 42
        }))
        .send()
        .await
        .expect("Failed to submit")
}

async fn board(client: &reqwest::Client, address: &str, mode: &GameMode) -> Vec<Value> {
    client
        .get(format!("{}/api/leaderboard/gamemode/{}", address, mode.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn submit_without_game_mode_is_rejected() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &address, "no_mode").await;

    let response = client
        .post(format!("{}/api/games/submit", address))
        .bearer_auth(&token)
        .json(&json!({
            "sport": 1,
            "score": 10,
            "correctAnswers": 1,
            "totalQuestions": 1,
            "timeSpent": 3
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn empty_game_mode_leaderboard_is_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let mode = nba_quick_trivia(&client, &address).await;

    let response = client
        .get(format!("{}/api/leaderboard/gamemode/{}", address, mode.id))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn improvement_reorders_ranks() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let mode = nba_quick_trivia(&client, &address).await;
    let alice = register_and_login(&client, &address, "alice").await;
    let bob = register_and_login(&client, &address, "bob").await;

    assert_eq!(submit(&client, &address, &alice, &mode, 50).await.status().as_u16(), 201);
    assert_eq!(submit(&client, &address, &bob, &mode, 80).await.status().as_u16(), 201);

    let rows = board(&client, &address, &mode).await;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["user"]["name"], "bob");
    assert_eq!(rows[0]["rank"], 1);
    assert_eq!(rows[1]["user"]["name"], "alice");
    assert_eq!(rows[1]["rank"], 2);

    assert_eq!(submit(&client, &address, &alice, &mode, 100).await.status().as_u16(), 201);

    let rows = board(&client, &address, &mode).await;
    assert_eq!(rows[0]["user"]["name"], "alice");
    assert_eq!(rows[0]["score"], 100);
    assert_eq!(rows[0]["rank"], 1);
    assert_eq!(rows[0]["gameMode"]["name"], "Quick Trivia");
    assert_eq!(rows[1]["user"]["name"], "bob");
    assert_eq!(rows[1]["rank"], 2);
}

#[tokio::test]
async fn lower_score_keeps_best_but_extends_history() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let mode = nba_quick_trivia(&client, &address).await;
    let token = register_and_login(&client, &address, "carol").await;

    submit(&client, &address, &token, &mode, 90).await;
    submit(&client, &address, &token, &mode, 30).await;
    submit(&client, &address, &token, &mode, 90).await;

    let rows = board(&client, &address, &mode).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["score"], 90);
    assert_eq!(rows[0]["rank"], 1);

    let history: Vec<Value> = client
        .get(format!("{}/api/games/history", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history.len(), 3);
    // Newest first
    assert_eq!(history[0]["score"], 90);
    assert_eq!(history[1]["score"], 30);
}

#[tokio::test]
async fn played_session_is_submitted_and_ranked() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let mode = nba_quick_trivia(&client, &address).await;
    let token = register_and_login(&client, &address, "dave").await;

    let questions: Vec<Question> = client
        .get(format!("{}/api/questions/gamemode/{}", address, mode.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Play the session: pick the correct option of every question
    let mut session = QuizSession::start(GameModeConfig::from(&mode), questions).unwrap();
    let summary = loop {
        let correct = session
            .current_question()
            .and_then(|q| q.options.iter().position(|o| o.is_correct))
            .unwrap();
        session.apply(SessionEvent::Select { option: correct, elapsed_secs: 4 });
        if let Outcome::Completed(summary) = session.apply(SessionEvent::Advance) {
            break summary;
        }
    };
    assert_eq!(summary.correct_answers, summary.total_questions);

    let response = client
        .post(format!("{}/api/games/submit", address))
        .bearer_auth(&token)
        .json(&summary.clone().into_submission(mode.sport_id, mode.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let history: Value = response.json().await.unwrap();
    assert_eq!(history["score"], i64::from(summary.score));
    assert_eq!(history["answers"][0]["isCorrect"], true);

    let global: Vec<Value> = client
        .get(format!("{}/api/leaderboard", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(global.len(), 1);
    assert_eq!(global[0]["user"]["name"], "dave");
    assert_eq!(global[0]["sport"]["name"], "NBA");
}
