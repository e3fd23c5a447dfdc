// tests/api_tests.rs

use std::sync::Arc;

use serde_json::Value;
use sports_arena::{
    config::Config,
    routes,
    services::seed::{seed_admin_user, seed_sample_data},
    state::AppState,
    store::MemoryStore,
};

const ADMIN_USERNAME: &str = "arena_admin";
const ADMIN_PASSWORD: &str = "admin_password";

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    // 1. In-process store with the sample catalogue and an admin account
    let store = Arc::new(MemoryStore::new());
    seed_sample_data(store.as_ref())
        .await
        .expect("Failed to seed sample data");
    seed_admin_user(store.as_ref(), ADMIN_USERNAME, ADMIN_PASSWORD)
        .await
        .expect("Failed to seed admin user");

    // 2. Create test configuration and state
    let config = Config {
        database_url: None,
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        port: 0,
        admin_username: None,
        admin_password: None,
        seed_sample_data: false,
    };

    let state = AppState::new(store, config);

    // 3. Create the router with the app state
    let app = routes::create_router(state);

    // 4. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 5. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

async fn login(client: &reqwest::Client, address: &str, username: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/api/users/login", address))
        .json(&serde_json::json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to login");
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

async fn register_and_login(client: &reqwest::Client, address: &str) -> String {
    let username = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    register_and_login_as(client, address, &username).await
}

async fn register_and_login_as(client: &reqwest::Client, address: &str, username: &str) -> String {
    client
        .post(format!("{}/api/users/register", address))
        .json(&serde_json::json!({ "username": username, "password": "password123" }))
        .send()
        .await
        .expect("Failed to register");

    login(client, address, username, "password123").await
}

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_works() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let unique_name = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);

    // Act
    let response = client
        .post(format!("{}/api/users/register", address))
        .json(&serde_json::json!({
            "username": unique_name,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["username"], unique_name.as_str());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn register_fails_validation() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act: Send a username that is too short
    let response = client
        .post(format!("{}/api/users/register", address))
        .json(&serde_json::json!({
            "username": "yo",
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn register_duplicate_is_conflict() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let body = serde_json::json!({ "username": "duplicate", "password": "password123" });

    let first = client
        .post(format!("{}/api/users/register", address))
        .json(&body)
        .send()
        .await
        .unwrap();
    let second = client
        .post(format!("{}/api/users/register", address))
        .json(&body)
        .send()
        .await
        .unwrap();

    assert_eq!(first.status().as_u16(), 201);
    assert_eq!(second.status().as_u16(), 409);
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/users/login", address))
        .json(&serde_json::json!({ "username": ADMIN_USERNAME, "password": "nope" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn catalogue_is_browsable() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Sports are listed by name
    let sports: Vec<Value> = client
        .get(format!("{}/api/sports", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = sports.iter().map(|s| s["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["MLB", "NBA", "NFL"]);

    let nba_id = sports[1]["id"].as_i64().unwrap();

    // Detail embeds the game modes
    let detail: Value = client
        .get(format!("{}/api/sports/{}", address, nba_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["name"], "NBA");
    let mode_id = detail["gameModes"][0]["id"].as_i64().unwrap();

    let questions: Vec<Value> = client
        .get(format!("{}/api/questions/gamemode/{}", address, mode_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0]["options"].as_array().unwrap().len(), 4);

    // Unknown ids
    let missing = client
        .get(format!("{}/api/questions/gamemode/999999", address))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn admin_routes_reject_regular_users() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &address).await;

    let response = client
        .post(format!("{}/api/admin/sports", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "name": "NHL", "description": "Hockey" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn admin_can_manage_catalogue() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = login(&client, &address, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    // Sport
    let sport: Value = client
        .post(format!("{}/api/admin/sports", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "name": "NHL", "description": "Hockey" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let sport_id = sport["id"].as_i64().unwrap();

    // Game mode
    let mode: Value = client
        .post(format!("{}/api/admin/gamemodes", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "sportId": sport_id,
            "name": "Sudden Death",
            "description": "One wrong answer ends it",
            "timeLimit": 10,
            "pointsPerCorrectAnswer": 20
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let mode_id = mode["id"].as_i64().unwrap();
    assert_eq!(mode["timeLimit"], 10);

    // Question with two correct options is rejected
    let invalid = client
        .post(format!("{}/api/admin/questions", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "sportId": sport_id,
            "gameModeId": mode_id,
            "text": "Which team won the 2023 Stanley Cup?",
            "options": [
                { "text": "Vegas Golden Knights", "isCorrect": true },
                { "text": "Florida Panthers", "isCorrect": true }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(invalid.status().as_u16(), 400);

    let created = client
        .post(format!("{}/api/admin/questions", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "sportId": sport_id,
            "gameModeId": mode_id,
            "text": "Which team won the 2023 Stanley Cup?",
            "options": [
                { "text": "Vegas Golden Knights", "isCorrect": true },
                { "text": "Florida Panthers<script>alert(1)</script>", "isCorrect": false }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status().as_u16(), 201);
    let question: Value = created.json().await.unwrap();
    // Option texts are sanitized like the prompt
    assert_eq!(question["options"][1]["text"], "Florida Panthers");
    let question_id = question["id"].as_i64().unwrap();

    let deleted = client
        .delete(format!("{}/api/admin/questions/{}", address, question_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 204);

    let gone = client
        .get(format!("{}/api/questions/{}", address, question_id))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status().as_u16(), 404);
}

#[tokio::test]
async fn profile_resolves_favorite_sports() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login_as(&client, &address, "fan_of_hoops").await;

    let sports: Vec<Value> = client
        .get(format!("{}/api/sports", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let nba_id = sports[1]["id"].as_i64().unwrap();
    let mlb_id = sports[0]["id"].as_i64().unwrap();

    // Fresh accounts start empty
    let profile: Value = client
        .get(format!("{}/api/users/profile", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile["username"], "fan_of_hoops");
    assert_eq!(profile["favoriteSports"].as_array().unwrap().len(), 0);
    assert_eq!(profile["achievements"].as_array().unwrap().len(), 0);

    // Unknown ids are stored but skipped when resolved; duplicates collapse
    let updated = client
        .put(format!("{}/api/users/profile", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "favoriteSports": [nba_id, 999999, nba_id, mlb_id] }))
        .send()
        .await
        .unwrap();
    assert_eq!(updated.status().as_u16(), 200);
    let body: Value = updated.json().await.unwrap();
    assert_eq!(body["favoriteSports"], serde_json::json!([nba_id, 999999, mlb_id]));
    assert!(body["token"].as_str().is_some());

    let profile: Value = client
        .get(format!("{}/api/users/profile", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = profile["favoriteSports"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["NBA", "MLB"]);
}

#[tokio::test]
async fn profile_update_changes_credentials() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login_as(&client, &address, "old_name").await;
    register_and_login_as(&client, &address, "taken_name").await;

    let conflict = client
        .put(format!("{}/api/users/profile", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "username": "taken_name" }))
        .send()
        .await
        .unwrap();
    assert_eq!(conflict.status().as_u16(), 409);

    let too_short = client
        .put(format!("{}/api/users/profile", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "password": "abc" }))
        .send()
        .await
        .unwrap();
    assert_eq!(too_short.status().as_u16(), 400);

    let renamed = client
        .put(format!("{}/api/users/profile", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "username": "new_name", "password": "new_password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(renamed.status().as_u16(), 200);
    let body: Value = renamed.json().await.unwrap();
    assert_eq!(body["username"], "new_name");

    // The returned token works and the new credentials log in
    let fresh = body["token"].as_str().unwrap();
    let profile = client
        .get(format!("{}/api/users/profile", address))
        .bearer_auth(fresh)
        .send()
        .await
        .unwrap();
    assert_eq!(profile.status().as_u16(), 200);
    login(&client, &address, "new_name", "new_password").await;
}

#[tokio::test]
async fn granted_achievement_shows_on_profile() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let admin = login(&client, &address, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let registered: Value = client
        .post(format!("{}/api/users/register", address))
        .json(&serde_json::json!({ "username": "rookie", "password": "password123" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let user_id = registered["id"].as_i64().unwrap();
    let token = login(&client, &address, "rookie", "password123").await;

    let created = client
        .post(format!("{}/api/admin/achievements", address))
        .bearer_auth(&admin)
        .json(&serde_json::json!({
            "name": "Sports Rookie",
            "description": "Complete your first game",
            "criteria": "Finish one game",
            "points": 10
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status().as_u16(), 201);
    let achievement: Value = created.json().await.unwrap();
    let achievement_id = achievement["id"].as_i64().unwrap();

    let missing_user = client
        .post(format!(
            "{}/api/admin/users/999999/achievements/{}",
            address, achievement_id
        ))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(missing_user.status().as_u16(), 404);

    for _ in 0..2 {
        let granted = client
            .post(format!(
                "{}/api/admin/users/{}/achievements/{}",
                address, user_id, achievement_id
            ))
            .bearer_auth(&admin)
            .send()
            .await
            .unwrap();
        assert_eq!(granted.status().as_u16(), 204);
    }

    let profile: Value = client
        .get(format!("{}/api/users/profile", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let achievements = profile["achievements"].as_array().unwrap();
    assert_eq!(achievements.len(), 1);
    assert_eq!(achievements[0]["name"], "Sports Rookie");
}
