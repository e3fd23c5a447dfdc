// src/services/seed.rs

use crate::{
    models::{
        game_mode::UpsertGameModeRequest,
        question::{CreateQuestionRequest, QuestionOption},
        sport::UpsertSportRequest,
    },
    store::{Scope, StorageResult, Store},
    utils::hash::hash_password,
};

struct SampleSport {
    name: &'static str,
    description: &'static str,
    image_url: &'static str,
    mode: &'static str,
    mode_description: &'static str,
    question: &'static str,
    options: [(&'static str, bool); 4],
    explanation: &'static str,
}

const SAMPLES: [SampleSport; 3] = [
    SampleSport {
        name: "NBA",
        description: "National Basketball Association",
        image_url: "https://cdn.nba.com/logos/nba/nba-logoman-75-word_white.svg",
        mode: "Quick Trivia",
        mode_description: "Answer 10 quick trivia questions",
        question: "Which NBA team has won the most championships?",
        options: [
            ("Los Angeles Lakers", false),
            ("Boston Celtics", true),
            ("Chicago Bulls", false),
            ("Golden State Warriors", false),
        ],
        explanation: "The Boston Celtics have won 17 NBA championships.",
    },
    SampleSport {
        name: "NFL",
        description: "National Football League",
        image_url: "https://static.www.nfl.com/image/upload/v1554321393/league/nvfr7ogywskqrfaiu38m.svg",
        mode: "Championship Challenge",
        mode_description: "Test your knowledge of championships",
        question: "Which NFL team has won the most Super Bowls?",
        options: [
            ("Dallas Cowboys", false),
            ("San Francisco 49ers", false),
            ("New England Patriots", true),
            ("Pittsburgh Steelers", false),
        ],
        explanation: "The New England Patriots have won 6 Super Bowls.",
    },
    SampleSport {
        name: "MLB",
        description: "Major League Baseball",
        image_url: "https://www.mlbstatic.com/team-logos/league-on-dark/1.svg",
        mode: "Stats Master",
        mode_description: "Answer questions about player statistics",
        question: "Which MLB team has won the most World Series?",
        options: [
            ("New York Yankees", true),
            ("St. Louis Cardinals", false),
            ("Boston Red Sox", false),
            ("Los Angeles Dodgers", false),
        ],
        explanation: "The New York Yankees have won 27 World Series championships.",
    },
];

/// Seeds the sample catalogue. Safe to run on every start: sports and game
/// modes are upserted on their natural keys and a question is only added if
/// its game mode has no question with the same text.
pub async fn seed_sample_data(store: &dyn Store) -> StorageResult<()> {
    for sample in &SAMPLES {
        let sport = store
            .upsert_sport(UpsertSportRequest {
                name: sample.name.to_string(),
                description: sample.description.to_string(),
                image_url: Some(sample.image_url.to_string()),
            })
            .await?;

        let mode = store
            .upsert_game_mode(UpsertGameModeRequest {
                sport_id: sport.id,
                name: sample.mode.to_string(),
                description: sample.mode_description.to_string(),
                rules: None,
                time_limit: 30,
                points_per_correct_answer: 10,
            })
            .await?;

        let existing = store.list_questions(Scope::GameMode(mode.id)).await?;
        if existing.iter().any(|q| q.text == sample.question) {
            continue;
        }

        store
            .insert_question(CreateQuestionRequest {
                text: sample.question.to_string(),
                options: sample
                    .options
                    .iter()
                    .map(|(text, is_correct)| QuestionOption {
                        text: text.to_string(),
                        is_correct: *is_correct,
                    })
                    .collect(),
                explanation: Some(sample.explanation.to_string()),
                image_url: None,
                difficulty: "easy".to_string(),
                category: Some("history".to_string()),
                sport_id: sport.id,
                game_mode_id: mode.id,
            })
            .await?;
    }

    tracing::info!("Sample data seeded.");
    Ok(())
}

/// Creates the configured admin account if it does not exist yet.
pub async fn seed_admin_user(
    store: &dyn Store,
    username: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if store.find_user_by_username(username).await?.is_none() {
        tracing::info!("Seeding admin user: {}", username);
        let hashed_password = hash_password(password)?;
        store.insert_user(username, &hashed_password, "admin").await?;
        tracing::info!("Admin user created successfully.");
    }
    Ok(())
}
