// src/models/mod.rs

pub mod achievement;
pub mod game_history;
pub mod game_mode;
pub mod leaderboard;
pub mod question;
pub mod sport;
pub mod user;

/// Validates that a string is a correctly formatted URL.
pub(crate) fn validate_url_string(url: &str) -> Result<(), validator::ValidationError> {
    if url::Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}
