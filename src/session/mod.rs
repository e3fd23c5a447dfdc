// src/session/mod.rs

//! Client-side quiz flow: a state machine over the question list plus an
//! async runner that owns the per-question countdown.

pub mod machine;
pub mod runner;

pub use machine::{
    GameModeConfig, MAX_QUESTIONS, Outcome, QuizSession, SessionError, SessionEvent, SessionState,
    SessionSummary,
};
pub use runner::{PlayerAction, run_session};
