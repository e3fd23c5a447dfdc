// src/session/machine.rs

use serde::Serialize;
use thiserror::Error;

use crate::models::{
    game_history::{AnswerRecord, SubmitGameRequest},
    game_mode::GameMode,
    question::Question,
};

/// Questions played per session, at most.
pub const MAX_QUESTIONS: usize = 10;

/// Settings a session runs under. Fixed once the session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameModeConfig {
    pub game_mode_id: i64,
    pub sport_id: i64,
    pub name: String,
    /// Seconds per question. 0 disables the countdown.
    pub time_limit: u32,
    pub points_per_correct_answer: u32,
}

impl From<&GameMode> for GameModeConfig {
    fn from(mode: &GameMode) -> Self {
        Self {
            game_mode_id: mode.id,
            sport_id: mode.sport_id,
            name: mode.name.clone(),
            time_limit: u32::try_from(mode.time_limit).unwrap_or(0),
            points_per_correct_answer: u32::try_from(mode.points_per_correct_answer).unwrap_or(0),
        }
    }
}

/// Result of a finished session, handed to the caller once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub score: u32,
    pub correct_answers: u32,
    pub total_questions: u32,
    /// Sum of the per-answer times, not wall-clock duration.
    pub time_spent: u32,
    pub answers: Vec<AnswerRecord>,
}

impl SessionSummary {
    /// Shapes the summary as a submission for the given sport and game mode.
    pub fn into_submission(self, sport_id: i64, game_mode_id: i64) -> SubmitGameRequest {
        SubmitGameRequest {
            sport: Some(sport_id),
            game_mode: Some(game_mode_id),
            score: i64::from(self.score),
            correct_answers: i64::from(self.correct_answers),
            total_questions: i64::from(self.total_questions),
            time_spent: i64::from(self.time_spent),
            completed: true,
            answers: self.answers,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no questions available")]
    NoQuestions,
    #[error("question {id} must have options with exactly one correct")]
    InvalidQuestion { id: i64 },
    #[error("session abandoned before completion")]
    Abandoned,
}

/// Where the session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Question `index` is open. `remaining` is `None` for untimed modes.
    AwaitingAnswer { index: usize, remaining: Option<u32> },
    /// Question `index` has an answer and its feedback is showing.
    Resolved { index: usize },
    /// Terminal.
    Completed,
}

/// Inputs the session reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The player picked option `option` of the current question.
    /// `elapsed_secs` is only read when the mode is untimed.
    Select { option: usize, elapsed_secs: u32 },
    /// One second of countdown passed.
    Tick,
    /// The player moved on from the feedback.
    Advance,
}

/// How a question got its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Selected { option: usize, time_to_answer: u32 },
    TimedOut { time_to_answer: u32 },
}

/// What applying an event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not valid in the current state; nothing changed.
    Ignored,
    Ticked { remaining: u32 },
    Resolved(AnswerRecord),
    NextQuestion { index: usize },
    Completed(SessionSummary),
}

/// Computes the next state for `event`, or `None` if the event does not apply.
///
/// `last_index` is the index of the final question and `time_limit` the
/// per-question limit (0 when untimed).
pub fn transition(
    state: SessionState,
    event: SessionEvent,
    last_index: usize,
    time_limit: u32,
) -> Option<(SessionState, Option<Resolution>)> {
    match (state, event) {
        (SessionState::AwaitingAnswer { index, remaining }, SessionEvent::Select { option, elapsed_secs }) => {
            let time_to_answer = match remaining {
                Some(left) => time_limit.saturating_sub(left),
                None => elapsed_secs,
            };
            Some((
                SessionState::Resolved { index },
                Some(Resolution::Selected {
                    option,
                    time_to_answer,
                }),
            ))
        }
        (SessionState::AwaitingAnswer { index, remaining: Some(left) }, SessionEvent::Tick) => {
            let left = left.saturating_sub(1);
            if left == 0 {
                Some((
                    SessionState::Resolved { index },
                    Some(Resolution::TimedOut {
                        time_to_answer: time_limit,
                    }),
                ))
            } else {
                Some((
                    SessionState::AwaitingAnswer {
                        index,
                        remaining: Some(left),
                    },
                    None,
                ))
            }
        }
        (SessionState::Resolved { index }, SessionEvent::Advance) => {
            if index >= last_index {
                Some((SessionState::Completed, None))
            } else {
                let remaining = (time_limit > 0).then_some(time_limit);
                Some((
                    SessionState::AwaitingAnswer {
                        index: index + 1,
                        remaining,
                    },
                    None,
                ))
            }
        }
        _ => None,
    }
}

/// One play-through of up to [`MAX_QUESTIONS`] questions.
#[derive(Debug, Clone)]
pub struct QuizSession {
    config: GameModeConfig,
    questions: Vec<Question>,
    state: SessionState,
    answers: Vec<AnswerRecord>,
    score: u32,
}

impl QuizSession {
    /// Starts a session on the first question.
    ///
    /// Only the first [`MAX_QUESTIONS`] questions are kept.
    pub fn start(config: GameModeConfig, mut questions: Vec<Question>) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }
        questions.truncate(MAX_QUESTIONS);
        if let Some(bad) = questions.iter().find(|q| q.correct_option().is_none()) {
            return Err(SessionError::InvalidQuestion { id: bad.id });
        }

        let remaining = (config.time_limit > 0).then_some(config.time_limit);
        Ok(Self {
            config,
            questions,
            state: SessionState::AwaitingAnswer {
                index: 0,
                remaining,
            },
            answers: Vec::new(),
            score: 0,
        })
    }

    pub fn config(&self) -> &GameModeConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_timed(&self) -> bool {
        self.config.time_limit > 0
    }

    /// Number of questions this session plays.
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    /// The question being asked or reviewed. `None` once completed.
    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            SessionState::AwaitingAnswer { index, .. } | SessionState::Resolved { index } => {
                self.questions.get(index)
            }
            SessionState::Completed => None,
        }
    }

    /// Applies one event. Events that do not fit the current state are ignored.
    pub fn apply(&mut self, event: SessionEvent) -> Outcome {
        if let SessionEvent::Select { option, .. } = event {
            let in_range = self
                .current_question()
                .is_some_and(|q| option < q.options.len());
            if !in_range {
                return Outcome::Ignored;
            }
        }

        let last_index = self.questions.len() - 1;
        let Some((next, resolution)) =
            transition(self.state, event, last_index, self.config.time_limit)
        else {
            return Outcome::Ignored;
        };

        let previous = self.state;
        self.state = next;

        if let (Some(resolution), SessionState::AwaitingAnswer { index, .. }) = (resolution, previous) {
            return Outcome::Resolved(self.record(index, resolution));
        }

        match next {
            SessionState::AwaitingAnswer { index, remaining } => match previous {
                SessionState::Resolved { .. } => Outcome::NextQuestion { index },
                _ => Outcome::Ticked {
                    remaining: remaining.unwrap_or(0),
                },
            },
            SessionState::Completed => Outcome::Completed(self.summary()),
            SessionState::Resolved { .. } => Outcome::Ignored,
        }
    }

    fn record(&mut self, index: usize, resolution: Resolution) -> AnswerRecord {
        let question = &self.questions[index];

        let record = match resolution {
            Resolution::Selected {
                option,
                time_to_answer,
            } => {
                let chosen = &question.options[option];
                AnswerRecord {
                    question_id: question.id,
                    user_answer: Some(chosen.text.clone()),
                    is_correct: chosen.is_correct,
                    time_to_answer,
                }
            }
            Resolution::TimedOut { time_to_answer } => AnswerRecord {
                question_id: question.id,
                user_answer: None,
                is_correct: false,
                time_to_answer,
            },
        };

        if record.is_correct {
            self.score += self.config.points_per_correct_answer;
        }
        tracing::debug!(
            question = record.question_id,
            correct = record.is_correct,
            time = record.time_to_answer,
            "question resolved"
        );
        self.answers.push(record.clone());
        record
    }

    fn summary(&self) -> SessionSummary {
        SessionSummary {
            score: self.score,
            correct_answers: self.answers.iter().filter(|a| a.is_correct).count() as u32,
            total_questions: self.questions.len() as u32,
            time_spent: self.answers.iter().map(|a| a.time_to_answer).sum(),
            answers: self.answers.clone(),
        }
    }
}
