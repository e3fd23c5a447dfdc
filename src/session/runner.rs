// src/session/runner.rs

use std::time::Duration;

use tokio::{
    sync::mpsc,
    time::{self, Instant, Interval},
};

use super::machine::{Outcome, QuizSession, SessionError, SessionEvent, SessionState, SessionSummary};

const SECOND: Duration = Duration::from_secs(1);

/// Something the player did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    /// Pick option `n` of the current question.
    Select(usize),
    /// Leave the feedback screen.
    Advance,
}

/// Drives `session` to completion from the player's actions, counting down
/// each timed question once per second.
///
/// `on_complete` runs exactly once, with the summary, when the last question
/// is advanced past. If `actions` closes first the session is dropped and
/// `SessionError::Abandoned` is returned without calling `on_complete`.
pub async fn run_session<F>(
    mut session: QuizSession,
    mut actions: mpsc::Receiver<PlayerAction>,
    on_complete: F,
) -> Result<(), SessionError>
where
    F: FnOnce(SessionSummary),
{
    loop {
        match session.state() {
            SessionState::AwaitingAnswer { .. } => {
                await_answer(&mut session, &mut actions).await?;
            }
            SessionState::Resolved { .. } => {
                let Some(action) = actions.recv().await else {
                    tracing::debug!("session abandoned during feedback");
                    return Err(SessionError::Abandoned);
                };
                if action != PlayerAction::Advance {
                    continue;
                }
                if let Outcome::Completed(summary) = session.apply(SessionEvent::Advance) {
                    tracing::info!(
                        score = summary.score,
                        correct = summary.correct_answers,
                        total = summary.total_questions,
                        "session completed"
                    );
                    on_complete(summary);
                    return Ok(());
                }
            }
            SessionState::Completed => return Ok(()),
        }
    }
}

/// Waits until the current question is resolved, by selection or timeout.
///
/// The countdown lives in this scope, so it is released on every return.
async fn await_answer(
    session: &mut QuizSession,
    actions: &mut mpsc::Receiver<PlayerAction>,
) -> Result<(), SessionError> {
    let started = Instant::now();
    let mut countdown = session
        .is_timed()
        .then(|| time::interval_at(started + SECOND, SECOND));

    loop {
        let outcome = tokio::select! {
            action = actions.recv() => match action {
                Some(PlayerAction::Select(option)) => {
                    let elapsed_secs = u32::try_from(started.elapsed().as_secs()).unwrap_or(u32::MAX);
                    session.apply(SessionEvent::Select { option, elapsed_secs })
                }
                Some(PlayerAction::Advance) => Outcome::Ignored,
                None => {
                    tracing::debug!("session abandoned while awaiting an answer");
                    return Err(SessionError::Abandoned);
                }
            },
            _ = next_tick(&mut countdown) => session.apply(SessionEvent::Tick),
        };

        if let Outcome::Resolved(_) = outcome {
            return Ok(());
        }
    }
}

async fn next_tick(countdown: &mut Option<Interval>) {
    match countdown {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::session::machine::tests::{config, question};

    type Captured = Arc<Mutex<Vec<SessionSummary>>>;

    fn spawn(
        session: QuizSession,
    ) -> (
        mpsc::Sender<PlayerAction>,
        Captured,
        tokio::task::JoinHandle<Result<(), SessionError>>,
    ) {
        let (tx, rx) = mpsc::channel(8);
        let captured: Captured = Arc::default();
        let sink = captured.clone();
        let handle = tokio::spawn(run_session(session, rx, move |summary| {
            sink.lock().unwrap().push(summary);
        }));
        (tx, captured, handle)
    }

    #[tokio::test(start_paused = true)]
    async fn test_answer_then_timeout_with_real_countdown() {
        let questions = vec![
            question(1, &["A", "B", "C"], "B"),
            question(2, &["A", "B", "C"], "A"),
        ];
        let session = QuizSession::start(config(10, 10), questions).unwrap();
        let (tx, captured, handle) = spawn(session);

        time::sleep(Duration::from_millis(3500)).await;
        tx.send(PlayerAction::Select(1)).await.unwrap();
        // Double click on the same question.
        tx.send(PlayerAction::Select(1)).await.unwrap();
        tx.send(PlayerAction::Advance).await.unwrap();

        // Let the second question run out.
        time::sleep(Duration::from_secs(11)).await;
        tx.send(PlayerAction::Advance).await.unwrap();
        tx.send(PlayerAction::Advance).await.ok();

        handle.await.unwrap().unwrap();

        let summaries = captured.lock().unwrap();
        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.score, 10);
        assert_eq!(summary.correct_answers, 1);
        assert_eq!(summary.total_questions, 2);
        assert_eq!(summary.time_spent, 13);
        assert_eq!(summary.answers[0].time_to_answer, 3);
        assert_eq!(summary.answers[1].user_answer, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_untimed_question_waits_for_selection() {
        let session =
            QuizSession::start(config(0, 10), vec![question(1, &["A", "B"], "A")]).unwrap();
        let (tx, captured, handle) = spawn(session);

        time::sleep(Duration::from_secs(120)).await;
        assert!(captured.lock().unwrap().is_empty());

        tx.send(PlayerAction::Select(0)).await.unwrap();
        tx.send(PlayerAction::Advance).await.unwrap();
        handle.await.unwrap().unwrap();

        let summaries = captured.lock().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].answers[0].time_to_answer, 120);
        assert!(summaries[0].answers[0].is_correct);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_actions_abandons_session() {
        let session =
            QuizSession::start(config(30, 10), vec![question(1, &["A", "B"], "A")]).unwrap();
        let (tx, captured, handle) = spawn(session);

        time::sleep(Duration::from_secs(5)).await;
        drop(tx);

        assert_eq!(handle.await.unwrap(), Err(SessionError::Abandoned));
        assert!(captured.lock().unwrap().is_empty());
    }
}
