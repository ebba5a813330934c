use chrono::{DateTime, Utc};
use rand::Rng;
use std::time::Duration;

use dino_core::generator::generate;
use dino_core::model::{
    EndReason, GameSummary, GameType, Question, SessionId, SessionState, SessionStatePatch, Tier,
};
use dino_core::options::synthesize;
use dino_core::rules::SESSION_LENGTH;
use dino_core::scoring::{SessionReward, compute_stars};

use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── ANSWERS ───────────────────────────────────────────────────────────────────
//

/// What the player did with the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// One of the offered options, as displayed.
    Selected(String),
    /// The per-question timer ran out.
    TimedOut,
}

impl Answer {
    #[must_use]
    pub fn selected(text: impl Into<String>) -> Self {
        Answer::Selected(text.into())
    }
}

/// Authorises moving on to the question after `question_index` once the
/// feedback delay is over. Bound to one session and one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Continuation {
    session_id: SessionId,
    question_index: u32,
}

impl Continuation {
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn question_index(&self) -> u32 {
        self.question_index
    }
}

/// Result of recording one answer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub question: Question,
    pub answer: Answer,
    pub is_correct: bool,
    pub points: u32,
    pub state: SessionState,
    /// `None` once the session has ended.
    pub continuation: Option<Continuation>,
    /// Filled by the game loop when this answer ended the session.
    pub reward: Option<SessionReward>,
    pub summary_id: Option<i64>,
}

impl AnswerOutcome {
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.continuation.is_none()
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One play-through of up to ten questions for a single game and tier.
#[derive(Debug, Clone)]
pub struct GameSession {
    id: SessionId,
    game: GameType,
    state: SessionState,
    question: Question,
    options: Vec<String>,
    question_index: u32,
    awaiting_advance: bool,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    reward: Option<SessionReward>,
    summary_id: Option<i64>,
}

impl GameSession {
    /// Fresh session with its first question ready.
    ///
    /// `high_score` seeds the in-session high score from the profile.
    pub fn start<R: Rng + ?Sized>(
        id: SessionId,
        game: GameType,
        tier: Tier,
        high_score: u32,
        started_at: DateTime<Utc>,
        rng: &mut R,
    ) -> Self {
        let state = SessionState::new(tier).apply(SessionStatePatch {
            high_score: Some(high_score),
            ..SessionStatePatch::new()
        });
        let (question, options) = next_question(tier, rng);
        Self {
            id,
            game,
            state,
            question,
            options,
            question_index: 0,
            awaiting_advance: false,
            started_at,
            completed_at: None,
            reward: None,
            summary_id: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn game(&self) -> GameType {
        self.game
    }

    #[must_use]
    pub fn tier(&self) -> Tier {
        self.state.tier()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn question(&self) -> &Question {
        &self.question
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Zero-based index of the question on screen.
    #[must_use]
    pub fn question_index(&self) -> u32 {
        self.question_index
    }

    /// Time the player has for the current question; `None` means untimed.
    #[must_use]
    pub fn time_limit(&self) -> Option<Duration> {
        self.tier().time_limit()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    #[must_use]
    pub fn reward(&self) -> Option<&SessionReward> {
        self.reward.as_ref()
    }

    #[must_use]
    pub fn summary_id(&self) -> Option<i64> {
        self.summary_id
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let answered = self.state.answered();
        SessionProgress {
            total: SESSION_LENGTH,
            answered,
            remaining: SESSION_LENGTH.saturating_sub(answered),
            score: self.state.current_score(),
            lives: self.state.lives(),
            is_complete: self.is_complete(),
        }
    }

    /// Why the session ended, `None` while it is still running.
    #[must_use]
    pub fn end_reason(&self) -> Option<EndReason> {
        if self.completed_at.is_none() {
            return None;
        }
        if self.state.lives() == 0 {
            Some(EndReason::OutOfLives)
        } else {
            Some(EndReason::Completed)
        }
    }

    /// Record an answer to the current question.
    ///
    /// A timed-out answer always counts as wrong. When the answer ends the
    /// session no continuation is handed out.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after the session ended,
    /// `SessionError::Paused` while paused and `SessionError::AlreadyAnswered`
    /// if the current question is waiting for `advance`.
    pub fn answer(
        &mut self,
        answer: Answer,
        answered_at: DateTime<Utc>,
    ) -> Result<AnswerOutcome, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        if self.state.is_paused() {
            return Err(SessionError::Paused);
        }
        if self.awaiting_advance {
            return Err(SessionError::AlreadyAnswered);
        }

        let is_correct = match &answer {
            Answer::Selected(text) => self.question.is_correct(text.trim()),
            Answer::TimedOut => false,
        };
        let points = if is_correct {
            self.tier().points_per_correct()
        } else {
            0
        };
        self.state = if is_correct {
            self.state.increment_score(points)
        } else {
            self.state.decrement_lives()
        };

        let continuation = if self.state.is_terminal() {
            self.state = self.state.finish();
            self.completed_at = Some(answered_at);
            None
        } else {
            self.awaiting_advance = true;
            Some(Continuation {
                session_id: self.id,
                question_index: self.question_index,
            })
        };

        Ok(AnswerOutcome {
            question: self.question.clone(),
            answer,
            is_correct,
            points,
            state: self.state,
            continuation,
            reward: None,
            summary_id: None,
        })
    }

    /// Show the next question once feedback for the previous one is over.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after the session ended, or
    /// `SessionError::StaleContinuation` when `token` belongs to another
    /// session or to a question that was already moved past.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        token: Continuation,
        rng: &mut R,
    ) -> Result<&Question, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        if token.session_id != self.id
            || token.question_index != self.question_index
            || !self.awaiting_advance
        {
            return Err(SessionError::StaleContinuation);
        }

        let (question, options) = next_question(self.tier(), rng);
        self.question = question;
        self.options = options;
        self.question_index += 1;
        self.awaiting_advance = false;
        Ok(&self.question)
    }

    /// Pause or resume; returns whether the session is now paused.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after the session ended.
    pub fn toggle_pause(&mut self) -> Result<bool, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        self.state = self.state.toggle_pause();
        Ok(self.state.is_paused())
    }

    /// Store the reward computed at the end of the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFinished` while the session is running, or
    /// `SessionError::AlreadyRewarded` on a second call.
    pub fn record_reward(&mut self, reward: SessionReward) -> Result<(), SessionError> {
        if !self.is_complete() {
            return Err(SessionError::NotFinished);
        }
        if self.reward.is_some() {
            return Err(SessionError::AlreadyRewarded);
        }
        self.reward = Some(reward);
        Ok(())
    }

    pub(crate) fn set_summary_id(&mut self, id: i64) {
        self.summary_id = Some(id);
    }

    /// Summary of the finished session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFinished` while the session is running, or
    /// `SessionError::Summary` if the record fails validation.
    pub fn build_summary(&self) -> Result<GameSummary, SessionError> {
        let (Some(completed_at), Some(ended_by)) = (self.completed_at, self.end_reason()) else {
            return Err(SessionError::NotFinished);
        };
        let stars = self.reward.as_ref().map_or_else(
            || compute_stars(self.tier(), self.state.current_score()),
            |r| r.stars,
        );
        Ok(GameSummary::new(
            self.game,
            self.tier(),
            self.state.current_score(),
            self.state.correct_count(),
            self.state.wrong_count(),
            stars,
            ended_by,
            self.started_at,
            completed_at,
        )?)
    }
}

fn next_question<R: Rng + ?Sized>(tier: Tier, rng: &mut R) -> (Question, Vec<String>) {
    let question = generate(tier, rng);
    let options = synthesize(&question, tier, rng);
    (question, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dino_core::model::PlayerProfile;
    use dino_core::scoring::apply_reward;
    use dino_core::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn session(tier: Tier) -> (GameSession, StdRng) {
        let mut rng = StdRng::seed_from_u64(17);
        let session = GameSession::start(
            SessionId::new(1),
            GameType::Math,
            tier,
            0,
            fixed_now(),
            &mut rng,
        );
        (session, rng)
    }

    fn correct(session: &GameSession) -> Answer {
        Answer::Selected(session.question().correct_answer_text())
    }

    fn wrong(session: &GameSession) -> Answer {
        let right = session.question().correct_answer_text();
        let other = session
            .options()
            .iter()
            .find(|o| **o != right)
            .cloned()
            .unwrap();
        Answer::Selected(other)
    }

    #[test]
    fn first_question_is_ready_with_options() {
        let (session, _) = session(Tier::Beginner);
        assert_eq!(session.options().len(), 4);
        assert!(session
            .options()
            .contains(&session.question().correct_answer_text()));
        assert_eq!(session.state().lives(), 3);
        assert_eq!(session.time_limit(), None);
    }

    #[test]
    fn progress_tracks_answers_score_and_lives() {
        let (mut session, mut rng) = session(Tier::Beginner);
        let start = session.progress();
        assert_eq!((start.total, start.answered, start.remaining), (10, 0, 10));

        let outcome = session.answer(correct(&session), fixed_now()).unwrap();
        session
            .advance(outcome.continuation.unwrap(), &mut rng)
            .unwrap();
        session.answer(wrong(&session), fixed_now()).unwrap();

        assert_eq!(
            session.progress(),
            SessionProgress {
                total: 10,
                answered: 2,
                remaining: 8,
                score: 10,
                lives: 2,
                is_complete: false,
            }
        );
    }

    #[test]
    fn ten_correct_answers_complete_the_session() {
        let (mut session, mut rng) = session(Tier::Intermediate);
        for i in 0..10 {
            let outcome = session.answer(correct(&session), fixed_now()).unwrap();
            assert!(outcome.is_correct);
            assert_eq!(outcome.points, 20);
            match outcome.continuation {
                Some(token) => {
                    assert!(i < 9);
                    session.advance(token, &mut rng).unwrap();
                }
                None => assert_eq!(i, 9),
            }
        }
        assert!(session.is_complete());
        assert_eq!(session.state().current_score(), 200);
        assert_eq!(session.end_reason(), Some(EndReason::Completed));
        assert!(matches!(
            session.answer(correct(&session), fixed_now()),
            Err(SessionError::Completed)
        ));
    }

    #[test]
    fn three_wrong_answers_end_the_session() {
        let (mut session, mut rng) = session(Tier::Beginner);
        for _ in 0..2 {
            let outcome = session.answer(wrong(&session), fixed_now()).unwrap();
            assert!(!outcome.is_correct);
            session
                .advance(outcome.continuation.unwrap(), &mut rng)
                .unwrap();
        }
        let outcome = session.answer(Answer::TimedOut, fixed_now()).unwrap();
        assert!(outcome.is_final());
        assert_eq!(outcome.state.lives(), 0);
        assert!(outcome.state.is_over());
        assert_eq!(session.end_reason(), Some(EndReason::OutOfLives));
    }

    #[test]
    fn timed_out_answer_is_wrong() {
        let (mut session, _) = session(Tier::Advanced);
        assert_eq!(session.time_limit(), Some(Duration::from_secs(20)));
        let outcome = session.answer(Answer::TimedOut, fixed_now()).unwrap();
        assert!(!outcome.is_correct);
        assert_eq!(outcome.state.wrong_count(), 1);
        assert_eq!(outcome.state.lives(), 2);
    }

    #[test]
    fn continuation_is_single_use_and_session_bound() {
        let (mut session, mut rng) = session(Tier::Beginner);
        let token = session
            .answer(correct(&session), fixed_now())
            .unwrap()
            .continuation
            .unwrap();
        assert!(matches!(
            session.answer(correct(&session), fixed_now()),
            Err(SessionError::AlreadyAnswered)
        ));

        session.advance(token, &mut rng).unwrap();
        assert_eq!(session.question_index(), 1);
        assert!(matches!(
            session.advance(token, &mut rng),
            Err(SessionError::StaleContinuation)
        ));

        let mut other = GameSession::start(
            SessionId::new(2),
            GameType::Math,
            Tier::Beginner,
            0,
            fixed_now(),
            &mut rng,
        );
        let token = session
            .answer(correct(&session), fixed_now())
            .unwrap()
            .continuation
            .unwrap();
        assert!(matches!(
            other.advance(token, &mut rng),
            Err(SessionError::StaleContinuation)
        ));
    }

    #[test]
    fn paused_session_rejects_answers() {
        let (mut session, _) = session(Tier::Beginner);
        assert!(session.toggle_pause().unwrap());
        assert!(matches!(
            session.answer(correct(&session), fixed_now()),
            Err(SessionError::Paused)
        ));
        assert!(!session.toggle_pause().unwrap());
        assert!(session.answer(correct(&session), fixed_now()).is_ok());
    }

    #[test]
    fn reward_is_recorded_once() {
        let (mut session, _) = session(Tier::Beginner);
        let (_, reward) = apply_reward(PlayerProfile::explorer(), GameType::Math, Tier::Beginner, 0);
        assert!(matches!(
            session.record_reward(reward.clone()),
            Err(SessionError::NotFinished)
        ));

        for _ in 0..3 {
            let outcome = session.answer(Answer::TimedOut, fixed_now()).unwrap();
            if let Some(token) = outcome.continuation {
                session.advance(token, &mut StdRng::seed_from_u64(1)).unwrap();
            }
        }
        session.record_reward(reward.clone()).unwrap();
        assert!(matches!(
            session.record_reward(reward),
            Err(SessionError::AlreadyRewarded)
        ));
    }

    #[test]
    fn summary_reflects_final_state() {
        let (mut session, mut rng) = session(Tier::Beginner);
        assert!(matches!(
            session.build_summary(),
            Err(SessionError::NotFinished)
        ));
        loop {
            let outcome = session.answer(correct(&session), fixed_now()).unwrap();
            let Some(token) = outcome.continuation else {
                break;
            };
            session.advance(token, &mut rng).unwrap();
        }
        let summary = session.build_summary().unwrap();
        assert_eq!(summary.final_score(), 100);
        assert_eq!(summary.correct(), 10);
        assert_eq!(summary.stars().value(), 3);
        assert_eq!(summary.ended_by(), EndReason::Completed);
    }
}
