use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use rand::SeedableRng;
use rand::rngs::StdRng;

use dino_core::model::{GameType, SessionId, Tier};
use storage::repository::{GameSummaryRepository, ProfileRepository};

use super::game::{Answer, AnswerOutcome, Continuation, GameSession};
use crate::Clock;
use crate::error::SessionError;
use crate::profile_store::ProfileStore;
use crate::sound::{SoundEffect, SoundEffects};

/// Orchestrates game sessions: question flow, sounds, rewards and persistence.
#[derive(Clone)]
pub struct GameLoopService {
    clock: Clock,
    profiles: Arc<dyn ProfileRepository>,
    summaries: Arc<dyn GameSummaryRepository>,
    sound: Arc<dyn SoundEffects>,
    rng: Arc<Mutex<StdRng>>,
    next_session_id: Arc<AtomicU64>,
}

impl GameLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        profiles: Arc<dyn ProfileRepository>,
        summaries: Arc<dyn GameSummaryRepository>,
        sound: Arc<dyn SoundEffects>,
    ) -> Self {
        Self {
            clock,
            profiles,
            summaries,
            sound,
            rng: Arc::new(Mutex::new(StdRng::from_os_rng())),
            next_session_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Replace the random source with a seeded one for reproducible sessions.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Arc::new(Mutex::new(StdRng::seed_from_u64(seed)));
        self
    }

    fn next_id(&self) -> SessionId {
        SessionId::new(self.next_session_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Start a new session for `game` at `tier`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the profile cannot be read.
    pub async fn start_session(
        &self,
        game: GameType,
        tier: Tier,
    ) -> Result<GameSession, SessionError> {
        let store = ProfileStore::new(self.profiles.get_profile().await?);
        let id = self.next_id();
        let session = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            GameSession::start(
                id,
                game,
                tier,
                store.high_score(game),
                self.clock.now(),
                &mut *rng,
            )
        };
        self.sound.play(SoundEffect::Click);
        tracing::info!(session = %id, game = game.as_str(), tier = tier.as_str(), "session started");
        Ok(session)
    }

    /// Start over with the same game and tier.
    ///
    /// The new session gets a fresh id, so continuations handed out by the
    /// old one are rejected.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the profile cannot be read.
    pub async fn restart(&self, session: &GameSession) -> Result<GameSession, SessionError> {
        self.start_session(session.game(), session.tier()).await
    }

    /// Record `answer` and, when it ends the session, apply the reward and
    /// persist the results.
    ///
    /// # Errors
    ///
    /// Returns the `GameSession::answer` errors, or `SessionError::Storage`
    /// if the results cannot be persisted.
    pub async fn answer(
        &self,
        session: &mut GameSession,
        answer: Answer,
    ) -> Result<AnswerOutcome, SessionError> {
        let mut outcome = session.answer(answer, self.clock.now())?;
        self.sound.play(if outcome.is_correct {
            SoundEffect::Correct
        } else {
            SoundEffect::Wrong
        });
        tracing::debug!(
            session = %session.id(),
            question = session.question_index(),
            correct = outcome.is_correct,
            score = outcome.state.current_score(),
            lives = outcome.state.lives(),
            "answer recorded"
        );

        if outcome.is_final() {
            outcome.summary_id = Some(self.finalize(session).await?);
            outcome.reward = session.reward().cloned();
        }
        Ok(outcome)
    }

    /// Move on to the next question after the feedback delay.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::StaleContinuation` for a token from another
    /// session or an already consumed question.
    pub fn advance(
        &self,
        session: &mut GameSession,
        token: Continuation,
    ) -> Result<(), SessionError> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        match session.advance(token, &mut *rng) {
            Ok(_) => Ok(()),
            Err(err) => {
                tracing::warn!(
                    session = %session.id(),
                    token_session = %token.session_id(),
                    token_question = token.question_index(),
                    "continuation rejected"
                );
                Err(err)
            }
        }
    }

    /// Pause or resume; returns whether the session is now paused.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after the session ended.
    pub fn toggle_pause(&self, session: &mut GameSession) -> Result<bool, SessionError> {
        let paused = session.toggle_pause()?;
        self.sound.play(SoundEffect::Click);
        Ok(paused)
    }

    /// Apply the reward to the stored profile and append the summary.
    ///
    /// Safe to call again after a failed write: the reward is applied once
    /// and the summary appended once.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFinished` while the session is running, or
    /// `SessionError::Storage` if persistence fails.
    pub async fn finalize(&self, session: &mut GameSession) -> Result<i64, SessionError> {
        if !session.is_complete() {
            return Err(SessionError::NotFinished);
        }

        if session.reward().is_none() {
            let mut store = ProfileStore::new(self.profiles.get_profile().await?);
            let reward = store.apply_session_reward(
                session.game(),
                session.tier(),
                session.state().current_score(),
            );
            if let Some(profile) = store.profile() {
                self.profiles.save_profile(profile).await?;
            }
            if !reward.stars.is_zero() {
                self.sound.play(SoundEffect::Achievement);
            }
            tracing::info!(
                session = %session.id(),
                score = reward.final_score,
                stars = reward.stars.value(),
                new_high_score = reward.new_high_score,
                unlocked = reward.unlocked.len(),
                "reward applied"
            );
            session.record_reward(reward)?;
        }

        if let Some(id) = session.summary_id() {
            return Ok(id);
        }
        let summary = session.build_summary()?;
        let id = self.summaries.append_summary(&summary).await?;
        session.set_summary_id(id);
        tracing::info!(session = %session.id(), summary_id = id, "session summary stored");
        Ok(id)
    }
}
