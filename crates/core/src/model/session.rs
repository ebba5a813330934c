use serde::{Deserialize, Serialize};

use crate::model::tier::Tier;
use crate::rules::{SESSION_LENGTH, STARTING_LIVES};

/// Partial update for [`SessionState::apply`]. `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStatePatch {
    pub current_score: Option<u32>,
    pub high_score: Option<u32>,
    pub lives: Option<u8>,
    pub correct_count: Option<u32>,
    pub wrong_count: Option<u32>,
    pub tier: Option<Tier>,
    pub is_over: Option<bool>,
    pub is_paused: Option<bool>,
}

impl SessionStatePatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn tier(tier: Tier) -> Self {
        Self {
            tier: Some(tier),
            ..Self::default()
        }
    }
}

/// Score, lives and flags of one play session.
///
/// Every operation returns the next state and leaves `self` untouched, so the
/// owner decides when a new state becomes current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    current_score: u32,
    high_score: u32,
    lives: u8,
    correct_count: u32,
    wrong_count: u32,
    tier: Tier,
    is_over: bool,
    is_paused: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            current_score: 0,
            high_score: 0,
            lives: STARTING_LIVES,
            correct_count: 0,
            wrong_count: 0,
            tier: Tier::Beginner,
            is_over: false,
            is_paused: false,
        }
    }
}

impl SessionState {
    /// Initial state for a session at `tier`.
    #[must_use]
    pub fn new(tier: Tier) -> Self {
        Self::default().apply(SessionStatePatch::tier(tier))
    }

    /// Back to the initial values, tier included.
    #[must_use]
    pub fn reset(self) -> Self {
        Self::default()
    }

    /// Shallow merge of `patch` over the current state.
    ///
    /// Lives are clamped to the starting maximum and the high score never
    /// drops below the current score.
    #[must_use]
    pub fn apply(self, patch: SessionStatePatch) -> Self {
        let current_score = patch.current_score.unwrap_or(self.current_score);
        let high_score = patch.high_score.unwrap_or(self.high_score).max(current_score);
        Self {
            current_score,
            high_score,
            lives: patch.lives.unwrap_or(self.lives).min(STARTING_LIVES),
            correct_count: patch.correct_count.unwrap_or(self.correct_count),
            wrong_count: patch.wrong_count.unwrap_or(self.wrong_count),
            tier: patch.tier.unwrap_or(self.tier),
            is_over: patch.is_over.unwrap_or(self.is_over),
            is_paused: patch.is_paused.unwrap_or(self.is_paused),
        }
    }

    /// Records a correct answer worth `points`.
    #[must_use]
    pub fn increment_score(self, points: u32) -> Self {
        let current_score = self.current_score.saturating_add(points);
        Self {
            current_score,
            high_score: self.high_score.max(current_score),
            correct_count: self.correct_count.saturating_add(1),
            ..self
        }
    }

    /// Records a wrong answer. Reaching zero lives ends the session.
    ///
    /// Lives saturate at zero if called on an exhausted state.
    #[must_use]
    pub fn decrement_lives(self) -> Self {
        let lives = self.lives.saturating_sub(1);
        Self {
            lives,
            is_over: self.is_over || lives == 0,
            wrong_count: self.wrong_count.saturating_add(1),
            ..self
        }
    }

    #[must_use]
    pub fn toggle_pause(self) -> Self {
        Self {
            is_paused: !self.is_paused,
            ..self
        }
    }

    /// Marks the session as over without touching the counters.
    #[must_use]
    pub fn finish(self) -> Self {
        Self {
            is_over: true,
            ..self
        }
    }

    #[must_use]
    pub fn current_score(&self) -> u32 {
        self.current_score
    }

    #[must_use]
    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    #[must_use]
    pub fn lives(&self) -> u8 {
        self.lives
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn wrong_count(&self) -> u32 {
        self.wrong_count
    }

    #[must_use]
    pub fn tier(&self) -> Tier {
        self.tier
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.is_over
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    /// Questions answered so far, correct or not.
    #[must_use]
    pub fn answered(&self) -> u32 {
        self.correct_count.saturating_add(self.wrong_count)
    }

    /// True once lives ran out or the full question set was answered.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.is_over || self.lives == 0 || self.answered() >= SESSION_LENGTH
    }
}
