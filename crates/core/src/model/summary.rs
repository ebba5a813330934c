use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::profile::GameType;
use crate::model::tier::Tier;
use crate::rules::SESSION_LENGTH;
use crate::scoring::Stars;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("answered {answered} questions, a session has at most {max}")]
    TooManyAnswers { answered: u32, max: u32 },

    #[error("star rating {0} is out of range")]
    InvalidStars(u8),

    #[error("unknown end reason: {0}")]
    UnknownEndReason(String),
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// All questions were answered.
    Completed,
    /// Lives reached zero first.
    OutOfLives,
}

impl EndReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EndReason::Completed => "completed",
            EndReason::OutOfLives => "out_of_lives",
        }
    }

    /// # Errors
    ///
    /// Returns `GameSummaryError::UnknownEndReason` for unrecognised values.
    pub fn parse(value: &str) -> Result<Self, GameSummaryError> {
        match value {
            "completed" => Ok(EndReason::Completed),
            "out_of_lives" => Ok(EndReason::OutOfLives),
            other => Err(GameSummaryError::UnknownEndReason(other.to_string())),
        }
    }
}

/// Record of one finished session, kept for the progress history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    game: GameType,
    tier: Tier,
    final_score: u32,
    correct: u32,
    wrong: u32,
    stars: Stars,
    ended_by: EndReason,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl GameSummary {
    /// Build and validate a summary.
    ///
    /// # Errors
    ///
    /// Returns `GameSummaryError::InvalidTimeRange` if `completed_at` precedes
    /// `started_at`, or `TooManyAnswers` if the counts exceed one session.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        game: GameType,
        tier: Tier,
        final_score: u32,
        correct: u32,
        wrong: u32,
        stars: Stars,
        ended_by: EndReason,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, GameSummaryError> {
        if completed_at < started_at {
            return Err(GameSummaryError::InvalidTimeRange);
        }
        let answered = correct.saturating_add(wrong);
        if answered > SESSION_LENGTH {
            return Err(GameSummaryError::TooManyAnswers {
                answered,
                max: SESSION_LENGTH,
            });
        }

        Ok(Self {
            game,
            tier,
            final_score,
            correct,
            wrong,
            stars,
            ended_by,
            started_at,
            completed_at,
        })
    }

    #[must_use]
    pub fn game(&self) -> GameType {
        self.game
    }

    #[must_use]
    pub fn tier(&self) -> Tier {
        self.tier
    }

    #[must_use]
    pub fn final_score(&self) -> u32 {
        self.final_score
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn wrong(&self) -> u32 {
        self.wrong
    }

    #[must_use]
    pub fn stars(&self) -> Stars {
        self.stars
    }

    #[must_use]
    pub fn ended_by(&self) -> EndReason {
        self.ended_by
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn rejects_inverted_time_range() {
        let now = fixed_now();
        let err = GameSummary::new(
            GameType::Math,
            Tier::Beginner,
            10,
            1,
            0,
            Stars::ZERO,
            EndReason::Completed,
            now,
            now - chrono::Duration::seconds(1),
        )
        .unwrap_err();
        assert_eq!(err, GameSummaryError::InvalidTimeRange);
    }

    #[test]
    fn rejects_more_answers_than_a_session_holds() {
        let now = fixed_now();
        let err = GameSummary::new(
            GameType::Math,
            Tier::Beginner,
            100,
            10,
            1,
            Stars::ZERO,
            EndReason::Completed,
            now,
            now,
        )
        .unwrap_err();
        assert!(matches!(err, GameSummaryError::TooManyAnswers { answered: 11, .. }));
    }

    #[test]
    fn end_reason_round_trips_through_text() {
        for reason in [EndReason::Completed, EndReason::OutOfLives] {
            assert_eq!(EndReason::parse(reason.as_str()).unwrap(), reason);
        }
        assert!(EndReason::parse("quit").is_err());
    }
}
