use chrono::{DateTime, Utc};
use std::sync::Arc;

use dino_core::model::{EndReason, GameSummary, GameType, Tier};
use storage::repository::{GameSummaryRepository, GameSummaryRow};

use crate::error::SessionError;

/// Storage identifier for a persisted game summary.
pub type GameSummaryId = i64;

/// Presentation-agnostic list item for one finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummaryListItem {
    pub id: GameSummaryId,
    pub game: GameType,
    pub tier: Tier,
    pub completed_at: DateTime<Utc>,

    pub final_score: u32,
    pub correct: u32,
    pub wrong: u32,
    pub stars: u8,
    pub ended_by: EndReason,
}

impl GameSummaryListItem {
    #[must_use]
    pub fn from_row(row: &GameSummaryRow) -> Self {
        Self::from_summary(row.id, &row.summary)
    }

    #[must_use]
    pub fn from_summary(id: GameSummaryId, summary: &GameSummary) -> Self {
        Self {
            id,
            game: summary.game(),
            tier: summary.tier(),
            completed_at: summary.completed_at(),
            final_score: summary.final_score(),
            correct: summary.correct(),
            wrong: summary.wrong(),
            stars: summary.stars().value(),
            ended_by: summary.ended_by(),
        }
    }
}

/// Read side of finished sessions for the parent dashboard.
#[derive(Clone)]
pub struct SessionHistoryService {
    summaries: Arc<dyn GameSummaryRepository>,
}

impl SessionHistoryService {
    #[must_use]
    pub fn new(summaries: Arc<dyn GameSummaryRepository>) -> Self {
        Self { summaries }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(storage::repository::InMemoryRepository::new()))
    }

    /// Newest sessions first, optionally for one game only.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on repository failures.
    pub async fn list_recent(
        &self,
        game: Option<GameType>,
        limit: u32,
    ) -> Result<Vec<GameSummaryListItem>, SessionError> {
        let rows = self.summaries.list_summaries(game, limit).await?;
        Ok(rows.iter().map(GameSummaryListItem::from_row).collect())
    }

    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the summary is missing or cannot be read.
    pub async fn get_summary(&self, id: GameSummaryId) -> Result<GameSummary, SessionError> {
        Ok(self.summaries.get_summary(id).await?)
    }
}
