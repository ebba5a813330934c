use async_trait::async_trait;
use dino_core::model::{GameSummary, GameType, PlayerProfile, SoundSettings};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A persisted game summary together with its storage id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummaryRow {
    pub id: i64,
    pub summary: GameSummary,
}

impl GameSummaryRow {
    #[must_use]
    pub fn new(id: i64, summary: GameSummary) -> Self {
        Self { id, summary }
    }
}

/// Repository contract for the single player profile of this device.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Fetch the stored profile, `None` when nobody has played yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the profile cannot be read.
    async fn get_profile(&self) -> Result<Option<PlayerProfile>, StorageError>;

    /// Persist the profile, replacing whatever was stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the profile cannot be stored.
    async fn save_profile(&self, profile: &PlayerProfile) -> Result<(), StorageError>;

    /// Remove the stored profile.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn clear_profile(&self) -> Result<(), StorageError>;
}

#[async_trait]
pub trait GameSummaryRepository: Send + Sync {
    /// Append a finished-session summary and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the summary cannot be stored.
    async fn append_summary(&self, summary: &GameSummary) -> Result<i64, StorageError>;

    /// Fetch one summary by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_summary(&self, id: i64) -> Result<GameSummary, StorageError>;

    /// Newest summaries first, optionally restricted to one game.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read or mapping failures.
    async fn list_summaries(
        &self,
        game: Option<GameType>,
        limit: u32,
    ) -> Result<Vec<GameSummaryRow>, StorageError>;
}

#[async_trait]
pub trait SoundSettingsRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if settings cannot be read.
    async fn get_settings(&self) -> Result<Option<SoundSettings>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if settings cannot be stored.
    async fn save_settings(&self, settings: &SoundSettings) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    profile: Arc<Mutex<Option<PlayerProfile>>>,
    summaries: Arc<Mutex<HashMap<i64, GameSummary>>>,
    next_summary_id: Arc<Mutex<i64>>,
    sound_settings: Arc<Mutex<Option<SoundSettings>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn get_profile(&self) -> Result<Option<PlayerProfile>, StorageError> {
        let guard = self.profile.lock().map_err(poisoned)?;
        Ok(guard.clone())
    }

    async fn save_profile(&self, profile: &PlayerProfile) -> Result<(), StorageError> {
        let mut guard = self.profile.lock().map_err(poisoned)?;
        *guard = Some(profile.clone());
        Ok(())
    }

    async fn clear_profile(&self) -> Result<(), StorageError> {
        let mut guard = self.profile.lock().map_err(poisoned)?;
        *guard = None;
        Ok(())
    }
}

#[async_trait]
impl GameSummaryRepository for InMemoryRepository {
    async fn append_summary(&self, summary: &GameSummary) -> Result<i64, StorageError> {
        let mut next = self.next_summary_id.lock().map_err(poisoned)?;
        *next += 1;
        let id = *next;
        let mut guard = self.summaries.lock().map_err(poisoned)?;
        guard.insert(id, summary.clone());
        Ok(id)
    }

    async fn get_summary(&self, id: i64) -> Result<GameSummary, StorageError> {
        let guard = self.summaries.lock().map_err(poisoned)?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_summaries(
        &self,
        game: Option<GameType>,
        limit: u32,
    ) -> Result<Vec<GameSummaryRow>, StorageError> {
        let guard = self.summaries.lock().map_err(poisoned)?;
        let mut rows: Vec<GameSummaryRow> = guard
            .iter()
            .filter(|(_, s)| game.is_none_or(|g| s.game() == g))
            .map(|(id, s)| GameSummaryRow::new(*id, s.clone()))
            .collect();
        rows.sort_by(|a, b| {
            b.summary
                .completed_at()
                .cmp(&a.summary.completed_at())
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }
}

#[async_trait]
impl SoundSettingsRepository for InMemoryRepository {
    async fn get_settings(&self) -> Result<Option<SoundSettings>, StorageError> {
        let guard = self.sound_settings.lock().map_err(poisoned)?;
        Ok(*guard)
    }

    async fn save_settings(&self, settings: &SoundSettings) -> Result<(), StorageError> {
        let mut guard = self.sound_settings.lock().map_err(poisoned)?;
        *guard = Some(*settings);
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub profiles: Arc<dyn ProfileRepository>,
    pub summaries: Arc<dyn GameSummaryRepository>,
    pub sound_settings: Arc<dyn SoundSettingsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let profiles: Arc<dyn ProfileRepository> = Arc::new(repo.clone());
        let summaries: Arc<dyn GameSummaryRepository> = Arc::new(repo.clone());
        let sound_settings: Arc<dyn SoundSettingsRepository> = Arc::new(repo);
        Self {
            profiles,
            summaries,
            sound_settings,
        }
    }
}
