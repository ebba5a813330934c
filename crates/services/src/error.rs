//! Shared error types for the services crate.

use thiserror::Error;

use dino_core::model::{GameSummaryError, ProfileError, SoundSettingsError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the game session workflow.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session already completed")]
    Completed,
    #[error("session is not finished yet")]
    NotFinished,
    #[error("session is paused")]
    Paused,
    #[error("current question was already answered")]
    AlreadyAnswered,
    #[error("continuation does not belong to the current question")]
    StaleContinuation,
    #[error("reward already applied to this session")]
    AlreadyRewarded,
    #[error(transparent)]
    Summary(#[from] GameSummaryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProfileService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileServiceError {
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `SoundSettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SoundSettingsServiceError {
    #[error(transparent)]
    Settings(#[from] SoundSettingsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services or starting a game.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Profile(#[from] ProfileServiceError),
    #[error(transparent)]
    Session(#[from] SessionError),
}
