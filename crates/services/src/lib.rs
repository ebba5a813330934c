#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod profile_service;
pub mod profile_store;
pub mod sessions;
pub mod sound;
pub mod sound_settings_service;

pub use dino_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use error::{AppServicesError, ProfileServiceError, SessionError, SoundSettingsServiceError};
pub use profile_service::{ProfileOverview, ProfileService};
pub use profile_store::ProfileStore;
pub use sessions::{
    Answer, AnswerOutcome, Continuation, GameLoopService, GameSession, GameSummaryId,
    GameSummaryListItem, SessionHistoryService, SessionProgress,
};
pub use sound::{SilentSound, SoundBoard, SoundEffect, SoundEffects};
pub use sound_settings_service::SoundSettingsService;
