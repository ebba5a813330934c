use std::sync::Arc;

use dino_core::model::{GameType, Tier};
use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::profile_service::ProfileService;
use crate::sessions::{GameLoopService, GameSession, SessionHistoryService};
use crate::sound::{SoundBoard, SoundEffects};
use crate::sound_settings_service::SoundSettingsService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    game_loop: Arc<GameLoopService>,
    history: Arc<SessionHistoryService>,
    profiles: Arc<ProfileService>,
    sound_settings: Arc<SoundSettingsService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or loading the
    /// sound settings fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::from_storage(storage, clock).await
    }

    /// Build services over in-memory repositories.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if loading the sound settings fails.
    pub async fn in_memory(clock: Clock) -> Result<Self, AppServicesError> {
        Self::from_storage(Storage::in_memory(), clock).await
    }

    async fn from_storage(storage: Storage, clock: Clock) -> Result<Self, AppServicesError> {
        let settings = storage
            .sound_settings
            .get_settings()
            .await?
            .unwrap_or_default();
        let board = Arc::new(SoundBoard::new(settings));
        let sound: Arc<dyn SoundEffects> = board.clone();

        let game_loop = Arc::new(GameLoopService::new(
            clock,
            Arc::clone(&storage.profiles),
            Arc::clone(&storage.summaries),
            sound,
        ));
        let history = Arc::new(SessionHistoryService::new(Arc::clone(&storage.summaries)));
        let profiles = Arc::new(ProfileService::new(Arc::clone(&storage.profiles)));
        let sound_settings = Arc::new(SoundSettingsService::new(
            Arc::clone(&storage.sound_settings),
            board,
        ));

        Ok(Self {
            game_loop,
            history,
            profiles,
            sound_settings,
        })
    }

    /// Start a session, creating the default explorer profile on first use.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the profile cannot be read or created.
    pub async fn start_game(
        &self,
        game: GameType,
        tier: Tier,
    ) -> Result<GameSession, AppServicesError> {
        self.profiles.ensure_profile().await?;
        Ok(self.game_loop.start_session(game, tier).await?)
    }

    #[must_use]
    pub fn game_loop(&self) -> Arc<GameLoopService> {
        Arc::clone(&self.game_loop)
    }

    #[must_use]
    pub fn history(&self) -> Arc<SessionHistoryService> {
        Arc::clone(&self.history)
    }

    #[must_use]
    pub fn profiles(&self) -> Arc<ProfileService> {
        Arc::clone(&self.profiles)
    }

    #[must_use]
    pub fn sound_settings(&self) -> Arc<SoundSettingsService> {
        Arc::clone(&self.sound_settings)
    }

    #[must_use]
    pub fn sound(&self) -> Arc<SoundBoard> {
        self.sound_settings.board()
    }
}
