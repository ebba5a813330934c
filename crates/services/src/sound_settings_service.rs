use std::sync::Arc;

use dino_core::model::SoundSettings;
use storage::repository::SoundSettingsRepository;

use crate::error::SoundSettingsServiceError;
use crate::sound::SoundBoard;

/// Reads and writes the per-device sound settings and keeps the sound board
/// in sync with them.
#[derive(Clone)]
pub struct SoundSettingsService {
    repo: Arc<dyn SoundSettingsRepository>,
    board: Arc<SoundBoard>,
}

impl SoundSettingsService {
    #[must_use]
    pub fn new(repo: Arc<dyn SoundSettingsRepository>, board: Arc<SoundBoard>) -> Self {
        Self { repo, board }
    }

    #[must_use]
    pub fn board(&self) -> Arc<SoundBoard> {
        Arc::clone(&self.board)
    }

    /// Stored settings, or the defaults when nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `SoundSettingsServiceError::Storage` on repository failures.
    pub async fn load(&self) -> Result<SoundSettings, SoundSettingsServiceError> {
        let settings = self.repo.get_settings().await?.unwrap_or_default();
        self.board.update_settings(settings);
        Ok(settings)
    }

    /// Flip the mute flag and return the new state.
    ///
    /// # Errors
    ///
    /// Returns `SoundSettingsServiceError::Storage` on repository failures.
    pub async fn toggle_mute(&self) -> Result<bool, SoundSettingsServiceError> {
        let current = self.load().await?;
        let next = current.with_muted(!current.muted());
        self.store(next).await?;
        Ok(next.muted())
    }

    /// Set the effects volume, clamped to `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns `SoundSettingsServiceError::Settings` for a non-finite volume or
    /// `SoundSettingsServiceError::Storage` on repository failures.
    pub async fn set_effects_volume(
        &self,
        volume: f32,
    ) -> Result<SoundSettings, SoundSettingsServiceError> {
        let next = self.load().await?.with_effects_volume(volume)?;
        self.store(next).await?;
        Ok(next)
    }

    /// Set the music volume, clamped to `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns `SoundSettingsServiceError::Settings` for a non-finite volume or
    /// `SoundSettingsServiceError::Storage` on repository failures.
    pub async fn set_music_volume(
        &self,
        volume: f32,
    ) -> Result<SoundSettings, SoundSettingsServiceError> {
        let next = self.load().await?.with_music_volume(volume)?;
        self.store(next).await?;
        Ok(next)
    }

    async fn store(&self, settings: SoundSettings) -> Result<(), SoundSettingsServiceError> {
        self.repo.save_settings(&settings).await?;
        self.board.update_settings(settings);
        tracing::info!(
            muted = settings.muted(),
            effects = settings.effects_volume(),
            music = settings.music_volume(),
            "sound settings saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dino_core::model::SoundSettingsError;
    use storage::repository::InMemoryRepository;

    fn service() -> SoundSettingsService {
        SoundSettingsService::new(
            Arc::new(InMemoryRepository::new()),
            Arc::new(SoundBoard::default()),
        )
    }

    #[tokio::test]
    async fn defaults_when_nothing_saved() {
        let settings = service().load().await.unwrap();
        assert_eq!(settings, SoundSettings::default());
    }

    #[tokio::test]
    async fn toggle_mute_persists_and_updates_board() {
        let svc = service();
        assert!(svc.toggle_mute().await.unwrap());
        assert!(svc.board().settings().muted());
        assert!(svc.load().await.unwrap().muted());
        assert!(!svc.toggle_mute().await.unwrap());
    }

    #[tokio::test]
    async fn volumes_are_clamped() {
        let svc = service();
        let settings = svc.set_effects_volume(1.7).await.unwrap();
        assert!((settings.effects_volume() - 1.0).abs() < f32::EPSILON);
        let settings = svc.set_music_volume(-0.2).await.unwrap();
        assert!(settings.music_volume().abs() < f32::EPSILON);
        assert!((svc.load().await.unwrap().effects_volume() - 1.0).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn non_finite_volume_is_rejected() {
        let err = service().set_music_volume(f32::NAN).await.unwrap_err();
        assert!(matches!(
            err,
            SoundSettingsServiceError::Settings(SoundSettingsError::NonFiniteVolume(_))
        ));
    }
}
