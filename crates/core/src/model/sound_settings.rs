use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SoundSettingsError {
    #[error("volume must be a finite number, got {0}")]
    NonFiniteVolume(f32),
}

/// Per-device mute and volume preferences.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SoundSettings {
    muted: bool,
    effects_volume: f32,
    music_volume: f32,
}

/// Unvalidated settings as entered or loaded from storage.
#[derive(Clone, Copy, Debug)]
pub struct SoundSettingsDraft {
    pub muted: bool,
    pub effects_volume: f32,
    pub music_volume: f32,
}

impl Default for SoundSettingsDraft {
    fn default() -> Self {
        let defaults = SoundSettings::default();
        Self {
            muted: defaults.muted,
            effects_volume: defaults.effects_volume,
            music_volume: defaults.music_volume,
        }
    }
}

impl SoundSettingsDraft {
    /// Validate the draft, clamping volumes into `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns `SoundSettingsError::NonFiniteVolume` for NaN or infinite volumes.
    pub fn validate(self) -> Result<SoundSettings, SoundSettingsError> {
        Ok(SoundSettings {
            muted: self.muted,
            effects_volume: clamp_volume(self.effects_volume)?,
            music_volume: clamp_volume(self.music_volume)?,
        })
    }
}

impl SoundSettings {
    pub const DEFAULT_EFFECTS_VOLUME: f32 = 0.7;
    pub const DEFAULT_MUSIC_VOLUME: f32 = 0.5;

    /// # Errors
    ///
    /// Returns `SoundSettingsError` if a stored volume is not finite.
    pub fn from_persisted(
        muted: bool,
        effects_volume: f32,
        music_volume: f32,
    ) -> Result<Self, SoundSettingsError> {
        SoundSettingsDraft {
            muted,
            effects_volume,
            music_volume,
        }
        .validate()
    }

    #[must_use]
    pub fn muted(&self) -> bool {
        self.muted
    }

    #[must_use]
    pub fn effects_volume(&self) -> f32 {
        self.effects_volume
    }

    #[must_use]
    pub fn music_volume(&self) -> f32 {
        self.music_volume
    }

    #[must_use]
    pub fn with_muted(self, muted: bool) -> Self {
        Self { muted, ..self }
    }

    /// # Errors
    ///
    /// Returns `SoundSettingsError::NonFiniteVolume` for NaN or infinite input.
    pub fn with_effects_volume(self, volume: f32) -> Result<Self, SoundSettingsError> {
        Ok(Self {
            effects_volume: clamp_volume(volume)?,
            ..self
        })
    }

    /// # Errors
    ///
    /// Returns `SoundSettingsError::NonFiniteVolume` for NaN or infinite input.
    pub fn with_music_volume(self, volume: f32) -> Result<Self, SoundSettingsError> {
        Ok(Self {
            music_volume: clamp_volume(volume)?,
            ..self
        })
    }
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            muted: false,
            effects_volume: Self::DEFAULT_EFFECTS_VOLUME,
            music_volume: Self::DEFAULT_MUSIC_VOLUME,
        }
    }
}

fn clamp_volume(volume: f32) -> Result<f32, SoundSettingsError> {
    if !volume.is_finite() {
        return Err(SoundSettingsError::NonFiniteVolume(volume));
    }
    Ok(volume.clamp(0.0, 1.0))
}
