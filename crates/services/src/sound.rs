//! Sound effects as a fire-and-forget collaborator.
//!
//! Nothing here touches an audio device: `SoundBoard` resolves what would be
//! played, at which volume, and reports it through `tracing`.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use dino_core::model::SoundSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    Click,
    Hover,
    Correct,
    Wrong,
    LevelUp,
    Achievement,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 6] = [
        SoundEffect::Click,
        SoundEffect::Hover,
        SoundEffect::Correct,
        SoundEffect::Wrong,
        SoundEffect::LevelUp,
        SoundEffect::Achievement,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SoundEffect::Click => "click",
            SoundEffect::Hover => "hover",
            SoundEffect::Correct => "correct",
            SoundEffect::Wrong => "wrong",
            SoundEffect::LevelUp => "level_up",
            SoundEffect::Achievement => "achievement",
        }
    }

    /// Mix level of the effect before the player's effects volume applies.
    #[must_use]
    pub fn base_volume(self) -> f32 {
        match self {
            SoundEffect::Hover => 0.3,
            SoundEffect::Achievement => 0.8,
            SoundEffect::Click | SoundEffect::Correct | SoundEffect::Wrong | SoundEffect::LevelUp => {
                0.7
            }
        }
    }
}

impl fmt::Display for SoundEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plays effects and background music without blocking the caller.
pub trait SoundEffects: Send + Sync {
    fn play(&self, effect: SoundEffect);

    fn start_music(&self);

    fn stop_music(&self);
}

/// Sound sink that never plays anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSound;

impl SoundEffects for SilentSound {
    fn play(&self, _effect: SoundEffect) {}

    fn start_music(&self) {}

    fn stop_music(&self) {}
}

/// Applies the player's `SoundSettings` to every effect it is asked to play.
#[derive(Debug, Default)]
pub struct SoundBoard {
    settings: Mutex<SoundSettings>,
    music_playing: AtomicBool,
}

impl SoundBoard {
    #[must_use]
    pub fn new(settings: SoundSettings) -> Self {
        Self {
            settings: Mutex::new(settings),
            music_playing: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn settings(&self) -> SoundSettings {
        *self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Swap in new settings; muting also stops the music.
    pub fn update_settings(&self, settings: SoundSettings) {
        *self.settings.lock().unwrap_or_else(PoisonError::into_inner) = settings;
        if settings.muted() {
            self.stop_music();
        }
    }

    #[must_use]
    pub fn is_music_playing(&self) -> bool {
        self.music_playing.load(Ordering::Relaxed)
    }

    /// Volume `effect` would play at, `None` when it stays silent.
    #[must_use]
    pub fn effect_volume(&self, effect: SoundEffect) -> Option<f32> {
        let settings = self.settings();
        if settings.muted() {
            return None;
        }
        let volume = effect.base_volume() * settings.effects_volume();
        (volume > 0.0).then_some(volume)
    }
}

impl SoundEffects for SoundBoard {
    fn play(&self, effect: SoundEffect) {
        match self.effect_volume(effect) {
            Some(volume) => tracing::debug!(effect = effect.as_str(), volume, "sound played"),
            None => tracing::debug!(effect = effect.as_str(), "sound skipped"),
        }
    }

    fn start_music(&self) {
        let settings = self.settings();
        if settings.muted() || self.music_playing.swap(true, Ordering::Relaxed) {
            return;
        }
        tracing::debug!(volume = settings.music_volume(), "music started");
    }

    fn stop_music(&self) {
        if self.music_playing.swap(false, Ordering::Relaxed) {
            tracing::debug!("music stopped");
        }
    }
}
