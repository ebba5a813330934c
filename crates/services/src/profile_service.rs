use std::sync::Arc;

use dino_core::model::{GameType, PlayerProfile, ProfileDraft};
use storage::repository::ProfileRepository;

use crate::error::ProfileServiceError;
use crate::profile_store::ProfileStore;

/// Parent dashboard numbers derived from the profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileOverview {
    pub display_name: String,
    pub star_total: u32,
    pub highest_score: u32,
    pub games_played: usize,
    pub unlocked_achievements: usize,
    pub recommended_games: Vec<GameType>,
}

impl ProfileOverview {
    #[must_use]
    pub fn from_profile(profile: &PlayerProfile) -> Self {
        Self {
            display_name: profile.display_name().to_string(),
            star_total: profile.star_total(),
            highest_score: profile.highest_score(),
            games_played: profile.games_played(),
            unlocked_achievements: profile
                .achievements()
                .iter()
                .filter(|a| a.is_unlocked)
                .count(),
            recommended_games: profile.recommended_games().to_vec(),
        }
    }
}

/// Loads, edits and persists the device's player profile.
#[derive(Clone)]
pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    #[must_use]
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    /// Current profile wrapped in a store; empty when nobody signed in.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Storage` on repository failures.
    pub async fn load(&self) -> Result<ProfileStore, ProfileServiceError> {
        Ok(ProfileStore::new(self.profiles.get_profile().await?))
    }

    /// Persist whatever the store holds; an empty store clears the profile.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Storage` on repository failures.
    pub async fn save(&self, store: &ProfileStore) -> Result<(), ProfileServiceError> {
        match store.profile() {
            Some(profile) => self.profiles.save_profile(profile).await?,
            None => self.profiles.clear_profile().await?,
        }
        Ok(())
    }

    /// Create a profile from user input, or update identity fields of the
    /// existing one while keeping its progress.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Profile` for invalid input, or
    /// `ProfileServiceError::Storage` on repository failures.
    pub async fn sign_in(&self, draft: ProfileDraft) -> Result<PlayerProfile, ProfileServiceError> {
        let profile = match self.profiles.get_profile().await? {
            Some(existing) => existing.apply(draft.validate_patch()?),
            None => draft.validate()?,
        };
        self.profiles.save_profile(&profile).await?;
        tracing::info!(name = profile.display_name(), "profile saved");
        Ok(profile)
    }

    /// The stored profile, creating the default explorer on first use.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Storage` on repository failures.
    pub async fn ensure_profile(&self) -> Result<PlayerProfile, ProfileServiceError> {
        if let Some(profile) = self.profiles.get_profile().await? {
            return Ok(profile);
        }
        let profile = PlayerProfile::explorer();
        self.profiles.save_profile(&profile).await?;
        tracing::info!("created default explorer profile");
        Ok(profile)
    }

    /// Dashboard numbers, `None` when nobody signed in.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Storage` on repository failures.
    pub async fn overview(&self) -> Result<Option<ProfileOverview>, ProfileServiceError> {
        let store = self.load().await?;
        Ok(store.profile().map(ProfileOverview::from_profile))
    }

    /// Sign out and forget the stored profile.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Storage` on repository failures.
    pub async fn sign_out(&self) -> Result<(), ProfileServiceError> {
        self.profiles.clear_profile().await?;
        tracing::info!("profile cleared");
        Ok(())
    }
}
