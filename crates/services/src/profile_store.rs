use dino_core::model::{AchievementId, GameType, PlayerProfile, ProfilePatch, Tier};
use dino_core::scoring::{SessionReward, apply_reward, compute_stars};

/// Holds the current player's profile, if anyone is signed in.
///
/// Every mutation on an absent profile is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileStore {
    profile: Option<PlayerProfile>,
}

impl ProfileStore {
    #[must_use]
    pub fn new(profile: Option<PlayerProfile>) -> Self {
        Self { profile }
    }

    #[must_use]
    pub fn profile(&self) -> Option<&PlayerProfile> {
        self.profile.as_ref()
    }

    #[must_use]
    pub fn into_profile(self) -> Option<PlayerProfile> {
        self.profile
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.profile.is_some()
    }

    /// Name to greet the player with; falls back to the explorer name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.profile
            .as_ref()
            .map_or(PlayerProfile::DEFAULT_NAME, PlayerProfile::display_name)
    }

    #[must_use]
    pub fn high_score(&self, game: GameType) -> u32 {
        self.profile.as_ref().map_or(0, |p| p.high_score(game))
    }

    pub fn set_profile(&mut self, profile: PlayerProfile) {
        self.profile = Some(profile);
    }

    pub fn update_profile(&mut self, patch: ProfilePatch) {
        self.profile = self.profile.take().map(|p| p.apply(patch));
    }

    pub fn add_stars(&mut self, stars: u32) {
        self.profile = self.profile.take().map(|p| p.add_stars(stars));
    }

    pub fn unlock_achievement(&mut self, id: AchievementId) {
        self.profile = self.profile.take().map(|p| p.unlock_achievement(id));
    }

    pub fn record_high_score(&mut self, game: GameType, score: u32) {
        self.profile = self.profile.take().map(|p| p.raise_high_score(game, score));
    }

    pub fn clear(&mut self) {
        self.profile = None;
    }

    /// Applies the end-of-session reward.
    ///
    /// Without a profile the stars are still computed for display, but nothing
    /// is recorded.
    pub fn apply_session_reward(
        &mut self,
        game: GameType,
        tier: Tier,
        final_score: u32,
    ) -> SessionReward {
        match self.profile.take() {
            Some(profile) => {
                let (profile, reward) = apply_reward(profile, game, tier, final_score);
                self.profile = Some(profile);
                reward
            }
            None => SessionReward {
                game,
                tier,
                final_score,
                stars: compute_stars(tier, final_score),
                new_high_score: false,
                unlocked: Vec::new(),
            },
        }
    }
}
