//! Star rating and end-of-session rewards.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{AchievementId, GameSummaryError, GameType, PlayerProfile, Tier};

//
// ─── STARS ─────────────────────────────────────────────────────────────────────
//

/// Star rating of one session, always in `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Stars(u8);

impl Stars {
    pub const ZERO: Stars = Stars(0);
    pub const MAX: Stars = Stars(3);

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<u8> for Stars {
    type Error = GameSummaryError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > Self::MAX.0 {
            return Err(GameSummaryError::InvalidStars(value));
        }
        Ok(Self(value))
    }
}

impl fmt::Display for Stars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── THRESHOLDS ────────────────────────────────────────────────────────────────
//

/// Minimum final score for one, two and three stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarThresholds {
    pub one: u32,
    pub two: u32,
    pub three: u32,
}

impl StarThresholds {
    #[must_use]
    pub fn for_tier(tier: Tier) -> Self {
        match tier {
            Tier::Beginner => Self {
                one: 30,
                two: 50,
                three: 80,
            },
            Tier::Intermediate => Self {
                one: 60,
                two: 100,
                three: 150,
            },
            Tier::Advanced => Self {
                one: 90,
                two: 150,
                three: 200,
            },
        }
    }
}

/// Stars earned by `final_score` at `tier`.
#[must_use]
pub fn compute_stars(tier: Tier, final_score: u32) -> Stars {
    let t = StarThresholds::for_tier(tier);
    if final_score >= t.three {
        Stars(3)
    } else if final_score >= t.two {
        Stars(2)
    } else if final_score >= t.one {
        Stars(1)
    } else {
        Stars::ZERO
    }
}

//
// ─── REWARD ────────────────────────────────────────────────────────────────────
//

/// What a finished session changed on the profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReward {
    pub game: GameType,
    pub tier: Tier,
    pub final_score: u32,
    pub stars: Stars,
    pub new_high_score: bool,
    pub unlocked: Vec<AchievementId>,
}

/// Applies the end-of-session reward to `profile`.
///
/// Raises the high score for `game` when beaten, adds the earned stars,
/// unlocks achievements whose required score was reached and records `game`
/// as last played.
#[must_use]
pub fn apply_reward(
    profile: PlayerProfile,
    game: GameType,
    tier: Tier,
    final_score: u32,
) -> (PlayerProfile, SessionReward) {
    let stars = compute_stars(tier, final_score);
    let new_high_score = final_score > profile.high_score(game);

    let unlocked: Vec<AchievementId> = profile
        .achievements()
        .iter()
        .filter(|a| !a.is_unlocked && a.required_score <= final_score)
        .map(|a| a.id)
        .collect();

    let mut profile = profile.played(game);
    if new_high_score {
        profile = profile.raise_high_score(game, final_score);
    }
    if !stars.is_zero() {
        profile = profile.add_stars(u32::from(stars.value()));
    }
    for id in &unlocked {
        profile = profile.unlock_achievement(*id);
    }

    let reward = SessionReward {
        game,
        tier,
        final_score,
        stars,
        new_high_score,
        unlocked,
    };
    (profile, reward)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_scenarios() {
        assert_eq!(compute_stars(Tier::Beginner, 85), Stars(3));
        assert_eq!(compute_stars(Tier::Intermediate, 100), Stars(2));
        assert_eq!(compute_stars(Tier::Advanced, 89), Stars::ZERO);
    }

    #[test]
    fn thresholds_are_inclusive() {
        for tier in Tier::ALL {
            let t = StarThresholds::for_tier(tier);
            assert_eq!(compute_stars(tier, t.one - 1).value(), 0);
            assert_eq!(compute_stars(tier, t.one).value(), 1);
            assert_eq!(compute_stars(tier, t.two).value(), 2);
            assert_eq!(compute_stars(tier, t.three).value(), 3);
            assert_eq!(compute_stars(tier, u32::MAX), Stars::MAX);
        }
    }

    #[test]
    fn compute_stars_is_pure() {
        for score in (0..=300).step_by(10) {
            for tier in Tier::ALL {
                assert_eq!(compute_stars(tier, score), compute_stars(tier, score));
            }
        }
    }

    #[test]
    fn stars_reject_out_of_range() {
        assert!(Stars::try_from(3_u8).is_ok());
        assert_eq!(
            Stars::try_from(4_u8).unwrap_err(),
            GameSummaryError::InvalidStars(4)
        );
    }

    #[test]
    fn reward_updates_high_score_stars_and_achievements() {
        let profile = PlayerProfile::explorer();
        let (profile, reward) = apply_reward(profile, GameType::Math, Tier::Beginner, 60);

        assert_eq!(reward.stars, Stars(2));
        assert!(reward.new_high_score);
        assert_eq!(
            reward.unlocked,
            vec![AchievementId::new(1), AchievementId::new(2)]
        );
        assert_eq!(profile.star_total(), 2);
        assert_eq!(profile.high_score(GameType::Math), 60);
        assert_eq!(profile.last_played(), Some(GameType::Math));
    }

    #[test]
    fn lower_score_keeps_high_score_and_adds_no_stars_on_zero() {
        let profile = PlayerProfile::explorer().raise_high_score(GameType::Math, 90);
        let (profile, reward) = apply_reward(profile, GameType::Math, Tier::Advanced, 20);

        assert!(!reward.new_high_score);
        assert!(reward.stars.is_zero());
        assert_eq!(profile.high_score(GameType::Math), 90);
        assert_eq!(profile.star_total(), 0);
    }

    #[test]
    fn unlocked_achievements_are_not_reported_twice() {
        let (profile, first) =
            apply_reward(PlayerProfile::explorer(), GameType::Math, Tier::Beginner, 10);
        assert_eq!(first.unlocked, vec![AchievementId::new(1)]);
        let (_, second) = apply_reward(profile, GameType::Math, Tier::Beginner, 10);
        assert!(second.unlocked.is_empty());
    }
}
