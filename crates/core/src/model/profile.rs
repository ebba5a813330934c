use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::AchievementId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("display name cannot be empty")]
    EmptyName,

    #[error("display name must be at most {max} characters")]
    NameTooLong { max: usize },

    #[error("age must be between 2 and 10, got {0}")]
    AgeOutOfRange(u8),

    #[error("unknown age group: {0}")]
    UnknownAgeGroup(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown game type: {0}")]
pub struct ParseGameTypeError(pub String);

//
// ─── AGE GROUP ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "2-4")]
    TwoToFour,
    #[serde(rename = "5-7")]
    FiveToSeven,
    #[serde(rename = "8-10")]
    EightToTen,
}

impl AgeGroup {
    /// Group for a supported age (2 to 10).
    #[must_use]
    pub fn for_age(age: u8) -> Option<Self> {
        match age {
            2..=4 => Some(Self::TwoToFour),
            5..=7 => Some(Self::FiveToSeven),
            8..=10 => Some(Self::EightToTen),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AgeGroup::TwoToFour => "2-4",
            AgeGroup::FiveToSeven => "5-7",
            AgeGroup::EightToTen => "8-10",
        }
    }

    /// Games suggested to parents for this age group.
    #[must_use]
    pub fn recommended_games(self) -> &'static [GameType] {
        match self {
            AgeGroup::TwoToFour => &[GameType::Counting, GameType::Shapes],
            AgeGroup::FiveToSeven => &[GameType::Math, GameType::Counting, GameType::Shapes],
            AgeGroup::EightToTen => &[GameType::Math, GameType::Memory],
        }
    }
}

impl FromStr for AgeGroup {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "2-4" => Ok(Self::TwoToFour),
            "5-7" => Ok(Self::FiveToSeven),
            "8-10" => Ok(Self::EightToTen),
            other => Err(ProfileError::UnknownAgeGroup(other.to_string())),
        }
    }
}

//
// ─── GAME TYPE ─────────────────────────────────────────────────────────────────
//

/// Mini-game a high score is tracked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    Math,
    Counting,
    Shapes,
    Memory,
}

impl GameType {
    pub const ALL: [GameType; 4] = [
        GameType::Math,
        GameType::Counting,
        GameType::Shapes,
        GameType::Memory,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GameType::Math => "math",
            GameType::Counting => "counting",
            GameType::Shapes => "shapes",
            GameType::Memory => "memory",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameType {
    type Err = ParseGameTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "math" => Ok(GameType::Math),
            "counting" => Ok(GameType::Counting),
            "shapes" => Ok(GameType::Shapes),
            "memory" => Ok(GameType::Memory),
            other => Err(ParseGameTypeError(other.to_string())),
        }
    }
}

//
// ─── ACHIEVEMENT ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub name: String,
    pub description: String,
    pub required_score: u32,
    pub is_unlocked: bool,
}

impl Achievement {
    /// A locked achievement.
    #[must_use]
    pub fn new(
        id: AchievementId,
        name: impl Into<String>,
        description: impl Into<String>,
        required_score: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            required_score,
            is_unlocked: false,
        }
    }

    /// Catalog every new profile starts with.
    #[must_use]
    pub fn starter_set() -> Vec<Self> {
        vec![
            Self::new(
                AchievementId::new(1),
                "First Steps",
                "Score your first points in a math game",
                10,
            ),
            Self::new(
                AchievementId::new(2),
                "Number Explorer",
                "Score 50 points in one game",
                50,
            ),
            Self::new(
                AchievementId::new(3),
                "Math Whiz",
                "Score 100 points in one game",
                100,
            ),
            Self::new(
                AchievementId::new(4),
                "Dino Champion",
                "Score 200 points in one game",
                200,
            ),
        ]
    }
}

//
// ─── PROFILE ───────────────────────────────────────────────────────────────────
//

/// Shallow merge input for [`PlayerProfile::apply`]. `None` keeps the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub age: Option<u8>,
    pub age_group: Option<AgeGroup>,
    pub avatar_id: Option<u32>,
    pub star_total: Option<u32>,
    pub high_scores: Option<BTreeMap<GameType, u32>>,
    pub achievements: Option<Vec<Achievement>>,
    pub last_played: Option<GameType>,
}

/// Identity, stars, high scores and achievements of the current player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    display_name: String,
    age: u8,
    age_group: AgeGroup,
    avatar_id: u32,
    star_total: u32,
    high_scores: BTreeMap<GameType, u32>,
    achievements: Vec<Achievement>,
    last_played: Option<GameType>,
}

impl PlayerProfile {
    /// Name shown when nobody is logged in or no name was chosen.
    pub const DEFAULT_NAME: &'static str = "Dino Explorer";
    pub const MAX_NAME_LEN: usize = 32;

    /// The profile a fresh install starts with.
    #[must_use]
    pub fn explorer() -> Self {
        Self {
            display_name: Self::DEFAULT_NAME.to_string(),
            age: 5,
            age_group: AgeGroup::FiveToSeven,
            avatar_id: 1,
            star_total: 0,
            high_scores: GameType::ALL.iter().map(|g| (*g, 0)).collect(),
            achievements: Achievement::starter_set(),
            last_played: None,
        }
    }

    /// Rehydrate a profile from persisted storage.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn from_persisted(
        display_name: String,
        age: u8,
        age_group: AgeGroup,
        avatar_id: u32,
        star_total: u32,
        high_scores: BTreeMap<GameType, u32>,
        achievements: Vec<Achievement>,
        last_played: Option<GameType>,
    ) -> Self {
        Self {
            display_name,
            age,
            age_group,
            avatar_id,
            star_total,
            high_scores,
            achievements,
            last_played,
        }
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn age(&self) -> u8 {
        self.age
    }

    #[must_use]
    pub fn age_group(&self) -> AgeGroup {
        self.age_group
    }

    #[must_use]
    pub fn avatar_id(&self) -> u32 {
        self.avatar_id
    }

    #[must_use]
    pub fn star_total(&self) -> u32 {
        self.star_total
    }

    #[must_use]
    pub fn high_scores(&self) -> &BTreeMap<GameType, u32> {
        &self.high_scores
    }

    /// High score for `game`, zero when never played.
    #[must_use]
    pub fn high_score(&self, game: GameType) -> u32 {
        self.high_scores.get(&game).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    #[must_use]
    pub fn last_played(&self) -> Option<GameType> {
        self.last_played
    }

    /// Shallow merge: fields present in `patch` replace the current ones.
    ///
    /// High scores are merged per game and never go down.
    #[must_use]
    pub fn apply(self, patch: ProfilePatch) -> Self {
        let mut high_scores = self.high_scores;
        for (game, score) in patch.high_scores.unwrap_or_default() {
            let entry = high_scores.entry(game).or_insert(0);
            *entry = (*entry).max(score);
        }
        Self {
            display_name: patch.display_name.unwrap_or(self.display_name),
            age: patch.age.unwrap_or(self.age),
            age_group: patch.age_group.unwrap_or(self.age_group),
            avatar_id: patch.avatar_id.unwrap_or(self.avatar_id),
            star_total: patch.star_total.unwrap_or(self.star_total),
            high_scores,
            achievements: patch.achievements.unwrap_or(self.achievements),
            last_played: patch.last_played.or(self.last_played),
        }
    }

    #[must_use]
    pub fn add_stars(self, stars: u32) -> Self {
        Self {
            star_total: self.star_total.saturating_add(stars),
            ..self
        }
    }

    /// Unlocks the achievement with `id`; unknown ids leave the profile as is.
    #[must_use]
    pub fn unlock_achievement(mut self, id: AchievementId) -> Self {
        if let Some(achievement) = self.achievements.iter_mut().find(|a| a.id == id) {
            achievement.is_unlocked = true;
        }
        self
    }

    /// Stores `score` for `game` only if it beats the current high score.
    #[must_use]
    pub fn raise_high_score(mut self, game: GameType, score: u32) -> Self {
        let entry = self.high_scores.entry(game).or_insert(0);
        if score > *entry {
            *entry = score;
        }
        self
    }

    #[must_use]
    pub fn played(self, game: GameType) -> Self {
        Self {
            last_played: Some(game),
            ..self
        }
    }

    /// Best score over all games.
    #[must_use]
    pub fn highest_score(&self) -> u32 {
        self.high_scores.values().copied().max().unwrap_or(0)
    }

    /// Number of games with a positive high score.
    #[must_use]
    pub fn games_played(&self) -> usize {
        self.high_scores.values().filter(|score| **score > 0).count()
    }

    #[must_use]
    pub fn recommended_games(&self) -> &'static [GameType] {
        self.age_group.recommended_games()
    }
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self::explorer()
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// User-entered identity fields, validated before becoming a profile.
#[derive(Clone, Debug, Default)]
pub struct ProfileDraft {
    pub display_name: String,
    pub age: u8,
    pub avatar_id: u32,
}

impl ProfileDraft {
    /// Validate into a fresh profile; the age group is derived from the age.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` for an empty or overlong name or an unsupported age.
    pub fn validate(self) -> Result<PlayerProfile, ProfileError> {
        let patch = self.validate_patch()?;
        Ok(PlayerProfile::explorer().apply(patch))
    }

    /// Validate into a patch for an existing profile, keeping its progress.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` for an empty or overlong name or an unsupported age.
    pub fn validate_patch(self) -> Result<ProfilePatch, ProfileError> {
        let name = self.display_name.trim();
        if name.is_empty() {
            return Err(ProfileError::EmptyName);
        }
        if name.chars().count() > PlayerProfile::MAX_NAME_LEN {
            return Err(ProfileError::NameTooLong {
                max: PlayerProfile::MAX_NAME_LEN,
            });
        }
        let age_group = AgeGroup::for_age(self.age).ok_or(ProfileError::AgeOutOfRange(self.age))?;

        Ok(ProfilePatch {
            display_name: Some(name.to_string()),
            age: Some(self.age),
            age_group: Some(age_group),
            avatar_id: Some(self.avatar_id),
            ..ProfilePatch::default()
        })
    }
}
