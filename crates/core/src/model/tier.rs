use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown difficulty tier: {0}")]
pub struct ParseTierError(pub String);

/// Difficulty level of a math session.
///
/// Each tier has its own operand ranges, point value, distractor spread,
/// answer time limit and star thresholds.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Beginner, Tier::Intermediate, Tier::Advanced];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Beginner => "beginner",
            Tier::Intermediate => "intermediate",
            Tier::Advanced => "advanced",
        }
    }

    /// Points awarded for one correct answer.
    #[must_use]
    pub fn points_per_correct(self) -> u32 {
        match self {
            Tier::Beginner => 10,
            Tier::Intermediate => 20,
            Tier::Advanced => 30,
        }
    }

    /// Maximum distance between a distractor and the correct answer.
    #[must_use]
    pub fn distractor_range(self) -> u32 {
        match self {
            Tier::Beginner => 3,
            Tier::Intermediate => 5,
            Tier::Advanced => 10,
        }
    }

    /// Time allowed per question, `None` when untimed.
    #[must_use]
    pub fn time_limit(self) -> Option<Duration> {
        match self {
            Tier::Beginner => None,
            Tier::Intermediate => Some(Duration::from_secs(15)),
            Tier::Advanced => Some(Duration::from_secs(20)),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = ParseTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Tier::Beginner),
            "intermediate" => Ok(Tier::Intermediate),
            "advanced" => Ok(Tier::Advanced),
            other => Err(ParseTierError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Advanced".parse::<Tier>().unwrap(), Tier::Advanced);
        assert_eq!(" beginner ".parse::<Tier>().unwrap(), Tier::Beginner);
        assert!("expert".parse::<Tier>().is_err());
    }

    #[test]
    fn per_tier_constants() {
        let points: Vec<u32> = Tier::ALL.iter().map(|t| t.points_per_correct()).collect();
        assert_eq!(points, vec![10, 20, 30]);
        assert_eq!(Tier::Beginner.time_limit(), None);
        assert_eq!(
            Tier::Intermediate.time_limit(),
            Some(Duration::from_secs(15))
        );
        assert_eq!(Tier::Advanced.distractor_range(), 10);
    }

    #[test]
    fn display_matches_as_str() {
        for tier in Tier::ALL {
            assert_eq!(tier.to_string(), tier.as_str());
            assert_eq!(tier.as_str().parse::<Tier>().unwrap(), tier);
        }
    }
}
