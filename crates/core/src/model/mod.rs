mod ids;
mod profile;
mod question;
mod session;
mod sound_settings;
mod summary;
mod tier;

pub use ids::{AchievementId, ParseIdError, QuestionId, SessionId};
pub use profile::{
    Achievement, AgeGroup, GameType, ParseGameTypeError, PlayerProfile, ProfileDraft,
    ProfileError, ProfilePatch,
};
pub use question::{Operation, Question};
pub use session::{SessionState, SessionStatePatch};
pub use sound_settings::{SoundSettings, SoundSettingsDraft, SoundSettingsError};
pub use summary::{EndReason, GameSummary, GameSummaryError};
pub use tier::{ParseTierError, Tier};
