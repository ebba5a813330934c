//! Fixed rules shared by every math session.

use std::time::Duration;

/// Number of questions in one session, regardless of tier.
pub const SESSION_LENGTH: u32 = 10;

/// Lives a player starts each session with.
pub const STARTING_LIVES: u8 = 3;

/// Number of multiple-choice options shown per question.
pub const OPTION_COUNT: usize = 4;

/// Pause between recording an answer and showing the next question.
pub const FEEDBACK_DELAY: Duration = Duration::from_millis(1500);
