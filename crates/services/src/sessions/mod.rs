mod game;
mod history;
mod progress;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use game::{Answer, AnswerOutcome, Continuation, GameSession};
pub use history::{GameSummaryId, GameSummaryListItem, SessionHistoryService};
pub use progress::SessionProgress;
pub use workflow::GameLoopService;
