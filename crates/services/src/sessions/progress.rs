/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: u32,
    pub answered: u32,
    pub remaining: u32,
    pub score: u32,
    pub lives: u8,
    pub is_complete: bool,
}
