use dino_core::model::{AchievementId, AgeGroup, GameType, Tier};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn u8_from_i64(field: &'static str, v: i64) -> Result<u8, StorageError> {
    u8::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn achievement_id_from_i64(v: i64) -> Result<AchievementId, StorageError> {
    u64::try_from(v)
        .map(AchievementId::new)
        .map_err(|_| StorageError::Serialization("achievement_id sign overflow".into()))
}

pub(crate) fn achievement_id_to_i64(id: AchievementId) -> Result<i64, StorageError> {
    i64::try_from(id.value())
        .map_err(|_| StorageError::Serialization("achievement_id overflow".into()))
}

pub(crate) fn parse_game(s: &str) -> Result<GameType, StorageError> {
    s.parse().map_err(ser)
}

pub(crate) fn parse_tier(s: &str) -> Result<Tier, StorageError> {
    s.parse().map_err(ser)
}

pub(crate) fn parse_age_group(s: &str) -> Result<AgeGroup, StorageError> {
    s.parse().map_err(ser)
}

pub(crate) fn get_u32(
    row: &sqlx::sqlite::SqliteRow,
    field: &'static str,
) -> Result<u32, StorageError> {
    u32_from_i64(field, row.try_get::<i64, _>(field).map_err(ser)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_counts_are_rejected() {
        assert!(u32_from_i64("score", -1).is_err());
        assert_eq!(u32_from_i64("score", 42).unwrap(), 42);
        assert!(u8_from_i64("age", 300).is_err());
    }

    #[test]
    fn stored_labels_parse_back() {
        assert_eq!(parse_game("counting").unwrap(), GameType::Counting);
        assert_eq!(parse_tier("advanced").unwrap(), Tier::Advanced);
        assert_eq!(parse_age_group("8-10").unwrap(), AgeGroup::EightToTen);
        assert!(matches!(
            parse_game("chess"),
            Err(StorageError::Serialization(_))
        ));
    }
}
