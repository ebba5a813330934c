use async_trait::async_trait;
use dino_core::model::SoundSettings;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser};
use crate::repository::{SoundSettingsRepository, StorageError};

#[async_trait]
impl SoundSettingsRepository for SqliteRepository {
    async fn get_settings(&self) -> Result<Option<SoundSettings>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT muted, effects_volume, music_volume
            FROM sound_settings
            WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let muted: bool = row.try_get("muted").map_err(ser)?;
        let effects_volume: f64 = row.try_get("effects_volume").map_err(ser)?;
        let music_volume: f64 = row.try_get("music_volume").map_err(ser)?;

        #[allow(clippy::cast_possible_truncation)]
        SoundSettings::from_persisted(muted, effects_volume as f32, music_volume as f32)
            .map(Some)
            .map_err(ser)
    }

    async fn save_settings(&self, settings: &SoundSettings) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO sound_settings (id, muted, effects_volume, music_volume)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                muted = excluded.muted,
                effects_volume = excluded.effects_volume,
                music_volume = excluded.music_volume
            ",
        )
        .bind(1_i64)
        .bind(settings.muted())
        .bind(f64::from(settings.effects_volume()))
        .bind(f64::from(settings.music_volume()))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
