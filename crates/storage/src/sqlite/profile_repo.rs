use async_trait::async_trait;
use dino_core::model::{Achievement, GameType, PlayerProfile};
use sqlx::{Row, SqliteConnection};
use std::collections::BTreeMap;

use super::SqliteRepository;
use super::mapping::{
    achievement_id_from_i64, achievement_id_to_i64, conn, get_u32, parse_age_group, parse_game,
    ser, u8_from_i64,
};
use crate::repository::{ProfileRepository, StorageError};

async fn load_high_scores(
    db: &mut SqliteConnection,
) -> Result<BTreeMap<GameType, u32>, StorageError> {
    let rows = sqlx::query("SELECT game, score FROM high_scores ORDER BY game")
        .fetch_all(&mut *db)
        .await
        .map_err(conn)?;

    let mut scores = BTreeMap::new();
    for row in rows {
        let game: String = row.try_get("game").map_err(ser)?;
        scores.insert(parse_game(&game)?, get_u32(&row, "score")?);
    }
    Ok(scores)
}

async fn load_achievements(db: &mut SqliteConnection) -> Result<Vec<Achievement>, StorageError> {
    let rows = sqlx::query(
        r"
            SELECT id, name, description, required_score, is_unlocked
            FROM achievements
            ORDER BY id ASC
        ",
    )
    .fetch_all(&mut *db)
    .await
    .map_err(conn)?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let mut achievement = Achievement::new(
            achievement_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
            row.try_get::<String, _>("name").map_err(ser)?,
            row.try_get::<String, _>("description").map_err(ser)?,
            get_u32(&row, "required_score")?,
        );
        achievement.is_unlocked = row.try_get::<bool, _>("is_unlocked").map_err(ser)?;
        out.push(achievement);
    }
    Ok(out)
}

#[async_trait]
impl ProfileRepository for SqliteRepository {
    async fn get_profile(&self) -> Result<Option<PlayerProfile>, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        let row = sqlx::query(
            r"
                SELECT display_name, age, age_group, avatar_id, star_total, last_played
                FROM player_profile
                WHERE id = 1
            ",
        )
        .fetch_optional(&mut *tx)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let age_group: String = row.try_get("age_group").map_err(ser)?;
        let last_played: Option<String> = row.try_get("last_played").map_err(ser)?;
        let high_scores = load_high_scores(&mut *tx).await?;
        let achievements = load_achievements(&mut *tx).await?;
        tx.commit().await.map_err(conn)?;

        Ok(Some(PlayerProfile::from_persisted(
            row.try_get::<String, _>("display_name").map_err(ser)?,
            u8_from_i64("age", row.try_get::<i64, _>("age").map_err(ser)?)?,
            parse_age_group(&age_group)?,
            get_u32(&row, "avatar_id")?,
            get_u32(&row, "star_total")?,
            high_scores,
            achievements,
            last_played.as_deref().map(parse_game).transpose()?,
        )))
    }

    async fn save_profile(&self, profile: &PlayerProfile) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query(
            r"
                INSERT INTO player_profile (
                    id, display_name, age, age_group, avatar_id, star_total, last_played
                )
                VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(id) DO UPDATE SET
                    display_name = excluded.display_name,
                    age = excluded.age,
                    age_group = excluded.age_group,
                    avatar_id = excluded.avatar_id,
                    star_total = excluded.star_total,
                    last_played = excluded.last_played
            ",
        )
        .bind(profile.display_name())
        .bind(i64::from(profile.age()))
        .bind(profile.age_group().as_str())
        .bind(i64::from(profile.avatar_id()))
        .bind(i64::from(profile.star_total()))
        .bind(profile.last_played().map(GameType::as_str))
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        sqlx::query("DELETE FROM high_scores")
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        for (game, score) in profile.high_scores() {
            sqlx::query("INSERT INTO high_scores (game, score) VALUES (?1, ?2)")
                .bind(game.as_str())
                .bind(i64::from(*score))
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
        }

        sqlx::query("DELETE FROM achievements")
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        for achievement in profile.achievements() {
            sqlx::query(
                r"
                    INSERT INTO achievements (
                        id, name, description, required_score, is_unlocked
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5)
                ",
            )
            .bind(achievement_id_to_i64(achievement.id)?)
            .bind(&achievement.name)
            .bind(&achievement.description)
            .bind(i64::from(achievement.required_score))
            .bind(achievement.is_unlocked)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn clear_profile(&self) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        for table in ["player_profile", "high_scores", "achievements"] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
        }
        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
