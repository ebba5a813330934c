use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
        .bind(version)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

/// Runs every pending schema migration in order.
///
/// Version 1 holds the profile, high scores, achievements and game
/// summaries. Version 2 adds the persisted sound settings.
#[allow(clippy::too_many_lines)]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS player_profile (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    display_name TEXT NOT NULL,
                    age INTEGER NOT NULL CHECK (age BETWEEN 0 AND 255),
                    age_group TEXT NOT NULL,
                    avatar_id INTEGER NOT NULL CHECK (avatar_id >= 0),
                    star_total INTEGER NOT NULL CHECK (star_total >= 0),
                    last_played TEXT
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS high_scores (
                    game TEXT PRIMARY KEY,
                    score INTEGER NOT NULL CHECK (score >= 0)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS achievements (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    description TEXT NOT NULL,
                    required_score INTEGER NOT NULL CHECK (required_score >= 0),
                    is_unlocked INTEGER NOT NULL CHECK (is_unlocked IN (0, 1))
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS game_summaries (
                    id INTEGER PRIMARY KEY,
                    game TEXT NOT NULL,
                    tier TEXT NOT NULL,
                    final_score INTEGER NOT NULL CHECK (final_score >= 0),
                    correct INTEGER NOT NULL CHECK (correct >= 0),
                    wrong INTEGER NOT NULL CHECK (wrong >= 0),
                    stars INTEGER NOT NULL CHECK (stars BETWEEN 0 AND 3),
                    ended_by TEXT NOT NULL,
                    started_at TEXT NOT NULL,
                    completed_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_game_summaries_game_completed
                    ON game_summaries (game, completed_at);
            ",
        )
        .execute(&mut *tx)
        .await?;

        mark_applied(&mut tx, 1).await?;
        tx.commit().await?;
        tracing::debug!(version = 1, "applied schema migration");
    }

    if !is_applied(pool, 2).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS sound_settings (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    muted INTEGER NOT NULL CHECK (muted IN (0, 1)),
                    effects_volume REAL NOT NULL,
                    music_volume REAL NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        mark_applied(&mut tx, 2).await?;
        tx.commit().await?;
        tracing::debug!(version = 2, "applied schema migration");
    }

    Ok(())
}

async fn mark_applied(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    version: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
            INSERT INTO schema_migrations (version, applied_at)
            VALUES (?1, ?2)
            ON CONFLICT(version) DO NOTHING
        ",
    )
    .bind(version)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;
    Ok(())
}
