use dino_core::model::{EndReason, GameSummary, GameType};
use dino_core::scoring::Stars;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, get_u32, parse_game, parse_tier, ser, u8_from_i64};
use crate::repository::{GameSummaryRepository, GameSummaryRow, StorageError};

const SUMMARY_COLUMNS: &str = r"
    id, game, tier, final_score, correct, wrong,
    stars, ended_by, started_at, completed_at
";

fn map_summary_row(row: &sqlx::sqlite::SqliteRow) -> Result<GameSummary, StorageError> {
    let game: String = row.try_get("game").map_err(ser)?;
    let tier: String = row.try_get("tier").map_err(ser)?;
    let ended_by: String = row.try_get("ended_by").map_err(ser)?;
    let stars = u8_from_i64("stars", row.try_get::<i64, _>("stars").map_err(ser)?)?;

    GameSummary::new(
        parse_game(&game)?,
        parse_tier(&tier)?,
        get_u32(row, "final_score")?,
        get_u32(row, "correct")?,
        get_u32(row, "wrong")?,
        Stars::try_from(stars).map_err(ser)?,
        EndReason::parse(&ended_by).map_err(ser)?,
        row.try_get("started_at").map_err(ser)?,
        row.try_get("completed_at").map_err(ser)?,
    )
    .map_err(ser)
}

fn map_summary_row_with_id(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<GameSummaryRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    Ok(GameSummaryRow::new(id, map_summary_row(row)?))
}

#[async_trait::async_trait]
impl GameSummaryRepository for SqliteRepository {
    async fn append_summary(&self, summary: &GameSummary) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO game_summaries (
                    game, tier, final_score, correct, wrong,
                    stars, ended_by, started_at, completed_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
        )
        .bind(summary.game().as_str())
        .bind(summary.tier().as_str())
        .bind(i64::from(summary.final_score()))
        .bind(i64::from(summary.correct()))
        .bind(i64::from(summary.wrong()))
        .bind(i64::from(summary.stars().value()))
        .bind(summary.ended_by().as_str())
        .bind(summary.started_at())
        .bind(summary.completed_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.last_insert_rowid())
    }

    async fn get_summary(&self, id: i64) -> Result<GameSummary, StorageError> {
        let sql = format!("SELECT {SUMMARY_COLUMNS} FROM game_summaries WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?
            .ok_or(StorageError::NotFound)?;

        map_summary_row(&row)
    }

    async fn list_summaries(
        &self,
        game: Option<GameType>,
        limit: u32,
    ) -> Result<Vec<GameSummaryRow>, StorageError> {
        let mut sql = format!("SELECT {SUMMARY_COLUMNS} FROM game_summaries");
        let mut bind_index = 1;
        if game.is_some() {
            sql.push_str(" WHERE game = ?1");
            bind_index += 1;
        }
        sql.push_str(" ORDER BY completed_at DESC, id DESC");
        sql.push_str(" LIMIT ?");
        sql.push_str(&bind_index.to_string());

        let mut query = sqlx::query(&sql);
        if let Some(game) = game {
            query = query.bind(game.as_str());
        }
        query = query.bind(i64::from(limit));

        let rows = query.fetch_all(&self.pool).await.map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_summary_row_with_id(&row)?);
        }
        Ok(out)
    }
}
