//! Leaderboard queries

use common::models::RankingEntry;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::decode;

/// Insert or replace a player's leaderboard row
pub async fn upsert(pool: &PgPool, entry: &RankingEntry) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO rankings (user_id, username, total_points, total_wins, accuracy, level,
                              max_streak, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (user_id) DO UPDATE
        SET username = EXCLUDED.username,
            total_points = EXCLUDED.total_points,
            total_wins = EXCLUDED.total_wins,
            accuracy = EXCLUDED.accuracy,
            level = EXCLUDED.level,
            max_streak = EXCLUDED.max_streak,
            updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(&entry.user_id)
    .bind(&entry.username)
    .bind(entry.total_points as i64)
    .bind(entry.total_wins as i32)
    .bind(entry.accuracy)
    .bind(entry.level as i32)
    .bind(entry.max_streak as i32)
    .bind(entry.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get the top of the leaderboard by total points
pub async fn get_top(pool: &PgPool, limit: i64) -> Result<Vec<RankingEntry>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT user_id, username, total_points, total_wins, accuracy, level, max_streak, updated_at
        FROM rankings
        ORDER BY total_points DESC, updated_at ASC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(from_row).collect()
}

/// Get a single player's row
pub async fn get_entry(pool: &PgPool, user_id: &str) -> Result<Option<RankingEntry>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT user_id, username, total_points, total_wins, accuracy, level, max_streak, updated_at
        FROM rankings
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(from_row).transpose()
}

/// Get a user's 1-based rank on the leaderboard
pub async fn get_user_rank(pool: &PgPool, user_id: &str) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        WITH ranked AS (
            SELECT
                user_id,
                ROW_NUMBER() OVER (ORDER BY total_points DESC, updated_at ASC) AS rank
            FROM rankings
        )
        SELECT rank FROM ranked WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

fn from_row(row: &PgRow) -> Result<RankingEntry, sqlx::Error> {
    let total_points: i64 = row.try_get("total_points")?;

    Ok(RankingEntry {
        user_id: row.try_get("user_id")?,
        username: row.try_get("username")?,
        total_points: total_points.max(0) as u64,
        total_wins: decode::count(row, "total_wins")?,
        accuracy: row.try_get("accuracy")?,
        level: decode::count(row, "level")?,
        max_streak: decode::count(row, "max_streak")?,
        updated_at: row.try_get("updated_at")?,
    })
}
