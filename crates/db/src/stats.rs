//! Per-user statistics

use std::collections::BTreeMap;

use common::models::{Category, UserStats};
use sqlx::{PgPool, Row};

use crate::decode;

/// Load a user's stats together with their per-category rows
pub async fn get(pool: &PgPool, user_id: &str) -> Result<Option<UserStats>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT user_id, total_games, total_wins, total_points, current_streak,
               max_streak, accuracy, level, questions_created, updated_at
        FROM user_stats
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let category_rows = sqlx::query(
        "SELECT category, games, accuracy FROM user_category_stats WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut games_per_category = BTreeMap::new();
    let mut accuracy_per_category = BTreeMap::new();
    for r in &category_rows {
        let category: Category = decode::parse(r, "category")?;
        let accuracy: f64 = r.try_get("accuracy")?;
        games_per_category.insert(category, decode::count(r, "games")?);
        accuracy_per_category.insert(category, accuracy);
    }

    let total_points: i64 = row.try_get("total_points")?;

    Ok(Some(UserStats {
        user_id: row.try_get("user_id")?,
        total_games: decode::count(&row, "total_games")?,
        total_wins: decode::count(&row, "total_wins")?,
        total_points: total_points.max(0) as u64,
        current_streak: decode::count(&row, "current_streak")?,
        max_streak: decode::count(&row, "max_streak")?,
        accuracy: row.try_get("accuracy")?,
        level: decode::count(&row, "level")?,
        questions_created: decode::count(&row, "questions_created")?,
        games_per_category,
        accuracy_per_category,
        updated_at: row.try_get("updated_at")?,
    }))
}

/// Replace a user's stats
pub async fn put(pool: &PgPool, stats: &UserStats) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO user_stats (user_id, total_games, total_wins, total_points, current_streak,
                                max_streak, accuracy, level, questions_created, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (user_id) DO UPDATE
        SET total_games = EXCLUDED.total_games,
            total_wins = EXCLUDED.total_wins,
            total_points = EXCLUDED.total_points,
            current_streak = EXCLUDED.current_streak,
            max_streak = EXCLUDED.max_streak,
            accuracy = EXCLUDED.accuracy,
            level = EXCLUDED.level,
            questions_created = EXCLUDED.questions_created,
            updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(&stats.user_id)
    .bind(stats.total_games as i32)
    .bind(stats.total_wins as i32)
    .bind(stats.total_points as i64)
    .bind(stats.current_streak as i32)
    .bind(stats.max_streak as i32)
    .bind(stats.accuracy)
    .bind(stats.level as i32)
    .bind(stats.questions_created as i32)
    .bind(stats.updated_at)
    .execute(&mut *tx)
    .await?;

    for (category, games) in &stats.games_per_category {
        let accuracy = stats
            .accuracy_per_category
            .get(category)
            .copied()
            .unwrap_or(0.0);

        sqlx::query(
            r#"
            INSERT INTO user_category_stats (user_id, category, games, accuracy)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, category) DO UPDATE
            SET games = EXCLUDED.games, accuracy = EXCLUDED.accuracy
            "#,
        )
        .bind(&stats.user_id)
        .bind(category.as_str())
        .bind(*games as i32)
        .bind(accuracy)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await
}
