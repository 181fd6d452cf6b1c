//! Finished game results

use common::models::GameResult;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::decode;

/// Store the result of a finished game
pub async fn insert(pool: &PgPool, result: &GameResult) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO game_results (id, user_id, username, mode, category, difficulty,
                                  total_questions, correct_answers, incorrect_answers, score,
                                  accuracy, max_streak, total_time_ms,
                                  average_time_per_question_ms, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(result.id)
    .bind(&result.user_id)
    .bind(&result.username)
    .bind(result.mode.as_str())
    .bind(result.category.map(|c| c.as_str()))
    .bind(result.difficulty.map(|d| d.as_str()))
    .bind(result.total_questions as i32)
    .bind(result.correct_answers as i32)
    .bind(result.incorrect_answers as i32)
    .bind(result.score as i32)
    .bind(result.accuracy)
    .bind(result.max_streak as i32)
    .bind(result.total_time_ms)
    .bind(result.average_time_per_question_ms)
    .bind(result.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Recent results for a user, newest first
pub async fn list_by_user(
    pool: &PgPool,
    user_id: &str,
    limit: i64,
) -> Result<Vec<GameResult>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, username, mode, category, difficulty, total_questions,
               correct_answers, incorrect_answers, score, accuracy, max_streak,
               total_time_ms, average_time_per_question_ms, created_at
        FROM game_results
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(from_row).collect()
}

fn from_row(row: &PgRow) -> Result<GameResult, sqlx::Error> {
    Ok(GameResult {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        username: row.try_get("username")?,
        mode: decode::parse(row, "mode")?,
        category: decode::parse_opt(row, "category")?,
        difficulty: decode::parse_opt(row, "difficulty")?,
        total_questions: decode::count(row, "total_questions")?,
        correct_answers: decode::count(row, "correct_answers")?,
        incorrect_answers: decode::count(row, "incorrect_answers")?,
        score: decode::count(row, "score")?,
        accuracy: row.try_get("accuracy")?,
        max_streak: decode::count(row, "max_streak")?,
        total_time_ms: row.try_get("total_time_ms")?,
        average_time_per_question_ms: row.try_get("average_time_per_question_ms")?,
        created_at: row.try_get("created_at")?,
    })
}
