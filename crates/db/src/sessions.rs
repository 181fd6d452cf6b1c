//! Game session queries

use chrono::{DateTime, Utc};
use common::models::{SessionRecord, UserAnswer};
use sqlx::PgPool;
use uuid::Uuid;

/// Insert the header row of a new session
pub async fn create(pool: &PgPool, session: &SessionRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO game_sessions (id, user_id, mode, category, difficulty, question_ids, started_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(session.id)
    .bind(&session.user_id)
    .bind(session.mode.as_str())
    .bind(session.category.map(|c| c.as_str()))
    .bind(session.difficulty.map(|d| d.as_str()))
    .bind(&session.question_ids)
    .bind(session.started_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Append an answer and update the running totals atomically
pub async fn append_answer(
    pool: &PgPool,
    session_id: Uuid,
    answer: &UserAnswer,
    score: u32,
    streak: u32,
    max_streak: u32,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO game_answers (session_id, position, question_id, answer, is_correct,
                                  time_spent_ms, points_earned)
        SELECT $1, COUNT(*)::int, $2, $3, $4, $5, $6
        FROM game_answers WHERE session_id = $1
        "#,
    )
    .bind(session_id)
    .bind(&answer.question_id)
    .bind(&answer.answer)
    .bind(answer.is_correct)
    .bind(answer.time_spent_ms as i64)
    .bind(answer.points_earned as i32)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        UPDATE game_sessions
        SET score = $2, streak = $3, max_streak = $4
        WHERE id = $1
        "#,
    )
    .bind(session_id)
    .bind(score as i32)
    .bind(streak as i32)
    .bind(max_streak as i32)
    .execute(&mut *tx)
    .await?;

    tx.commit().await
}

/// Mark a session finished
pub async fn mark_finished(
    pool: &PgPool,
    session_id: Uuid,
    ended_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE game_sessions
        SET status = 'finished', ended_at = $2
        WHERE id = $1 AND status = 'playing'
        "#,
    )
    .bind(session_id)
    .bind(ended_at)
    .execute(pool)
    .await?;

    Ok(())
}
