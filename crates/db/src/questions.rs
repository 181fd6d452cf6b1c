//! Question queries

use common::models::{Question, QuestionFilter};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::decode;

/// List questions matching a filter, newest first
pub async fn list(pool: &PgPool, filter: &QuestionFilter) -> Result<Vec<Question>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, category, difficulty, prompt, correct_answer, incorrect_answers,
               is_public, created_by, created_at
        FROM questions
        WHERE ($1::text IS NULL OR category = $1)
          AND ($2::text IS NULL OR difficulty = $2)
          AND ($3::text IS NULL OR created_by = $3)
          AND ($4::boolean IS NULL OR is_public = $4)
        ORDER BY created_at DESC
        LIMIT $5
        "#,
    )
    .bind(filter.category.map(|c| c.as_str()))
    .bind(filter.difficulty.map(|d| d.as_str()))
    .bind(filter.created_by.as_deref())
    .bind(filter.is_public)
    .bind(filter.limit.map(|l| l as i64))
    .fetch_all(pool)
    .await?;

    rows.iter().map(from_row).collect()
}

/// Count questions matching a filter
pub async fn count(pool: &PgPool, filter: &QuestionFilter) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM questions
        WHERE ($1::text IS NULL OR category = $1)
          AND ($2::text IS NULL OR difficulty = $2)
          AND ($3::text IS NULL OR created_by = $3)
          AND ($4::boolean IS NULL OR is_public = $4)
        "#,
    )
    .bind(filter.category.map(|c| c.as_str()))
    .bind(filter.difficulty.map(|d| d.as_str()))
    .bind(filter.created_by.as_deref())
    .bind(filter.is_public)
    .fetch_one(pool)
    .await
}

/// Insert a question
pub async fn insert(pool: &PgPool, question: &Question) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO questions (id, category, difficulty, prompt, correct_answer,
                               incorrect_answers, is_public, created_by, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(&question.id)
    .bind(question.category.as_str())
    .bind(question.difficulty.as_str())
    .bind(&question.prompt)
    .bind(&question.correct_answer)
    .bind(question.incorrect_answers.to_vec())
    .bind(question.is_public)
    .bind(&question.created_by)
    .bind(question.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a question by id
pub async fn get(pool: &PgPool, id: &str) -> Result<Option<Question>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, category, difficulty, prompt, correct_answer, incorrect_answers,
               is_public, created_by, created_at
        FROM questions
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(from_row).transpose()
}

/// Rewrite the editable fields. Returns the number of rows touched.
pub async fn update(pool: &PgPool, question: &Question) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE questions
        SET category = $2, difficulty = $3, prompt = $4, correct_answer = $5,
            incorrect_answers = $6, is_public = $7
        WHERE id = $1
        "#,
    )
    .bind(&question.id)
    .bind(question.category.as_str())
    .bind(question.difficulty.as_str())
    .bind(&question.prompt)
    .bind(&question.correct_answer)
    .bind(question.incorrect_answers.to_vec())
    .bind(question.is_public)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Delete a question. Returns the number of rows removed.
pub async fn delete(pool: &PgPool, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

fn from_row(row: &PgRow) -> Result<Question, sqlx::Error> {
    let incorrect: Vec<String> = row.try_get("incorrect_answers")?;
    let incorrect_answers: [String; 3] = incorrect.try_into().map_err(|v: Vec<String>| {
        sqlx::Error::Decode(format!("expected 3 incorrect answers, got {}", v.len()).into())
    })?;

    Ok(Question {
        id: row.try_get("id")?,
        category: decode::parse(row, "category")?,
        difficulty: decode::parse(row, "difficulty")?,
        prompt: row.try_get("prompt")?,
        correct_answer: row.try_get("correct_answer")?,
        incorrect_answers,
        is_public: row.try_get("is_public")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
    })
}
