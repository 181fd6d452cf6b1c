//! PostgreSQL-backed [`Store`]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::models::{
    GameResult, Question, QuestionFilter, RankingEntry, SessionRecord, UserAnswer, UserStats,
};
use common::{Error, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{leaderboard, questions, results, sessions, stats, Store};

/// Store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn db_err(e: sqlx::Error) -> Error {
    Error::Database(e.to_string())
}

#[async_trait]
impl Store for PgStore {
    async fn get_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        questions::list(&self.pool, filter).await.map_err(db_err)
    }

    async fn count_questions(&self, filter: &QuestionFilter) -> Result<usize> {
        let count = questions::count(&self.pool, filter).await.map_err(db_err)?;
        Ok(count.max(0) as usize)
    }

    async fn put_question(&self, question: &Question) -> Result<String> {
        let mut question = question.clone();
        if question.id.is_empty() {
            question.id = Uuid::new_v4().to_string();
        }
        questions::insert(&self.pool, &question)
            .await
            .map_err(db_err)?;
        Ok(question.id)
    }

    async fn get_question(&self, id: &str) -> Result<Option<Question>> {
        questions::get(&self.pool, id).await.map_err(db_err)
    }

    async fn update_question(&self, question: &Question) -> Result<()> {
        let updated = questions::update(&self.pool, question)
            .await
            .map_err(db_err)?;
        if updated == 0 {
            return Err(Error::NotFound(format!("question {}", question.id)));
        }
        Ok(())
    }

    async fn delete_question(&self, id: &str) -> Result<()> {
        let deleted = questions::delete(&self.pool, id).await.map_err(db_err)?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("question {}", id)));
        }
        Ok(())
    }

    async fn create_session(&self, session: &SessionRecord) -> Result<()> {
        sessions::create(&self.pool, session).await.map_err(db_err)
    }

    async fn append_answer(
        &self,
        session_id: Uuid,
        answer: &UserAnswer,
        score: u32,
        streak: u32,
        max_streak: u32,
    ) -> Result<()> {
        sessions::append_answer(&self.pool, session_id, answer, score, streak, max_streak)
            .await
            .map_err(db_err)
    }

    async fn mark_finished(&self, session_id: Uuid, ended_at: DateTime<Utc>) -> Result<()> {
        sessions::mark_finished(&self.pool, session_id, ended_at)
            .await
            .map_err(db_err)
    }

    async fn record_result(&self, result: &GameResult) -> Result<()> {
        results::insert(&self.pool, result).await.map_err(db_err)
    }

    async fn game_history(&self, user_id: &str, limit: usize) -> Result<Vec<GameResult>> {
        results::list_by_user(&self.pool, user_id, limit as i64)
            .await
            .map_err(db_err)
    }

    async fn get_stats(&self, user_id: &str) -> Result<Option<UserStats>> {
        stats::get(&self.pool, user_id).await.map_err(db_err)
    }

    async fn put_stats(&self, user_stats: &UserStats) -> Result<()> {
        stats::put(&self.pool, user_stats).await.map_err(db_err)
    }

    async fn upsert_ranking(&self, entry: &RankingEntry) -> Result<()> {
        leaderboard::upsert(&self.pool, entry).await.map_err(db_err)
    }

    async fn top_rankings(&self, limit: usize) -> Result<Vec<RankingEntry>> {
        leaderboard::get_top(&self.pool, limit as i64)
            .await
            .map_err(db_err)
    }

    async fn ranking_position(&self, user_id: &str) -> Result<Option<usize>> {
        let rank = leaderboard::get_user_rank(&self.pool, user_id)
            .await
            .map_err(db_err)?;
        Ok(rank.map(|r| r as usize))
    }

    async fn get_ranking(&self, user_id: &str) -> Result<Option<RankingEntry>> {
        leaderboard::get_entry(&self.pool, user_id)
            .await
            .map_err(db_err)
    }
}
