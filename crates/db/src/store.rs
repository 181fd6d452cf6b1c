//! The persistence port consumed by the game engine

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::models::{
    GameResult, Question, QuestionFilter, RankingEntry, SessionRecord, UserAnswer, UserStats,
};
use common::Result;
use uuid::Uuid;

/// Storage for questions, sessions, stats and the leaderboard.
///
/// Every call may fail with [`common::Error::Database`] when the backing
/// store is unreachable; callers decide whether that is fatal.
#[async_trait]
pub trait Store: Send + Sync {
    /// Questions matching `filter`, newest first, capped at `filter.limit`
    async fn get_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>>;

    /// Number of questions matching `filter`, ignoring `filter.limit`
    async fn count_questions(&self, filter: &QuestionFilter) -> Result<usize>;

    /// Store a question, assigning an id when `question.id` is empty.
    /// Returns the stored id.
    async fn put_question(&self, question: &Question) -> Result<String>;

    async fn get_question(&self, id: &str) -> Result<Option<Question>>;

    /// Replace the editable fields of an existing question.
    /// Fails with [`common::Error::NotFound`] when it does not exist.
    async fn update_question(&self, question: &Question) -> Result<()>;

    /// Fails with [`common::Error::NotFound`] when the question does not exist
    async fn delete_question(&self, id: &str) -> Result<()>;

    async fn create_session(&self, session: &SessionRecord) -> Result<()>;

    /// Record one answer together with the session's running totals
    async fn append_answer(
        &self,
        session_id: Uuid,
        answer: &UserAnswer,
        score: u32,
        streak: u32,
        max_streak: u32,
    ) -> Result<()>;

    async fn mark_finished(&self, session_id: Uuid, ended_at: DateTime<Utc>) -> Result<()>;

    async fn record_result(&self, result: &GameResult) -> Result<()>;

    /// Finished games for a user, newest first
    async fn game_history(&self, user_id: &str, limit: usize) -> Result<Vec<GameResult>>;

    async fn get_stats(&self, user_id: &str) -> Result<Option<UserStats>>;

    async fn put_stats(&self, stats: &UserStats) -> Result<()>;

    /// Insert or replace the entry for `entry.user_id`
    async fn upsert_ranking(&self, entry: &RankingEntry) -> Result<()>;

    /// Leaderboard head, highest total points first
    async fn top_rankings(&self, limit: usize) -> Result<Vec<RankingEntry>>;

    /// 1-based leaderboard position, `None` when the user has no entry
    async fn ranking_position(&self, user_id: &str) -> Result<Option<usize>>;

    async fn get_ranking(&self, user_id: &str) -> Result<Option<RankingEntry>>;
}
