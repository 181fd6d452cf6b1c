//! In-process [`Store`] used by tests and by the server when no database is configured

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::models::{
    GameResult, Question, QuestionFilter, RankingEntry, SessionRecord, UserAnswer, UserStats,
};
use common::{Error, Result};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::Store;

/// A session as the memory store keeps it
#[derive(Debug, Clone)]
pub struct StoredSession {
    pub record: SessionRecord,
    pub answers: Vec<UserAnswer>,
    pub score: u32,
    pub streak: u32,
    pub max_streak: u32,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct Inner {
    questions: Vec<Question>,
    sessions: HashMap<Uuid, StoredSession>,
    results: Vec<GameResult>,
    stats: HashMap<String, UserStats>,
    /// Kept sorted by total points, highest first
    rankings: Vec<RankingEntry>,
}

/// Store that keeps everything in memory.
///
/// [`MemoryStore::set_offline`] makes every call fail, which stands in for
/// an unreachable remote store. [`MemoryStore::set_leaderboard_offline`]
/// fails leaderboard writes only.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    offline: AtomicBool,
    leaderboard_offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with questions
    pub fn with_questions(questions: Vec<Question>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                questions,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_leaderboard_offline(&self, offline: bool) {
        self.leaderboard_offline.store(offline, Ordering::SeqCst);
    }

    /// Snapshot of a stored session
    pub async fn session(&self, id: Uuid) -> Option<StoredSession> {
        self.inner.read().await.sessions.get(&id).cloned()
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Database("store unreachable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        self.check_online()?;
        let inner = self.inner.read().await;

        let mut matching: Vec<Question> = inner
            .questions
            .iter()
            .filter(|q| filter.matches(q))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = filter.limit {
            matching.truncate(limit);
        }

        Ok(matching)
    }

    async fn count_questions(&self, filter: &QuestionFilter) -> Result<usize> {
        self.check_online()?;
        let inner = self.inner.read().await;
        Ok(inner.questions.iter().filter(|q| filter.matches(q)).count())
    }

    async fn put_question(&self, question: &Question) -> Result<String> {
        self.check_online()?;
        let mut question = question.clone();
        if question.id.is_empty() {
            question.id = Uuid::new_v4().to_string();
        }

        let mut inner = self.inner.write().await;
        if inner.questions.iter().any(|q| q.id == question.id) {
            return Err(Error::Database(format!(
                "question {} already exists",
                question.id
            )));
        }
        let id = question.id.clone();
        inner.questions.push(question);
        Ok(id)
    }

    async fn get_question(&self, id: &str) -> Result<Option<Question>> {
        self.check_online()?;
        let inner = self.inner.read().await;
        Ok(inner.questions.iter().find(|q| q.id == id).cloned())
    }

    async fn update_question(&self, question: &Question) -> Result<()> {
        self.check_online()?;
        let mut inner = self.inner.write().await;
        let stored = inner
            .questions
            .iter_mut()
            .find(|q| q.id == question.id)
            .ok_or_else(|| Error::NotFound(format!("question {}", question.id)))?;

        stored.category = question.category;
        stored.difficulty = question.difficulty;
        stored.prompt = question.prompt.clone();
        stored.correct_answer = question.correct_answer.clone();
        stored.incorrect_answers = question.incorrect_answers.clone();
        stored.is_public = question.is_public;
        Ok(())
    }

    async fn delete_question(&self, id: &str) -> Result<()> {
        self.check_online()?;
        let mut inner = self.inner.write().await;
        let idx = inner
            .questions
            .iter()
            .position(|q| q.id == id)
            .ok_or_else(|| Error::NotFound(format!("question {}", id)))?;
        inner.questions.remove(idx);
        Ok(())
    }

    async fn create_session(&self, session: &SessionRecord) -> Result<()> {
        self.check_online()?;
        let mut inner = self.inner.write().await;
        inner.sessions.insert(
            session.id,
            StoredSession {
                record: session.clone(),
                answers: Vec::new(),
                score: 0,
                streak: 0,
                max_streak: 0,
                ended_at: None,
            },
        );
        Ok(())
    }

    async fn append_answer(
        &self,
        session_id: Uuid,
        answer: &UserAnswer,
        score: u32,
        streak: u32,
        max_streak: u32,
    ) -> Result<()> {
        self.check_online()?;
        let mut inner = self.inner.write().await;
        let session = inner
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| Error::NotFound(format!("session {}", session_id)))?;

        session.answers.push(answer.clone());
        session.score = score;
        session.streak = streak;
        session.max_streak = max_streak;
        Ok(())
    }

    async fn mark_finished(&self, session_id: Uuid, ended_at: DateTime<Utc>) -> Result<()> {
        self.check_online()?;
        let mut inner = self.inner.write().await;
        let session = inner
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| Error::NotFound(format!("session {}", session_id)))?;

        session.ended_at.get_or_insert(ended_at);
        Ok(())
    }

    async fn record_result(&self, result: &GameResult) -> Result<()> {
        self.check_online()?;
        let mut inner = self.inner.write().await;
        if !inner.results.iter().any(|r| r.id == result.id) {
            inner.results.push(result.clone());
        }
        Ok(())
    }

    async fn game_history(&self, user_id: &str, limit: usize) -> Result<Vec<GameResult>> {
        self.check_online()?;
        let inner = self.inner.read().await;

        let mut history: Vec<GameResult> = inner
            .results
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        history.truncate(limit);

        Ok(history)
    }

    async fn get_stats(&self, user_id: &str) -> Result<Option<UserStats>> {
        self.check_online()?;
        Ok(self.inner.read().await.stats.get(user_id).cloned())
    }

    async fn put_stats(&self, stats: &UserStats) -> Result<()> {
        self.check_online()?;
        self.inner
            .write()
            .await
            .stats
            .insert(stats.user_id.clone(), stats.clone());
        Ok(())
    }

    async fn upsert_ranking(&self, entry: &RankingEntry) -> Result<()> {
        self.check_online()?;
        if self.leaderboard_offline.load(Ordering::SeqCst) {
            return Err(Error::Database("leaderboard unreachable".to_string()));
        }
        let mut inner = self.inner.write().await;

        match inner.rankings.iter().position(|e| e.user_id == entry.user_id) {
            Some(idx) => inner.rankings[idx] = entry.clone(),
            None => inner.rankings.push(entry.clone()),
        }
        // Stable sort keeps earlier entries ahead on equal points
        inner
            .rankings
            .sort_by(|a, b| b.total_points.cmp(&a.total_points));

        Ok(())
    }

    async fn top_rankings(&self, limit: usize) -> Result<Vec<RankingEntry>> {
        self.check_online()?;
        let inner = self.inner.read().await;
        Ok(inner.rankings.iter().take(limit).cloned().collect())
    }

    async fn ranking_position(&self, user_id: &str) -> Result<Option<usize>> {
        self.check_online()?;
        let inner = self.inner.read().await;
        Ok(inner
            .rankings
            .iter()
            .position(|e| e.user_id == user_id)
            .map(|idx| idx + 1))
    }

    async fn get_ranking(&self, user_id: &str) -> Result<Option<RankingEntry>> {
        self.check_online()?;
        let inner = self.inner.read().await;
        Ok(inner.rankings.iter().find(|e| e.user_id == user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use common::models::{Category, Difficulty};

    fn make_question(id: &str, category: Category, is_public: bool, age_mins: i64) -> Question {
        Question {
            id: id.to_string(),
            category,
            difficulty: Difficulty::Easy,
            prompt: format!("Prompt {}", id),
            correct_answer: "A".to_string(),
            incorrect_answers: ["B".to_string(), "C".to_string(), "D".to_string()],
            is_public,
            created_by: "author".to_string(),
            created_at: Utc::now() - Duration::minutes(age_mins),
        }
    }

    fn make_entry(user_id: &str, total_points: u64) -> RankingEntry {
        RankingEntry {
            user_id: user_id.to_string(),
            username: user_id.to_uppercase(),
            total_points,
            total_wins: 0,
            accuracy: 0.0,
            level: 1,
            max_streak: 0,
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_get_questions_filters_sorts_and_limits() {
        let store = MemoryStore::with_questions(vec![
            make_question("old", Category::Art, true, 30),
            make_question("new", Category::Art, true, 1),
            make_question("private", Category::Art, false, 0),
            make_question("science", Category::Science, true, 0),
        ]);

        let filter = QuestionFilter {
            category: Some(Category::Art),
            ..QuestionFilter::public()
        };
        let found = store.get_questions(&filter).await.unwrap();
        let ids: Vec<&str> = found.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);

        let limited = store
            .get_questions(&QuestionFilter {
                limit: Some(1),
                ..filter.clone()
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, "new");

        assert_eq!(store.count_questions(&filter).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_put_question_assigns_id() {
        let store = MemoryStore::new();
        let id = store
            .put_question(&make_question("", Category::History, false, 0))
            .await
            .unwrap();
        assert!(!id.is_empty());

        let all = store.get_questions(&QuestionFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
    }

    #[tokio::test]
    async fn test_question_update_and_delete() {
        let store = MemoryStore::with_questions(vec![make_question("q1", Category::Art, false, 0)]);

        let mut edited = store.get_question("q1").await.unwrap().unwrap();
        edited.difficulty = Difficulty::Hard;
        edited.created_by = "someone else".to_string();
        store.update_question(&edited).await.unwrap();

        let stored = store.get_question("q1").await.unwrap().unwrap();
        assert_eq!(stored.difficulty, Difficulty::Hard);
        // Ownership is not editable
        assert_eq!(stored.created_by, "author");

        store.delete_question("q1").await.unwrap();
        assert!(store.get_question("q1").await.unwrap().is_none());
        assert!(matches!(
            store.delete_question("q1").await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            store.update_question(&edited).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rankings_stay_sorted_by_points() {
        let store = MemoryStore::new();
        store.upsert_ranking(&make_entry("ana", 300)).await.unwrap();
        store.upsert_ranking(&make_entry("bo", 500)).await.unwrap();
        store.upsert_ranking(&make_entry("cy", 100)).await.unwrap();

        assert_eq!(store.ranking_position("bo").await.unwrap(), Some(1));
        assert_eq!(store.ranking_position("cy").await.unwrap(), Some(3));
        assert_eq!(store.ranking_position("nobody").await.unwrap(), None);

        // Upsert replaces rather than duplicates
        store.upsert_ranking(&make_entry("cy", 900)).await.unwrap();
        let top = store.top_rankings(10).await.unwrap();
        let ids: Vec<&str> = top.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(ids, vec!["cy", "bo", "ana"]);

        let top_two = store.top_rankings(2).await.unwrap();
        assert_eq!(top_two.len(), 2);
        assert_eq!(
            store.get_ranking("cy").await.unwrap().map(|e| e.total_points),
            Some(900)
        );
    }

    #[tokio::test]
    async fn test_offline_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set_offline(true);

        assert!(matches!(
            store.get_questions(&QuestionFilter::default()).await,
            Err(Error::Database(_))
        ));
        assert!(store.get_stats("ana").await.is_err());
        assert!(store.top_rankings(5).await.is_err());

        store.set_offline(false);
        assert!(store.get_stats("ana").await.unwrap().is_none());
    }
}
