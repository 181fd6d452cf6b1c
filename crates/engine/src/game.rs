//! Orchestrates sessions against the store
//!
//! The [`GameSession`] state machine is pure; this layer adds the side
//! effects around it. Writes made while a game is in progress (session
//! header, answers, finish marker, result, stats) are best effort: a store
//! failure is logged and gameplay carries on.

use std::sync::Arc;

use chrono::Utc;
use common::models::{
    GameResult, NewQuestion, Question, QuestionPool, QuestionUpdate, RankingEntry, UserStats,
};
use common::{Error, GameConfig, Result};
use db::Store;
use serde::Serialize;
use tracing::{info, warn};

use crate::aggregator::StatsAggregator;
use crate::authoring;
use crate::local::LocalBank;
use crate::resolver::{OwnBankStatus, QuestionResolver};
use crate::session::{AnswerOutcome, GameSession};

pub use crate::session::StartRequest;

/// Final state of a finished session
#[derive(Debug, Clone, Serialize)]
pub struct GameOutcome {
    pub result: GameResult,
    /// Updated stats, `None` when they could not be saved
    pub stats: Option<UserStats>,
}

pub struct GameEngine {
    store: Arc<dyn Store>,
    resolver: QuestionResolver,
    aggregator: StatsAggregator,
    config: GameConfig,
}

impl GameEngine {
    /// Engine backed by `store`, falling back to the bundled question set
    pub fn new(store: Arc<dyn Store>, config: GameConfig) -> Result<Self> {
        Ok(Self::with_local_bank(store, LocalBank::bundled()?, config))
    }

    pub fn with_local_bank(store: Arc<dyn Store>, local: LocalBank, config: GameConfig) -> Self {
        Self {
            resolver: QuestionResolver::new(store.clone(), local),
            aggregator: StatsAggregator::new(store.clone(), config.clone()),
            store,
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn resolver(&self) -> &QuestionResolver {
        &self.resolver
    }

    pub fn aggregator(&self) -> &StatsAggregator {
        &self.aggregator
    }

    /// Resolve questions and open a new session.
    ///
    /// Fails with [`Error::NoQuestions`] when nothing could be resolved; no
    /// session is created or persisted in that case.
    pub async fn start_game(&self, request: StartRequest) -> Result<GameSession> {
        let count = self.config.questions_per_game;
        let questions = match request.pool {
            QuestionPool::Public => {
                self.resolver
                    .resolve_questions(request.category, request.difficulty, count)
                    .await
            }
            QuestionPool::Own => {
                self.resolver
                    .resolve_user_questions(
                        &request.user_id,
                        request.category,
                        request.difficulty,
                        count,
                    )
                    .await
            }
        };

        let session = GameSession::start(&request, questions, &self.config, Utc::now())?;

        if let Err(e) = self.store.create_session(&session.record()).await {
            warn!("Failed to persist session {}: {}", session.id(), e);
        }
        info!(
            "Started {} session {} for {} with {} questions",
            session.mode().as_str(),
            session.id(),
            session.user_id(),
            session.questions().len()
        );

        Ok(session)
    }

    /// Answer the current question and persist the answer.
    ///
    /// Returns `None` when the session is already finished.
    pub async fn submit_answer(
        &self,
        session: &mut GameSession,
        answer: &str,
        time_spent_ms: u64,
    ) -> Option<AnswerOutcome> {
        let outcome = session.submit_answer(answer, time_spent_ms, Utc::now())?;

        if let Err(e) = self
            .store
            .append_answer(
                session.id(),
                &outcome.answer,
                outcome.score,
                outcome.streak,
                outcome.max_streak,
            )
            .await
        {
            warn!("Failed to persist answer for session {}: {}", session.id(), e);
        }

        if outcome.finished {
            self.persist_finished(session).await;
        }

        Some(outcome)
    }

    /// Finalize a session: record its result and fold it into the player's
    /// stats. Consumes the session, so a result is applied at most once.
    pub async fn finish_game(&self, mut session: GameSession) -> GameOutcome {
        if !session.is_finished() {
            session.finish(Utc::now());
            self.persist_finished(&session).await;
        }

        let result = session.result();

        if let Err(e) = self.store.record_result(&result).await {
            warn!("Failed to record result {}: {}", result.id, e);
        }

        let stats = match self.aggregator.apply_result(&result).await {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!("Failed to update stats for {}: {}", result.user_id, e);
                None
            }
        };

        info!(
            "Finished session {} for {}: {} points, {:.0}% accuracy",
            result.id, result.user_id, result.score, result.accuracy
        );

        GameOutcome { result, stats }
    }

    /// Drop a session without recording a result
    pub async fn abandon_game(&self, mut session: GameSession) {
        if !session.is_finished() {
            session.finish(Utc::now());
            self.persist_finished(&session).await;
        }
        info!("Abandoned session {} for {}", session.id(), session.user_id());
    }

    async fn persist_finished(&self, session: &GameSession) {
        let ended_at = session.ended_at().unwrap_or_else(Utc::now);
        if let Err(e) = self.store.mark_finished(session.id(), ended_at).await {
            warn!("Failed to mark session {} finished: {}", session.id(), e);
        }
    }

    /// Most recent results for a player
    pub async fn history(&self, user_id: &str, limit: usize) -> Result<Vec<GameResult>> {
        self.store.game_history(user_id, limit).await
    }

    pub async fn stats(&self, user_id: &str) -> Result<UserStats> {
        self.aggregator.stats(user_id).await
    }

    pub async fn leaderboard(&self, limit: usize) -> Result<Vec<RankingEntry>> {
        self.aggregator.top_n(limit).await
    }

    /// Leaderboard row and 1-based position
    pub async fn ranking(&self, user_id: &str) -> Result<(RankingEntry, usize)> {
        let entry = self
            .aggregator
            .entry(user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("no ranking for {}", user_id)))?;
        let position = self
            .aggregator
            .position(user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("no ranking for {}", user_id)))?;
        Ok((entry, position))
    }

    pub async fn create_question(&self, user_id: &str, new: NewQuestion) -> Result<String> {
        let id = authoring::create_question(self.store.as_ref(), user_id, new).await?;
        self.aggregator.record_question_created(user_id).await;
        Ok(id)
    }

    pub async fn get_question(&self, id: &str) -> Result<Question> {
        authoring::get_question(self.store.as_ref(), id).await
    }

    pub async fn update_question(
        &self,
        user_id: &str,
        id: &str,
        update: QuestionUpdate,
    ) -> Result<Question> {
        authoring::update_question(self.store.as_ref(), user_id, id, update).await
    }

    pub async fn delete_question(&self, user_id: &str, id: &str) -> Result<()> {
        authoring::delete_question(self.store.as_ref(), user_id, id).await
    }

    pub async fn can_modify_question(&self, id: &str, user_id: &str) -> bool {
        authoring::can_user_modify_question(self.store.as_ref(), id, user_id).await
    }

    pub async fn can_play_own_questions(&self, user_id: &str) -> OwnBankStatus {
        self.resolver
            .can_play_own_questions(user_id, self.config.min_own_questions)
            .await
    }
}
