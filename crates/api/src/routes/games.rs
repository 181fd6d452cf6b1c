//! Game session routes

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use common::models::{Category, Difficulty, GameMode, Question};
use engine::{AnswerOutcome, GameOutcome, GameSession, Progress, StartRequest};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, OptionExt};
use crate::state::AppState;

/// A question as shown to the player, without revealing the answer
#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub id: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub prompt: String,
    pub options: Vec<String>,
    pub points: u32,
}

impl From<&Question> for QuestionView {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id.clone(),
            category: q.category,
            difficulty: q.difficulty,
            prompt: q.prompt.clone(),
            options: q.options(),
            points: q.points(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GameView {
    pub id: Uuid,
    pub user_id: String,
    pub username: String,
    pub mode: GameMode,
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
    pub progress: Progress,
    pub question: Option<QuestionView>,
}

impl From<&GameSession> for GameView {
    fn from(session: &GameSession) -> Self {
        Self {
            id: session.id(),
            user_id: session.user_id().to_string(),
            username: session.username().to_string(),
            mode: session.mode(),
            category: session.category(),
            difficulty: session.difficulty(),
            progress: session.progress(),
            question: session.current_question().map(QuestionView::from),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    /// Empty or missing when the timer ran out
    #[serde(default)]
    pub answer: String,
    pub time_spent_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    #[serde(flatten)]
    pub outcome: AnswerOutcome,
    pub next_question: Option<QuestionView>,
}

/// Start a game, replacing the player's previous one
pub async fn start(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartRequest>,
) -> ApiResult<(StatusCode, Json<GameView>)> {
    if req.user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("user_id is required".to_string()));
    }

    let session = state.engine.start_game(req).await?;
    let view = GameView::from(&session);

    if let Some(previous) = state.sessions.insert(session).await {
        // A game that already ended still gets its result recorded
        if previous.is_finished() {
            state.engine.finish_game(previous).await;
        } else {
            state.engine.abandon_game(previous).await;
        }
    }

    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<GameView>> {
    let handle = state
        .sessions
        .get(id)
        .await
        .not_found(format!("Game {} not found", id))?;
    let guard = handle.lock().await;
    let session = guard
        .as_ref()
        .not_found(format!("Game {} not found", id))?;
    Ok(Json(GameView::from(session)))
}

/// Answer the current question
pub async fn answer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> ApiResult<Json<AnswerResponse>> {
    let handle = state
        .sessions
        .get(id)
        .await
        .not_found(format!("Game {} not found", id))?;
    let mut guard = handle.lock().await;
    // Emptied when the game was finished or abandoned meanwhile
    let session = guard
        .as_mut()
        .ok_or_else(|| ApiError::Conflict(format!("Game {} has ended", id)))?;

    let outcome = state
        .engine
        .submit_answer(session, &req.answer, req.time_spent_ms)
        .await
        .ok_or_else(|| ApiError::Conflict(format!("Game {} is already finished", id)))?;
    debug!(
        "Game {}: answer {} ({} points)",
        id,
        if outcome.answer.is_correct { "correct" } else { "wrong" },
        outcome.answer.points_earned
    );

    Ok(Json(AnswerResponse {
        next_question: session.current_question().map(QuestionView::from),
        outcome,
    }))
}

/// End a game and record its result. Ends unfinished games early.
pub async fn finish(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<GameOutcome>> {
    let session = state
        .sessions
        .remove(id)
        .await
        .not_found(format!("Game {} not found", id))?;
    Ok(Json(state.engine.finish_game(session).await))
}

/// Drop a game without recording anything
pub async fn abandon(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let session = state
        .sessions
        .remove(id)
        .await
        .not_found(format!("Game {} not found", id))?;
    state.engine.abandon_game(session).await;
    Ok(StatusCode::NO_CONTENT)
}
