//! Player routes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use common::models::{GameResult, NewQuestion, Question, QuestionUpdate, RankingEntry, UserStats};
use engine::OwnBankStatus;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

#[derive(Serialize)]
pub struct RankResponse {
    pub position: usize,
    #[serde(flatten)]
    pub entry: RankingEntry,
}

#[derive(Serialize)]
pub struct CreatedQuestion {
    pub id: String,
}

pub async fn stats(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserStats>> {
    Ok(Json(state.engine.stats(&user_id).await?))
}

pub async fn rank(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<RankResponse>> {
    let (entry, position) = state.engine.ranking(&user_id).await?;
    Ok(Json(RankResponse { position, entry }))
}

pub async fn history(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<GameResult>>> {
    let history = state
        .engine
        .history(&user_id, query.limit.clamp(1, 100))
        .await?;
    Ok(Json(history))
}

/// Whether the player can start a game from their own questions
pub async fn own_questions(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Json<OwnBankStatus> {
    Json(state.engine.can_play_own_questions(&user_id).await)
}

pub async fn create_question(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(req): Json<NewQuestion>,
) -> ApiResult<(StatusCode, Json<CreatedQuestion>)> {
    let id = state.engine.create_question(&user_id, req).await?;
    Ok((StatusCode::CREATED, Json(CreatedQuestion { id })))
}

/// An authored question with its answers, visible to its author only
pub async fn get_question(
    State(state): State<Arc<AppState>>,
    Path((user_id, question_id)): Path<(String, String)>,
) -> ApiResult<Json<Question>> {
    let question = state.engine.get_question(&question_id).await?;
    if question.created_by != user_id {
        return Err(ApiError::Forbidden(format!(
            "Question {} belongs to another player",
            question_id
        )));
    }
    Ok(Json(question))
}

pub async fn update_question(
    State(state): State<Arc<AppState>>,
    Path((user_id, question_id)): Path<(String, String)>,
    Json(req): Json<QuestionUpdate>,
) -> ApiResult<Json<Question>> {
    let question = state
        .engine
        .update_question(&user_id, &question_id, req)
        .await?;
    Ok(Json(question))
}

pub async fn delete_question(
    State(state): State<Arc<AppState>>,
    Path((user_id, question_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state.engine.delete_question(&user_id, &question_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
