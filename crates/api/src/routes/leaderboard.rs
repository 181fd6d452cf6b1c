//! Leaderboard routes

use axum::{
    extract::{Query, State},
    Json,
};
use common::models::RankingEntry;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    25
}

pub async fn global(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult<Json<Vec<RankingEntry>>> {
    let leaderboard = state.engine.leaderboard(query.limit.clamp(1, 100)).await?;
    Ok(Json(leaderboard))
}
