//! API routes

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub mod categories;
pub mod games;
pub mod health;
pub mod leaderboard;
pub mod users;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/games", post(games::start))
        .route("/api/games/:id", get(games::get).delete(games::abandon))
        .route("/api/games/:id/answers", post(games::answer))
        .route("/api/games/:id/finish", post(games::finish))
        .route("/api/leaderboard", get(leaderboard::global))
        .route("/api/categories", get(categories::list))
        .route("/api/users/:user_id/stats", get(users::stats))
        .route("/api/users/:user_id/rank", get(users::rank))
        .route("/api/users/:user_id/history", get(users::history))
        .route(
            "/api/users/:user_id/questions",
            get(users::own_questions).post(users::create_question),
        )
        .route(
            "/api/users/:user_id/questions/:question_id",
            get(users::get_question)
                .put(users::update_question)
                .delete(users::delete_question),
        )
        .with_state(state)
}
