//! Shared fixtures for engine tests

use std::sync::Arc;

use chrono::{Duration, Utc};
use common::models::{Category, Difficulty, GameMode, Question, QuestionPool};
use common::GameConfig;
use db::MemoryStore;

use crate::game::GameEngine;
use crate::local::LocalBank;
use crate::session::StartRequest;

pub const CORRECT: &str = "right";
pub const WRONG: &str = "wrong";

pub fn question(id: &str, category: Category, difficulty: Difficulty, is_public: bool) -> Question {
    Question {
        id: id.to_string(),
        category,
        difficulty,
        prompt: format!("Question {}?", id),
        correct_answer: CORRECT.to_string(),
        incorrect_answers: [WRONG.to_string(), "nope".to_string(), "never".to_string()],
        is_public,
        created_by: "author".to_string(),
        created_at: Utc::now(),
    }
}

/// `n` public questions, each a minute older than the last
pub fn questions(prefix: &str, category: Category, difficulty: Difficulty, n: usize) -> Vec<Question> {
    (0..n)
        .map(|i| {
            let mut q = question(&format!("{}-{}", prefix, i), category, difficulty, true);
            q.created_at = Utc::now() - Duration::minutes(i as i64);
            q
        })
        .collect()
}

/// Private questions authored by `user_id`
pub fn private_questions(user_id: &str, n: usize) -> Vec<Question> {
    (0..n)
        .map(|i| {
            let mut q = question(
                &format!("{}-own-{}", user_id, i),
                Category::Entertainment,
                Difficulty::Medium,
                false,
            );
            q.created_by = user_id.to_string();
            q
        })
        .collect()
}

pub fn request(user_id: &str, mode: GameMode) -> StartRequest {
    StartRequest {
        user_id: user_id.to_string(),
        username: Some(format!("{} name", user_id)),
        mode,
        category: None,
        difficulty: None,
        pool: QuestionPool::Public,
    }
}

pub fn engine(store: Arc<MemoryStore>) -> GameEngine {
    engine_with_bank(store, LocalBank::from_questions(Vec::new()))
}

pub fn engine_with_bank(store: Arc<MemoryStore>, bank: LocalBank) -> GameEngine {
    GameEngine::with_local_bank(store, bank, GameConfig::default())
}
