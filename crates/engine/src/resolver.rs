//! Question sourcing for new sessions
//!
//! Public play widens its search against the store step by step:
//! 1. category and difficulty
//! 2. category only
//! 3. difficulty only
//! 4. any public question
//!
//! and stops as soon as enough unique questions are collected. Any shortfall
//! is filled from the bundled [`LocalBank`]. If the store cannot be reached
//! the bundled set is used on its own.
//!
//! Private play ("my questions") only ever uses the player's own questions.

use std::collections::HashSet;
use std::sync::Arc;

use common::models::{Category, Difficulty, Question, QuestionFilter};
use db::Store;
use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::local::LocalBank;

/// Whether a player's private bank is big enough to play
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnBankStatus {
    pub can_play: bool,
    pub count: usize,
    pub message: String,
}

/// Filter combinations to try, strictest first. Always ends with "any".
pub(crate) fn widening_steps(
    category: Option<Category>,
    difficulty: Option<Difficulty>,
) -> Vec<(Option<Category>, Option<Difficulty>)> {
    let mut steps = Vec::with_capacity(4);
    if category.is_some() && difficulty.is_some() {
        steps.push((category, difficulty));
    }
    if category.is_some() {
        steps.push((category, None));
    }
    if difficulty.is_some() {
        steps.push((None, difficulty));
    }
    steps.push((None, None));
    steps
}

/// Looser steps ask the store for more rows, since more of them overlap
fn step_limit(step: (Option<Category>, Option<Difficulty>), count: usize) -> usize {
    match step {
        (Some(_), Some(_)) => count,
        (None, None) => count * 3,
        _ => count * 2,
    }
}

fn shuffle(questions: &mut [Question]) {
    questions.shuffle(&mut rand::thread_rng());
}

/// Produces question lists for new sessions
pub struct QuestionResolver {
    store: Arc<dyn Store>,
    local: LocalBank,
}

impl QuestionResolver {
    pub fn new(store: Arc<dyn Store>, local: LocalBank) -> Self {
        Self { store, local }
    }

    pub fn local(&self) -> &LocalBank {
        &self.local
    }

    /// Questions for classic and timed play.
    ///
    /// Returns exactly `count` questions whenever the store and the bundled
    /// set hold that many between them, otherwise everything found. The
    /// result is shuffled and free of duplicate ids.
    pub async fn resolve_questions(
        &self,
        category: Option<Category>,
        difficulty: Option<Difficulty>,
        count: usize,
    ) -> Vec<Question> {
        if count == 0 {
            return Vec::new();
        }

        let mut remote: Vec<Question> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut store_failed = false;

        for step in widening_steps(category, difficulty) {
            if remote.len() >= count {
                break;
            }

            let filter = QuestionFilter {
                category: step.0,
                difficulty: step.1,
                limit: Some(step_limit(step, count)),
                ..QuestionFilter::public()
            };

            match self.store.get_questions(&filter).await {
                Ok(found) => {
                    let before = remote.len();
                    for q in found {
                        if seen.insert(q.id.clone()) {
                            remote.push(q);
                        }
                    }
                    debug!(
                        "Step {:?}/{:?}: {} new questions ({} total)",
                        step.0,
                        step.1,
                        remote.len() - before,
                        remote.len()
                    );
                }
                Err(e) => {
                    warn!("Question store unavailable, using bundled questions only: {}", e);
                    store_failed = true;
                    break;
                }
            }
        }

        if store_failed {
            remote.clear();
        }

        shuffle(&mut remote);
        remote.truncate(count);
        let mut questions = remote;

        if questions.len() < count {
            let exclude: HashSet<String> = questions.iter().map(|q| q.id.clone()).collect();
            let fill = self
                .local
                .fill(category, difficulty, count - questions.len(), &exclude);
            info!(
                "Store supplied {} of {} questions, adding {} bundled",
                questions.len(),
                count,
                fill.len()
            );
            questions.extend(fill);
        }

        shuffle(&mut questions);
        questions.truncate(count);
        questions
    }

    /// Questions from the player's own private bank. Never falls back to
    /// public or bundled questions; store failures yield an empty list.
    pub async fn resolve_user_questions(
        &self,
        user_id: &str,
        category: Option<Category>,
        difficulty: Option<Difficulty>,
        count: usize,
    ) -> Vec<Question> {
        let filter = QuestionFilter {
            category,
            difficulty,
            created_by: Some(user_id.to_string()),
            is_public: Some(false),
            limit: None,
        };

        match self.store.get_questions(&filter).await {
            Ok(mut questions) => {
                shuffle(&mut questions);
                questions.truncate(count);
                info!("Loaded {} private questions for {}", questions.len(), user_id);
                questions
            }
            Err(e) => {
                warn!("Failed to load private questions for {}: {}", user_id, e);
                Vec::new()
            }
        }
    }

    /// Whether `user_id` has authored at least `min_required` private questions
    pub async fn can_play_own_questions(&self, user_id: &str, min_required: usize) -> OwnBankStatus {
        let filter = QuestionFilter {
            created_by: Some(user_id.to_string()),
            is_public: Some(false),
            ..Default::default()
        };

        let count = match self.store.count_questions(&filter).await {
            Ok(count) => count,
            Err(e) => {
                warn!("Failed to count private questions for {}: {}", user_id, e);
                0
            }
        };

        let can_play = count >= min_required;
        let message = if can_play {
            format!("You have {} questions available", count)
        } else {
            format!(
                "You need to create at least {} more questions ({}/{})",
                min_required - count,
                count,
                min_required
            )
        };

        OwnBankStatus {
            can_play,
            count,
            message,
        }
    }

    /// Public questions in a category, counting the bundled set when the store is down
    pub async fn count_public_by_category(&self, category: Category) -> usize {
        let filter = QuestionFilter {
            category: Some(category),
            ..QuestionFilter::public()
        };

        match self.store.count_questions(&filter).await {
            Ok(count) => count,
            Err(e) => {
                warn!("Failed to count {} questions: {}", category, e);
                self.local.matching(Some(category), None).count()
            }
        }
    }
}
