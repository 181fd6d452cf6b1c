//! Category routes

use axum::{extract::State, Json};
use common::models::Category;
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub questions: usize,
}

/// Public question count for every category
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<CategoryCount>> {
    let resolver = state.engine.resolver();
    let mut counts = Vec::with_capacity(Category::ALL.len());
    for category in Category::ALL {
        counts.push(CategoryCount {
            category,
            questions: resolver.count_public_by_category(category).await,
        });
    }
    Json(counts)
}
