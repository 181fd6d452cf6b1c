//! Bundled question set used when the store cannot supply enough questions

use std::collections::HashSet;

use chrono::Utc;
use common::models::{Category, Difficulty, Question};
use common::{Error, Result};
use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::resolver::widening_steps;

const BUNDLED_JSON: &str = include_str!("../data/local_questions.json");

/// Owner recorded on bundled questions
pub const SYSTEM_AUTHOR: &str = "system";

#[derive(Deserialize)]
struct BundledQuestion {
    id: String,
    category: Category,
    difficulty: Difficulty,
    prompt: String,
    correct_answer: String,
    incorrect_answers: [String; 3],
}

/// Static, read-only question set
#[derive(Debug, Clone)]
pub struct LocalBank {
    questions: Vec<Question>,
}

impl LocalBank {
    /// Parse the question set compiled into the binary
    pub fn bundled() -> Result<Self> {
        let bundled: Vec<BundledQuestion> = serde_json::from_str(BUNDLED_JSON)
            .map_err(|e| Error::Internal(format!("bundled questions are malformed: {}", e)))?;

        let created_at = Utc::now();
        let questions = bundled
            .into_iter()
            .map(|q| Question {
                id: q.id,
                category: q.category,
                difficulty: q.difficulty,
                prompt: q.prompt,
                correct_answer: q.correct_answer,
                incorrect_answers: q.incorrect_answers,
                is_public: true,
                created_by: SYSTEM_AUTHOR.to_string(),
                created_at,
            })
            .collect();

        Ok(Self { questions })
    }

    pub fn from_questions(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Questions matching both filters, unshuffled
    pub fn matching(
        &self,
        category: Option<Category>,
        difficulty: Option<Difficulty>,
    ) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(move |q| {
            category.map_or(true, |c| q.category == c)
                && difficulty.map_or(true, |d| q.difficulty == d)
        })
    }

    /// Pick up to `needed` questions not in `exclude`.
    ///
    /// Exact matches come first, then the same widening order the resolver
    /// uses against the store. Each tier is shuffled before picking.
    pub fn fill(
        &self,
        category: Option<Category>,
        difficulty: Option<Difficulty>,
        needed: usize,
        exclude: &HashSet<String>,
    ) -> Vec<Question> {
        let mut picked: Vec<Question> = Vec::new();
        let mut taken: HashSet<&str> = HashSet::new();
        let mut rng = rand::thread_rng();

        for (step_category, step_difficulty) in widening_steps(category, difficulty) {
            if picked.len() >= needed {
                break;
            }

            let mut tier: Vec<&Question> = self
                .matching(step_category, step_difficulty)
                .filter(|q| !exclude.contains(&q.id) && !taken.contains(q.id.as_str()))
                .collect();
            tier.shuffle(&mut rng);

            for q in tier.into_iter().take(needed - picked.len()) {
                taken.insert(q.id.as_str());
                picked.push(q.clone());
            }
        }

        picked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_questions_are_well_formed() {
        let bank = LocalBank::bundled().unwrap();
        assert_eq!(bank.len(), 30);

        let mut ids = HashSet::new();
        for q in bank.questions() {
            assert!(ids.insert(q.id.clone()), "duplicate id {}", q.id);
            assert!(q.is_public);
            assert!(!q.prompt.is_empty());
            assert!(
                !q.incorrect_answers.contains(&q.correct_answer),
                "{} lists its correct answer as incorrect",
                q.id
            );
            let distinct: HashSet<&String> = q.incorrect_answers.iter().collect();
            assert_eq!(distinct.len(), 3, "{} repeats an incorrect answer", q.id);
        }

        for category in Category::ALL {
            assert_eq!(bank.matching(Some(category), None).count(), 5);
        }
    }

    #[test]
    fn test_fill_prefers_exact_matches_then_widens() {
        let bank = LocalBank::bundled().unwrap();
        let picked = bank.fill(
            Some(Category::Science),
            Some(Difficulty::Easy),
            4,
            &HashSet::new(),
        );

        assert_eq!(picked.len(), 4);
        // Both science/easy questions are taken before anything looser
        let exact = picked
            .iter()
            .filter(|q| q.category == Category::Science && q.difficulty == Difficulty::Easy)
            .count();
        assert_eq!(exact, 2);
        // The next tier is the rest of the category
        assert!(picked.iter().all(|q| q.category == Category::Science));
    }

    #[test]
    fn test_fill_skips_excluded_ids() {
        let bank = LocalBank::bundled().unwrap();
        let exclude: HashSet<String> = bank
            .matching(Some(Category::Art), None)
            .map(|q| q.id.clone())
            .collect();

        let picked = bank.fill(Some(Category::Art), None, 3, &exclude);
        assert_eq!(picked.len(), 3);
        assert!(picked.iter().all(|q| !exclude.contains(&q.id)));
        assert!(picked.iter().all(|q| q.category != Category::Art));
    }

    #[test]
    fn test_fill_is_capped_by_bank_size() {
        let bank = LocalBank::bundled().unwrap();
        let picked = bank.fill(None, None, 100, &HashSet::new());
        assert_eq!(picked.len(), bank.len());
    }
}
