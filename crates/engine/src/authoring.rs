//! Player-authored questions

use std::collections::HashSet;

use chrono::Utc;
use common::models::{NewQuestion, Question, QuestionUpdate};
use common::{Error, Result};
use db::Store;
use tracing::{info, warn};

/// Check a submission and turn it into a storable question
pub fn validate(user_id: &str, new: NewQuestion) -> Result<Question> {
    let prompt = new.prompt.trim();
    if prompt.is_empty() {
        return Err(Error::InvalidQuestion("question text is required".to_string()));
    }

    let correct_answer = new.correct_answer.trim();
    if correct_answer.is_empty() {
        return Err(Error::InvalidQuestion("correct answer is required".to_string()));
    }

    let incorrect: Vec<String> = new
        .incorrect_answers
        .iter()
        .map(|a| a.trim().to_string())
        .collect();
    let incorrect_answers: [String; 3] = incorrect.try_into().map_err(|given: Vec<String>| {
        Error::InvalidQuestion(format!(
            "exactly 3 incorrect answers are required, got {}",
            given.len()
        ))
    })?;
    if incorrect_answers.iter().any(|a| a.is_empty()) {
        return Err(Error::InvalidQuestion(
            "incorrect answers cannot be empty".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let all = std::iter::once(correct_answer).chain(incorrect_answers.iter().map(String::as_str));
    for answer in all {
        if !seen.insert(answer.to_lowercase()) {
            return Err(Error::InvalidQuestion(format!(
                "answer '{}' appears more than once",
                answer
            )));
        }
    }

    Ok(Question {
        id: String::new(),
        category: new.category,
        difficulty: new.difficulty,
        prompt: prompt.to_string(),
        correct_answer: correct_answer.to_string(),
        incorrect_answers,
        is_public: new.is_public,
        created_by: user_id.to_string(),
        created_at: Utc::now(),
    })
}

/// Validate and store a question authored by `user_id`, returning its id
pub async fn create_question(store: &dyn Store, user_id: &str, new: NewQuestion) -> Result<String> {
    let question = validate(user_id, new)?;
    let id = store.put_question(&question).await?;
    info!(
        "{} created {} question {} ({}/{})",
        user_id,
        if question.is_public { "public" } else { "private" },
        id,
        question.category,
        question.difficulty
    );
    Ok(id)
}

pub async fn get_question(store: &dyn Store, id: &str) -> Result<Question> {
    store
        .get_question(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Question {} not found", id)))
}

/// Only the author may edit or delete a question
pub async fn can_user_modify_question(store: &dyn Store, id: &str, user_id: &str) -> bool {
    match store.get_question(id).await {
        Ok(Some(question)) => question.created_by == user_id,
        Ok(None) => false,
        Err(e) => {
            warn!("Failed to check ownership of question {}: {}", id, e);
            false
        }
    }
}

async fn owned_question(store: &dyn Store, user_id: &str, id: &str) -> Result<Question> {
    let question = get_question(store, id).await?;
    if question.created_by != user_id {
        return Err(Error::Forbidden(format!(
            "Question {} belongs to another player",
            id
        )));
    }
    Ok(question)
}

/// Apply `update` to a question owned by `user_id`.
///
/// The merged question goes through the same checks as a new one. Its id,
/// author and creation time never change.
pub async fn update_question(
    store: &dyn Store,
    user_id: &str,
    id: &str,
    update: QuestionUpdate,
) -> Result<Question> {
    let existing = owned_question(store, user_id, id).await?;

    let merged = NewQuestion {
        category: update.category.unwrap_or(existing.category),
        difficulty: update.difficulty.unwrap_or(existing.difficulty),
        prompt: update.prompt.unwrap_or(existing.prompt),
        correct_answer: update.correct_answer.unwrap_or(existing.correct_answer),
        incorrect_answers: update
            .incorrect_answers
            .unwrap_or_else(|| existing.incorrect_answers.to_vec()),
        is_public: update.is_public.unwrap_or(existing.is_public),
    };
    let question = Question {
        id: existing.id,
        created_by: existing.created_by,
        created_at: existing.created_at,
        ..validate(user_id, merged)?
    };

    store.update_question(&question).await?;
    info!("{} updated question {}", user_id, id);
    Ok(question)
}

/// Delete a question owned by `user_id`
pub async fn delete_question(store: &dyn Store, user_id: &str, id: &str) -> Result<()> {
    owned_question(store, user_id, id).await?;
    store.delete_question(id).await?;
    info!("{} deleted question {}", user_id, id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::{Category, Difficulty, QuestionFilter, QuestionUpdate};
    use db::MemoryStore;

    fn submission() -> NewQuestion {
        NewQuestion {
            category: Category::Geography,
            difficulty: Difficulty::Medium,
            prompt: "  What is the capital of Canada? ".to_string(),
            correct_answer: "Ottawa".to_string(),
            incorrect_answers: vec![
                "Toronto".to_string(),
                "Vancouver".to_string(),
                " Montreal ".to_string(),
            ],
            is_public: false,
        }
    }

    #[test]
    fn test_valid_submission_is_trimmed() {
        let question = validate("ana", submission()).unwrap();
        assert_eq!(question.prompt, "What is the capital of Canada?");
        assert_eq!(question.incorrect_answers[2], "Montreal");
        assert_eq!(question.created_by, "ana");
        assert!(!question.is_public);
    }

    #[test]
    fn test_rejects_missing_fields() {
        let mut new = submission();
        new.prompt = "   ".to_string();
        assert!(matches!(validate("ana", new), Err(Error::InvalidQuestion(_))));

        let mut new = submission();
        new.correct_answer = String::new();
        assert!(matches!(validate("ana", new), Err(Error::InvalidQuestion(_))));

        let mut new = submission();
        new.incorrect_answers[1] = " ".to_string();
        assert!(matches!(validate("ana", new), Err(Error::InvalidQuestion(_))));
    }

    #[test]
    fn test_rejects_wrong_number_of_incorrect_answers() {
        let mut new = submission();
        new.incorrect_answers.pop();
        assert!(matches!(validate("ana", new), Err(Error::InvalidQuestion(_))));

        let mut new = submission();
        new.incorrect_answers.push("Quebec".to_string());
        assert!(matches!(validate("ana", new), Err(Error::InvalidQuestion(_))));
    }

    #[test]
    fn test_rejects_duplicate_answers_ignoring_case() {
        let mut new = submission();
        new.incorrect_answers[0] = "ottawa".to_string();
        assert!(matches!(validate("ana", new), Err(Error::InvalidQuestion(_))));
    }

    #[tokio::test]
    async fn test_create_question_stores_private_question() {
        let store = MemoryStore::new();
        let id = create_question(&store, "ana", submission()).await.unwrap();

        let mine = store
            .get_questions(&QuestionFilter {
                created_by: Some("ana".to_string()),
                is_public: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, id);
    }

    #[tokio::test]
    async fn test_only_the_author_can_modify() {
        let store = MemoryStore::new();
        let id = create_question(&store, "ana", submission()).await.unwrap();

        assert!(can_user_modify_question(&store, &id, "ana").await);
        assert!(!can_user_modify_question(&store, &id, "bo").await);
        assert!(!can_user_modify_question(&store, "missing", "ana").await);

        let update = QuestionUpdate {
            prompt: Some("Hijacked?".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            update_question(&store, "bo", &id, update).await,
            Err(Error::Forbidden(_))
        ));
        assert!(matches!(
            delete_question(&store, "bo", &id).await,
            Err(Error::Forbidden(_))
        ));

        let stored = get_question(&store, &id).await.unwrap();
        assert_eq!(stored.prompt, "What is the capital of Canada?");
    }

    #[tokio::test]
    async fn test_missing_question_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            get_question(&store, "missing").await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            update_question(&store, "ana", "missing", QuestionUpdate::default()).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            delete_question(&store, "ana", "missing").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_merges_and_revalidates() {
        let store = MemoryStore::new();
        let id = create_question(&store, "ana", submission()).await.unwrap();
        let created = get_question(&store, &id).await.unwrap();

        let update = QuestionUpdate {
            difficulty: Some(Difficulty::Hard),
            is_public: Some(true),
            ..Default::default()
        };
        let updated = update_question(&store, "ana", &id, update).await.unwrap();
        assert_eq!(updated.id, id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.points(), Difficulty::Hard.points());
        assert_eq!(updated.correct_answer, "Ottawa");

        let stored = get_question(&store, &id).await.unwrap();
        assert_eq!(stored.difficulty, Difficulty::Hard);
        assert!(stored.is_public);

        // A clash between the new correct answer and an old wrong one
        let update = QuestionUpdate {
            correct_answer: Some("toronto".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            update_question(&store, "ana", &id, update).await,
            Err(Error::InvalidQuestion(_))
        ));
        assert_eq!(get_question(&store, &id).await.unwrap().correct_answer, "Ottawa");
    }

    #[tokio::test]
    async fn test_delete_removes_question() {
        let store = MemoryStore::new();
        let id = create_question(&store, "ana", submission()).await.unwrap();

        delete_question(&store, "ana", &id).await.unwrap();
        assert!(store.get_question(&id).await.unwrap().is_none());
        assert!(matches!(
            delete_question(&store, "ana", &id).await,
            Err(Error::NotFound(_))
        ));
    }
}
