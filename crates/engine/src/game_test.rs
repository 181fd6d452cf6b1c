use std::sync::Arc;

use common::models::{Category, Difficulty, GameMode, NewQuestion, QuestionPool};
use common::Error;
use db::{MemoryStore, Store};

use crate::local::LocalBank;
use crate::testing::{self, CORRECT, WRONG};

#[tokio::test]
async fn test_full_game_updates_store_stats_and_leaderboard() {
    let store = Arc::new(MemoryStore::with_questions(testing::questions(
        "sci",
        Category::Science,
        Difficulty::Easy,
        10,
    )));
    let engine = testing::engine(store.clone());

    let mut request = testing::request("ana", GameMode::Classic);
    request.category = Some(Category::Science);
    request.difficulty = Some(Difficulty::Easy);
    let mut session = engine.start_game(request).await.unwrap();
    assert_eq!(session.questions().len(), 10);
    assert!(store.session(session.id()).await.is_some());

    while !session.is_finished() {
        engine.submit_answer(&mut session, CORRECT, 2_000).await.unwrap();
    }

    let stored = store.session(session.id()).await.unwrap();
    assert_eq!(stored.answers.len(), 10);
    assert_eq!(stored.score, 100);
    assert_eq!(stored.max_streak, 10);
    assert!(stored.ended_at.is_some());

    let outcome = engine.finish_game(session).await;
    assert_eq!(outcome.result.score, 100);
    assert_eq!(outcome.result.accuracy, 100.0);
    assert_eq!(outcome.result.username, "ana name");

    let stats = outcome.stats.unwrap();
    assert_eq!(stats.total_games, 1);
    assert_eq!(stats.total_wins, 1);
    assert_eq!(stats.max_streak, 10);
    assert_eq!(stats.games_per_category[&Category::Science], 1);

    let history = engine.history("ana", 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, outcome.result.id);

    let (entry, position) = engine.ranking("ana").await.unwrap();
    assert_eq!(position, 1);
    assert_eq!(entry.total_points, 100);
    assert_eq!(engine.leaderboard(5).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_start_fails_without_any_questions() {
    let store = Arc::new(MemoryStore::new());
    let engine = testing::engine(store);

    let result = engine
        .start_game(testing::request("ana", GameMode::Timed))
        .await;
    assert!(matches!(result, Err(Error::NoQuestions(_))));
}

#[tokio::test]
async fn test_store_failures_do_not_interrupt_play() {
    let store = Arc::new(MemoryStore::new());
    store.set_offline(true);
    let engine = testing::engine_with_bank(store.clone(), LocalBank::bundled().unwrap());

    let mut session = engine
        .start_game(testing::request("ana", GameMode::Timed))
        .await
        .unwrap();
    assert_eq!(session.questions().len(), 10);

    let outcome = engine
        .submit_answer(&mut session, WRONG, 1_000)
        .await
        .unwrap();
    assert_eq!(outcome.lives, 2);

    let outcome = engine.finish_game(session).await;
    assert!(outcome.stats.is_none());
    assert_eq!(outcome.result.incorrect_answers, 1);

    store.set_offline(false);
    assert!(store.get_stats("ana").await.unwrap().is_none());
}

#[tokio::test]
async fn test_finishing_early_scores_partial_game() {
    let store = Arc::new(MemoryStore::with_questions(testing::questions(
        "art",
        Category::Art,
        Difficulty::Hard,
        10,
    )));
    let engine = testing::engine(store.clone());

    let mut session = engine
        .start_game(testing::request("ana", GameMode::Classic))
        .await
        .unwrap();
    let id = session.id();
    engine.submit_answer(&mut session, CORRECT, 1_000).await.unwrap();
    engine.submit_answer(&mut session, WRONG, 1_000).await.unwrap();

    let outcome = engine.finish_game(session).await;
    assert_eq!(outcome.result.score, 30);
    assert_eq!(outcome.result.accuracy, 50.0);
    assert!(store.session(id).await.unwrap().ended_at.is_some());

    let stats = outcome.stats.unwrap();
    assert_eq!(stats.total_wins, 0);
    assert_eq!(stats.current_streak, 0);
}

#[tokio::test]
async fn test_abandon_records_nothing() {
    let store = Arc::new(MemoryStore::with_questions(testing::questions(
        "geo",
        Category::Geography,
        Difficulty::Medium,
        10,
    )));
    let engine = testing::engine(store.clone());

    let mut session = engine
        .start_game(testing::request("ana", GameMode::Classic))
        .await
        .unwrap();
    let id = session.id();
    engine.submit_answer(&mut session, CORRECT, 1_000).await.unwrap();
    engine.abandon_game(session).await;

    assert!(store.session(id).await.unwrap().ended_at.is_some());
    assert!(engine.history("ana", 10).await.unwrap().is_empty());
    assert_eq!(engine.stats("ana").await.unwrap().total_games, 0);
    assert!(matches!(engine.ranking("ana").await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_own_pool_requires_authored_questions() {
    let mut stored = testing::private_questions("ana", 3);
    stored.extend(testing::questions("pub", Category::Art, Difficulty::Easy, 10));
    let store = Arc::new(MemoryStore::with_questions(stored));
    let engine = testing::engine_with_bank(store, LocalBank::bundled().unwrap());

    let status = engine.can_play_own_questions("ana").await;
    assert!(!status.can_play);
    assert_eq!(
        status.message,
        "You need to create at least 7 more questions (3/10)"
    );

    let mut request = testing::request("ana", GameMode::Classic);
    request.pool = QuestionPool::Own;
    let session = engine.start_game(request).await.unwrap();
    assert_eq!(session.questions().len(), 3);
    assert!(session.questions().iter().all(|q| q.created_by == "ana"));

    let mut request = testing::request("bo", GameMode::Classic);
    request.pool = QuestionPool::Own;
    assert!(matches!(
        engine.start_game(request).await,
        Err(Error::NoQuestions(_))
    ));
}

#[tokio::test]
async fn test_created_questions_count_towards_own_bank() {
    let store = Arc::new(MemoryStore::new());
    let engine = testing::engine(store);

    for i in 0..10 {
        engine
            .create_question(
                "ana",
                NewQuestion {
                    category: Category::History,
                    difficulty: Difficulty::Easy,
                    prompt: format!("Question number {}?", i),
                    correct_answer: format!("answer {}", i),
                    incorrect_answers: vec!["a".to_string(), "b".to_string(), "c".to_string()],
                    is_public: false,
                },
            )
            .await
            .unwrap();
    }

    let status = engine.can_play_own_questions("ana").await;
    assert!(status.can_play);
    assert_eq!(status.count, 10);
    assert_eq!(engine.stats("ana").await.unwrap().questions_created, 10);
}

#[tokio::test]
async fn test_question_count_kept_alongside_game_stats() {
    let store = Arc::new(MemoryStore::new());
    let engine = testing::engine(store.clone());
    let new = NewQuestion {
        category: Category::Art,
        difficulty: Difficulty::Hard,
        prompt: "Who sculpted David?".to_string(),
        correct_answer: "Michelangelo".to_string(),
        incorrect_answers: vec!["Donatello".to_string(), "Bernini".to_string(), "Rodin".to_string()],
        is_public: true,
    };

    let id = engine.create_question("ana", new.clone()).await.unwrap();
    assert!(engine.can_modify_question(&id, "ana").await);
    assert!(!engine.can_modify_question(&id, "bo").await);

    // Games played before and after keep the counter
    let mut stats = store.get_stats("ana").await.unwrap().unwrap();
    assert_eq!(stats.questions_created, 1);
    stats.total_games = 4;
    store.put_stats(&stats).await.unwrap();
    engine.create_question("ana", new).await.unwrap();

    let stats = engine.stats("ana").await.unwrap();
    assert_eq!(stats.questions_created, 2);
    assert_eq!(stats.total_games, 4);

    engine.delete_question("ana", &id).await.unwrap();
    assert!(matches!(engine.get_question(&id).await, Err(Error::NotFound(_))));
}
