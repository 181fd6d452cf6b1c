//! Game session state machine
//!
//! A [`GameSession`] is the handle for one play-through. It starts in
//! [`SessionStatus::Playing`] and moves to [`SessionStatus::Finished`] when
//! the question list is exhausted or the player runs out of lives. Status
//! never moves backwards and each accepted answer mutates the session once.

use chrono::{DateTime, Utc};
use common::models::{
    Category, Difficulty, GameMode, GameResult, Question, QuestionPool, SessionRecord, UserAnswer,
};
use common::{Error, GameConfig, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::scoring;

/// Display name used when the caller does not supply one
pub const DEFAULT_USERNAME: &str = "Player";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Playing,
    Finished,
}

/// Everything needed to start a session, apart from the questions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRequest {
    pub user_id: String,
    #[serde(default)]
    pub username: Option<String>,
    pub mode: GameMode,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub pool: QuestionPool,
}

/// What a single answer did to the session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerOutcome {
    pub answer: UserAnswer,
    pub correct_answer: String,
    pub score: u32,
    pub lives: u32,
    pub streak: u32,
    pub max_streak: u32,
    pub finished: bool,
}

/// Read-only view for rendering gameplay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    /// 1-based number of the question being shown, capped at `total`
    pub current: usize,
    pub total: usize,
    pub answered: usize,
    pub score: u32,
    pub lives: u32,
    pub streak: u32,
    pub max_streak: u32,
    pub status: SessionStatus,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    id: Uuid,
    user_id: String,
    username: String,
    mode: GameMode,
    category: Option<Category>,
    difficulty: Option<Difficulty>,
    questions: Vec<Question>,
    current_question_index: usize,
    answers: Vec<UserAnswer>,
    score: u32,
    lives: u32,
    streak: u32,
    max_streak: u32,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    status: SessionStatus,
    timer_seconds: f64,
}

impl GameSession {
    /// Start a session over an already resolved question list.
    ///
    /// Fails with [`Error::NoQuestions`] when `questions` is empty; no
    /// session exists in that case.
    pub fn start(
        request: &StartRequest,
        questions: Vec<Question>,
        config: &GameConfig,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if questions.is_empty() {
            return Err(Error::NoQuestions(
                "no questions are available for this selection".to_string(),
            ));
        }

        let username = request
            .username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_USERNAME)
            .to_string();

        Ok(Self {
            id: Uuid::new_v4(),
            user_id: request.user_id.clone(),
            username,
            mode: request.mode,
            category: request.category,
            difficulty: request.difficulty,
            questions,
            current_question_index: 0,
            answers: Vec::new(),
            score: 0,
            lives: config.starting_lives,
            streak: 0,
            max_streak: 0,
            started_at: now,
            ended_at: None,
            status: SessionStatus::Playing,
            timer_seconds: config.timer_seconds,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    pub fn answers(&self) -> &[UserAnswer] {
        &self.answers
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn max_streak(&self) -> u32 {
        self.max_streak
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status == SessionStatus::Finished
    }

    /// The question awaiting an answer, `None` once finished
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_finished() {
            return None;
        }
        self.questions.get(self.current_question_index)
    }

    pub fn progress(&self) -> Progress {
        Progress {
            current: (self.current_question_index + 1).min(self.questions.len()),
            total: self.questions.len(),
            answered: self.answers.len(),
            score: self.score,
            lives: self.lives,
            streak: self.streak,
            max_streak: self.max_streak,
            status: self.status,
        }
    }

    /// Header persisted when the session starts
    pub fn record(&self) -> SessionRecord {
        SessionRecord {
            id: self.id,
            user_id: self.user_id.clone(),
            mode: self.mode,
            category: self.category,
            difficulty: self.difficulty,
            question_ids: self.questions.iter().map(|q| q.id.clone()).collect(),
            started_at: self.started_at,
        }
    }

    /// Answer the current question. An empty answer counts as a timeout.
    ///
    /// Returns `None` without touching the session when it is already
    /// finished.
    pub fn submit_answer(
        &mut self,
        answer: &str,
        time_spent_ms: u64,
        now: DateTime<Utc>,
    ) -> Option<AnswerOutcome> {
        let Some(question) = self.current_question() else {
            debug!("Ignoring answer for finished session {}", self.id);
            return None;
        };

        let is_correct = question.is_correct(answer);
        let points_earned = scoring::points_for_answer(
            question,
            self.mode,
            is_correct,
            time_spent_ms,
            self.timer_seconds,
        );
        let user_answer = UserAnswer {
            question_id: question.id.clone(),
            answer: answer.to_string(),
            is_correct,
            time_spent_ms,
            points_earned,
        };
        let correct_answer = question.correct_answer.clone();

        self.score += points_earned;
        if is_correct {
            self.streak += 1;
            self.max_streak = self.max_streak.max(self.streak);
        } else {
            self.streak = 0;
            self.lives = self.lives.saturating_sub(1);
        }
        self.answers.push(user_answer.clone());
        self.current_question_index += 1;

        if self.current_question_index >= self.questions.len() || self.lives == 0 {
            self.status = SessionStatus::Finished;
            self.ended_at = Some(now);
        }

        Some(AnswerOutcome {
            answer: user_answer,
            correct_answer,
            score: self.score,
            lives: self.lives,
            streak: self.streak,
            max_streak: self.max_streak,
            finished: self.is_finished(),
        })
    }

    /// Force the session into its terminal state. No-op when already finished.
    pub fn finish(&mut self, now: DateTime<Utc>) {
        if self.status == SessionStatus::Playing {
            self.status = SessionStatus::Finished;
        }
        self.ended_at.get_or_insert(now);
    }

    /// Snapshot of the session for stats aggregation
    pub fn result(&self) -> GameResult {
        let answered = self.answers.len();
        let correct_answers = self.answers.iter().filter(|a| a.is_correct).count();
        let accuracy = if answered > 0 {
            correct_answers as f64 / answered as f64 * 100.0
        } else {
            0.0
        };
        let average_time_per_question_ms = if answered > 0 {
            self.answers.iter().map(|a| a.time_spent_ms as f64).sum::<f64>() / answered as f64
        } else {
            0.0
        };
        let ended_at = self.ended_at.unwrap_or(self.started_at);

        GameResult {
            id: self.id,
            user_id: self.user_id.clone(),
            username: self.username.clone(),
            mode: self.mode,
            category: self.category,
            difficulty: self.difficulty,
            total_questions: self.questions.len() as u32,
            correct_answers: correct_answers as u32,
            incorrect_answers: (answered - correct_answers) as u32,
            score: self.score,
            accuracy,
            max_streak: self.max_streak,
            total_time_ms: (ended_at - self.started_at).num_milliseconds(),
            average_time_per_question_ms,
            created_at: ended_at,
        }
    }
}
