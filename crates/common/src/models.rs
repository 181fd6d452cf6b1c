//! Domain models

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Question categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Art,
    Science,
    Sports,
    Entertainment,
    Geography,
    History,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Self::Art,
        Self::Science,
        Self::Sports,
        Self::Entertainment,
        Self::Geography,
        Self::History,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Art => "art",
            Self::Science => "science",
            Self::Sports => "sports",
            Self::Entertainment => "entertainment",
            Self::Geography => "geography",
            Self::History => "history",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Base points awarded for a correct answer
    pub fn points(&self) -> u32 {
        match self {
            Self::Easy => 10,
            Self::Medium => 20,
            Self::Hard => 30,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(format!("unknown difficulty: {}", s)),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scoring mode of a play-through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Flat points per correct answer
    Classic,
    /// Correct answers earn a bonus for answering quickly
    Timed,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Timed => "timed",
        }
    }
}

impl FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "classic" => Ok(Self::Classic),
            "timed" => Ok(Self::Timed),
            _ => Err(format!("unknown game mode: {}", s)),
        }
    }
}

/// Where a session draws its questions from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionPool {
    /// Public questions, widening filters and falling back to the bundled set
    #[default]
    Public,
    /// The player's own private questions, no fallback
    Own,
}

/// A trivia question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub prompt: String,
    pub correct_answer: String,
    pub incorrect_answers: [String; 3],
    pub is_public: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Question {
    pub fn points(&self) -> u32 {
        self.difficulty.points()
    }

    /// An empty answer never matches.
    pub fn is_correct(&self, answer: &str) -> bool {
        !answer.is_empty() && answer == self.correct_answer
    }

    /// All four answers in random order
    pub fn options(&self) -> Vec<String> {
        let mut options = Vec::with_capacity(4);
        options.push(self.correct_answer.clone());
        options.extend(self.incorrect_answers.iter().cloned());
        options.shuffle(&mut rand::thread_rng());
        options
    }
}

/// Input for authoring a question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuestion {
    pub category: Category,
    pub difficulty: Difficulty,
    pub prompt: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
    #[serde(default)]
    pub is_public: bool,
}

/// Edit of an authored question. Unset fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionUpdate {
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
    pub prompt: Option<String>,
    pub correct_answer: Option<String>,
    pub incorrect_answers: Option<Vec<String>>,
    pub is_public: Option<bool>,
}

/// Filter for question lookups. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionFilter {
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
    pub created_by: Option<String>,
    pub is_public: Option<bool>,
    pub limit: Option<usize>,
}

impl QuestionFilter {
    pub fn public() -> Self {
        Self {
            is_public: Some(true),
            ..Default::default()
        }
    }

    pub fn matches(&self, question: &Question) -> bool {
        self.category.map_or(true, |c| question.category == c)
            && self.difficulty.map_or(true, |d| question.difficulty == d)
            && self
                .created_by
                .as_deref()
                .map_or(true, |u| question.created_by == u)
            && self.is_public.map_or(true, |p| question.is_public == p)
    }
}

/// A single response within a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAnswer {
    pub question_id: String,
    /// Empty when the player timed out or skipped
    pub answer: String,
    pub is_correct: bool,
    pub time_spent_ms: u64,
    pub points_earned: u32,
}

/// Persisted header of a game session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub user_id: String,
    pub mode: GameMode,
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
    pub question_ids: Vec<String>,
    pub started_at: DateTime<Utc>,
}

/// Snapshot of a finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    /// Same as the session id
    pub id: Uuid,
    pub user_id: String,
    pub username: String,
    pub mode: GameMode,
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    pub score: u32,
    /// Percentage of answered questions that were correct
    pub accuracy: f64,
    pub max_streak: u32,
    pub total_time_ms: i64,
    pub average_time_per_question_ms: f64,
    pub created_at: DateTime<Utc>,
}

/// Cumulative per-user statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub user_id: String,
    pub total_games: u32,
    /// Sessions that reached the win accuracy
    pub total_wins: u32,
    pub total_points: u64,
    /// Consecutive winning sessions
    pub current_streak: u32,
    /// Best streak of any kind: in-session answer streak or win streak
    pub max_streak: u32,
    pub accuracy: f64,
    pub level: u32,
    /// Questions this player has authored
    #[serde(default)]
    pub questions_created: u32,
    pub games_per_category: BTreeMap<Category, u32>,
    pub accuracy_per_category: BTreeMap<Category, f64>,
    pub updated_at: DateTime<Utc>,
}

impl UserStats {
    /// Zero-value stats for a player with no finished games
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            total_games: 0,
            total_wins: 0,
            total_points: 0,
            current_streak: 0,
            max_streak: 0,
            accuracy: 0.0,
            level: 1,
            questions_created: 0,
            games_per_category: BTreeMap::new(),
            accuracy_per_category: BTreeMap::new(),
            updated_at: Utc::now(),
        }
    }
}

/// Leaderboard row, derived from UserStats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub user_id: String,
    pub username: String,
    pub total_points: u64,
    pub total_wins: u32,
    pub accuracy: f64,
    pub level: u32,
    pub max_streak: u32,
    pub updated_at: DateTime<Utc>,
}

impl RankingEntry {
    pub fn from_stats(stats: &UserStats, username: &str) -> Self {
        Self {
            user_id: stats.user_id.clone(),
            username: username.to_string(),
            total_points: stats.total_points,
            total_wins: stats.total_wins,
            accuracy: stats.accuracy,
            level: stats.level,
            max_streak: stats.max_streak,
            updated_at: stats.updated_at,
        }
    }
}
