//! Application configuration

use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string. `None` runs against the in-memory store.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub game: GameConfig,
}

/// Gameplay tuning
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub questions_per_game: usize,
    pub starting_lives: u32,
    /// Per-question countdown in timed mode, in seconds
    pub timer_seconds: f64,
    /// Minimum session accuracy (percent) that counts as a win
    pub win_accuracy: f64,
    pub points_per_level: u32,
    /// Private questions a user needs before playing their own bank
    pub min_own_questions: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            questions_per_game: 10,
            starting_lives: 3,
            timer_seconds: 15.0,
            win_accuracy: 70.0,
            points_per_level: 1000,
            min_own_questions: 10,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var::<u16>("PORT").unwrap_or(3000),
            game: GameConfig::from_env(),
        }
    }
}

impl GameConfig {
    /// Load game tuning from environment variables, keeping defaults for anything unset
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            questions_per_game: parse_var::<usize>("QUESTIONS_PER_GAME")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.questions_per_game),
            starting_lives: parse_var::<u32>("STARTING_LIVES")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.starting_lives),
            timer_seconds: parse_var::<f64>("TIMER_SECONDS")
                .filter(|s| *s > 0.0)
                .unwrap_or(defaults.timer_seconds),
            win_accuracy: parse_var::<f64>("WIN_ACCURACY").unwrap_or(defaults.win_accuracy),
            points_per_level: parse_var::<u32>("POINTS_PER_LEVEL")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.points_per_level),
            min_own_questions: parse_var::<usize>("MIN_OWN_QUESTIONS")
                .unwrap_or(defaults.min_own_questions),
        }
    }
}

fn parse_var<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
