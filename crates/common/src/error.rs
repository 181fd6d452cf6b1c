//! Error types

use thiserror::Error;

/// Main error type for the trivia game
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(String),

    /// No questions could be obtained from any source
    #[error("No questions available: {0}")]
    NoQuestions(String),

    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller does not own the resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
