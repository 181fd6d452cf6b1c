//! Common types and utilities for the trivia game

pub mod config;
pub mod error;
pub mod models;

pub use config::{Config, GameConfig};
pub use error::{Error, Result};
