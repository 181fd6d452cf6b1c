//! Game session engine: question sourcing, session state, scoring and stats

pub mod aggregator;
pub mod authoring;
pub mod game;
pub mod local;
pub mod resolver;
pub mod scoring;
pub mod session;

#[cfg(test)]
mod game_test;
#[cfg(test)]
mod testing;

pub use aggregator::StatsAggregator;
pub use game::{GameEngine, GameOutcome, StartRequest};
pub use local::LocalBank;
pub use resolver::{OwnBankStatus, QuestionResolver};
pub use session::{AnswerOutcome, GameSession, Progress, SessionStatus};
