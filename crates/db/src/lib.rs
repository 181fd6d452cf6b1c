//! Persistence layer for the trivia game
//!
//! The game engine talks to storage only through the [`Store`] trait.
//! Two adapters are provided: [`PgStore`] for PostgreSQL and [`MemoryStore`]
//! for tests and local play without a database.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

pub mod leaderboard;
pub mod memory;
pub mod pg;
pub mod questions;
pub mod results;
pub mod sessions;
pub mod stats;
pub mod store;

mod decode;

pub use memory::MemoryStore;
pub use pg::PgStore;
pub use store::Store;

/// Create a database connection pool
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    info!("Database connected");
    Ok(pool)
}

/// Run database migrations from SQL files
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    info!("Running migrations...");

    let migration_sql = include_str!("../../../migrations/001_initial.sql");
    sqlx::raw_sql(migration_sql).execute(pool).await?;

    info!("Migrations complete");
    Ok(())
}
