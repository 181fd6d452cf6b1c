//! Trivia game API server

use std::sync::Arc;

use db::{MemoryStore, PgStore, Store};
use engine::GameEngine;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

mod error;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api=debug".parse()?)
                .add_directive("engine=debug".parse()?)
                .add_directive("db=info".parse()?),
        )
        .init();

    info!("🎮 Starting trivia API");

    // Load configuration
    let config = common::Config::from_env();

    // Connect to the question store
    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            db::run_migrations(&pool).await?;
            Arc::new(PgStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, keeping everything in memory");
            Arc::new(MemoryStore::new())
        }
    };

    let engine = GameEngine::new(store, config.game.clone())?;
    info!(
        "📚 {} bundled questions, {} per game",
        engine.resolver().local().len(),
        config.game.questions_per_game
    );

    // Create app state
    let state = Arc::new(AppState::new(engine));

    let app = routes::router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    info!("🚀 Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
