//! branchsync node binary.

use branchsync_server::clock::SystemClock;
use branchsync_server::config::Config;
use branchsync_server::sync::spawn_scheduler;
use branchsync_server::{build_router, db, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "branchsync_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!(
        node = %config.node_name,
        peers = config.peers.len(),
        auto_sync = config.auto_sync,
        "Starting branchsync node on {}:{}",
        config.host,
        config.port
    );

    let pool = db::create_pool(&config.database_url).await?;

    tracing::info!("Running database migrations...");
    db::run_migrations(&pool).await?;

    let state = AppState::new(config.clone(), pool, Arc::new(SystemClock)).await?;

    let _scheduler = spawn_scheduler(
        state.coordinator.clone(),
        config.sync_interval,
        config.sync_scope,
        config.port,
    );

    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
