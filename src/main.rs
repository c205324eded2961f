mod config;
mod csrf;
mod db;
mod error;
mod handler;
mod model;
mod repository;
mod route;
mod schema;
mod session;

use std::{sync::Arc, time::Duration};

use axum::Server;
use ring::rand::{SecureRandom, SystemRandom};
use sqlx::SqlitePool;
use tracing_subscriber::EnvFilter;

use crate::{
    config::Config,
    error::StartupError,
    repository::{Clock, SystemClock},
    route::create_router,
    session::{spawn_session_sweeper, SessionSettings, MIN_SECRET_LEN},
};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

// Struct representing the application state
pub struct AppState {
    db: SqlitePool,
    clock: Arc<dyn Clock>,
    sessions: SessionSettings,
}

// Entry point of the application
#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("todo_web_app=debug,tower_http=debug")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("🔥 {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = Config::from_env()?;

    let pool = db::connect(&config.database_url).await?;
    tracing::info!("✅ Connection to the database {} is successful!", config.database_url);

    let secret = match &config.session_secret {
        Some(secret) => secret.as_bytes().to_vec(),
        None => {
            tracing::warn!("SESSION_SECRET not set, sessions will not survive a restart");
            let mut secret = vec![0u8; MIN_SECRET_LEN];
            SystemRandom::new().fill(&mut secret)?;
            secret
        }
    };
    let sessions = SessionSettings::new(secret, config.session_ttl);
    let sweeper = spawn_session_sweeper(sessions.store.clone(), SESSION_SWEEP_INTERVAL);

    // Create an Arc-wrapped instance of the application state
    let app_state = Arc::new(AppState {
        db: pool.clone(),
        clock: Arc::new(SystemClock),
        sessions,
    });

    let app = create_router(app_state);

    tracing::info!("🚀 Server started successfully on {}", config.bind_addr);

    Server::try_bind(&config.bind_addr)
        .map_err(|e| StartupError::Serve(e.into()))?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StartupError::Serve(e.into()))?;

    sweeper.abort();
    pool.close().await;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
