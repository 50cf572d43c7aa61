//! Subscription Service - Main Application Entry Point
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Initialize logging
//! 3. Create database connection pool
//! 4. Run database migrations
//! 5. Wire repository, service and router
//! 6. Serve until SIGINT/SIGTERM, then drain within the grace period
//! 7. Close the pool, again bounded by the grace period

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use subscription_service::{
    config::Config, db, repository::PgSubscriptionRepository, routes, services::SubscriptionService,
    shutdown, telemetry,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;

    telemetry::init_tracing(&config.logger_level, &config.logger_format);

    let options = config
        .connect_options()
        .context("invalid database settings")?;
    let pool = db::create_pool(options, config.db_max_connections)
        .await
        .context("failed to connect to database")?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool)
        .await
        .context("failed to run migrations")?;
    tracing::info!("Database migrations complete");

    let repository = Arc::new(PgSubscriptionRepository::new(pool.clone()));
    let service = SubscriptionService::new(repository);
    let app = routes::create_router(service);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.app_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "Subscription API started");

    let result = shutdown::serve(
        listener,
        app,
        shutdown::shutdown_signal(),
        config.shutdown_grace(),
    )
    .await;

    if let Err(e) = &result {
        tracing::error!(error = ?e, "Server failed");
    }

    // Connections still checked out by cut-off requests would hold this up.
    match tokio::time::timeout(config.shutdown_grace(), pool.close()).await {
        Ok(()) => tracing::info!("Database connection closed"),
        Err(_) => tracing::warn!("timed out closing database connections"),
    }

    result
}
