//! Tanzia API Server
//!
//! Main entry point for the Tanzia backend service.

use std::{sync::Arc, time::Duration};

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tanzia_api::{AppState, create_router};
use tanzia_core::{
    security::{CsrfManager, RateLimitPolicy, RateLimiter, seconds, spawn_sweeper},
    tier::TierLimits,
};
use tanzia_db::{SessionRepository, connect_with};
use tanzia_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tanzia=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    // Connect to database
    let db = connect_with(&config.database).await?;
    info!("Connected to database");

    let purged = SessionRepository::new(db.clone()).cleanup_expired().await?;
    info!(purged, "Expired sessions purged");

    if config.stripe.webhook_secret.is_none() {
        warn!("No webhook secret configured, subscription events will be refused");
    }

    // In-memory guards and their sweepers
    let security = &config.security;
    let rate_limiter = Arc::new(RateLimiter::new(RateLimitPolicy::from(security)));
    let policy = rate_limiter.policy();
    info!(
        max_attempts = policy.max_attempts,
        lockout_secs = policy.lockout.num_seconds(),
        attempt_window_secs = policy.attempt_window.num_seconds(),
        "Login throttle configured"
    );
    let csrf = Arc::new(CsrfManager::new(seconds(security.csrf_token_expiry_secs)));

    let cancel = CancellationToken::new();
    let sweepers = [
        spawn_sweeper(
            Arc::clone(&rate_limiter),
            Duration::from_secs(security.rate_limit_sweep_secs),
            cancel.clone(),
        ),
        spawn_sweeper(
            Arc::clone(&csrf),
            Duration::from_secs(security.csrf_sweep_secs),
            cancel.clone(),
        ),
    ];

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        rate_limiter,
        csrf,
        tiers: TierLimits::from(&config.tiers),
        session: config.session.clone(),
        stripe: config.stripe.clone(),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel.cancel();
    for sweeper in sweepers {
        sweeper.await?;
    }
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
