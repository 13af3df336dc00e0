//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Session and anti-forgery middleware
//! - Error to response mapping

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use tanzia_core::security::{CsrfManager, RateLimiter};
use tanzia_core::tier::TierLimits;
use tanzia_shared::{SessionConfig, StripeConfig};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Failed-login throttle keyed by email.
    pub rate_limiter: Arc<RateLimiter>,
    /// Per-session anti-forgery tokens.
    pub csrf: Arc<CsrfManager>,
    /// Free tier caps.
    pub tiers: TierLimits,
    /// Session cookie settings.
    pub session: SessionConfig,
    /// Subscription webhook settings.
    pub stripe: StripeConfig,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(&state))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
