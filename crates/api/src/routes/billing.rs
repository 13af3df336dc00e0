//! Subscription webhook receiver.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::post,
};
use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use crate::{AppState, error::ApiResult};
use tanzia_core::{
    billing::{DEFAULT_TOLERANCE, SIGNATURE_HEADER, WebhookEvent, construct_event},
    security::seconds,
};
use tanzia_db::UserRepository;
use tanzia_shared::AppError;

/// Creates the billing router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/billing/webhook", post(webhook))
}

/// POST /billing/webhook - Apply a signed subscription event.
async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Bytes,
) -> ApiResult<impl IntoResponse> {
    let Some(secret) = state.stripe.webhook_secret.as_deref() else {
        return Err(AppError::ExternalService("Webhook secret not configured".into()).into());
    };

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Validation(format!("Missing {SIGNATURE_HEADER} header")))?;

    let tolerance = state.stripe.tolerance_secs.map_or(DEFAULT_TOLERANCE, seconds);
    let event = construct_event(&payload, signature, secret, tolerance, Utc::now()).map_err(|e| {
        warn!(error = %e, "Rejected webhook");
        AppError::Validation(e.to_string())
    })?;

    apply_event(&UserRepository::new((*state.db).clone()), event).await?;

    Ok(Json(json!({ "received": true })))
}

async fn apply_event(users: &UserRepository, event: WebhookEvent) -> ApiResult<()> {
    match event {
        WebhookEvent::CheckoutCompleted {
            customer_id,
            customer_email,
        } => {
            let email = customer_email.trim().to_lowercase();
            let updated = users.activate_premium_by_email(&email, &customer_id).await?;
            if updated == 0 {
                warn!(%customer_id, "Checkout completed for an unknown email");
            } else {
                info!(%customer_id, "Premium activated");
            }
        }
        WebhookEvent::SubscriptionChanged {
            customer_id,
            status,
        } => {
            let is_premium = status.grants_premium();
            let updated = users
                .set_premium_by_customer(&customer_id, is_premium)
                .await?;
            info!(%customer_id, ?status, is_premium, updated, "Subscription changed");
        }
        WebhookEvent::SubscriptionDeleted { customer_id } => {
            let updated = users.set_premium_by_customer(&customer_id, false).await?;
            info!(%customer_id, updated, "Subscription ended");
        }
        WebhookEvent::Ignored { event_type } => {
            info!(%event_type, "Ignoring webhook event");
        }
    }
    Ok(())
}
