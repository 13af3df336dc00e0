//! API route definitions.

pub mod auth;
pub mod billing;
pub mod bills;
pub mod dashboard;
pub mod export;
pub mod health;
pub mod persons;
pub mod provisions;

use std::sync::Arc;

use axum::{Router, middleware::from_fn_with_state};
use rust_decimal::Decimal;
use sea_orm::{DatabaseTransaction, TransactionTrait};
use serde::Deserialize;
use tracing::info;
use tanzia_core::tier::Resource;
use tanzia_db::{UserRepository, entities::users};
use tanzia_shared::{AppError, types::UserId};

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::{auth::auth_middleware, csrf::csrf_middleware},
};

/// Creates all API routes with state for middleware.
///
/// Protected routes run the anti-forgery guard first, then resolve the
/// session.
pub fn api_routes_with_state(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(billing::routes());

    let protected = Router::new()
        .merge(auth::protected_routes())
        .merge(persons::routes())
        .merge(bills::routes())
        .merge(provisions::routes())
        .merge(dashboard::routes())
        .merge(export::routes())
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .layer(from_fn_with_state(Arc::clone(&state.csrf), csrf_middleware));

    public.merge(protected)
}

/// Loads the account owning the current session.
pub(crate) async fn load_user(state: &AppState, user_id: UserId) -> ApiResult<users::Model> {
    UserRepository::new((*state.db).clone())
        .find_by_id(user_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()).into())
}

/// Opens a transaction holding the account's row lock.
///
/// Creates gated by a tier cap count and insert inside it, so two
/// concurrent requests cannot both see the last free slot.
pub(crate) async fn lock_user(
    state: &AppState,
    user_id: UserId,
) -> ApiResult<(DatabaseTransaction, users::Model)> {
    let txn = state.db.begin().await?;
    let user = UserRepository::lock_in(&txn, user_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok((txn, user))
}

/// Rejects the request if the account may not create one more `resource`.
pub(crate) fn ensure_below_limit(
    state: &AppState,
    user: &users::Model,
    resource: Resource,
    current: u64,
) -> ApiResult<()> {
    let check = state.tiers.check(resource, current, user.is_premium);
    if check.allowed {
        Ok(())
    } else {
        info!(user_id = %user.id, %resource, current, "Free tier limit reached");
        Err(ApiError::LimitReached(check))
    }
}

/// Largest amount a `NUMERIC(14,2)` column holds.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// Body of a bill or provision creation request.
#[derive(Debug, Clone, Deserialize)]
pub struct AmountEntryRequest {
    /// What the amount is for.
    pub label: String,
    /// Amount in euros.
    pub amount: Decimal,
}

impl AmountEntryRequest {
    /// Returns the trimmed label and the amount rounded to cents.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank label, a negative amount or
    /// an amount above [`MAX_AMOUNT`].
    pub fn validated(self) -> Result<(String, Decimal), AppError> {
        let label = self.label.trim();
        if label.is_empty() {
            return Err(AppError::Validation("Label cannot be empty".into()));
        }
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(AppError::Validation("Amount cannot be negative".into()));
        }
        let amount = self.amount.round_dp(2);
        if amount > MAX_AMOUNT {
            return Err(AppError::Validation(format!(
                "Amount cannot exceed {MAX_AMOUNT}"
            )));
        }
        Ok((label.to_string(), amount))
    }
}
