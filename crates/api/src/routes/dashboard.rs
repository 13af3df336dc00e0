//! Dashboard route: every record plus the computed balances.

use axum::{Json, Router, extract::State, routing::get};
use rust_decimal::Decimal;
use serde::Serialize;

use super::load_user;
use crate::{AppState, error::ApiResult, middleware::auth::AuthUser};
use tanzia_core::{
    balance::{Ledger, PersonBalance},
    tier::{LimitCheck, Resource, TierLimits},
};
use tanzia_db::LedgerRepository;
use tanzia_shared::{auth::UserInfo, types::UserId};

/// Usage of each capped resource.
#[derive(Debug, Serialize)]
pub struct UsageResponse {
    /// Co-owners.
    pub persons: LimitCheck,
    /// Shared expenses.
    pub bills: LimitCheck,
    /// Advance payments.
    pub provisions: LimitCheck,
}

/// Dashboard payload.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    /// Current account.
    pub user: UserInfo,
    /// Raw records.
    pub ledger: Ledger,
    /// One row per person, in creation order.
    pub balances: Vec<PersonBalance>,
    /// Sum of all shares.
    pub total_share: u64,
    /// Sum of all bills.
    pub total_bills: Decimal,
    /// Sum of all provisions.
    pub total_provisions: Decimal,
    /// `total_provisions - total_bills`.
    pub global_balance: Decimal,
    /// Record usage against the account's caps.
    pub usage: UsageResponse,
}

fn usage(tiers: &TierLimits, ledger: &Ledger, is_premium: bool) -> UsageResponse {
    let count = |len: usize| u64::try_from(len).unwrap_or(u64::MAX);
    UsageResponse {
        persons: tiers.check(Resource::Persons, count(ledger.persons.len()), is_premium),
        bills: tiers.check(Resource::Bills, count(ledger.bills.len()), is_premium),
        provisions: tiers.check(
            Resource::Provisions,
            count(ledger.provisions.len()),
            is_premium,
        ),
    }
}

/// Creates the dashboard router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

/// GET /dashboard - Records, balances and tier usage.
async fn dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<DashboardResponse>> {
    let user = load_user(&state, auth.user_id).await?;
    let ledger = LedgerRepository::new((*state.db).clone())
        .load(user.id)
        .await?;

    Ok(Json(DashboardResponse {
        user: UserInfo {
            id: UserId::from_uuid(user.id),
            email: user.email,
            name: user.name,
            is_premium: user.is_premium,
        },
        balances: ledger.balances(),
        total_share: ledger.total_share(),
        total_bills: ledger.total_bills(),
        total_provisions: ledger.total_provisions(),
        global_balance: ledger.global_balance(),
        usage: usage(&state.tiers, &ledger, user.is_premium),
        ledger,
    }))
}
