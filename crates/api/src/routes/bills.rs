//! Shared expense routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tracing::info;

use super::{AmountEntryRequest, ensure_below_limit, lock_user};
use crate::{AppState, error::ApiResult, middleware::auth::AuthUser};
use tanzia_core::tier::Resource;
use tanzia_db::BillRepository;
use tanzia_shared::records::BillResponse;

/// Creates the bill router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/bills", get(list_bills).post(create_bill))
}

/// GET /bills - List bills in creation order.
async fn list_bills(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    let bills = BillRepository::new((*state.db).clone())
        .list_by_user(auth.uuid())
        .await?;

    Ok(Json(
        bills
            .into_iter()
            .map(BillResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// POST /bills - Record a shared expense.
async fn create_bill(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<AmountEntryRequest>,
) -> ApiResult<impl IntoResponse> {
    let (label, amount) = payload.validated()?;

    let (txn, user) = lock_user(&state, auth.user_id).await?;
    let current = BillRepository::count_in(&txn, user.id).await?;
    ensure_below_limit(&state, &user, Resource::Bills, current)?;

    let bill = BillRepository::create_in(&txn, user.id, &label, amount).await?;
    txn.commit().await?;

    info!(user_id = %user.id, bill_id = %bill.id, %amount, "Bill recorded");

    Ok((StatusCode::CREATED, Json(BillResponse::from(bill))))
}
