//! Advance payment routes.

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
use tanzia_db::ProvisionRepository;
use tanzia_shared::records::ProvisionResponse;

/// Creates the provision router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/provisions", get(list_provisions).post(create_provision))
}

/// GET /provisions - List provisions in creation order.
async fn list_provisions(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    let provisions = ProvisionRepository::new((*state.db).clone())
        .list_by_user(auth.uuid())
        .await?;

    Ok(Json(
        provisions
            .into_iter()
            .map(ProvisionResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// POST /provisions - Record an advance payment.
async fn create_provision(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<AmountEntryRequest>,
) -> ApiResult<impl IntoResponse> {
    let (label, amount) = payload.validated()?;

    let (txn, user) = lock_user(&state, auth.user_id).await?;
    let current = ProvisionRepository::count_in(&txn, user.id).await?;
    ensure_below_limit(&state, &user, Resource::Provisions, current)?;

    let provision = ProvisionRepository::create_in(&txn, user.id, &label, amount).await?;
    txn.commit().await?;

    info!(user_id = %user.id, provision_id = %provision.id, %amount, "Provision recorded");

    Ok((StatusCode::CREATED, Json(ProvisionResponse::from(provision))))
}
