//! Co-owner routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use tracing::info;

use super::{ensure_below_limit, lock_user};
use crate::{AppState, error::ApiResult, middleware::auth::AuthUser};
use tanzia_core::tier::Resource;
use tanzia_db::PersonRepository;
use tanzia_shared::{AppError, records::PersonResponse};

/// Body of a person creation request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePersonRequest {
    /// Display name.
    pub name: String,
    /// Ownership share ("tantieme"), between 1 and `i32::MAX`.
    pub share: u32,
}

impl CreatePersonRequest {
    fn validated(self) -> Result<(String, u32), AppError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Name cannot be empty".into()));
        }
        if self.share == 0 {
            return Err(AppError::Validation("Share must be at least 1".into()));
        }
        if i32::try_from(self.share).is_err() {
            return Err(AppError::Validation(format!(
                "Share cannot exceed {}",
                i32::MAX
            )));
        }
        Ok((name.to_string(), self.share))
    }
}

/// Creates the person router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/persons", get(list_persons).post(create_person))
}

/// GET /persons - List co-owners in creation order.
async fn list_persons(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let persons = PersonRepository::new((*state.db).clone())
        .list_by_user(auth.uuid())
        .await?;

    Ok(Json(
        persons
            .into_iter()
            .map(PersonResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// POST /persons - Add a co-owner.
async fn create_person(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreatePersonRequest>,
) -> ApiResult<impl IntoResponse> {
    let (name, share) = payload.validated()?;

    let (txn, user) = lock_user(&state, auth.user_id).await?;
    let current = PersonRepository::count_in(&txn, user.id).await?;
    ensure_below_limit(&state, &user, Resource::Persons, current)?;

    let person = PersonRepository::create_in(&txn, user.id, &name, share).await?;
    txn.commit().await?;

    info!(user_id = %user.id, person_id = %person.id, share, "Person added");

    Ok((StatusCode::CREATED, Json(PersonResponse::from(person))))
}
