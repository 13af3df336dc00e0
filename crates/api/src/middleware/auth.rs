//! Session authentication for protected routes.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use serde_json::json;
use tracing::error;

use crate::AppState;
use tanzia_db::SessionRepository;
use tanzia_shared::{
    auth::SESSION_COOKIE_NAME,
    types::{SessionId, UserId},
};

/// Key under which a session's in-memory state (its CSRF token) is stored.
///
/// Derived from the raw cookie value so that no database round trip is
/// needed to resolve it.
#[must_use]
pub fn session_key(session_token: &str) -> String {
    SessionRepository::hash_token(session_token)
}

/// Reads the raw session token from the cookie jar.
#[must_use]
pub fn session_token(jar: &CookieJar) -> Option<&str> {
    jar.get(SESSION_COOKIE_NAME)
        .map(axum_extra::extract::cookie::Cookie::value)
        .filter(|value| !value.is_empty())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "unauthorized",
            "message": "Authentication required"
        })),
    )
        .into_response()
}

/// Authentication middleware resolving the session cookie.
///
/// This middleware:
/// 1. Reads the `tanzia-session` cookie
/// 2. Looks up a live session for it
/// 3. Stores the [`AuthUser`] in request extensions for handlers to access
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = session_token(&jar) else {
        return unauthorized();
    };

    let sessions = SessionRepository::new((*state.db).clone());
    match sessions.find_active(token).await {
        Ok(Some(session)) => {
            request.extensions_mut().insert(AuthUser {
                user_id: UserId::from_uuid(session.user_id),
                session_id: SessionId::from_uuid(session.id),
                session_key: session_key(token),
            });
            next.run(request).await
        }
        Ok(None) => unauthorized(),
        Err(e) => {
            error!(error = %e, "Database error resolving session");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}

/// The authenticated account of the current request.
///
/// ```ignore
/// async fn handler(user: AuthUser) -> impl IntoResponse {
///     let user_id = user.user_id;
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Account owning the session.
    pub user_id: UserId,
    /// Session row resolved from the cookie.
    pub session_id: SessionId,
    /// Key of the session's in-memory state.
    pub session_key: String,
}

impl AuthUser {
    /// Returns the raw user UUID.
    #[must_use]
    pub const fn uuid(&self) -> uuid::Uuid {
        self.user_id.into_inner()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(unauthorized)
    }
}
