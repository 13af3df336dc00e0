//! Account routes: signup, login, logout and anti-forgery token refresh.

use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};
use validator::Validate;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::{
        auth::{AuthUser, session_key, session_token},
        csrf::{clear_csrf_cookie, csrf_cookie, time_duration},
    },
};
use tanzia_core::{
    auth::{hash_password, validate_password_strength, verify_password},
    security::seconds,
};
use tanzia_db::{SessionRepository, UserRepository, entities::users};
use tanzia_shared::{
    AppError,
    auth::{
        CsrfTokenResponse, LoginRequest, LoginResponse, SESSION_COOKIE_NAME, SignupRequest,
        UserInfo,
    },
    types::{SessionId, UserId},
};

/// Creates the public auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

/// Creates the auth routes that need a session.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/csrf", get(csrf_token))
}

fn user_info(user: &users::Model) -> UserInfo {
    UserInfo {
        id: UserId::from_uuid(user.id),
        email: user.email.clone(),
        name: user.name.clone(),
        is_premium: user.is_premium,
    }
}

/// Whole seconds until `remaining` elapses, rounded up.
fn retry_after_secs(remaining: Duration) -> u64 {
    remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
}

fn session_cookie(token: String, state: &AppState) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .secure(state.session.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(time_duration(seconds(state.session.ttl_secs)))
        .build()
}

fn clear_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE_NAME, "")).path("/").build();
    cookie.make_removal();
    cookie
}

/// Builds the lockout error for `identifier`.
fn locked_out(state: &AppState, identifier: &str) -> ApiError {
    let retry_after_secs = retry_after_secs(state.rate_limiter.lockout_remaining(identifier));
    AppError::RateLimited { retry_after_secs }.into()
}

/// Counts a failed login and builds the matching error.
fn failed_login(state: &AppState, identifier: &str) -> ApiError {
    if state.rate_limiter.record_failed_attempt(identifier) {
        warn!(email = %identifier, "Login locked after repeated failures");
        return locked_out(state, identifier);
    }

    let remaining_attempts = state.rate_limiter.remaining_attempts(identifier);
    info!(email = %identifier, remaining_attempts, "Failed login attempt");
    ApiError::InvalidCredentials { remaining_attempts }
}

/// POST /auth/signup - Create a free account.
async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    validate_password_strength(&payload.password)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let email = payload.email.trim().to_lowercase();
    let name = payload.name.trim();
    let users = UserRepository::new((*state.db).clone());

    if users.email_exists(&email).await? {
        return Err(AppError::Conflict("An account with this email already exists".into()).into());
    }

    let password_hash =
        hash_password(&payload.password).map_err(|e| AppError::Internal(e.to_string()))?;
    let user = users.create(&email, &password_hash, name).await?;

    info!(user_id = %user.id, "Account created");

    Ok((StatusCode::CREATED, Json(user_info(&user))))
}

/// POST /auth/login - Open a session.
///
/// Unknown emails and wrong passwords count against the same throttle.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let identifier = payload.throttle_key();

    if state.rate_limiter.is_locked(&identifier) {
        info!(email = %identifier, "Login refused while locked");
        return Err(locked_out(&state, &identifier));
    }

    let users = UserRepository::new((*state.db).clone());
    let Some(user) = users.find_by_email(&identifier).await? else {
        return Err(failed_login(&state, &identifier));
    };

    let verified = verify_password(&payload.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if !verified {
        return Err(failed_login(&state, &identifier));
    }

    state.rate_limiter.reset_attempts(&identifier);

    let expires_at = Utc::now() + seconds(state.session.ttl_secs);
    let (session, raw_token) = SessionRepository::new((*state.db).clone())
        .create(user.id, expires_at)
        .await?;

    let csrf_token = state.csrf.create_token(&session_key(&raw_token))?;

    let session_id = SessionId::from_uuid(session.id);
    info!(user_id = %user.id, %session_id, "User logged in");

    let jar = jar
        .add(session_cookie(raw_token, &state))
        .add(csrf_cookie(
            csrf_token.clone(),
            state.csrf.expiry(),
            state.session.secure_cookies,
        ));

    Ok((
        jar,
        Json(LoginResponse {
            user: user_info(&user),
            csrf_token,
        }),
    ))
}

/// POST /auth/logout - Revoke the current session.
async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    jar: CookieJar,
) -> ApiResult<impl IntoResponse> {
    if let Some(token) = session_token(&jar) {
        SessionRepository::new((*state.db).clone())
            .revoke_by_token(token)
            .await?;
    }
    state.csrf.invalidate_token(&auth.session_key);

    info!(user_id = %auth.user_id, session_id = %auth.session_id, "User logged out");

    let jar = jar.add(clear_session_cookie()).add(clear_csrf_cookie());
    Ok((jar, Json(json!({ "message": "Logged out" }))))
}

/// GET /auth/csrf - Return the session's token, minting one if needed.
async fn csrf_token(
    State(state): State<AppState>,
    auth: AuthUser,
    jar: CookieJar,
) -> ApiResult<impl IntoResponse> {
    let csrf_token = state.csrf.get_or_create_token(&auth.session_key)?;

    let jar = jar.add(csrf_cookie(
        csrf_token.clone(),
        state.csrf.expiry(),
        state.session.secure_cookies,
    ));
    Ok((jar, Json(CsrfTokenResponse { csrf_token })))
}
