//! Anti-forgery guard for state-changing requests.
//!
//! - Safe methods pass through untouched.
//! - Requests without a session cookie pass through; downstream auth
//!   decides what to do with them.
//! - Requests with a session cookie must carry that session's token in the
//!   `csrf_token` form field, the `X-CSRF-Token` header or the
//!   `tanzia-csrf` cookie, in that order of precedence.

use std::sync::Arc;

use axum::{
    Json,
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{Method, StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use serde_json::json;
use tracing::warn;

use super::auth::{session_key, session_token};
use tanzia_core::security::{
    CSRF_COOKIE_NAME, CSRF_FORM_FIELD, CSRF_HEADER_NAME, CsrfManager, csrf::select_submitted_token,
};

/// Largest form body buffered while looking for the token field.
const MAX_FORM_BYTES: usize = 64 * 1024;

/// Returns true for methods that must not change state.
#[must_use]
pub fn is_safe_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

/// Builds the cookie carrying `token` to the browser.
#[must_use]
pub fn csrf_cookie(token: String, max_age: chrono::TimeDelta, secure: bool) -> Cookie<'static> {
    Cookie::build((CSRF_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(time_duration(max_age))
        .build()
}

/// Builds an expired cookie that clears the token on the browser.
#[must_use]
pub fn clear_csrf_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((CSRF_COOKIE_NAME, "")).path("/").build();
    cookie.make_removal();
    cookie
}

/// Converts a `TimeDelta` into the cookie max-age type.
#[must_use]
pub fn time_duration(delta: chrono::TimeDelta) -> time::Duration {
    time::Duration::seconds(delta.num_seconds())
}

fn forbidden(message: &'static str) -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": "csrf_failed",
            "message": message
        })),
    )
        .into_response()
}

fn is_form(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

/// Reads the token form field, handing back a request with the same body.
async fn take_form_token(request: Request) -> Result<(Request, Option<String>), Response> {
    let (parts, body) = request.into_parts();
    let Ok(bytes) = to_bytes(body, MAX_FORM_BYTES).await else {
        return Err((
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(json!({
                "error": "payload_too_large",
                "message": "Form body too large"
            })),
        )
            .into_response());
    };

    let token = serde_urlencoded::from_bytes::<Vec<(String, String)>>(&bytes)
        .ok()
        .and_then(|fields| {
            fields
                .into_iter()
                .find(|(name, _)| name == CSRF_FORM_FIELD)
                .map(|(_, value)| value)
        });

    Ok((Request::from_parts(parts, Body::from(bytes)), token))
}

/// CSRF middleware.
pub async fn csrf_middleware(
    State(csrf): State<Arc<CsrfManager>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    if is_safe_method(request.method()) {
        return next.run(request).await;
    }

    let Some(session) = session_token(&jar).map(session_key) else {
        return next.run(request).await;
    };

    let header = request
        .headers()
        .get(CSRF_HEADER_NAME)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let cookie = jar.get(CSRF_COOKIE_NAME).map(|c| c.value().to_owned());

    let (request, form) = if is_form(&request) {
        match take_form_token(request).await {
            Ok(taken) => taken,
            Err(response) => return response,
        }
    } else {
        (request, None)
    };

    let Some(submitted) =
        select_submitted_token(form.as_deref(), header.as_deref(), cookie.as_deref())
    else {
        warn!(method = %request.method(), path = %request.uri().path(), "CSRF token missing");
        return forbidden("CSRF token required");
    };

    if !csrf.validate_token(&session, submitted) {
        warn!(method = %request.method(), path = %request.uri().path(), "CSRF token rejected");
        return forbidden("Invalid CSRF token");
    }

    next.run(request).await
}
