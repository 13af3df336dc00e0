//! Error responses.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use tanzia_core::{security::CsrfError, tier::LimitCheck};
use tanzia_shared::AppError;

/// Errors returned by handlers.
#[derive(Debug)]
pub enum ApiError {
    /// An application error, mapped through its status and code.
    App(AppError),
    /// Wrong email or password; carries what is left before a lockout.
    InvalidCredentials {
        /// Failures left before the identifier is locked.
        remaining_attempts: u32,
    },
    /// The free tier cap for a resource is reached.
    LimitReached(LimitCheck),
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self::App(error)
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(error: sea_orm::DbErr) -> Self {
        Self::App(AppError::Database(error.to_string()))
    }
}

impl From<CsrfError> for ApiError {
    fn from(error: CsrfError) -> Self {
        Self::App(AppError::Internal(error.to_string()))
    }
}

fn app_error_response(error: &AppError) -> Response {
    let status = StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let message = if error.is_client_error() {
        error.to_string()
    } else {
        error!(error = %error, "Request failed");
        "An internal error occurred".to_string()
    };

    let mut body = json!({
        "error": error.error_code(),
        "message": message,
    });

    let retry_after = match error {
        AppError::RateLimited { retry_after_secs } => Some(*retry_after_secs),
        _ => None,
    };
    if let Some(secs) = retry_after {
        body["retry_after_secs"] = json!(secs);
    }

    let mut response = (status, Json(body)).into_response();
    if let Some(secs) = retry_after {
        response
            .headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from(secs));
    }
    response
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::App(error) => app_error_response(&error),
            Self::InvalidCredentials { remaining_attempts } => (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "invalid_credentials",
                    "message": "Invalid email or password",
                    "remaining_attempts": remaining_attempts,
                })),
            )
                .into_response(),
            Self::LimitReached(check) => (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "error": "limit_reached",
                    "message": check.message,
                    "current": check.current,
                    "limit": check.limit,
                })),
            )
                .into_response(),
        }
    }
}
