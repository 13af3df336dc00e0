//! Request and response payloads for the account endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::UserId;

/// Name of the cookie carrying the raw session token.
pub const SESSION_COOKIE_NAME: &str = "tanzia-session";

/// Signup request payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    /// Account email, used as the login identifier.
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    /// Display name.
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: String,
    /// Plaintext password, checked for strength before hashing.
    pub password: String,
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

impl LoginRequest {
    /// Returns the identifier the login throttle is keyed on.
    ///
    /// Emails are compared case-insensitively so that `Bob@x.io` and
    /// `bob@x.io` share one failure counter.
    #[must_use]
    pub fn throttle_key(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

/// Account info returned in auth responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    /// User ID.
    pub id: UserId,
    /// User email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Whether the account has an active subscription.
    pub is_premium: bool,
}

/// Login response payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Authenticated account.
    pub user: UserInfo,
    /// Anti-forgery token to echo on state-changing requests.
    pub csrf_token: String,
}

/// Anti-forgery token response.
#[derive(Debug, Clone, Serialize)]
pub struct CsrfTokenResponse {
    /// The session's current token.
    pub csrf_token: String,
}
