//! Per-session anti-forgery tokens.

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use rand::TryRngCore;
use rand::rngs::OsRng;
use thiserror::Error;

use super::clock::{Clock, SystemClock};
use super::sweeper::Sweep;
use super::constant_time_eq;

/// Random bytes per token, before encoding.
pub const TOKEN_LENGTH: usize = 32;

/// Cookie carrying the token back to the browser.
pub const CSRF_COOKIE_NAME: &str = "tanzia-csrf";

/// Form field a submitted token is read from.
pub const CSRF_FORM_FIELD: &str = "csrf_token";

/// Header a submitted token is read from.
pub const CSRF_HEADER_NAME: &str = "X-CSRF-Token";

/// Errors raised while minting tokens.
#[derive(Debug, Error)]
pub enum CsrfError {
    /// The operating system random source failed.
    #[error("random source unavailable: {0}")]
    RandomSource(String),
}

#[derive(Debug, Clone)]
struct StoredToken {
    value: String,
    created_at: DateTime<Utc>,
}

impl StoredToken {
    fn is_expired(&self, now: DateTime<Utc>, expiry: TimeDelta) -> bool {
        now - self.created_at > expiry
    }
}

/// Generates a URL-safe token from [`TOKEN_LENGTH`] OS random bytes.
///
/// # Errors
///
/// Returns [`CsrfError::RandomSource`] if the OS random source fails.
pub fn generate_token() -> Result<String, CsrfError> {
    let mut bytes = [0u8; TOKEN_LENGTH];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CsrfError::RandomSource(e.to_string()))?;
    Ok(base64_url::encode(&bytes))
}

/// Picks the submitted token from a request's extraction points.
///
/// The form field wins over the header, which wins over the cookie.
/// Empty values count as absent.
#[must_use]
pub fn select_submitted_token<'a>(
    form: Option<&'a str>,
    header: Option<&'a str>,
    cookie: Option<&'a str>,
) -> Option<&'a str> {
    [form, header, cookie]
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
}

/// In-memory store holding one token per session.
#[derive(Debug)]
pub struct CsrfManager<C: Clock = SystemClock> {
    tokens: DashMap<String, StoredToken>,
    expiry: TimeDelta,
    clock: C,
}

impl CsrfManager<SystemClock> {
    /// Creates a manager on the system clock.
    #[must_use]
    pub fn new(expiry: TimeDelta) -> Self {
        Self::with_clock(expiry, SystemClock)
    }
}

impl Default for CsrfManager<SystemClock> {
    fn default() -> Self {
        Self::new(TimeDelta::hours(24))
    }
}

impl<C: Clock> CsrfManager<C> {
    /// Creates a manager reading time from `clock`.
    #[must_use]
    pub fn with_clock(expiry: TimeDelta, clock: C) -> Self {
        Self {
            tokens: DashMap::new(),
            expiry,
            clock,
        }
    }

    /// Token lifetime.
    #[must_use]
    pub const fn expiry(&self) -> TimeDelta {
        self.expiry
    }

    /// Mints a fresh token for `session_id`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`CsrfError::RandomSource`] if no random bytes could be read.
    /// Nothing is stored in that case.
    pub fn create_token(&self, session_id: &str) -> Result<String, CsrfError> {
        let value = generate_token()?;
        self.tokens.insert(
            session_id.to_owned(),
            StoredToken {
                value: value.clone(),
                created_at: self.clock.now(),
            },
        );
        Ok(value)
    }

    /// Returns true if `candidate` is the live token for `session_id`.
    pub fn validate_token(&self, session_id: &str, candidate: &str) -> bool {
        let now = self.clock.now();
        let Some(stored) = self.tokens.get(session_id) else {
            return false;
        };
        if stored.is_expired(now, self.expiry) {
            return false;
        }
        constant_time_eq(stored.value.as_bytes(), candidate.as_bytes())
    }

    /// Returns the live token for `session_id`, if any.
    pub fn get_token(&self, session_id: &str) -> Option<String> {
        let now = self.clock.now();
        self.tokens
            .get(session_id)
            .filter(|stored| !stored.is_expired(now, self.expiry))
            .map(|stored| stored.value.clone())
    }

    /// Returns the live token for `session_id`, minting one if needed.
    ///
    /// # Errors
    ///
    /// Returns [`CsrfError::RandomSource`] if a token had to be minted and
    /// the random source failed.
    pub fn get_or_create_token(&self, session_id: &str) -> Result<String, CsrfError> {
        match self.get_token(session_id) {
            Some(token) => Ok(token),
            None => self.create_token(session_id),
        }
    }

    /// Drops the token for `session_id`.
    pub fn invalidate_token(&self, session_id: &str) {
        self.tokens.remove(session_id);
    }

    /// Number of stored tokens, expired ones included.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if no token is stored.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Removes expired tokens and returns how many were dropped.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;
        self.tokens.retain(|_, stored| {
            let keep = !stored.is_expired(now, self.expiry);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }
}

impl<C: Clock> Sweep for CsrfManager<C> {
    fn name(&self) -> &'static str {
        "csrf_tokens"
    }

    fn sweep(&self) -> usize {
        Self::sweep(self)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::security::clock::ManualClock;

    fn manager() -> (CsrfManager<ManualClock>, ManualClock) {
        let clock = ManualClock::default();
        (
            CsrfManager::with_clock(TimeDelta::hours(24), clock.clone()),
            clock,
        )
    }

    #[test]
    fn test_generated_token_is_url_safe() {
        let token = generate_token().unwrap();

        // 32 bytes, unpadded base64
        assert_eq!(token.len(), 43);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_created_token_validates() {
        let (manager, _) = manager();
        let token = manager.create_token("session-a").unwrap();

        assert!(manager.validate_token("session-a", &token));
        assert_eq!(manager.get_token("session-a"), Some(token));
    }

    #[test]
    fn test_token_is_bound_to_its_session() {
        let (manager, _) = manager();
        manager.create_token("session-a").unwrap();
        let token_b = manager.create_token("session-b").unwrap();

        assert!(!manager.validate_token("session-a", &token_b));
        assert!(manager.validate_token("session-b", &token_b));
    }

    #[test]
    fn test_unknown_session_is_invalid() {
        let (manager, _) = manager();

        assert!(!manager.validate_token("missing", "anything"));
        assert_eq!(manager.get_token("missing"), None);
    }

    #[test]
    fn test_wrong_candidate_is_invalid() {
        let (manager, _) = manager();
        let token = manager.create_token("session-a").unwrap();

        assert!(!manager.validate_token("session-a", ""));
        assert!(!manager.validate_token("session-a", &token[1..]));
        assert!(!manager.validate_token("session-a", &format!("{token}x")));
    }

    #[test]
    fn test_recreate_replaces_previous_token() {
        let (manager, _) = manager();
        let first = manager.create_token("session-a").unwrap();
        let second = manager.create_token("session-a").unwrap();

        assert_ne!(first, second);
        assert!(!manager.validate_token("session-a", &first));
        assert!(manager.validate_token("session-a", &second));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_token_expires() {
        let (manager, clock) = manager();
        let token = manager.create_token("session-a").unwrap();

        clock.advance(TimeDelta::hours(24));
        assert!(manager.validate_token("session-a", &token));

        clock.advance(TimeDelta::seconds(1));
        assert!(!manager.validate_token("session-a", &token));
        assert_eq!(manager.get_token("session-a"), None);
        // lazily expired, still stored until swept
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_get_or_create_reuses_live_token() {
        let (manager, clock) = manager();
        let first = manager.get_or_create_token("session-a").unwrap();
        assert_eq!(manager.get_or_create_token("session-a").unwrap(), first);

        clock.advance(TimeDelta::hours(25));
        let renewed = manager.get_or_create_token("session-a").unwrap();
        assert_ne!(renewed, first);
        assert!(manager.validate_token("session-a", &renewed));
    }

    #[test]
    fn test_invalidate_removes_token() {
        let (manager, _) = manager();
        let token = manager.create_token("session-a").unwrap();

        manager.invalidate_token("session-a");

        assert!(!manager.validate_token("session-a", &token));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let (manager, clock) = manager();
        manager.create_token("old").unwrap();
        clock.advance(TimeDelta::hours(12));
        manager.create_token("young").unwrap();
        clock.advance(TimeDelta::hours(13));

        assert_eq!(manager.sweep(), 1);
        assert_eq!(manager.len(), 1);
        assert!(manager.get_token("young").is_some());
    }

    #[rstest]
    #[case(Some("form"), Some("header"), Some("cookie"), Some("form"))]
    #[case(None, Some("header"), Some("cookie"), Some("header"))]
    #[case(None, None, Some("cookie"), Some("cookie"))]
    #[case(Some(""), Some("header"), None, Some("header"))]
    #[case(None, Some(""), Some("cookie"), Some("cookie"))]
    #[case(None, None, None, None)]
    fn test_submitted_token_precedence(
        #[case] form: Option<&str>,
        #[case] header: Option<&str>,
        #[case] cookie: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(select_submitted_token(form, header, cookie), expected);
    }
}
