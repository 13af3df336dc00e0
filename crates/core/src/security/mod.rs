//! In-memory security guards for the login and form endpoints.
//!
//! - `rate_limiter` - per-identifier failed-login lockout
//! - `csrf` - per-session anti-forgery tokens
//! - `sweeper` - periodic reclamation of expired entries
//!
//! Both guards read time through a [`Clock`] so expiry can be driven
//! deterministically in tests.

pub mod clock;
pub mod csrf;
pub mod rate_limiter;
pub mod sweeper;

pub use clock::{Clock, ManualClock, SystemClock};
pub use csrf::{CSRF_COOKIE_NAME, CSRF_FORM_FIELD, CSRF_HEADER_NAME, CsrfError, CsrfManager};
pub use rate_limiter::{RateLimitPolicy, RateLimiter};
pub use sweeper::{Sweep, spawn_sweeper};

use sha2::{Digest, Sha256};

/// Compares two byte strings in constant time.
///
/// Both inputs are first reduced to SHA-256 digests so the comparison
/// always walks 32 bytes, independent of input lengths and of where the
/// first mismatch sits. Mismatches are XOR-accumulated with no early exit.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let a = Sha256::digest(a);
    let b = Sha256::digest(b);
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Converts configured seconds into a `TimeDelta`, saturating on overflow.
#[must_use]
pub fn seconds(secs: u64) -> chrono::TimeDelta {
    i64::try_from(secs)
        .ok()
        .and_then(chrono::TimeDelta::try_seconds)
        .unwrap_or(chrono::TimeDelta::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"token", b"token"));
        assert!(!constant_time_eq(b"token", b"tokem"));
        assert!(!constant_time_eq(b"token", b"token-longer"));
        assert!(!constant_time_eq(b"", b"x"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn test_seconds_saturates() {
        assert_eq!(seconds(900), chrono::TimeDelta::minutes(15));
        assert_eq!(seconds(u64::MAX), chrono::TimeDelta::MAX);
    }
}
