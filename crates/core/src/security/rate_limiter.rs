//! Failed-login throttling per identifier.
//!
//! An identifier (the login email) moves through three states:
//!
//! - **clean**: no record
//! - **accumulating**: `1..max_attempts` failures inside the attempt window
//! - **locked**: `max_attempts` failures reached, lockout timer running
//!
//! Once the attempt window has elapsed since the first failure, the next
//! failure restarts the whole counter at 1 and clears any lock. Expired
//! locks are never cleared eagerly: they read as unlocked and are removed
//! by [`RateLimiter::sweep`] or overwritten by the next failure.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::{DashMap, mapref::entry::Entry};
use tanzia_shared::SecurityConfig;

use super::clock::{Clock, SystemClock};
use super::seconds;
use super::sweeper::Sweep;

/// Throttling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Failures that trigger a lockout.
    pub max_attempts: u32,
    /// How long a lockout lasts.
    pub lockout: TimeDelta,
    /// How long after the first failure the counter restarts.
    pub attempt_window: TimeDelta,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lockout: TimeDelta::minutes(15),
            attempt_window: TimeDelta::minutes(15),
        }
    }
}

impl From<&SecurityConfig> for RateLimitPolicy {
    fn from(config: &SecurityConfig) -> Self {
        Self {
            max_attempts: config.max_login_attempts,
            lockout: seconds(config.lockout_secs),
            attempt_window: seconds(config.attempt_window_secs),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct LoginAttempt {
    failure_count: u32,
    first_failure_at: DateTime<Utc>,
    locked_since: Option<DateTime<Utc>>,
}

impl LoginAttempt {
    const fn first(now: DateTime<Utc>) -> Self {
        Self {
            failure_count: 1,
            first_failure_at: now,
            locked_since: None,
        }
    }

    fn window_expired(&self, now: DateTime<Utc>, policy: &RateLimitPolicy) -> bool {
        now - self.first_failure_at > policy.attempt_window
    }

    fn is_locked(&self, now: DateTime<Utc>, policy: &RateLimitPolicy) -> bool {
        self.locked_since
            .is_some_and(|since| now - since < policy.lockout)
    }

    fn is_reclaimable(&self, now: DateTime<Utc>, policy: &RateLimitPolicy) -> bool {
        match self.locked_since {
            Some(since) => now - since > policy.lockout,
            None => self.window_expired(now, policy),
        }
    }
}

/// In-memory failed-login counter.
///
/// Every operation on one identifier is atomic: the map is sharded and
/// each call holds the shard lock for its whole read-modify-write.
#[derive(Debug)]
pub struct RateLimiter<C: Clock = SystemClock> {
    attempts: DashMap<String, LoginAttempt>,
    policy: RateLimitPolicy,
    clock: C,
}

impl RateLimiter<SystemClock> {
    /// Creates a limiter on the system clock.
    #[must_use]
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self::with_clock(policy, SystemClock)
    }
}

impl Default for RateLimiter<SystemClock> {
    fn default() -> Self {
        Self::new(RateLimitPolicy::default())
    }
}

impl<C: Clock> RateLimiter<C> {
    /// Creates a limiter reading time from `clock`.
    #[must_use]
    pub fn with_clock(policy: RateLimitPolicy, clock: C) -> Self {
        Self {
            attempts: DashMap::new(),
            policy,
            clock,
        }
    }

    /// Returns the active policy.
    #[must_use]
    pub const fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Records a failed login and returns true if the identifier is now locked.
    pub fn record_failed_attempt(&self, identifier: &str) -> bool {
        let now = self.clock.now();

        match self.attempts.entry(identifier.to_owned()) {
            Entry::Vacant(entry) => {
                entry.insert(LoginAttempt::first(now));
                false
            }
            Entry::Occupied(mut entry) => {
                let attempt = entry.get_mut();

                if attempt.window_expired(now, &self.policy) {
                    *attempt = LoginAttempt::first(now);
                    return false;
                }

                attempt.failure_count = attempt.failure_count.saturating_add(1);
                if attempt.failure_count >= self.policy.max_attempts {
                    attempt.locked_since = Some(now);
                    return true;
                }

                false
            }
        }
    }

    /// Returns true while a lockout is running for `identifier`.
    pub fn is_locked(&self, identifier: &str) -> bool {
        let now = self.clock.now();
        self.attempts
            .get(identifier)
            .is_some_and(|attempt| attempt.is_locked(now, &self.policy))
    }

    /// Time left on the lockout, zero when not locked.
    pub fn lockout_remaining(&self, identifier: &str) -> Duration {
        let now = self.clock.now();
        self.attempts
            .get(identifier)
            .and_then(|attempt| attempt.locked_since)
            .and_then(|since| (self.policy.lockout - (now - since)).to_std().ok())
            .unwrap_or(Duration::ZERO)
    }

    /// Failures left before a lockout.
    pub fn remaining_attempts(&self, identifier: &str) -> u32 {
        let now = self.clock.now();
        match self.attempts.get(identifier) {
            Some(attempt) if !attempt.window_expired(now, &self.policy) => self
                .policy
                .max_attempts
                .saturating_sub(attempt.failure_count),
            _ => self.policy.max_attempts,
        }
    }

    /// Forgets `identifier` entirely. Called after a successful login.
    pub fn reset_attempts(&self, identifier: &str) {
        self.attempts.remove(identifier);
    }

    /// Number of tracked identifiers.
    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    /// Returns true if no identifier is tracked.
    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Removes records whose lock, or unlocked window, has expired.
    ///
    /// Returns the number of records removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;
        self.attempts.retain(|_, attempt| {
            let keep = !attempt.is_reclaimable(now, &self.policy);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }
}

impl<C: Clock> Sweep for RateLimiter<C> {
    fn name(&self) -> &'static str {
        "login_rate_limiter"
    }

    fn sweep(&self) -> usize {
        Self::sweep(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::clock::ManualClock;

    const EMAIL: &str = "owner@example.com";

    fn limiter() -> (RateLimiter<ManualClock>, ManualClock) {
        let clock = ManualClock::default();
        (
            RateLimiter::with_clock(RateLimitPolicy::default(), clock.clone()),
            clock,
        )
    }

    #[test]
    fn test_new_identifier_is_clean() {
        let (limiter, _) = limiter();

        assert!(!limiter.is_locked(EMAIL));
        assert_eq!(limiter.remaining_attempts(EMAIL), 5);
        assert_eq!(limiter.lockout_remaining(EMAIL), Duration::ZERO);
    }

    #[test]
    fn test_four_failures_leave_one_attempt() {
        let (limiter, _) = limiter();

        for i in 0..4 {
            assert!(
                !limiter.record_failed_attempt(EMAIL),
                "locked after {} attempts",
                i + 1
            );
        }

        assert!(!limiter.is_locked(EMAIL));
        assert_eq!(limiter.remaining_attempts(EMAIL), 1);
    }

    #[test]
    fn test_fifth_failure_locks() {
        let (limiter, _) = limiter();

        for _ in 0..4 {
            limiter.record_failed_attempt(EMAIL);
        }

        assert!(limiter.record_failed_attempt(EMAIL));
        assert!(limiter.is_locked(EMAIL));
        assert_eq!(limiter.remaining_attempts(EMAIL), 0);
        assert_eq!(limiter.lockout_remaining(EMAIL), Duration::from_secs(900));
    }

    #[test]
    fn test_lock_holds_until_lockout_elapses() {
        let (limiter, clock) = limiter();
        for _ in 0..5 {
            limiter.record_failed_attempt(EMAIL);
        }

        clock.advance(TimeDelta::minutes(14));
        assert!(limiter.is_locked(EMAIL));
        assert_eq!(limiter.lockout_remaining(EMAIL), Duration::from_secs(60));

        clock.advance(TimeDelta::minutes(1));
        assert!(!limiter.is_locked(EMAIL));
        assert_eq!(limiter.lockout_remaining(EMAIL), Duration::ZERO);
    }

    #[test]
    fn test_expired_lock_is_not_eagerly_removed() {
        let (limiter, clock) = limiter();
        for _ in 0..5 {
            limiter.record_failed_attempt(EMAIL);
        }

        clock.advance(TimeDelta::minutes(20));

        assert!(!limiter.is_locked(EMAIL));
        assert_eq!(limiter.len(), 1);
    }

    #[test]
    fn test_failure_after_window_restarts_counter() {
        let (limiter, clock) = limiter();
        for _ in 0..5 {
            limiter.record_failed_attempt(EMAIL);
        }

        clock.advance(TimeDelta::minutes(16));

        assert!(!limiter.record_failed_attempt(EMAIL));
        assert!(!limiter.is_locked(EMAIL));
        assert_eq!(limiter.remaining_attempts(EMAIL), 4);
    }

    #[test]
    fn test_remaining_attempts_resets_after_window() {
        let (limiter, clock) = limiter();
        limiter.record_failed_attempt(EMAIL);
        limiter.record_failed_attempt(EMAIL);
        assert_eq!(limiter.remaining_attempts(EMAIL), 3);

        clock.advance(TimeDelta::minutes(16));

        assert_eq!(limiter.remaining_attempts(EMAIL), 5);
    }

    #[test]
    fn test_reset_restores_full_attempts() {
        let (limiter, _) = limiter();
        limiter.record_failed_attempt(EMAIL);
        limiter.record_failed_attempt(EMAIL);

        limiter.reset_attempts(EMAIL);

        assert_eq!(limiter.remaining_attempts(EMAIL), 5);
        assert!(limiter.is_empty());
    }

    #[test]
    fn test_identifiers_are_independent() {
        let (limiter, _) = limiter();
        for _ in 0..5 {
            limiter.record_failed_attempt(EMAIL);
        }

        assert!(!limiter.is_locked("other@example.com"));
        assert_eq!(limiter.remaining_attempts("other@example.com"), 5);
    }

    #[test]
    fn test_sweep_reclaims_expired_records_only() {
        let (limiter, clock) = limiter();
        for _ in 0..5 {
            limiter.record_failed_attempt("locked@example.com");
        }
        limiter.record_failed_attempt("stale@example.com");

        clock.advance(TimeDelta::minutes(10));
        limiter.record_failed_attempt("fresh@example.com");
        assert_eq!(limiter.sweep(), 0);

        clock.advance(TimeDelta::minutes(6));
        assert_eq!(limiter.sweep(), 2);
        assert_eq!(limiter.len(), 1);
        assert_eq!(limiter.remaining_attempts("fresh@example.com"), 4);
    }

    #[test]
    fn test_policy_from_config() {
        let config = SecurityConfig {
            max_login_attempts: 3,
            lockout_secs: 60,
            attempt_window_secs: 120,
            ..SecurityConfig::default()
        };

        let policy = RateLimitPolicy::from(&config);

        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.lockout, TimeDelta::seconds(60));
        assert_eq!(policy.attempt_window, TimeDelta::seconds(120));
        assert_eq!(RateLimiter::new(policy).policy(), &policy);
    }

    #[test]
    fn test_concurrent_failures_lock_exactly_once() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let limiter = Arc::new(RateLimiter::with_clock(
            RateLimitPolicy {
                max_attempts: 40,
                ..RateLimitPolicy::default()
            },
            ManualClock::default(),
        ));
        let first_lock = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let first_lock = Arc::clone(&first_lock);
                std::thread::spawn(move || {
                    for _ in 0..5 {
                        if limiter.record_failed_attempt(EMAIL)
                            && limiter.remaining_attempts(EMAIL) == 0
                        {
                            first_lock.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(limiter.is_locked(EMAIL));
        assert_eq!(first_lock.load(Ordering::SeqCst), 1);
    }
}
