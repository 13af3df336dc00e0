//! Periodic reclamation of expired guard entries.
//!
//! Expiry is always checked lazily at read time; sweeping only frees memory
//! early and never changes what a guard reports.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A store whose expired entries can be dropped in a single pass.
pub trait Sweep: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Drops expired entries and returns how many were removed.
    fn sweep(&self) -> usize;
}

/// Shortest period a sweeper runs at.
pub const MIN_SWEEP_PERIOD: Duration = Duration::from_secs(1);

/// Spawns a task sweeping `store` every `period` until `cancel` fires.
///
/// The first sweep runs one full `period` after spawning. Periods below
/// [`MIN_SWEEP_PERIOD`], zero included, are raised to it.
pub fn spawn_sweeper<S: Sweep>(
    store: Arc<S>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    if period < MIN_SWEEP_PERIOD {
        warn!(
            store = store.name(),
            requested_ms = period.as_millis(),
            "Sweep interval too short, using 1s"
        );
    }
    let period = period.max(MIN_SWEEP_PERIOD);

    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;

        info!(
            store = store.name(),
            interval_secs = period.as_secs(),
            "Sweeper started"
        );

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!(store = store.name(), "Sweeper shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let removed = store.sweep();
                    debug!(store = store.name(), removed, "Sweep completed");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::TimeDelta;

    use super::*;
    use crate::security::clock::ManualClock;
    use crate::security::csrf::CsrfManager;

    #[derive(Default)]
    struct CountingStore {
        runs: AtomicUsize,
    }

    impl Sweep for CountingStore {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn sweep(&self) -> usize {
            self.runs.fetch_add(1, Ordering::SeqCst);
            0
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeps_on_each_period() {
        let store = Arc::new(CountingStore::default());
        let cancel = CancellationToken::new();
        let handle = spawn_sweeper(Arc::clone(&store), Duration::from_secs(60), cancel.clone());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(store.runs.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(160)).await;
        assert_eq!(store.runs.load(Ordering::SeqCst), 3);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_period_is_raised_to_minimum() {
        let store = Arc::new(CountingStore::default());
        let cancel = CancellationToken::new();
        let handle = spawn_sweeper(Arc::clone(&store), Duration::ZERO, cancel.clone());

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(store.runs.load(Ordering::SeqCst), 3);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_sweeping() {
        let store = Arc::new(CountingStore::default());
        let cancel = CancellationToken::new();
        let handle = spawn_sweeper(Arc::clone(&store), Duration::from_secs(60), cancel.clone());

        cancel.cancel();
        handle.await.unwrap();

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(store.runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_reclaims_expired_tokens() {
        let clock = ManualClock::default();
        let manager = Arc::new(CsrfManager::with_clock(TimeDelta::hours(24), clock.clone()));
        manager.create_token("session-a").unwrap();
        clock.advance(TimeDelta::hours(25));
        manager.create_token("session-b").unwrap();

        let cancel = CancellationToken::new();
        let handle = spawn_sweeper(Arc::clone(&manager), Duration::from_secs(1800), cancel.clone());

        tokio::time::sleep(Duration::from_secs(1801)).await;

        assert_eq!(manager.len(), 1);
        assert!(manager.get_token("session-b").is_some());

        cancel.cancel();
        handle.await.unwrap();
    }
}
