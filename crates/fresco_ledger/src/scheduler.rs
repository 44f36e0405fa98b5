//! Periodic retention purge.

use crate::RetentionLedger;
use chrono::Utc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Tick interval used when none is configured.
pub const DEFAULT_PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Retention window used when none is configured.
pub const DEFAULT_RETENTION_WINDOW: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Runs [`RetentionLedger::purge_expired`] on a fixed tick.
///
/// # Example
///
/// ```rust,no_run
/// use fresco_ledger::{PurgeScheduler, RetentionLedger};
/// use std::time::Duration;
///
/// # async fn example() {
/// let ledger = RetentionLedger::in_memory();
/// let handle = PurgeScheduler::new(ledger)
///     .with_interval(Duration::from_secs(60))
///     .spawn();
///
/// // ... serve requests ...
///
/// handle.shutdown().await;
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PurgeScheduler {
    ledger: RetentionLedger,
    interval: Duration,
    window: Duration,
}

impl PurgeScheduler {
    /// Create a scheduler with the default interval and window.
    pub fn new(ledger: RetentionLedger) -> Self {
        Self {
            ledger,
            interval: DEFAULT_PURGE_INTERVAL,
            window: DEFAULT_RETENTION_WINDOW,
        }
    }

    /// Set the tick interval. A zero interval is raised to one millisecond.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Set the retention window.
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Run a single purge against the current time.
    ///
    /// Returns the number of purged tombstones.
    #[instrument(skip(self))]
    pub fn run_once(&self) -> usize {
        let window = match chrono::Duration::from_std(self.window) {
            Ok(window) => window,
            Err(e) => {
                warn!(error = %e, "Retention window out of range, skipping purge");
                return 0;
            }
        };

        let purged = self.ledger.purge_expired(Utc::now(), window);
        if purged.is_empty() {
            debug!("No expired tombstones");
        } else {
            let ids: Vec<String> = purged.iter().map(ToString::to_string).collect();
            info!(count = purged.len(), ids = ?ids, "Purged expired tombstones");
        }
        purged.len()
    }

    /// Start the purge loop on the current runtime.
    ///
    /// The first purge happens one interval after spawning.
    #[instrument(skip(self), fields(interval = ?self.interval, window = ?self.window))]
    pub fn spawn(self) -> PurgeHandle {
        let token = CancellationToken::new();
        let loop_token = token.clone();

        let join = tokio::spawn(async move {
            let mut timer = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = loop_token.cancelled() => {
                        debug!("Purge loop cancelled");
                        break;
                    }
                    _ = timer.tick() => {
                        self.run_once();
                    }
                }
            }
        });

        info!("Purge scheduler started");
        PurgeHandle { token, join }
    }
}

/// Handle to a running purge loop.
#[derive(Debug)]
pub struct PurgeHandle {
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl PurgeHandle {
    /// Token that stops the loop when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Whether the loop task has exited.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Stop the loop and wait for it to exit.
    #[instrument(skip(self))]
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = self.join.await {
            warn!(error = %e, "Purge loop ended abnormally");
        }
        info!("Purge scheduler stopped");
    }
}
