//! When the next pass over a resource runs, and how many run at once.

use std::sync::Arc;
use std::time::Duration;

use ghp_core::{Error, Result};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use crate::types::ReconcileOutcome;

/// Requeue policy for reconcile passes.
///
/// Successful passes wait one poll interval. Failed passes back off
/// exponentially from `base`, never waiting longer than the poll interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Delay after the first failure.
    pub base: Duration,
    /// Delay after a successful pass, and the cap on failure delays.
    pub poll_interval: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            poll_interval: Duration::from_secs(120),
        }
    }
}

impl BackoffPolicy {
    #[must_use]
    pub const fn with_base(mut self, base: Duration) -> Self {
        self.base = base;
        self
    }

    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Delay after `consecutive_failures` failed passes in a row (1-indexed).
    #[must_use]
    pub fn failure_delay(&self, consecutive_failures: u32) -> Duration {
        let exponent = consecutive_failures.saturating_sub(1);
        let factor = 2u32.saturating_pow(exponent);
        self.base.saturating_mul(factor).min(self.poll_interval)
    }

    /// Delay before the next pass, or `None` when the object needs no more.
    ///
    /// `failures` is the caller's running count of consecutive failures and
    /// is reset by any successful pass.
    pub fn next_attempt(&self, outcome: &ReconcileOutcome, failures: &mut u32) -> Option<Duration> {
        if outcome.is_terminal() {
            return None;
        }

        if outcome.is_failure() {
            *failures = failures.saturating_add(1);
            let delay = self.failure_delay(*failures);
            debug!(failures = *failures, delay_ms = delay.as_millis(), "Backing off");
            Some(delay)
        } else {
            *failures = 0;
            Some(self.poll_interval)
        }
    }
}

/// Global cap on reconcile passes in flight, shared by every controller.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl RateLimiter {
    /// A limiter admitting `capacity` concurrent passes (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait for a slot. The slot is returned when the permit drops.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit> {
        Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| Error::store(format!("rate limiter closed: {e}")))
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Passes currently holding a slot.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.capacity - self.permits.available_permits()
    }
}
