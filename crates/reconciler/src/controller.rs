//! Long-running controller for one managed kind.
//!
//! The controller keeps one worker task per tracked object. A worker runs
//! reconcile passes back to back, sleeping between them according to the
//! [`BackoffPolicy`], so passes for one object never overlap. Every pass
//! holds a slot of the shared [`RateLimiter`] for its whole duration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future;
use ghp_core::{Managed, ObjectMeta, ResourceKey, ResultExt};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::external::Connector;
use crate::reconciler::Reconciler;
use crate::scheduler::{BackoffPolicy, RateLimiter};
use crate::shutdown::ShutdownCoordinator;

/// Floor for the resync period.
const MIN_SYNC_PERIOD: Duration = Duration::from_millis(10);

/// Tuning shared by every controller in the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Wait between successful passes over one object.
    pub poll_interval: Duration,
    /// Period of the full resync over every tracked object.
    pub sync_period: Duration,
    /// First delay after a failed pass.
    pub backoff_base: Duration,
    /// Passes in flight across all controllers.
    pub max_concurrent_reconciles: usize,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2 * 60),
            sync_period: Duration::from_secs(60 * 60),
            backoff_base: Duration::from_secs(1),
            max_concurrent_reconciles: 5,
        }
    }
}

impl ControllerOptions {
    #[must_use]
    pub const fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy {
            base: self.backoff_base,
            poll_interval: self.poll_interval,
        }
    }
}

struct Worker {
    handle: JoinHandle<()>,
    wake: Arc<Notify>,
    generation: u64,
}

/// Drives a [`Reconciler`] over every object in its store.
pub struct Controller<R: Managed, C: Connector<R>> {
    reconciler: Arc<Reconciler<R, C>>,
    limiter: RateLimiter,
    policy: BackoffPolicy,
    sync_period: Duration,
}

impl<R: Managed, C: Connector<R>> Controller<R, C> {
    pub fn new(reconciler: Reconciler<R, C>, limiter: RateLimiter, options: &ControllerOptions) -> Self {
        Self {
            reconciler: Arc::new(reconciler),
            limiter,
            policy: options.backoff(),
            sync_period: options.sync_period.max(MIN_SYNC_PERIOD),
        }
    }

    /// Run until shutdown is initiated, then wait for workers to stop.
    pub async fn run(self, shutdown: Arc<ShutdownCoordinator>) {
        info!(
            kind = R::KIND,
            poll_ms = self.policy.poll_interval.as_millis(),
            sync_ms = self.sync_period.as_millis(),
            "Starting controller"
        );

        let mut changes = self.reconciler.store().watch();
        let mut resync = tokio::time::interval(self.sync_period);
        resync.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut workers: HashMap<ResourceKey, Worker> = HashMap::new();

        loop {
            let resync_all = tokio::select! {
                () = shutdown.cancelled() => break,
                _ = resync.tick() => true,
                changed = changes.changed() => {
                    if changed.is_err() {
                        warn!(kind = R::KIND, "Store watch closed");
                        break;
                    }
                    false
                }
            };

            self.sync_workers(&mut workers, &shutdown, resync_all).await;
        }

        info!(kind = R::KIND, workers = workers.len(), "Stopping controller");
        future::join_all(workers.into_values().map(|w| w.handle)).await;
    }

    /// Start workers for new objects and wake those whose spec changed, or
    /// all of them on a full resync.
    async fn sync_workers(
        &self,
        workers: &mut HashMap<ResourceKey, Worker>,
        shutdown: &Arc<ShutdownCoordinator>,
        resync_all: bool,
    ) {
        workers.retain(|_, w| !w.handle.is_finished());

        let Some(objects) = self.reconciler.store().list().await.into_option_logged() else {
            return;
        };

        debug!(
            kind = R::KIND,
            objects = objects.len(),
            workers = workers.len(),
            resync_all,
            "Syncing workers"
        );

        for meta in objects {
            let key = meta.key();
            match workers.get_mut(&key) {
                Some(worker) => {
                    if resync_all || worker.generation != meta.generation {
                        worker.generation = meta.generation;
                        worker.wake.notify_one();
                    }
                }
                None => {
                    let worker = self.spawn_worker(&meta, shutdown);
                    workers.insert(key, worker);
                }
            }
        }
    }

    fn spawn_worker(&self, meta: &ObjectMeta, shutdown: &Arc<ShutdownCoordinator>) -> Worker {
        let wake = Arc::new(Notify::new());
        let handle = tokio::spawn(work(
            Arc::clone(&self.reconciler),
            self.limiter.clone(),
            self.policy,
            meta.key(),
            Arc::clone(&wake),
            Arc::clone(shutdown),
        ));

        Worker {
            handle,
            wake,
            generation: meta.generation,
        }
    }
}

/// Reconcile one object until it is released or shutdown begins.
async fn work<R: Managed, C: Connector<R>>(
    reconciler: Arc<Reconciler<R, C>>,
    limiter: RateLimiter,
    policy: BackoffPolicy,
    key: ResourceKey,
    wake: Arc<Notify>,
    shutdown: Arc<ShutdownCoordinator>,
) {
    let mut failures = 0u32;

    loop {
        let permit = tokio::select! {
            () = shutdown.cancelled() => break,
            permit = limiter.acquire() => permit,
        };
        let Ok(permit) = permit else {
            break;
        };

        let outcome = tokio::select! {
            () = shutdown.cancelled() => break,
            outcome = reconciler.reconcile(&key) => outcome,
        };
        drop(permit);

        let Some(delay) = policy.next_attempt(&outcome, &mut failures) else {
            debug!(kind = R::KIND, resource = %key, outcome = %outcome, "Worker finished");
            break;
        };
        debug!(
            kind = R::KIND,
            resource = %key,
            outcome = %outcome,
            requeue_after_ms = delay.as_millis(),
            "Pass complete"
        );

        tokio::select! {
            () = shutdown.cancelled() => break,
            () = tokio::time::sleep(delay) => {}
            () = wake.notified() => {}
        }
    }
}
