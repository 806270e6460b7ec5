//! Ownership of the active pass and its bounded cancellation.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use tracing::{debug, info, warn};

use crate::pool::{WaitResult, WorkerPool};

/// What a cancellation request found and did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// No pass was active, or its tasks had all finished.
    Idle,
    /// Every task of the cancelled pass finished within the timeout.
    Drained,
    /// The timeout elapsed with tasks still queued or running. They see the
    /// cancel flag and will not report progress.
    TimedOut { pending: usize },
    /// The wait itself was interrupted.
    Interrupted,
}

impl CancelOutcome {
    /// Whether the cancelled pass is known to have stopped.
    pub fn is_quiescent(&self) -> bool {
        matches!(self, CancelOutcome::Idle | CancelOutcome::Drained)
    }
}

impl From<WaitResult> for CancelOutcome {
    fn from(result: WaitResult) -> Self {
        match result {
            WaitResult::Drained => CancelOutcome::Drained,
            WaitResult::TimedOut { pending } => CancelOutcome::TimedOut { pending },
            WaitResult::Interrupted => CancelOutcome::Interrupted,
        }
    }
}

/// Holds the pool of the active pass, if any.
#[derive(Debug)]
pub struct CancellationController {
    active: Mutex<Option<WorkerPool>>,
    timeout: Duration,
}

impl CancellationController {
    pub fn new(timeout: Duration) -> Self {
        Self {
            active: Mutex::new(None),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Make `pool` the active pass. Returns the pool it replaces.
    pub fn install(&self, pool: WorkerPool) -> Option<WorkerPool> {
        self.lock().replace(pool)
    }

    /// Whether the active pass still has queued or running tasks.
    pub fn is_busy(&self) -> bool {
        self.lock()
            .as_ref()
            .and_then(WorkerPool::pending)
            .map_or(false, |pending| pending > 0)
    }

    /// Cancel the active pass and wait up to the timeout for it to stop.
    ///
    /// The pool is released whatever the outcome. Tasks still running after
    /// the timeout finish on their own threads.
    pub fn cancel(&self) -> CancelOutcome {
        let Some(pool) = self.lock().take() else {
            return CancelOutcome::Idle;
        };

        pool.shutdown_now();
        if pool.pending() == Some(0) {
            // Finished pass, nothing to wait for
            return CancelOutcome::Idle;
        }

        let started = Instant::now();
        let outcome = CancelOutcome::from(pool.await_termination(self.timeout));
        histogram!("feature_render_cancel_wait_seconds").record(started.elapsed().as_secs_f64());
        counter!("feature_render_cancellations_total").increment(1);

        match outcome {
            CancelOutcome::Drained => debug!(
                waited_ms = started.elapsed().as_millis() as u64,
                "Cancelled draw pass drained"
            ),
            CancelOutcome::TimedOut { pending } => {
                counter!("feature_render_cancel_timeouts_total").increment(1);
                warn!(
                    pending,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Draw tasks still running after cancel timeout"
                );
            }
            CancelOutcome::Interrupted => {
                info!("Wait for cancelled draw pass was interrupted");
            }
            CancelOutcome::Idle => {}
        }

        outcome
    }

    /// Block until the active pass, if any, has no pending tasks.
    ///
    /// Returns false if `timeout` elapsed first.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        // Wait on the tracker without holding the lock so cancel stays possible
        let tracker = match self.lock().as_ref() {
            Some(pool) => pool.tracker(),
            None => return true,
        };
        tracker.wait_idle(timeout) == WaitResult::Drained
    }

    /// Flag the active pass cancelled without waiting for it.
    pub fn abandon(&self) {
        if let Some(pool) = self.lock().take() {
            pool.shutdown_now();
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<WorkerPool>> {
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_without_pass_is_idle() {
        let controller = CancellationController::new(Duration::from_millis(10));
        assert_eq!(controller.cancel(), CancelOutcome::Idle);
        assert!(controller.wait_idle(Duration::from_millis(1)));
    }

    #[test]
    fn test_cancel_times_out_on_blocked_task() {
        let controller = CancellationController::new(Duration::from_millis(20));
        let pool = WorkerPool::new(1).unwrap();
        pool.submit(|_| std::thread::sleep(Duration::from_millis(300)));
        pool.shutdown();
        assert!(controller.install(pool).is_none());
        assert!(controller.is_busy());

        let started = Instant::now();
        assert_eq!(controller.cancel(), CancelOutcome::TimedOut { pending: 1 });
        assert!(started.elapsed() < Duration::from_millis(250));
        // The pool was released
        assert_eq!(controller.cancel(), CancelOutcome::Idle);
    }

    #[test]
    fn test_cancel_drains_cooperative_tasks() {
        let controller = CancellationController::new(Duration::from_secs(5));
        let pool = WorkerPool::new(2).unwrap();
        for _ in 0..10 {
            pool.submit(|cancel| {
                while !cancel.is_cancelled() {
                    std::thread::sleep(Duration::from_millis(1));
                }
            });
        }
        pool.shutdown();
        controller.install(pool);
        assert_eq!(controller.cancel(), CancelOutcome::Drained);
    }

    #[test]
    fn test_outcome_quiescence() {
        assert!(CancelOutcome::Idle.is_quiescent());
        assert!(CancelOutcome::Drained.is_quiescent());
        assert!(!CancelOutcome::TimedOut { pending: 2 }.is_quiescent());
        assert!(!CancelOutcome::Interrupted.is_quiescent());
    }
}
