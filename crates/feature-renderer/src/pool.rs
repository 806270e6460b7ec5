//! Per-pass worker pool.
//!
//! Each render pass gets its own fixed-size rayon pool. Submitted tasks are
//! tracked so that cancellation can wait, with a deadline, for the tasks that
//! are already running.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{error, warn};

use crate::error::Result;

/// Cooperative cancellation flag shared by the tasks of one pool.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    flag: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Result of waiting for a pool's tasks to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitResult {
    Drained,
    TimedOut { pending: usize },
    /// The tracker was poisoned while waiting.
    Interrupted,
}

/// Counts queued and running tasks of one pool.
#[derive(Debug, Default)]
pub struct TaskTracker {
    pending: Mutex<usize>,
    idle: Condvar,
}

impl TaskTracker {
    fn enqueue(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            *pending += 1;
        }
    }

    fn finish(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            *pending = pending.saturating_sub(1);
            if *pending == 0 {
                self.idle.notify_all();
            }
        }
    }

    /// Tasks queued or running, `None` if the tracker is poisoned.
    pub fn pending(&self) -> Option<usize> {
        self.pending.lock().ok().map(|pending| *pending)
    }

    /// Block until no task is pending or `timeout` elapses.
    pub fn wait_idle(&self, timeout: Duration) -> WaitResult {
        let Ok(pending) = self.pending.lock() else {
            return WaitResult::Interrupted;
        };
        match self.idle.wait_timeout_while(pending, timeout, |pending| *pending > 0) {
            Ok((pending, result)) if result.timed_out() && *pending > 0 => WaitResult::TimedOut {
                pending: *pending,
            },
            Ok(_) => WaitResult::Drained,
            Err(_) => WaitResult::Interrupted,
        }
    }
}

/// Marks a task finished when dropped, including on unwind.
struct FinishGuard(Arc<TaskTracker>);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// Fixed-size pool running the draw tasks of one pass.
pub struct WorkerPool {
    pool: ThreadPool,
    threads: usize,
    tracker: Arc<TaskTracker>,
    cancel: CancelFlag,
    accepting: AtomicBool,
}

impl WorkerPool {
    pub fn new(threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("feature-draw-{}", i))
            .panic_handler(|_| error!("Draw worker panicked outside a task"))
            .build()?;

        Ok(Self {
            pool,
            threads,
            tracker: Arc::new(TaskTracker::default()),
            cancel: CancelFlag::new(),
            accepting: AtomicBool::new(true),
        })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Queue a task. Returns false once the pool has been shut down.
    pub fn submit<F>(&self, task: F) -> bool
    where
        F: FnOnce(&CancelFlag) + Send + 'static,
    {
        if !self.accepting.load(Ordering::Acquire) {
            warn!("Task submitted to a shut-down draw pool");
            return false;
        }

        self.tracker.enqueue();
        let guard = FinishGuard(Arc::clone(&self.tracker));
        let cancel = self.cancel.clone();
        self.pool.spawn(move || {
            let _guard = guard;
            task(&cancel);
        });
        true
    }

    /// Stop accepting tasks. Queued tasks still run.
    pub fn shutdown(&self) {
        self.accepting.store(false, Ordering::Release);
    }

    /// Stop accepting tasks and tell queued and running tasks to stop.
    pub fn shutdown_now(&self) {
        self.shutdown();
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn pending(&self) -> Option<usize> {
        self.tracker.pending()
    }

    pub fn tracker(&self) -> Arc<TaskTracker> {
        Arc::clone(&self.tracker)
    }

    pub fn await_termination(&self, timeout: Duration) -> WaitResult {
        self.tracker.wait_idle(timeout)
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads)
            .field("pending", &self.pending())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
