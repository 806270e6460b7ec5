//! Completion counting for render passes.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Identifies one render pass.
///
/// A task only reports progress while the generation it was queued under is
/// still current. Cancelling or starting a pass moves the generation on, so
/// tasks from an earlier pass can no longer touch the shared count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Default)]
struct ProgressState {
    generation: Generation,
    completed: usize,
}

/// Shared completed-task count of a layer's current pass.
///
/// Updates go through the mutex. The read accessors load atomic copies that
/// the lock holder refreshes, so they never block and may be called from the
/// progress callback itself.
#[derive(Debug, Default)]
pub struct ProgressCounter {
    state: Mutex<ProgressState>,
    generation: AtomicU64,
    completed: AtomicUsize,
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new pass: advance the generation and zero the count.
    pub fn begin_pass(&self) -> Generation {
        let mut state = self.lock();
        state.generation = Generation(state.generation.0 + 1);
        state.completed = 0;
        self.publish(&state);
        state.generation
    }

    /// Invalidate the current pass without starting another.
    pub fn retire(&self) -> Generation {
        let mut state = self.lock();
        state.generation = Generation(state.generation.0 + 1);
        self.publish(&state);
        state.generation
    }

    pub fn generation(&self) -> Generation {
        Generation(self.generation.load(Ordering::Acquire))
    }

    /// Lock-free check; `complete_one` re-checks under the lock.
    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation() == generation
    }

    /// Completed tasks of the current pass.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    /// Count one finished task of `generation` and report the new fraction.
    ///
    /// `report` runs while the count is locked, so reports reach the layer in
    /// increasing order. It may read `generation` and `completed` but must not
    /// call `begin_pass` or `retire`. Returns `None` without reporting when
    /// `generation` is no longer current.
    pub fn complete_one<F>(&self, generation: Generation, total: usize, report: F) -> Option<f32>
    where
        F: FnOnce(f32),
    {
        let mut state = self.lock();
        if state.generation != generation {
            return None;
        }
        state.completed += 1;
        self.publish(&state);

        let fraction = if total == 0 {
            1.0
        } else {
            state.completed as f32 / total as f32
        };
        report(fraction);
        Some(fraction)
    }

    fn publish(&self, state: &ProgressState) {
        self.generation.store(state.generation.0, Ordering::Release);
        self.completed.store(state.completed, Ordering::Release);
    }

    fn lock(&self) -> MutexGuard<'_, ProgressState> {
        // A panicking progress callback leaves the count itself consistent
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fractions_increase_to_one() {
        let counter = ProgressCounter::new();
        let generation = counter.begin_pass();
        let mut seen = Vec::new();
        for _ in 0..4 {
            counter.complete_one(generation, 4, |f| seen.push(f));
        }
        assert_eq!(seen, vec![0.25, 0.5, 0.75, 1.0]);
        assert_eq!(counter.completed(), 4);
    }

    #[test]
    fn test_stale_generation_is_ignored() {
        let counter = ProgressCounter::new();
        let old = counter.begin_pass();
        counter.complete_one(old, 2, |_| {});

        let new = counter.begin_pass();
        assert_eq!(counter.completed(), 0);
        assert_eq!(counter.complete_one(old, 2, |_| panic!("stale report")), None);
        assert_eq!(counter.complete_one(new, 2, |_| {}), Some(0.5));
    }

    #[test]
    fn test_report_can_read_counter() {
        let counter = ProgressCounter::new();
        let generation = counter.begin_pass();
        let mut seen = None;
        counter.complete_one(generation, 2, |_| {
            seen = Some((counter.generation(), counter.completed()));
        });
        assert_eq!(seen, Some((generation, 1)));
    }

    #[test]
    fn test_retire_keeps_count() {
        let counter = ProgressCounter::new();
        let generation = counter.begin_pass();
        counter.complete_one(generation, 3, |_| {});
        let retired = counter.retire();
        assert!(retired > generation);
        assert!(!counter.is_current(generation));
        assert_eq!(counter.completed(), 1);
    }
}
