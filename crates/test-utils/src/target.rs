//! A render target that records draw commands.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use feature_renderer::{DrawCommand, RenderTarget};
use map_common::BoundingBox;

/// Render target that keeps every command it receives.
///
/// An optional per-command delay keeps draw tasks busy long enough to
/// observe concurrency and cancellation.
pub struct RecordingTarget {
    bounds: BoundingBox,
    delay: Option<Duration>,
    commands: Mutex<Vec<DrawCommand>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl RecordingTarget {
    pub fn new(bounds: BoundingBox) -> Self {
        Self {
            bounds,
            delay: None,
            commands: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    /// Sleep for `delay` inside every draw call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn commands(&self) -> Vec<DrawCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn draw_count(&self) -> usize {
        self.commands.lock().unwrap().len()
    }

    /// Number of commands of the given kind, e.g. `"marker"`.
    pub fn count_of(&self, kind: &str) -> usize {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.kind() == kind)
            .count()
    }

    /// Highest number of draw calls observed in flight at once.
    pub fn max_concurrent_draws(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

impl RenderTarget for RecordingTarget {
    fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    fn draw(&self, command: &DrawCommand) {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.commands.lock().unwrap().push(command.clone());

        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_common::{Color, Coord};

    #[test]
    fn test_counts_by_kind() {
        let target = RecordingTarget::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0));
        target.draw(&DrawCommand::Label {
            at: Coord::new(0.5, 0.5),
            text: "a".to_string(),
            size: 10.0,
            color: Color::BLACK,
        });
        assert_eq!(target.draw_count(), 1);
        assert_eq!(target.count_of("label"), 1);
        assert_eq!(target.count_of("marker"), 0);
        assert_eq!(target.max_concurrent_draws(), 1);
    }
}
