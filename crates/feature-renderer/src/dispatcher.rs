//! Parallel feature-draw dispatcher.
//!
//! A [`RenderDispatcher`] draws every cached feature of one layer onto a
//! render target. Each pass gets a fresh bounded worker pool with one task
//! per feature. Tasks report completion through the layer's progress
//! callback, and starting a pass cancels the pass before it.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::thread;
use std::time::{Duration, Instant};

use map_common::{BoundingBox, FeatureCacheItem, LayerId};
use metrics::counter;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::cancellation::{CancelOutcome, CancellationController};
use crate::codec;
use crate::config::RenderConfig;
use crate::error::Result;
use crate::pool::{CancelFlag, WorkerPool};
use crate::progress::{Generation, ProgressCounter};
use crate::registry::StyleRegistry;
use crate::resolver::{SharedStyleResolver, StyleResolver};
use crate::style::Style;
use crate::target::RenderTarget;

/// The layer a dispatcher renders.
///
/// `on_draw_progress` is called from worker threads and from the delayed
/// completion thread, never from the thread calling `run`.
pub trait VectorLayer: Send + Sync {
    fn id(&self) -> LayerId;

    /// Extent of the layer's features, `None` if unknown.
    fn extents(&self) -> Option<BoundingBox>;

    /// Snapshot of the cached features, in draw order.
    fn feature_cache(&self) -> Arc<Vec<FeatureCacheItem>>;

    /// Completion fraction of the current pass, in `0.0..=1.0`.
    ///
    /// Task reports arrive while the pass's progress count is locked. The
    /// callback may read dispatcher state such as `completed`, `generation`
    /// or `is_busy`, but must not call `run` or `cancel` or drop the last
    /// handle to the dispatcher; those wait on the same lock and deadlock.
    fn on_draw_progress(&self, layer: &LayerId, fraction: f32);
}

/// What `run` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// No style configured; nothing drawn and nothing reported.
    NoStyle,
    /// Extents missing or disjoint from the target; a delayed 100% is reported.
    OutOfView,
    /// The feature cache is empty; a delayed 100% is reported.
    EmptyCache,
    /// One draw task per feature was queued.
    Dispatched {
        features: usize,
        generation: Generation,
    },
}

/// Per-layer render pass orchestrator.
pub struct RenderDispatcher {
    layer: Arc<dyn VectorLayer>,
    style: RwLock<Option<Arc<dyn Style>>>,
    resolver: Arc<dyn StyleResolver>,
    registry: StyleRegistry,
    config: RenderConfig,
    progress: Arc<ProgressCounter>,
    controller: CancellationController,
    /// Serializes pass setup against cancellation.
    run_lock: Mutex<()>,
}

impl RenderDispatcher {
    /// Create a dispatcher for `layer` with no style.
    pub fn new(layer: Arc<dyn VectorLayer>, config: RenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            layer,
            style: RwLock::new(None),
            resolver: Arc::new(SharedStyleResolver),
            registry: StyleRegistry::default(),
            controller: CancellationController::new(config.terminate_timeout),
            config,
            progress: Arc::new(ProgressCounter::new()),
            run_lock: Mutex::new(()),
        })
    }

    pub fn with_style<S: Style + 'static>(self, style: S) -> Self {
        self.set_style(Box::new(style));
        self
    }

    pub fn with_resolver<R: StyleResolver + 'static>(mut self, resolver: R) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Replace the registry used by [`deserialize`](Self::deserialize).
    pub fn with_registry(mut self, registry: StyleRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn layer(&self) -> &Arc<dyn VectorLayer> {
        &self.layer
    }

    pub fn style(&self) -> Option<Arc<dyn Style>> {
        match self.style.read() {
            Ok(style) => style.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Set the style used by subsequent passes.
    pub fn set_style(&self, style: Box<dyn Style>) {
        *self.style_mut() = Some(Arc::from(style));
    }

    pub fn clear_style(&self) {
        *self.style_mut() = None;
    }

    /// Generation of the most recent pass or cancellation.
    pub fn generation(&self) -> Generation {
        self.progress.generation()
    }

    /// Completed tasks of the current pass. Never blocks.
    pub fn completed(&self) -> usize {
        self.progress.completed()
    }

    /// Whether the current pass still has queued or running tasks.
    pub fn is_busy(&self) -> bool {
        self.controller.is_busy()
    }

    /// Start a render pass onto `target`.
    ///
    /// Returns once every draw task is queued; drawing continues on the
    /// pass's worker threads. Errors only if the worker pool cannot start.
    #[instrument(skip(self, target), fields(layer = %self.layer.id()))]
    pub fn run(&self, target: Arc<dyn RenderTarget>) -> Result<RunOutcome> {
        let Some(style) = self.style() else {
            debug!("No style configured, skipping draw pass");
            return Ok(RunOutcome::NoStyle);
        };

        let view = target.bounds();
        match self.layer.extents() {
            Some(extents) if extents.intersects(&view) => {}
            extents => {
                debug!(?extents, ?view, "Layer not in view, reporting completion");
                self.schedule_completion();
                return Ok(RunOutcome::OutOfView);
            }
        }

        let cache = self.layer.feature_cache();
        if cache.is_empty() {
            debug!("Feature cache empty, reporting completion");
            self.schedule_completion();
            return Ok(RunOutcome::EmptyCache);
        }

        let _setup = self.lock_run();
        self.retire_pass();

        let pool = WorkerPool::new(self.config.draw_threads)?;
        let generation = self.progress.begin_pass();
        let total = cache.len();
        let layer_id = Arc::new(self.layer.id());

        for item in cache.iter() {
            let task = DrawTask {
                item: item.clone(),
                style: self.resolver.resolve(item.id(), &style),
                target: Arc::clone(&target),
                layer: Arc::clone(&self.layer),
                layer_id: Arc::clone(&layer_id),
                progress: Arc::clone(&self.progress),
                generation,
                total,
            };
            pool.submit(move |cancel| task.run(cancel));
        }
        pool.shutdown();

        if let Some(previous) = self.controller.install(pool) {
            // retire_pass already took the previous pool; only a racing
            // install could leave one here
            previous.shutdown_now();
        }

        counter!("feature_render_passes_total").increment(1);
        counter!("feature_render_features_total").increment(total as u64);
        info!(
            features = total,
            threads = self.config.draw_threads,
            generation = generation.value(),
            "Draw pass dispatched"
        );

        Ok(RunOutcome::Dispatched {
            features: total,
            generation,
        })
    }

    /// Cancel the current pass, waiting up to the configured timeout.
    ///
    /// Never fails. Features already drawn stay drawn, and tasks still running
    /// when this returns will not report progress.
    pub fn cancel(&self) -> CancelOutcome {
        let _setup = self.lock_run();
        self.retire_pass()
    }

    /// Block until the current pass has no pending tasks or `timeout` elapses.
    ///
    /// Returns true when no task is pending.
    pub fn wait_for_completion(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        // Pass setup holds the run lock until the pool is installed
        drop(self.lock_run());
        self.controller
            .wait_idle(deadline.saturating_duration_since(Instant::now()))
    }

    /// Configuration record of this renderer.
    pub fn serialize(&self) -> Result<Value> {
        let style = self.style();
        codec::encode(style.as_deref())
    }

    /// Replace the style with the one described by `record`.
    ///
    /// On error the current style is left unchanged.
    pub fn deserialize(&self, record: &Value) -> Result<()> {
        match codec::decode_style(record, &self.registry) {
            Ok(style) => {
                debug!(style = style.type_name(), "Style loaded from record");
                self.set_style(style);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to load renderer record");
                Err(e)
            }
        }
    }

    fn retire_pass(&self) -> CancelOutcome {
        if self.controller.is_busy() {
            debug!("Cancelling previous draw pass");
        }
        self.progress.retire();
        self.controller.cancel()
    }

    fn schedule_completion(&self) {
        let layer = Arc::clone(&self.layer);
        let delay = self.config.completion_delay;
        let spawned = thread::Builder::new()
            .name("feature-render-complete".to_string())
            .spawn(move || {
                thread::sleep(delay);
                let id = layer.id();
                layer.on_draw_progress(&id, 1.0);
            });

        if let Err(e) = spawned {
            warn!(error = %e, "Failed to schedule completion callback");
        }
    }

    fn lock_run(&self) -> MutexGuard<'_, ()> {
        self.run_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn style_mut(&self) -> std::sync::RwLockWriteGuard<'_, Option<Arc<dyn Style>>> {
        self.style
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for RenderDispatcher {
    fn drop(&mut self) {
        self.progress.retire();
        self.controller.abandon();
    }
}

impl std::fmt::Debug for RenderDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderDispatcher")
            .field("layer", &self.layer.id())
            .field("style", &self.style().map(|s| s.type_name()))
            .field("config", &self.config)
            .field("generation", &self.generation())
            .finish()
    }
}

/// One feature's draw-and-report unit.
struct DrawTask {
    item: FeatureCacheItem,
    style: Arc<dyn Style>,
    target: Arc<dyn RenderTarget>,
    layer: Arc<dyn VectorLayer>,
    layer_id: Arc<LayerId>,
    progress: Arc<ProgressCounter>,
    generation: Generation,
    total: usize,
}

impl DrawTask {
    fn run(self, cancel: &CancelFlag) {
        if cancel.is_cancelled() || !self.progress.is_current(self.generation) {
            counter!("feature_render_stale_reports_total").increment(1);
            return;
        }

        if let Some(geometry) = self.item.geometry() {
            let drawn = panic::catch_unwind(AssertUnwindSafe(|| {
                self.style.draw(geometry, self.target.as_ref())
            }));
            match drawn {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    counter!("feature_render_draw_errors_total").increment(1);
                    debug!(feature_id = self.item.id(), error = %e, "Feature not drawn");
                }
                Err(_) => {
                    counter!("feature_render_draw_errors_total").increment(1);
                    warn!(
                        feature_id = self.item.id(),
                        style = self.style.type_name(),
                        "Style panicked while drawing feature"
                    );
                }
            }
        }

        let reported = self.progress.complete_one(self.generation, self.total, |fraction| {
            self.layer.on_draw_progress(&self.layer_id, fraction)
        });
        if reported.is_none() {
            counter!("feature_render_stale_reports_total").increment(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_common::Geometry;
    use std::sync::Mutex as StdMutex;

    use crate::style::SimpleMarkerStyle;
    use crate::target::DrawCommand;

    struct StubLayer {
        extents: Option<BoundingBox>,
        features: Arc<Vec<FeatureCacheItem>>,
        reports: StdMutex<Vec<f32>>,
    }

    impl VectorLayer for StubLayer {
        fn id(&self) -> LayerId {
            LayerId::new("stub")
        }

        fn extents(&self) -> Option<BoundingBox> {
            self.extents
        }

        fn feature_cache(&self) -> Arc<Vec<FeatureCacheItem>> {
            Arc::clone(&self.features)
        }

        fn on_draw_progress(&self, _layer: &LayerId, fraction: f32) {
            self.reports.lock().unwrap().push(fraction);
        }
    }

    struct NullTarget;

    impl RenderTarget for NullTarget {
        fn bounds(&self) -> BoundingBox {
            BoundingBox::new(0.0, 0.0, 10.0, 10.0)
        }

        fn draw(&self, _command: &DrawCommand) {}
    }

    fn layer(extents: Option<BoundingBox>, n: i64) -> Arc<StubLayer> {
        Arc::new(StubLayer {
            extents,
            features: Arc::new(
                (0..n)
                    .map(|i| FeatureCacheItem::new(i, Some(Geometry::point(1.0, 1.0))))
                    .collect(),
            ),
            reports: StdMutex::new(Vec::new()),
        })
    }

    #[test]
    fn test_no_style_outcome() {
        let dispatcher = RenderDispatcher::new(layer(None, 1), RenderConfig::default()).unwrap();
        assert_eq!(dispatcher.run(Arc::new(NullTarget)).unwrap(), RunOutcome::NoStyle);
    }

    #[test]
    fn test_dispatch_reports_generation() {
        let layer = layer(Some(BoundingBox::new(0.0, 0.0, 5.0, 5.0)), 3);
        let dispatcher = RenderDispatcher::new(layer.clone(), RenderConfig::default())
            .unwrap()
            .with_style(SimpleMarkerStyle::default());

        let outcome = dispatcher.run(Arc::new(NullTarget)).unwrap();
        assert!(matches!(outcome, RunOutcome::Dispatched { features: 3, .. }));
        assert!(dispatcher.wait_for_completion(Duration::from_secs(5)));
        assert_eq!(dispatcher.completed(), 3);
        assert_eq!(layer.reports.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RenderConfig::default().with_draw_threads(0);
        assert!(RenderDispatcher::new(layer(None, 0), config).is_err());
    }
}
