//! A vector layer that records the progress reported to it.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use feature_renderer::VectorLayer;
use map_common::{BoundingBox, FeatureCacheItem, LayerId};

/// In-memory layer for dispatcher tests.
///
/// Extents default to the union of the feature envelopes.
pub struct RecordingLayer {
    id: LayerId,
    extents: Mutex<Option<BoundingBox>>,
    features: Mutex<Arc<Vec<FeatureCacheItem>>>,
    reports: Mutex<Vec<f32>>,
    reported: Condvar,
}

impl RecordingLayer {
    pub fn new(id: &str, features: Vec<FeatureCacheItem>) -> Self {
        let extents = envelope_of(&features);
        Self {
            id: LayerId::new(id),
            extents: Mutex::new(extents),
            features: Mutex::new(Arc::new(features)),
            reports: Mutex::new(Vec::new()),
            reported: Condvar::new(),
        }
    }

    /// Override the extents reported to the dispatcher.
    pub fn with_extents(self, extents: Option<BoundingBox>) -> Self {
        *self.extents.lock().unwrap() = extents;
        self
    }

    /// Replace the cached features. Extents are left as they are.
    pub fn set_features(&self, features: Vec<FeatureCacheItem>) {
        *self.features.lock().unwrap() = Arc::new(features);
    }

    /// Every fraction reported so far, in arrival order.
    pub fn reports(&self) -> Vec<f32> {
        self.reports.lock().unwrap().clone()
    }

    pub fn report_count(&self) -> usize {
        self.reports.lock().unwrap().len()
    }

    pub fn clear_reports(&self) {
        self.reports.lock().unwrap().clear();
    }

    /// Wait until at least `count` reports arrived. Returns false on timeout.
    pub fn wait_for_reports(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut reports = self.reports.lock().unwrap();
        while reports.len() < count {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            reports = self.reported.wait_timeout(reports, remaining).unwrap().0;
        }
        true
    }
}

impl VectorLayer for RecordingLayer {
    fn id(&self) -> LayerId {
        self.id.clone()
    }

    fn extents(&self) -> Option<BoundingBox> {
        *self.extents.lock().unwrap()
    }

    fn feature_cache(&self) -> Arc<Vec<FeatureCacheItem>> {
        Arc::clone(&self.features.lock().unwrap())
    }

    fn on_draw_progress(&self, layer: &LayerId, fraction: f32) {
        assert_eq!(layer, &self.id, "progress reported for another layer");
        self.reports.lock().unwrap().push(fraction);
        self.reported.notify_all();
    }
}

fn envelope_of(features: &[FeatureCacheItem]) -> Option<BoundingBox> {
    features
        .iter()
        .filter_map(|f| f.geometry()?.envelope())
        .reduce(|a, b| a.union(&b))
}
