//! Feature layer loaded from a JSON file.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use feature_renderer::VectorLayer;
use map_common::{BoundingBox, FeatureCacheItem, LayerId};
use serde_json::Value;
use tracing::{debug, info};

/// Layer backed by a feature list read once at startup.
///
/// The file holds an array of `{ "id": 1, "geometry": { "type": "point", ... } }`
/// objects; `geometry` may be omitted.
pub struct FileLayer {
    id: LayerId,
    extents: Option<BoundingBox>,
    features: Arc<Vec<FeatureCacheItem>>,
    progress: Mutex<f32>,
    finished: Condvar,
}

impl FileLayer {
    pub fn new(id: LayerId, features: Vec<FeatureCacheItem>) -> Self {
        let extents = features
            .iter()
            .filter_map(|f| f.geometry()?.envelope())
            .reduce(|a, b| a.union(&b));

        Self {
            id,
            extents,
            features: Arc::new(features),
            progress: Mutex::new(0.0),
            finished: Condvar::new(),
        }
    }

    /// Load features from `path`, naming the layer after the file stem.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read features from {}", path.display()))?;
        let features: Vec<FeatureCacheItem> = serde_json::from_str(&text)
            .with_context(|| format!("Invalid feature list in {}", path.display()))?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "features".to_string());

        let layer = Self::new(LayerId::new(name), features);
        info!(
            layer = %layer.id,
            features = layer.features.len(),
            extents = ?layer.extents,
            "Loaded feature layer"
        );
        Ok(layer)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Latest reported fraction.
    pub fn progress(&self) -> f32 {
        *lock(&self.progress)
    }

    /// Block until the pass reports completion. Returns false on timeout.
    pub fn wait_finished(&self, timeout: Duration) -> bool {
        let progress = lock(&self.progress);
        match self
            .finished
            .wait_timeout_while(progress, timeout, |fraction| *fraction < 1.0)
        {
            Ok((_, result)) => !result.timed_out(),
            Err(poisoned) => *poisoned.into_inner().0 >= 1.0,
        }
    }
}

impl VectorLayer for FileLayer {
    fn id(&self) -> LayerId {
        self.id.clone()
    }

    fn extents(&self) -> Option<BoundingBox> {
        self.extents
    }

    fn feature_cache(&self) -> Arc<Vec<FeatureCacheItem>> {
        Arc::clone(&self.features)
    }

    fn on_draw_progress(&self, layer: &LayerId, fraction: f32) {
        debug!(layer = %layer, fraction, "Draw progress");
        let mut progress = lock(&self.progress);
        *progress = fraction;
        if fraction >= 1.0 {
            self.finished.notify_all();
        }
    }
}

/// Read a renderer configuration record.
pub fn load_record(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read renderer record {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Invalid JSON in renderer record {}", path.display()))
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
