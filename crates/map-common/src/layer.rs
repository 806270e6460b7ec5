//! Layer identity and the cached features a vector layer hands to renderers.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::Geometry;

/// Unique identifier for a layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(pub String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Feature identifier within a layer.
pub type FeatureId = i64;

/// Immutable snapshot of one cached feature.
///
/// The geometry may be absent when the layer has not materialized it yet;
/// renderers treat that as "nothing to draw", not as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCacheItem {
    id: FeatureId,
    #[serde(default)]
    geometry: Option<Arc<Geometry>>,
}

impl FeatureCacheItem {
    pub fn new(id: FeatureId, geometry: Option<Geometry>) -> Self {
        Self {
            id,
            geometry: geometry.map(Arc::new),
        }
    }

    /// A feature whose geometry has not been loaded.
    pub fn unloaded(id: FeatureId) -> Self {
        Self { id, geometry: None }
    }

    pub fn id(&self) -> FeatureId {
        self.id
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_deref()
    }
}
