//! Feature cache generators.
//!
//! Generated geometry stays inside [`fixtures::bbox::VIEW`](crate::fixtures::bbox::VIEW)
//! unless stated otherwise.

use map_common::{FeatureCacheItem, FeatureId, Geometry};

/// `n` point features on a diagonal through the view.
pub fn point_features(n: usize) -> Vec<FeatureCacheItem> {
    (0..n)
        .map(|i| {
            let t = position(i, n);
            FeatureCacheItem::new(i as FeatureId, Some(Geometry::point(t, t)))
        })
        .collect()
}

/// `n` features cycling through point, line and polygon geometry.
pub fn mixed_features(n: usize) -> Vec<FeatureCacheItem> {
    (0..n)
        .map(|i| {
            let t = position(i, n);
            let geometry = match i % 3 {
                0 => Geometry::point(t, t),
                1 => Geometry::line([(t, 0.0), (t, 50.0), (100.0 - t, 100.0)]),
                _ => Geometry::polygon([(t, t), (t + 1.0, t), (t + 1.0, t + 1.0), (t, t + 1.0)]),
            };
            FeatureCacheItem::new(i as FeatureId, Some(geometry))
        })
        .collect()
}

/// `present` point features interleaved with `absent` features whose
/// geometry is not loaded. Ids run from 0 in cache order.
pub fn sparse_features(present: usize, absent: usize) -> Vec<FeatureCacheItem> {
    let total = present + absent;
    let mut loaded = 0;
    (0..total)
        .map(|i| {
            let id = i as FeatureId;
            // Alternate while both kinds remain, then fill with the rest
            let take_present = loaded < present && (i % 2 == 0 || i - loaded >= absent);
            if take_present {
                loaded += 1;
                let t = position(i, total);
                FeatureCacheItem::new(id, Some(Geometry::point(t, t)))
            } else {
                FeatureCacheItem::unloaded(id)
            }
        })
        .collect()
}

fn position(i: usize, n: usize) -> f64 {
    // Keep clear of the view edges
    1.0 + 98.0 * (i as f64 + 0.5) / n.max(1) as f64
}
