//! Per-feature style selection.

use std::sync::Arc;

use map_common::{Color, FeatureId};

use crate::style::Style;

/// Picks the style used to draw one feature.
///
/// Called once per feature on the thread running the pass, before the draw
/// task is queued. Implementations that customize a style must return a copy
/// and leave the shared instance untouched.
pub trait StyleResolver: Send + Sync {
    fn resolve(&self, feature_id: FeatureId, style: &Arc<dyn Style>) -> Arc<dyn Style>;
}

impl<F> StyleResolver for F
where
    F: Fn(FeatureId, &Arc<dyn Style>) -> Arc<dyn Style> + Send + Sync,
{
    fn resolve(&self, feature_id: FeatureId, style: &Arc<dyn Style>) -> Arc<dyn Style> {
        self(feature_id, style)
    }
}

/// Every feature shares the renderer's style.
#[derive(Debug, Default, Clone, Copy)]
pub struct SharedStyleResolver;

impl StyleResolver for SharedStyleResolver {
    fn resolve(&self, _feature_id: FeatureId, style: &Arc<dyn Style>) -> Arc<dyn Style> {
        Arc::clone(style)
    }
}

/// Colours features from a palette by id.
#[derive(Debug, Clone)]
pub struct CategoryColorResolver {
    palette: Vec<Color>,
}

impl CategoryColorResolver {
    pub fn new(palette: Vec<Color>) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    fn color_for(&self, feature_id: FeatureId) -> Option<Color> {
        if self.palette.is_empty() {
            return None;
        }
        let index = feature_id.rem_euclid(self.palette.len() as i64) as usize;
        Some(self.palette[index])
    }
}

impl StyleResolver for CategoryColorResolver {
    fn resolve(&self, feature_id: FeatureId, style: &Arc<dyn Style>) -> Arc<dyn Style> {
        match self.color_for(feature_id) {
            Some(color) if color != style.color() => {
                let mut owned = dyn_clone::clone_box(&**style);
                owned.set_color(color);
                Arc::from(owned)
            }
            _ => Arc::clone(style),
        }
    }
}
