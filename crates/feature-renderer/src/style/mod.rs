//! Feature styles.
//!
//! A style turns one feature geometry into draw commands. Every style carries
//! a type name that tags its configuration record, e.g.
//!
//! ```json
//! { "name": "SimpleLineStyle", "type": "dash", "color": "#3366FF", "width": 2.0 }
//! ```
//!
//! Styles are shared read-only between draw workers. A resolver that needs a
//! per-feature variant clones the style (see [`dyn_clone::clone_box`]) and
//! mutates the copy.

mod line;
mod marker;
mod polygon;

use std::fmt;

use dyn_clone::DynClone;
use map_common::{Color, Coord, Geometry};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{RendererError, Result};
use crate::target::RenderTarget;

pub use line::{SimpleLineStyle, SimpleTextLineStyle};
pub use marker::{SimpleMarkerStyle, SimpleTextMarkerStyle};
pub use polygon::SimplePolygonStyle;

/// How a geometry is painted.
pub trait Style: DynClone + fmt::Debug + Send + Sync {
    /// Type tag written to the `name` field of the style record.
    fn type_name(&self) -> &'static str;

    /// Paint `geometry` onto `target`.
    ///
    /// Fails with [`RendererError::UnsupportedGeometry`] for geometry kinds the
    /// style does not handle.
    fn draw(&self, geometry: &Geometry, target: &dyn RenderTarget) -> Result<()>;

    /// Configuration record including the `name` tag.
    fn to_record(&self) -> Result<Value>;

    /// Primary colour.
    fn color(&self) -> Color;

    fn set_color(&mut self, color: Color);
}

dyn_clone::clone_trait_object!(Style);

/// A concrete style type that can be decoded from its record.
pub trait StyleType: Style + Serialize + DeserializeOwned + Sized + 'static {
    /// Registry name of the type.
    const NAME: &'static str;

    /// Reject decoded values that cannot be drawn.
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }

    /// Decode and validate a record of this type.
    fn from_record(record: &Value) -> Result<Self> {
        let style: Self = serde_json::from_value(record.clone())
            .map_err(|e| RendererError::invalid_style(Self::NAME, e.to_string()))?;
        style
            .validate()
            .map_err(|message| RendererError::invalid_style(Self::NAME, message))?;
        Ok(style)
    }
}

/// Serialize `style` and tag it with its type name.
pub(crate) fn tagged_record<S: StyleType>(style: &S) -> Result<Value> {
    let mut value = serde_json::to_value(style)?;
    match value.as_object_mut() {
        Some(fields) => {
            fields.insert("name".to_string(), Value::String(S::NAME.to_string()));
            Ok(value)
        }
        None => Err(RendererError::invalid_style(
            S::NAME,
            "style did not serialize to an object",
        )),
    }
}

pub(crate) fn check_width(field: &str, value: f32) -> std::result::Result<(), String> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(format!("{} must be a non-negative number, got {}", field, value))
    }
}

pub(crate) fn check_size(field: &str, value: f32) -> std::result::Result<(), String> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(format!("{} must be a positive number, got {}", field, value))
    }
}

pub(crate) fn unsupported(style: &'static str, geometry: &Geometry) -> RendererError {
    RendererError::UnsupportedGeometry {
        style,
        geometry: geometry.kind(),
    }
}

/// Point halfway along a polyline, measured by length.
pub(crate) fn midpoint(coords: &[Coord]) -> Option<Coord> {
    let segment_len = |a: &Coord, b: &Coord| (b.x - a.x).hypot(b.y - a.y);

    let total: f64 = coords.windows(2).map(|w| segment_len(&w[0], &w[1])).sum();
    if total == 0.0 {
        return coords.first().copied();
    }

    let mut remaining = total / 2.0;
    for w in coords.windows(2) {
        let len = segment_len(&w[0], &w[1]);
        if len >= remaining {
            let t = remaining / len;
            return Some(Coord::new(
                w[0].x + (w[1].x - w[0].x) * t,
                w[0].y + (w[1].y - w[0].y) * t,
            ));
        }
        remaining -= len;
    }
    coords.last().copied()
}
