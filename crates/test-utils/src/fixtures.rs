//! Common test fixtures for vector-render tests.
//!
//! This module provides pre-defined extents and configuration records that
//! represent common rendering scenarios.

use map_common::BoundingBox;

/// Common bounding box definitions for testing, as (min_x, min_y, max_x, max_y).
pub mod bbox {
    /// Global geographic extent
    pub const GLOBAL: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);

    /// The 100x100 square that generated features are placed in
    pub const VIEW: (f64, f64, f64, f64) = (0.0, 0.0, 100.0, 100.0);

    /// Top-right quarter of [`VIEW`]
    pub const QUARTER: (f64, f64, f64, f64) = (50.0, 50.0, 100.0, 100.0);

    /// Well away from [`VIEW`]
    pub const DISJOINT: (f64, f64, f64, f64) = (500.0, 500.0, 600.0, 600.0);

    /// Shares only the right edge of [`VIEW`]
    pub const EDGE_ADJACENT: (f64, f64, f64, f64) = (100.0, 0.0, 200.0, 100.0);

    /// Invalid bbox (min > max)
    pub const INVALID: (f64, f64, f64, f64) = (10.0, 10.0, 5.0, 5.0);
}

/// Build a [`BoundingBox`] from one of the [`bbox`] tuples.
pub fn to_bbox((min_x, min_y, max_x, max_y): (f64, f64, f64, f64)) -> BoundingBox {
    BoundingBox::new(min_x, min_y, max_x, max_y)
}

/// Renderer configuration records, one per built-in style.
pub mod records {
    use serde_json::{json, Value};

    pub fn marker() -> Value {
        renderer(json!({
            "name": "SimpleMarkerStyle",
            "type": "crossed_box",
            "color": "#FF8800",
            "outline_color": "#000000",
            "size": 8.0,
            "width": 1.5
        }))
    }

    pub fn text_marker() -> Value {
        renderer(json!({
            "name": "SimpleTextMarkerStyle",
            "type": "triangle",
            "color": "#00AA00",
            "outline_color": "#FFFFFF",
            "size": 10.0,
            "width": 1.0,
            "text": "Station",
            "text_size": 11.0
        }))
    }

    pub fn line() -> Value {
        renderer(json!({
            "name": "SimpleLineStyle",
            "type": "dash",
            "color": "#3366FF",
            "outline_color": "#000000",
            "width": 2.0
        }))
    }

    pub fn text_line() -> Value {
        renderer(json!({
            "name": "SimpleTextLineStyle",
            "type": "edging",
            "color": "#FFFFFF",
            "outline_color": "#333333",
            "width": 3.0,
            "text": "Main St",
            "text_size": 14.0
        }))
    }

    pub fn polygon() -> Value {
        renderer(json!({
            "name": "SimplePolygonStyle",
            "color": "#CC000080",
            "width": 1.0,
            "fill": true
        }))
    }

    /// All built-in style records.
    pub fn all() -> Vec<Value> {
        vec![marker(), text_marker(), line(), text_line(), polygon()]
    }

    /// A renderer record naming a style type nothing registers.
    pub fn unknown_style() -> Value {
        renderer(json!({ "name": "HeatmapStyle", "radius": 12 }))
    }

    fn renderer(style: Value) -> Value {
        json!({ "name": "SimpleFeatureRenderer", "style": style })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_relations() {
        let view = to_bbox(bbox::VIEW);
        assert!(view.intersects(&to_bbox(bbox::QUARTER)));
        assert!(!view.intersects(&to_bbox(bbox::DISJOINT)));
        assert!(!view.intersects(&to_bbox(bbox::EDGE_ADJACENT)));
    }

    #[test]
    fn test_records_are_tagged() {
        for record in records::all() {
            assert_eq!(record["name"], "SimpleFeatureRenderer");
            assert!(record["style"]["name"].is_string());
        }
    }
}
