//! Tests for the built-in styles.
//!
//! Tests the draw commands each style emits for the geometry kinds it
//! accepts, and rasterization of those commands onto a pixmap.

use feature_renderer::{
    DrawCommand, LineKind, MarkerShape, PixmapTarget, SimpleLineStyle,
    SimpleMarkerStyle, SimplePolygonStyle, SimpleTextLineStyle, SimpleTextMarkerStyle, Style,
};
use map_common::geometry::PolygonRings;
use map_common::{Color, Coord, Geometry};
use test_utils::fixtures::{bbox, to_bbox};
use test_utils::{assert_approx_eq, RecordingTarget};

// ============================================================================
// Helper functions
// ============================================================================

fn recording() -> RecordingTarget {
    RecordingTarget::new(to_bbox(bbox::VIEW))
}

fn pixmap() -> PixmapTarget {
    PixmapTarget::new(100, 100, to_bbox(bbox::VIEW)).unwrap()
}

fn all_styles() -> Vec<Box<dyn Style>> {
    vec![
        Box::new(SimpleMarkerStyle::default()),
        Box::new(SimpleTextMarkerStyle::default()),
        Box::new(SimpleLineStyle::default()),
        Box::new(SimpleTextLineStyle::default()),
        Box::new(SimplePolygonStyle::default()),
    ]
}

fn sample_geometries() -> Vec<Geometry> {
    vec![
        Geometry::point(50.0, 50.0),
        Geometry::MultiPoint {
            coords: vec![Coord::new(10.0, 10.0), Coord::new(20.0, 20.0)],
        },
        Geometry::line([(0.0, 0.0), (100.0, 100.0)]),
        Geometry::MultiLineString {
            lines: vec![vec![Coord::new(0.0, 50.0), Coord::new(100.0, 50.0)]],
        },
        Geometry::polygon([(10.0, 10.0), (90.0, 10.0), (90.0, 90.0)]),
        Geometry::MultiPolygon {
            polygons: vec![PolygonRings {
                exterior: vec![Coord::new(0.0, 0.0), Coord::new(5.0, 0.0), Coord::new(5.0, 5.0)],
                interiors: vec![],
            }],
        },
    ]
}

// ============================================================================
// Geometry support tests
// ============================================================================

#[test]
fn test_each_style_accepts_its_geometry_family() {
    let expected: [(&str, [bool; 6]); 5] = [
        ("SimpleMarkerStyle", [true, true, false, false, false, false]),
        ("SimpleTextMarkerStyle", [true, true, false, false, false, false]),
        ("SimpleLineStyle", [false, false, true, true, false, false]),
        ("SimpleTextLineStyle", [false, false, true, true, false, false]),
        ("SimplePolygonStyle", [false, false, false, false, true, true]),
    ];

    for (style, (name, accepts)) in all_styles().iter().zip(expected) {
        assert_eq!(style.type_name(), name);
        for (geometry, accepted) in sample_geometries().iter().zip(accepts) {
            let target = recording();
            let result = style.draw(geometry, &target);
            assert_eq!(
                result.is_ok(),
                accepted,
                "{} drawing {}",
                name,
                geometry.kind()
            );
            if !accepted {
                assert_eq!(target.draw_count(), 0);
            }
        }
    }
}

// ============================================================================
// Command tests
// ============================================================================

#[test]
fn test_marker_command_fields() {
    let mut style = SimpleMarkerStyle::new(MarkerShape::Triangle, Color::rgb(200, 0, 0), 12.0);
    style.outline_color = Color::WHITE;
    style.width = 2.0;
    let target = recording();

    style.draw(&Geometry::point(30.0, 40.0), &target).unwrap();

    assert_eq!(
        target.commands(),
        vec![DrawCommand::Marker {
            at: Coord::new(30.0, 40.0),
            shape: MarkerShape::Triangle,
            size: 12.0,
            fill: Color::rgb(200, 0, 0),
            outline: Color::WHITE,
            outline_width: 2.0,
        }]
    );
}

#[test]
fn test_text_marker_without_text_draws_marker_only() {
    let target = recording();
    SimpleTextMarkerStyle::default()
        .draw(&Geometry::point(1.0, 1.0), &target)
        .unwrap();
    assert_eq!(target.count_of("marker"), 1);
    assert_eq!(target.count_of("label"), 0);
}

#[test]
fn test_text_line_label_at_midpoint() {
    let target = recording();
    SimpleTextLineStyle::new(SimpleLineStyle::default(), "A1")
        .draw(&Geometry::line([(0.0, 0.0), (30.0, 0.0), (30.0, 40.0)]), &target)
        .unwrap();

    let label = target
        .commands()
        .into_iter()
        .find_map(|c| match c {
            DrawCommand::Label { at, text, .. } => Some((at, text)),
            _ => None,
        })
        .unwrap();
    assert_eq!(label.1, "A1");
    assert_approx_eq!(label.0.x, 30.0, 1e-9);
    assert_approx_eq!(label.0.y, 5.0, 1e-9);
}

#[test]
fn test_degenerate_polygon_skipped() {
    let target = recording();
    SimplePolygonStyle::default()
        .draw(&Geometry::polygon([(0.0, 0.0), (1.0, 1.0)]), &target)
        .unwrap();
    assert_eq!(target.draw_count(), 0);
}

// ============================================================================
// Rasterization tests
// ============================================================================

#[test]
fn test_line_kinds_rasterize() {
    for kind in [LineKind::Solid, LineKind::Dash, LineKind::Edging] {
        let target = pixmap();
        SimpleLineStyle::new(kind, Color::rgb(0, 0, 255), 4.0)
            .draw(&Geometry::line([(0.0, 50.0), (100.0, 50.0)]), &target)
            .unwrap();
        // First dash starts at the left edge
        assert_eq!(target.alpha_at(2, 50), Some(255), "{:?}", kind);
        assert_eq!(target.alpha_at(2, 10), Some(0), "{:?}", kind);
    }
}

#[test]
fn test_every_marker_shape_paints_center() {
    let shapes = [
        MarkerShape::Point,
        MarkerShape::Circle,
        MarkerShape::Diamond,
        MarkerShape::Cross,
        MarkerShape::Triangle,
        MarkerShape::Box,
        MarkerShape::CrossedBox,
    ];
    for shape in shapes {
        let target = pixmap();
        SimpleMarkerStyle::new(shape, Color::BLACK, 20.0)
            .draw(&Geometry::point(50.0, 50.0), &target)
            .unwrap();
        let alpha = target.alpha_at(50, 50).unwrap();
        assert!(alpha > 0, "{:?} left the center empty", shape);
    }
}

#[test]
fn test_unfilled_polygon_outline_only() {
    let target = pixmap();
    SimplePolygonStyle::new(Color::rgb(255, 0, 0), 2.0, false)
        .draw(
            &Geometry::polygon([(10.0, 10.0), (90.0, 10.0), (90.0, 90.0), (10.0, 90.0)]),
            &target,
        )
        .unwrap();
    assert_eq!(target.alpha_at(50, 50), Some(0));
    assert!(target.alpha_at(10, 50).unwrap() > 0);
}

#[test]
fn test_labels_collected_not_painted() {
    let target = pixmap();
    SimpleTextMarkerStyle::new(SimpleMarkerStyle::new(MarkerShape::Box, Color::BLACK, 2.0), "Depot")
        .draw(&Geometry::point(80.0, 20.0), &target)
        .unwrap();
    let labels = target.labels();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].text, "Depot");
    assert_approx_eq!(labels[0].x, 80.0, 1e-4);
    assert_approx_eq!(labels[0].y, 80.0, 1e-4);
    assert_eq!(target.command_count(), 2);
}
