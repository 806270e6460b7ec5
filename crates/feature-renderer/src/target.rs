//! Drawing surfaces and the commands styles paint onto them.

use map_common::{BoundingBox, Color, Coord};
use serde::{Deserialize, Serialize};

/// Marker symbol drawn at a point feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerShape {
    Point,
    #[default]
    Circle,
    Diamond,
    Cross,
    Triangle,
    Box,
    CrossedBox,
}

/// Stroke pattern of a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    #[default]
    Solid,
    Dash,
    /// A solid line drawn over a wider outline-coloured casing.
    Edging,
}

/// One primitive drawing operation in map coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Marker {
        at: Coord,
        shape: MarkerShape,
        /// Symbol size in pixels.
        size: f32,
        fill: Color,
        outline: Color,
        outline_width: f32,
    },
    Polyline {
        points: Vec<Coord>,
        color: Color,
        width: f32,
        /// Dash/gap lengths in pixels, solid when `None`.
        dash: Option<Vec<f32>>,
    },
    Polygon {
        rings: Vec<Vec<Coord>>,
        fill: Option<Color>,
        outline: Color,
        outline_width: f32,
    },
    Label {
        at: Coord,
        text: String,
        size: f32,
        color: Color,
    },
}

impl DrawCommand {
    pub fn kind(&self) -> &'static str {
        match self {
            DrawCommand::Marker { .. } => "marker",
            DrawCommand::Polyline { .. } => "polyline",
            DrawCommand::Polygon { .. } => "polygon",
            DrawCommand::Label { .. } => "label",
        }
    }
}

/// A surface features are drawn onto.
///
/// Draw tasks call `draw` concurrently from several worker threads. The
/// dispatcher does not serialize those calls, so implementations must
/// synchronize their own interior.
pub trait RenderTarget: Send + Sync {
    /// Currently visible extent in map units.
    fn bounds(&self) -> BoundingBox;

    /// Paint one command.
    fn draw(&self, command: &DrawCommand);
}
