//! Line styles.

use map_common::{Color, Coord, Geometry};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{check_size, check_width, midpoint, tagged_record, unsupported, Style, StyleType};
use crate::error::Result;
use crate::target::{DrawCommand, LineKind, RenderTarget};

/// Stroke for line and multiline geometries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleLineStyle {
    #[serde(rename = "type")]
    pub kind: LineKind,
    pub color: Color,
    /// Casing colour for [`LineKind::Edging`].
    pub outline_color: Color,
    /// Stroke width in pixels.
    pub width: f32,
}

impl Default for SimpleLineStyle {
    fn default() -> Self {
        Self {
            kind: LineKind::Solid,
            color: Color::BLACK,
            outline_color: Color::BLACK,
            width: 1.0,
        }
    }
}

impl SimpleLineStyle {
    pub fn new(kind: LineKind, color: Color, width: f32) -> Self {
        Self {
            kind,
            color,
            width,
            ..Self::default()
        }
    }

    fn lines<'g>(name: &'static str, geometry: &'g Geometry) -> Result<Vec<&'g [Coord]>> {
        match geometry {
            Geometry::LineString { coords } => Ok(vec![coords.as_slice()]),
            Geometry::MultiLineString { lines } => Ok(lines.iter().map(Vec::as_slice).collect()),
            other => Err(unsupported(name, other)),
        }
    }

    fn stroke(&self, points: &[Coord], target: &dyn RenderTarget) {
        let width = self.width.max(0.5);
        match self.kind {
            LineKind::Solid => target.draw(&self.polyline(points, self.color, width, None)),
            LineKind::Dash => {
                let dash = vec![width * 4.0, width * 2.0];
                target.draw(&self.polyline(points, self.color, width, Some(dash)));
            }
            LineKind::Edging => {
                // Casing first so the line sits on top of it
                target.draw(&self.polyline(points, self.outline_color, width + 2.0, None));
                target.draw(&self.polyline(points, self.color, width, None));
            }
        }
    }

    fn polyline(&self, points: &[Coord], color: Color, width: f32, dash: Option<Vec<f32>>) -> DrawCommand {
        DrawCommand::Polyline {
            points: points.to_vec(),
            color,
            width,
            dash,
        }
    }

    fn draw_lines(&self, name: &'static str, geometry: &Geometry, target: &dyn RenderTarget) -> Result<Vec<Coord>> {
        let mut anchors = Vec::new();
        for line in Self::lines(name, geometry)? {
            if line.len() < 2 {
                continue;
            }
            self.stroke(line, target);
            anchors.extend(midpoint(line));
        }
        Ok(anchors)
    }
}

impl Style for SimpleLineStyle {
    fn type_name(&self) -> &'static str {
        Self::NAME
    }

    fn draw(&self, geometry: &Geometry, target: &dyn RenderTarget) -> Result<()> {
        self.draw_lines(Self::NAME, geometry, target).map(|_| ())
    }

    fn to_record(&self) -> Result<Value> {
        tagged_record(self)
    }

    fn color(&self) -> Color {
        self.color
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

impl StyleType for SimpleLineStyle {
    const NAME: &'static str = "SimpleLineStyle";

    fn validate(&self) -> std::result::Result<(), String> {
        check_width("width", self.width)
    }
}

/// Line with a text label at the middle of each part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleTextLineStyle {
    #[serde(flatten)]
    pub line: SimpleLineStyle,
    pub text: String,
    pub text_size: f32,
}

impl Default for SimpleTextLineStyle {
    fn default() -> Self {
        Self {
            line: SimpleLineStyle::default(),
            text: String::new(),
            text_size: 12.0,
        }
    }
}

impl SimpleTextLineStyle {
    pub fn new(line: SimpleLineStyle, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
            ..Self::default()
        }
    }
}

impl Style for SimpleTextLineStyle {
    fn type_name(&self) -> &'static str {
        Self::NAME
    }

    fn draw(&self, geometry: &Geometry, target: &dyn RenderTarget) -> Result<()> {
        let anchors = self.line.draw_lines(Self::NAME, geometry, target)?;
        if self.text.is_empty() {
            return Ok(());
        }
        for at in anchors {
            target.draw(&DrawCommand::Label {
                at,
                text: self.text.clone(),
                size: self.text_size,
                color: self.line.color,
            });
        }
        Ok(())
    }

    fn to_record(&self) -> Result<Value> {
        tagged_record(self)
    }

    fn color(&self) -> Color {
        self.line.color
    }

    fn set_color(&mut self, color: Color) {
        self.line.color = color;
    }
}

impl StyleType for SimpleTextLineStyle {
    const NAME: &'static str = "SimpleTextLineStyle";

    fn validate(&self) -> std::result::Result<(), String> {
        self.line.validate()?;
        check_size("text_size", self.text_size)
    }
}
