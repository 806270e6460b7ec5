//! Point symbol styles.

use map_common::{Color, Coord, Geometry};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{check_size, check_width, tagged_record, unsupported, Style, StyleType};
use crate::error::Result;
use crate::target::{DrawCommand, MarkerShape, RenderTarget};

/// Symbol drawn at every vertex of a point or multipoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleMarkerStyle {
    #[serde(rename = "type")]
    pub shape: MarkerShape,
    pub color: Color,
    pub outline_color: Color,
    /// Symbol size in pixels.
    pub size: f32,
    /// Outline width in pixels.
    pub width: f32,
}

impl Default for SimpleMarkerStyle {
    fn default() -> Self {
        Self {
            shape: MarkerShape::Circle,
            color: Color::BLACK,
            outline_color: Color::BLACK,
            size: 6.0,
            width: 1.0,
        }
    }
}

impl SimpleMarkerStyle {
    pub fn new(shape: MarkerShape, color: Color, size: f32) -> Self {
        Self {
            shape,
            color,
            size,
            ..Self::default()
        }
    }

    fn marker_at(&self, at: Coord) -> DrawCommand {
        DrawCommand::Marker {
            at,
            shape: self.shape,
            size: self.size,
            fill: self.color,
            outline: self.outline_color,
            outline_width: self.width,
        }
    }

    /// Points of a point-like geometry.
    fn anchors<'g>(&self, name: &'static str, geometry: &'g Geometry) -> Result<&'g [Coord]> {
        match geometry {
            Geometry::Point { coord } => Ok(std::slice::from_ref(coord)),
            Geometry::MultiPoint { coords } => Ok(coords.as_slice()),
            other => Err(unsupported(name, other)),
        }
    }
}

impl Style for SimpleMarkerStyle {
    fn type_name(&self) -> &'static str {
        Self::NAME
    }

    fn draw(&self, geometry: &Geometry, target: &dyn RenderTarget) -> Result<()> {
        for at in self.anchors(Self::NAME, geometry)? {
            target.draw(&self.marker_at(*at));
        }
        Ok(())
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

impl StyleType for SimpleMarkerStyle {
    const NAME: &'static str = "SimpleMarkerStyle";

    fn validate(&self) -> std::result::Result<(), String> {
        check_size("size", self.size)?;
        check_width("width", self.width)
    }
}

/// Marker with a text label next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleTextMarkerStyle {
    #[serde(flatten)]
    pub marker: SimpleMarkerStyle,
    pub text: String,
    /// Label size in pixels.
    pub text_size: f32,
}

impl Default for SimpleTextMarkerStyle {
    fn default() -> Self {
        Self {
            marker: SimpleMarkerStyle::default(),
            text: String::new(),
            text_size: 12.0,
        }
    }
}

impl SimpleTextMarkerStyle {
    pub fn new(marker: SimpleMarkerStyle, text: impl Into<String>) -> Self {
        Self {
            marker,
            text: text.into(),
            ..Self::default()
        }
    }
}

impl Style for SimpleTextMarkerStyle {
    fn type_name(&self) -> &'static str {
        Self::NAME
    }

    fn draw(&self, geometry: &Geometry, target: &dyn RenderTarget) -> Result<()> {
        for at in self.marker.anchors(Self::NAME, geometry)? {
            target.draw(&self.marker.marker_at(*at));
            if !self.text.is_empty() {
                target.draw(&DrawCommand::Label {
                    at: *at,
                    text: self.text.clone(),
                    size: self.text_size,
                    color: self.marker.outline_color,
                });
            }
        }
        Ok(())
    }

    fn to_record(&self) -> Result<Value> {
        tagged_record(self)
    }

    fn color(&self) -> Color {
        self.marker.color
    }

    fn set_color(&mut self, color: Color) {
        self.marker.color = color;
    }
}

impl StyleType for SimpleTextMarkerStyle {
    const NAME: &'static str = "SimpleTextMarkerStyle";

    fn validate(&self) -> std::result::Result<(), String> {
        self.marker.validate()?;
        check_size("text_size", self.text_size)
    }
}
