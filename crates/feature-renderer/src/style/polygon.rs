//! Area style.

use map_common::{Color, Coord, Geometry};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{check_width, tagged_record, unsupported, Style, StyleType};
use crate::error::Result;
use crate::target::{DrawCommand, RenderTarget};

/// Fill and outline for polygon and multipolygon geometries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplePolygonStyle {
    pub color: Color,
    /// Outline width in pixels, no outline at 0.
    pub width: f32,
    pub fill: bool,
}

impl Default for SimplePolygonStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 1.0,
            fill: true,
        }
    }
}

impl SimplePolygonStyle {
    pub fn new(color: Color, width: f32, fill: bool) -> Self {
        Self { color, width, fill }
    }

    fn area(&self, exterior: &[Coord], interiors: &[Vec<Coord>]) -> Option<DrawCommand> {
        if exterior.len() < 3 {
            return None;
        }
        let rings = std::iter::once(exterior.to_vec())
            .chain(interiors.iter().filter(|r| r.len() >= 3).cloned())
            .collect();

        Some(DrawCommand::Polygon {
            rings,
            fill: self.fill.then_some(self.color),
            outline: self.color,
            outline_width: self.width,
        })
    }
}

impl Style for SimplePolygonStyle {
    fn type_name(&self) -> &'static str {
        Self::NAME
    }

    fn draw(&self, geometry: &Geometry, target: &dyn RenderTarget) -> Result<()> {
        let commands: Vec<DrawCommand> = match geometry {
            Geometry::Polygon {
                exterior,
                interiors,
            } => self.area(exterior, interiors).into_iter().collect(),
            Geometry::MultiPolygon { polygons } => polygons
                .iter()
                .filter_map(|p| self.area(&p.exterior, &p.interiors))
                .collect(),
            other => return Err(unsupported(Self::NAME, other)),
        };

        for command in &commands {
            target.draw(command);
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

impl StyleType for SimplePolygonStyle {
    const NAME: &'static str = "SimplePolygonStyle";

    fn validate(&self) -> std::result::Result<(), String> {
        check_width("width", self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_common::geometry::PolygonRings;
    use map_common::BoundingBox;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<DrawCommand>>);

    impl RenderTarget for Collect {
        fn bounds(&self) -> BoundingBox {
            BoundingBox::new(0.0, 0.0, 10.0, 10.0)
        }

        fn draw(&self, command: &DrawCommand) {
            self.0.lock().unwrap().push(command.clone());
        }
    }

    fn square(lo: f64, hi: f64) -> Vec<Coord> {
        vec![
            Coord::new(lo, lo),
            Coord::new(hi, lo),
            Coord::new(hi, hi),
            Coord::new(lo, hi),
        ]
    }

    #[test]
    fn test_unfilled_polygon() {
        let target = Collect::default();
        SimplePolygonStyle::new(Color::WHITE, 2.0, false)
            .draw(&Geometry::polygon([(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]), &target)
            .unwrap();
        let commands = target.0.into_inner().unwrap();
        assert!(matches!(
            &commands[0],
            DrawCommand::Polygon { fill: None, outline_width, .. } if *outline_width == 2.0
        ));
    }

    #[test]
    fn test_multipolygon_one_command_per_member() {
        let target = Collect::default();
        let geom = Geometry::MultiPolygon {
            polygons: vec![
                PolygonRings {
                    exterior: square(0.0, 4.0),
                    interiors: vec![square(1.0, 2.0)],
                },
                PolygonRings {
                    exterior: vec![Coord::new(0.0, 0.0)],
                    interiors: vec![],
                },
                PolygonRings {
                    exterior: square(5.0, 6.0),
                    interiors: vec![],
                },
            ],
        };
        SimplePolygonStyle::default().draw(&geom, &target).unwrap();
        let commands = target.0.into_inner().unwrap();
        assert_eq!(commands.len(), 2);
        assert!(matches!(&commands[0], DrawCommand::Polygon { rings, .. } if rings.len() == 2));
    }

    #[test]
    fn test_polygon_rejects_lines() {
        let target = Collect::default();
        assert!(SimplePolygonStyle::default()
            .draw(&Geometry::line([(0.0, 0.0), (1.0, 1.0)]), &target)
            .is_err());
    }
}
