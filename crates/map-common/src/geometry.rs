//! Vector geometry held by cached features.

use serde::{Deserialize, Serialize};

use crate::BoundingBox;

/// A position in map units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Coord {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Feature geometry.
///
/// Rings of a polygon are not required to repeat their first vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Point { coord: Coord },
    MultiPoint { coords: Vec<Coord> },
    LineString { coords: Vec<Coord> },
    MultiLineString { lines: Vec<Vec<Coord>> },
    Polygon {
        exterior: Vec<Coord>,
        #[serde(default)]
        interiors: Vec<Vec<Coord>>,
    },
    MultiPolygon { polygons: Vec<PolygonRings> },
}

/// Exterior and interior rings of one member of a multipolygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonRings {
    pub exterior: Vec<Coord>,
    #[serde(default)]
    pub interiors: Vec<Vec<Coord>>,
}

impl Geometry {
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::Point {
            coord: Coord::new(x, y),
        }
    }

    pub fn line(coords: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Geometry::LineString {
            coords: coords.into_iter().map(Coord::from).collect(),
        }
    }

    pub fn polygon(exterior: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Geometry::Polygon {
            exterior: exterior.into_iter().map(Coord::from).collect(),
            interiors: Vec::new(),
        }
    }

    /// Static name of the geometry type, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::MultiPoint { .. } => "MultiPoint",
            Geometry::LineString { .. } => "LineString",
            Geometry::MultiLineString { .. } => "MultiLineString",
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
        }
    }

    /// Iterate over every vertex of the geometry.
    pub fn coords(&self) -> Box<dyn Iterator<Item = &Coord> + '_> {
        match self {
            Geometry::Point { coord } => Box::new(std::iter::once(coord)),
            Geometry::MultiPoint { coords } | Geometry::LineString { coords } => {
                Box::new(coords.iter())
            }
            Geometry::MultiLineString { lines } => Box::new(lines.iter().flatten()),
            Geometry::Polygon {
                exterior,
                interiors,
            } => Box::new(exterior.iter().chain(interiors.iter().flatten())),
            Geometry::MultiPolygon { polygons } => Box::new(
                polygons
                    .iter()
                    .flat_map(|p| p.exterior.iter().chain(p.interiors.iter().flatten())),
            ),
        }
    }

    /// Bounding box of all vertices, `None` for an empty geometry.
    pub fn envelope(&self) -> Option<BoundingBox> {
        BoundingBox::from_coords(self.coords())
    }
}
