//! Bounding box types and operations.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::geometry::Coord;

/// An axis-aligned extent in map units.
///
/// Layers report their data extents with it and render targets report the
/// currently visible window with it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Envelope of a set of coordinates, or `None` when the set is empty.
    pub fn from_coords<'a>(coords: impl IntoIterator<Item = &'a Coord>) -> Option<Self> {
        let mut iter = coords.into_iter();
        let first = iter.next()?;
        let mut bbox = Self::new(first.x, first.y, first.x, first.y);
        for c in iter {
            bbox.expand_to_include(c.x, c.y);
        }
        Some(bbox)
    }

    /// Parse a comma separated "minx,miny,maxx,maxy" string.
    pub fn from_csv(s: &str) -> Result<Self, BboxParseError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        let parse = |p: &str| -> Result<f64, BboxParseError> {
            p.parse()
                .map_err(|_| BboxParseError::InvalidNumber(p.to_string()))
        };

        Ok(Self {
            min_x: parse(parts[0])?,
            min_y: parse(parts[1])?,
            max_x: parse(parts[2])?,
            max_y: parse(parts[3])?,
        })
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check if this bbox intersects another.
    ///
    /// Boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    /// Compute the intersection of two bounding boxes.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        if !self.intersects(other) {
            return None;
        }

        Some(BoundingBox {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        })
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Grow the box so that it covers the given point.
    pub fn expand_to_include(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Smallest box covering both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

impl FromStr for BoundingBox {
    type Err = BboxParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_csv(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid bounds format: {0}. Expected 'minx,miny,maxx,maxy'")]
    InvalidFormat(String),

    #[error("Invalid number in bounds: {0}")]
    InvalidNumber(String),
}
