//! Common types shared by the feature renderer and its front ends.

pub mod bbox;
pub mod color;
pub mod geometry;
pub mod layer;

pub use bbox::{BboxParseError, BoundingBox};
pub use color::{Color, ColorParseError};
pub use geometry::{Coord, Geometry};
pub use layer::{FeatureCacheItem, FeatureId, LayerId};
