//! Geometry utilities for rule checking.
//!
//! Everything here is deliberately simple: straight-line distances and
//! axis-aligned boxes, never topology or true floor polygons.

pub mod area;
pub mod bbox;
pub mod distance;
pub mod path;

pub use area::{floor_area, net_floor_area, polygon_area};
pub use bbox::{bounding_box, box_clearance, clearance, opening_width, BoundingBox};
pub use distance::{centroid, centroid_of, distance_2d, distance_3d, element_location};
pub use path::{nearest, nearest_of_type, travel_distance};

use serde::Serialize;

/// A point in model space, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl From<[f64; 3]> for Point3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}
