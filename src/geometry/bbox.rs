use super::Point3;
use crate::model::{Element, ModelQuery, PropertySets};
use crate::resolve::first_resolved;
use serde::Serialize;
use tracing::debug;

/// Axis-aligned bounding box. Computed on demand, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub max_z: f64,
}

impl BoundingBox {
    /// Box around a flattened `[x, y, z, ...]` vertex list.
    #[must_use]
    pub fn from_vertices(vertices: &[f64]) -> Option<Self> {
        let mut chunks = vertices.chunks_exact(3);
        let first = chunks.next()?;
        let init = Self {
            min_x: first[0],
            min_y: first[1],
            min_z: first[2],
            max_x: first[0],
            max_y: first[1],
            max_z: first[2],
        };
        Some(chunks.fold(init, |b, v| Self {
            min_x: b.min_x.min(v[0]),
            min_y: b.min_y.min(v[1]),
            min_z: b.min_z.min(v[2]),
            max_x: b.max_x.max(v[0]),
            max_y: b.max_y.max(v[1]),
            max_z: b.max_z.max(v[2]),
        }))
    }

    /// Extent along X.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Extent along Y.
    #[must_use]
    pub fn depth(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Extent along Z.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_z - self.min_z
    }

    /// Smaller of the two horizontal extents.
    #[must_use]
    pub fn plan_min(&self) -> f64 {
        self.width().min(self.depth())
    }

    #[must_use]
    pub fn center(&self) -> Point3 {
        Point3::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
            (self.min_z + self.max_z) / 2.0,
        )
    }

    /// Smallest box enclosing both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            min_z: self.min_z.min(other.min_z),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
            max_z: self.max_z.max(other.max_z),
        }
    }

    /// Minimum separation between two boxes: the per-axis gaps (zero where
    /// the boxes overlap) combined as a Euclidean norm.
    #[must_use]
    pub fn separation(&self, other: &Self) -> f64 {
        let dx = (self.min_x - other.max_x).max(other.min_x - self.max_x).max(0.0);
        let dy = (self.min_y - other.max_y).max(other.min_y - self.max_y).max(0.0);
        let dz = (self.min_z - other.max_z).max(other.min_z - self.max_z).max(0.0);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Bounding box of the element's mesh; `None` when the mesh is unavailable.
/// Absence means "cannot verify", never a violation.
pub fn bounding_box(model: &dyn ModelQuery, element: &Element) -> Option<BoundingBox> {
    match model.raw_mesh_vertices(element) {
        Ok(vertices) => BoundingBox::from_vertices(&vertices),
        Err(e) => {
            debug!(element = element.id, "bounding box unavailable: {e}");
            None
        }
    }
}

/// Checks that two elements are at least `min_clearance` apart.
///
/// Returns `(passes, distance)`. When either box is unavailable the check
/// passes with no distance.
pub fn clearance(
    model: &dyn ModelQuery,
    a: &Element,
    b: &Element,
    min_clearance: f64,
) -> (bool, Option<f64>) {
    box_clearance(
        bounding_box(model, a).as_ref(),
        bounding_box(model, b).as_ref(),
        min_clearance,
    )
}

/// [`clearance`] over already resolved boxes.
#[must_use]
pub fn box_clearance(
    a: Option<&BoundingBox>,
    b: Option<&BoundingBox>,
    min_clearance: f64,
) -> (bool, Option<f64>) {
    match (a, b) {
        (Some(a), Some(b)) => {
            let distance = a.separation(b);
            (distance >= min_clearance, Some(distance))
        }
        _ => (true, None),
    }
}

/// Clear opening width of a door, in model units.
pub fn opening_width(model: &dyn ModelQuery, door: &Element) -> Option<f64> {
    let psets = model.property_sets(door);
    opening_width_from(door, &psets, || bounding_box(model, door))
}

/// Opening width resolution: declared overall width, then the first numeric
/// property whose name contains "width", then the smaller plan extent of the
/// bounding box. The box is only computed if the first two sources fail.
pub fn opening_width_from(
    door: &Element,
    psets: &PropertySets,
    bbox: impl Fn() -> Option<BoundingBox>,
) -> Option<f64> {
    first_resolved(&[
        &|| declared_width(door),
        &|| property_width(psets),
        &|| bbox().map(|b| b.plan_min()),
    ])
}

/// The element's own overall width, ignoring zero.
#[must_use]
pub fn declared_width(element: &Element) -> Option<f64> {
    element.overall_width.filter(|w| *w != 0.0)
}

/// First numeric property, across all sets, whose key mentions "width".
#[must_use]
pub fn property_width(psets: &PropertySets) -> Option<f64> {
    psets
        .values()
        .flat_map(|set| set.iter())
        .filter(|(key, _)| key.to_lowercase().contains("width"))
        .find_map(|(_, value)| value.as_f64())
}
