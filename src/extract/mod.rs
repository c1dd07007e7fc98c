//! Element extractors.
//!
//! Each extractor normalizes one kind of building element into a record
//! with resolved attributes and derived geometry, and caches the record by
//! element id for the lifetime of the extractor. Build one extractor per
//! check session: the cache is never invalidated.

pub mod cache;
pub mod door;
pub mod space;
pub mod stair;
pub mod wall;

pub use cache::ElementCache;
pub use door::{DoorExtractor, DoorRecord};
pub use space::{SpaceExtractor, SpaceRecord};
pub use stair::{StairExtractor, StairRecord};
pub use wall::{WallExtractor, WallRecord};

use crate::geometry::{centroid_of, BoundingBox, Point3};
use crate::model::{Element, ModelQuery, PropertySets, PropertyValue};
use tracing::debug;

const IFC_BUILDING_STOREY: &str = "IFCBUILDINGSTOREY";

/// Fields shared by every extracted record.
pub trait ElementRecord {
    fn id(&self) -> u64;
    fn name(&self) -> Option<&str>;
    fn centroid(&self) -> Option<Point3>;
    fn bounding_box(&self) -> Option<&BoundingBox>;
    fn storey(&self) -> Option<&str>;
}

/// Keeps the records on the named storey.
pub fn on_storey<'a, R: ElementRecord>(records: Vec<&'a R>, storey: &str) -> Vec<&'a R> {
    records
        .into_iter()
        .filter(|r| r.storey() == Some(storey))
        .collect()
}

/// Name of the building storey containing the element. Any other container,
/// or none, means the storey is unknown.
pub fn storey_name(model: &dyn ModelQuery, element: &Element) -> Option<String> {
    model
        .container_of(element)
        .filter(|container| container.is_a(IFC_BUILDING_STOREY))
        .and_then(|storey| storey.name)
}

/// Centroid and bounding box from a single mesh lookup.
pub(crate) fn derived_geometry(
    model: &dyn ModelQuery,
    element: &Element,
) -> (Option<Point3>, Option<BoundingBox>) {
    match model.raw_mesh_vertices(element) {
        Ok(vertices) => (centroid_of(&vertices), BoundingBox::from_vertices(&vertices)),
        Err(e) => {
            debug!(element = element.id, "no geometry: {e}");
            (None, None)
        }
    }
}

pub(crate) fn property<'a>(psets: &'a PropertySets, set: &str, key: &str) -> Option<&'a PropertyValue> {
    psets.get(set)?.get(key)
}

pub(crate) fn property_f64(psets: &PropertySets, set: &str, key: &str) -> Option<f64> {
    property(psets, set, key).and_then(PropertyValue::as_f64)
}

pub(crate) fn property_flag(psets: &PropertySets, set: &str, key: &str) -> bool {
    property(psets, set, key)
        .and_then(PropertyValue::as_bool)
        .unwrap_or(false)
}

pub(crate) fn property_text(psets: &PropertySets, set: &str, key: &str) -> Option<String> {
    property(psets, set, key).map(ToString::to_string)
}

/// Case-insensitive substring test against an optional field.
pub(crate) fn contains_ignore_case(field: Option<&str>, needle: &str) -> bool {
    field.is_some_and(|f| f.to_lowercase().contains(&needle.to_lowercase()))
}
