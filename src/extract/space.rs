use super::{
    contains_ignore_case, derived_geometry, on_storey, property, property_f64, storey_name,
    ElementCache, ElementRecord,
};
use crate::geometry::{floor_area, BoundingBox, Point3};
use crate::model::{Element, ModelQuery, PropertySets, PropertyValue};
use crate::resolve::first_resolved;
use serde::Serialize;

const IFC_SPACE: &str = "IFCSPACE";
const SPACE_QUANTITIES: &str = "Qto_SpaceBaseQuantities";
const SPACE_COMMON: &str = "Pset_SpaceCommon";

/// Space kinds that are never counted as rooms.
const NON_ROOM_TYPES: &[&str] = &["corridor", "stair", "elevator", "shaft", "toilet"];

#[derive(Debug, Clone, Serialize)]
pub struct SpaceRecord {
    pub id: u64,
    pub global_id: String,
    pub name: Option<String>,
    pub long_name: Option<String>,
    pub space_type: Option<String>,
    pub floor_area: Option<f64>,
    pub height: Option<f64>,
    pub centroid: Option<Point3>,
    #[serde(skip)]
    pub bounding_box: Option<BoundingBox>,
    #[serde(skip)]
    pub properties: PropertySets,
    pub storey: Option<String>,
}

impl SpaceRecord {
    /// Name for messages: the short name, else the long name.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.long_name.as_deref())
    }

    /// True when the type, name or long name contains `pattern`.
    #[must_use]
    pub fn mentions(&self, pattern: &str) -> bool {
        contains_ignore_case(self.space_type.as_deref(), pattern)
            || contains_ignore_case(self.name.as_deref(), pattern)
            || contains_ignore_case(self.long_name.as_deref(), pattern)
    }
}

impl ElementRecord for SpaceRecord {
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn centroid(&self) -> Option<Point3> {
        self.centroid
    }

    fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bounding_box.as_ref()
    }

    fn storey(&self) -> Option<&str> {
        self.storey.as_deref()
    }
}

/// Extracts and caches IfcSpace records.
pub struct SpaceExtractor<'m> {
    model: &'m dyn ModelQuery,
    cache: ElementCache<SpaceRecord>,
}

impl<'m> SpaceExtractor<'m> {
    #[must_use]
    pub fn new(model: &'m dyn ModelQuery) -> Self {
        Self {
            model,
            cache: ElementCache::new(),
        }
    }

    /// All spaces in model order.
    pub fn all(&mut self) -> Vec<&SpaceRecord> {
        let spaces = self.model.elements_of_type(IFC_SPACE);
        for space in &spaces {
            self.extract(space);
        }
        spaces.iter().filter_map(|s| self.cache.get(s.id)).collect()
    }

    pub fn by_storey(&mut self, storey: &str) -> Vec<&SpaceRecord> {
        on_storey(self.all(), storey)
    }

    /// Spaces whose type contains `space_type` (case-insensitive).
    pub fn by_type(&mut self, space_type: &str) -> Vec<&SpaceRecord> {
        self.all()
            .into_iter()
            .filter(|s| contains_ignore_case(s.space_type.as_deref(), space_type))
            .collect()
    }

    /// Spaces whose type, name or long name mentions "corridor".
    pub fn corridors(&mut self) -> Vec<&SpaceRecord> {
        self.all()
            .into_iter()
            .filter(|s| s.mentions("corridor"))
            .collect()
    }

    /// Every space whose type or name avoids the circulation and service
    /// vocabulary (corridor, stair, elevator, shaft, toilet).
    pub fn rooms(&mut self) -> Vec<&SpaceRecord> {
        self.all()
            .into_iter()
            .filter(|s| {
                !NON_ROOM_TYPES.iter().any(|t| {
                    contains_ignore_case(s.space_type.as_deref(), t)
                        || contains_ignore_case(s.name.as_deref(), t)
                })
            })
            .collect()
    }

    /// Record for one space, built on first request and cached by id.
    pub fn extract(&mut self, space: &Element) -> &SpaceRecord {
        let model = self.model;
        self.cache
            .get_or_insert_with(space.id, || build_record(model, space))
    }

    /// Number of records built so far.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

fn build_record(model: &dyn ModelQuery, space: &Element) -> SpaceRecord {
    let psets = model.property_sets(space);
    let (centroid, bbox) = derived_geometry(model, space);

    let floor_area = first_resolved(&[
        &|| property_f64(&psets, SPACE_QUANTITIES, "NetFloorArea"),
        &|| property_f64(&psets, SPACE_QUANTITIES, "GrossFloorArea"),
        &|| floor_area(&psets),
    ]);
    let height = first_resolved(&[
        &|| property_f64(&psets, SPACE_QUANTITIES, "Height"),
        &|| bbox.map(|b| b.height()),
    ]);
    let space_type = first_resolved(&[
        &|| space.predefined_type.clone(),
        &|| {
            property(&psets, SPACE_COMMON, "Category")
                .and_then(PropertyValue::as_text)
                .map(str::to_string)
        },
    ]);

    SpaceRecord {
        id: space.id,
        global_id: space.global_id.clone(),
        name: space.name.clone(),
        long_name: space.long_name.clone(),
        space_type,
        floor_area,
        height,
        centroid,
        bounding_box: bbox,
        properties: psets,
        storey: storey_name(model, space),
    }
}
