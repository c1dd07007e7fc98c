use super::{
    derived_geometry, on_storey, property_flag, property_text, storey_name, ElementCache,
    ElementRecord,
};
use crate::geometry::{bbox::opening_width_from, element_location, BoundingBox, Point3};
use crate::model::{Element, ModelQuery, PropertySets};
use serde::Serialize;

const IFC_DOOR: &str = "IFCDOOR";
const DOOR_COMMON: &str = "Pset_DoorCommon";

#[derive(Debug, Clone, Serialize)]
pub struct DoorRecord {
    pub id: u64,
    pub global_id: String,
    pub name: Option<String>,
    pub door_type: Option<String>,
    pub overall_width: Option<f64>,
    pub overall_height: Option<f64>,
    pub clear_width: Option<f64>,
    pub is_external: bool,
    pub is_fire_rated: bool,
    pub fire_rating: Option<String>,
    pub centroid: Option<Point3>,
    pub location: Option<Point3>,
    #[serde(skip)]
    pub bounding_box: Option<BoundingBox>,
    #[serde(skip)]
    pub properties: PropertySets,
    pub storey: Option<String>,
}

impl ElementRecord for DoorRecord {
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

/// Extracts and caches IfcDoor records.
pub struct DoorExtractor<'m> {
    model: &'m dyn ModelQuery,
    cache: ElementCache<DoorRecord>,
}

impl<'m> DoorExtractor<'m> {
    #[must_use]
    pub fn new(model: &'m dyn ModelQuery) -> Self {
        Self {
            model,
            cache: ElementCache::new(),
        }
    }

    pub fn all(&mut self) -> Vec<&DoorRecord> {
        let doors = self.model.elements_of_type(IFC_DOOR);
        for door in &doors {
            self.extract(door);
        }
        doors.iter().filter_map(|d| self.cache.get(d.id)).collect()
    }

    pub fn external(&mut self) -> Vec<&DoorRecord> {
        self.all().into_iter().filter(|d| d.is_external).collect()
    }

    pub fn fire_rated(&mut self) -> Vec<&DoorRecord> {
        self.all().into_iter().filter(|d| d.is_fire_rated).collect()
    }

    pub fn by_storey(&mut self, storey: &str) -> Vec<&DoorRecord> {
        on_storey(self.all(), storey)
    }

    pub fn extract(&mut self, door: &Element) -> &DoorRecord {
        let model = self.model;
        self.cache
            .get_or_insert_with(door.id, || build_record(model, door))
    }
}

fn build_record(model: &dyn ModelQuery, door: &Element) -> DoorRecord {
    let psets = model.property_sets(door);
    let (centroid, bbox) = derived_geometry(model, door);

    let clear_width = opening_width_from(door, &psets, || bbox);
    let fire_rating = property_text(&psets, DOOR_COMMON, "FireRating");
    let is_fire_rated = fire_rating.as_deref().is_some_and(|r| !r.is_empty());

    DoorRecord {
        id: door.id,
        global_id: door.global_id.clone(),
        name: door.name.clone(),
        door_type: door.predefined_type.clone(),
        overall_width: door.overall_width,
        overall_height: door.overall_height,
        clear_width,
        is_external: property_flag(&psets, DOOR_COMMON, "IsExternal"),
        is_fire_rated,
        fire_rating,
        centroid,
        location: element_location(model, door),
        bounding_box: bbox,
        properties: psets,
        storey: storey_name(model, door),
    }
}
