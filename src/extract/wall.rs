use super::{
    derived_geometry, on_storey, property_f64, property_flag, property_text, storey_name,
    ElementCache, ElementRecord,
};
use crate::geometry::{BoundingBox, Point3};
use crate::model::{Element, ModelQuery, PropertySets};
use crate::resolve::first_resolved;
use serde::Serialize;

const IFC_WALL: &str = "IFCWALL";
const WALL_COMMON: &str = "Pset_WallCommon";
const WALL_QUANTITIES: &str = "Qto_WallBaseQuantities";

#[derive(Debug, Clone, Serialize)]
pub struct WallRecord {
    pub id: u64,
    pub global_id: String,
    pub name: Option<String>,
    pub wall_type: Option<String>,
    pub is_external: bool,
    pub is_load_bearing: bool,
    pub fire_rating: Option<String>,
    pub thickness: Option<f64>,
    pub height: Option<f64>,
    pub length: Option<f64>,
    pub centroid: Option<Point3>,
    #[serde(skip)]
    pub bounding_box: Option<BoundingBox>,
    #[serde(skip)]
    pub properties: PropertySets,
    pub storey: Option<String>,
}

impl ElementRecord for WallRecord {
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

/// Extracts and caches IfcWall records (standard and elemented cases included).
pub struct WallExtractor<'m> {
    model: &'m dyn ModelQuery,
    cache: ElementCache<WallRecord>,
}

impl<'m> WallExtractor<'m> {
    #[must_use]
    pub fn new(model: &'m dyn ModelQuery) -> Self {
        Self {
            model,
            cache: ElementCache::new(),
        }
    }

    pub fn all(&mut self) -> Vec<&WallRecord> {
        let walls = self.model.elements_of_type(IFC_WALL);
        for wall in &walls {
            self.extract(wall);
        }
        walls.iter().filter_map(|w| self.cache.get(w.id)).collect()
    }

    pub fn external(&mut self) -> Vec<&WallRecord> {
        self.all().into_iter().filter(|w| w.is_external).collect()
    }

    pub fn fire_rated(&mut self) -> Vec<&WallRecord> {
        self.all()
            .into_iter()
            .filter(|w| w.fire_rating.as_deref().is_some_and(|r| !r.is_empty()))
            .collect()
    }

    pub fn by_storey(&mut self, storey: &str) -> Vec<&WallRecord> {
        on_storey(self.all(), storey)
    }

    pub fn extract(&mut self, wall: &Element) -> &WallRecord {
        let model = self.model;
        self.cache
            .get_or_insert_with(wall.id, || build_record(model, wall))
    }
}

fn build_record(model: &dyn ModelQuery, wall: &Element) -> WallRecord {
    let psets = model.property_sets(wall);
    let (centroid, bbox) = derived_geometry(model, wall);

    let thickness = first_resolved(&[
        &|| property_f64(&psets, WALL_QUANTITIES, "Width"),
        &|| bbox.map(|b| b.plan_min()),
    ]);
    let height = first_resolved(&[
        &|| property_f64(&psets, WALL_QUANTITIES, "Height"),
        &|| bbox.map(|b| b.height()),
    ]);

    WallRecord {
        id: wall.id,
        global_id: wall.global_id.clone(),
        name: wall.name.clone(),
        wall_type: wall.predefined_type.clone(),
        is_external: property_flag(&psets, WALL_COMMON, "IsExternal"),
        is_load_bearing: property_flag(&psets, WALL_COMMON, "LoadBearing"),
        fire_rating: property_text(&psets, WALL_COMMON, "FireRating"),
        thickness,
        height,
        length: property_f64(&psets, WALL_QUANTITIES, "Length"),
        centroid,
        bounding_box: bbox,
        properties: psets,
        storey: storey_name(model, wall),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InMemoryModel;

    #[test]
    fn quantities_win_over_bounding_box() {
        let mut model = InMemoryModel::new();
        model.insert(Element::new(1, "IfcWall").with_name("External"));
        model.set_property(1, WALL_COMMON, "IsExternal", true);
        model.set_property(1, WALL_COMMON, "LoadBearing", true);
        model.set_property(1, WALL_COMMON, "FireRating", "REI60");
        model.set_property(1, WALL_QUANTITIES, "Width", 0.3);
        model.set_property(1, WALL_QUANTITIES, "Length", 8.0);
        model.set_box(1, [0.0, 0.0, 0.0], [8.0, 0.25, 3.0]);

        let mut walls = WallExtractor::new(&model);
        let wall = walls.all()[0].clone();
        assert_eq!(wall.thickness, Some(0.3));
        assert_eq!(wall.height, Some(3.0));
        assert_eq!(wall.length, Some(8.0));
        assert!(wall.is_external && wall.is_load_bearing);
        assert_eq!(walls.fire_rated().len(), 1);
    }

    #[test]
    fn bounding_box_fallbacks() {
        let mut model = InMemoryModel::new();
        model.insert(Element::new(1, "IfcWallStandardCase"));
        model.set_box(1, [0.0, 0.0, 0.0], [0.2, 5.0, 2.7]);

        let mut walls = WallExtractor::new(&model);
        let wall = walls.all()[0].clone();
        assert!((wall.thickness.unwrap() - 0.2).abs() < 1e-10);
        assert!((wall.height.unwrap() - 2.7).abs() < 1e-10);
        assert_eq!(wall.length, None);
        assert!(!wall.is_external);
        assert!(walls.external().is_empty());
    }

    #[test]
    fn no_geometry_leaves_dimensions_unknown() {
        let mut model = InMemoryModel::new();
        model.insert(Element::new(1, "IfcWall"));
        let mut walls = WallExtractor::new(&model);
        let wall = walls.all()[0].clone();
        assert_eq!(wall.thickness, None);
        assert_eq!(wall.height, None);
        assert_eq!(wall.centroid, None);
    }
}
