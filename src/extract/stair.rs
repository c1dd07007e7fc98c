use super::{
    derived_geometry, on_storey, property, property_f64, property_flag, storey_name,
    ElementCache, ElementRecord,
};
use crate::geometry::{BoundingBox, Point3};
use crate::model::{Element, ModelQuery, PropertySets, PropertyValue};
use crate::resolve::first_resolved;
use serde::Serialize;

const IFC_STAIR: &str = "IFCSTAIR";
const STAIR_COMMON: &str = "Pset_StairCommon";

#[derive(Debug, Clone, Serialize)]
pub struct StairRecord {
    pub id: u64,
    pub global_id: String,
    pub name: Option<String>,
    pub stair_type: Option<String>,
    pub number_of_risers: Option<i64>,
    pub number_of_treads: Option<i64>,
    pub riser_height: Option<f64>,
    pub tread_length: Option<f64>,
    pub stair_width: Option<f64>,
    pub is_external: bool,
    pub centroid: Option<Point3>,
    #[serde(skip)]
    pub bounding_box: Option<BoundingBox>,
    #[serde(skip)]
    pub properties: PropertySets,
    pub storey: Option<String>,
}

impl ElementRecord for StairRecord {
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

/// Extracts and caches IfcStair records.
pub struct StairExtractor<'m> {
    model: &'m dyn ModelQuery,
    cache: ElementCache<StairRecord>,
}

impl<'m> StairExtractor<'m> {
    #[must_use]
    pub fn new(model: &'m dyn ModelQuery) -> Self {
        Self {
            model,
            cache: ElementCache::new(),
        }
    }

    pub fn all(&mut self) -> Vec<&StairRecord> {
        let stairs = self.model.elements_of_type(IFC_STAIR);
        for stair in &stairs {
            self.extract(stair);
        }
        stairs.iter().filter_map(|s| self.cache.get(s.id)).collect()
    }

    pub fn by_storey(&mut self, storey: &str) -> Vec<&StairRecord> {
        on_storey(self.all(), storey)
    }

    pub fn extract(&mut self, stair: &Element) -> &StairRecord {
        let model = self.model;
        self.cache
            .get_or_insert_with(stair.id, || build_record(model, stair))
    }
}

fn count(psets: &PropertySets, key: &str) -> Option<i64> {
    property(psets, STAIR_COMMON, key).and_then(PropertyValue::as_i64)
}

fn build_record(model: &dyn ModelQuery, stair: &Element) -> StairRecord {
    let psets = model.property_sets(stair);
    let (centroid, bbox) = derived_geometry(model, stair);

    // Riser/tread sets rarely carry a plan width, so width is geometric only.
    let stair_width = bbox.map(|b| b.plan_min());

    StairRecord {
        id: stair.id,
        global_id: stair.global_id.clone(),
        name: stair.name.clone(),
        stair_type: stair.predefined_type.clone(),
        number_of_risers: first_resolved(&[
            &|| count(&psets, "NumberOfRiser"),
            &|| count(&psets, "NumberOfRisers"),
        ]),
        number_of_treads: count(&psets, "NumberOfTreads"),
        riser_height: property_f64(&psets, STAIR_COMMON, "RiserHeight"),
        tread_length: property_f64(&psets, STAIR_COMMON, "TreadLength"),
        stair_width,
        is_external: property_flag(&psets, STAIR_COMMON, "IsExternal"),
        centroid,
        bounding_box: bbox,
        properties: psets,
        storey: storey_name(model, stair),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InMemoryModel;

    #[test]
    fn width_comes_from_geometry_only() {
        let mut model = InMemoryModel::new();
        model.insert(Element::new(1, "IfcBuildingStorey").with_name("L1"));
        model.insert(
            Element::new(5, "IfcStair")
                .with_name("Stair A")
                .with_predefined_type("STRAIGHT_RUN_STAIR"),
        );
        model.set_property(5, STAIR_COMMON, "NumberOfRisers", 18_i64);
        model.set_property(5, STAIR_COMMON, "NumberOfTreads", 17_i64);
        model.set_property(5, STAIR_COMMON, "RiserHeight", 0.17);
        model.set_property(5, STAIR_COMMON, "Width", 2.0);
        model.set_box(5, [0.0, 0.0, 0.0], [4.5, 1.2, 3.0]);
        model.set_container(5, 1);

        let mut stairs = StairExtractor::new(&model);
        let stair = stairs.all()[0].clone();
        assert_eq!(stair.number_of_risers, Some(18));
        assert_eq!(stair.number_of_treads, Some(17));
        assert_eq!(stair.riser_height, Some(0.17));
        assert!((stair.stair_width.unwrap() - 1.2).abs() < 1e-10);
        assert_eq!(stair.stair_type.as_deref(), Some("STRAIGHT_RUN_STAIR"));
        assert_eq!(stairs.by_storey("L1").len(), 1);
    }

    #[test]
    fn stair_without_geometry_has_no_width() {
        let mut model = InMemoryModel::new();
        model.insert(Element::new(5, "IfcStair"));
        model.set_property(5, STAIR_COMMON, "Width", 2.0);
        let mut stairs = StairExtractor::new(&model);
        assert_eq!(stairs.all()[0].stair_width, None);
    }
}
