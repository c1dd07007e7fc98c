use super::Point3;
use crate::model::{Element, ModelQuery};
use tracing::debug;

/// Euclidean distance between two points.
#[must_use]
pub fn distance_3d(a: Point3, b: Point3) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2) + (b.z - a.z).powi(2)).sqrt()
}

/// Euclidean distance on the X-Y plane; Z is ignored.
#[must_use]
pub fn distance_2d(a: Point3, b: Point3) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Arithmetic mean of the element's mesh vertices.
///
/// `None` when the mesh cannot be resolved or is empty.
pub fn centroid(model: &dyn ModelQuery, element: &Element) -> Option<Point3> {
    match model.raw_mesh_vertices(element) {
        Ok(vertices) => centroid_of(&vertices),
        Err(e) => {
            debug!(element = element.id, "centroid unavailable: {e}");
            None
        }
    }
}

/// Mean of a flattened vertex list; trailing partial triples are ignored.
#[must_use]
pub fn centroid_of(vertices: &[f64]) -> Option<Point3> {
    let count = vertices.len() / 3;
    if count == 0 {
        return None;
    }
    let (sx, sy, sz) = vertices
        .chunks_exact(3)
        .fold((0.0, 0.0, 0.0), |(x, y, z), v| (x + v[0], y + v[1], z + v[2]));
    let n = count as f64;
    Some(Point3::new(sx / n, sy / n, sz / n))
}

/// Origin of the element's placement. Independent of the mesh: an element
/// may have a placement but no geometry, or the other way round.
pub fn element_location(model: &dyn ModelQuery, element: &Element) -> Option<Point3> {
    match model.placement(element) {
        Ok(location) => location,
        Err(e) => {
            debug!(element = element.id, "placement unavailable: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InMemoryModel;

    #[test]
    fn distances() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 4.0, 12.0);
        assert!((distance_3d(a, b) - 13.0).abs() < 1e-10);
        assert!((distance_2d(a, b) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn centroid_is_vertex_mean() {
        let mut model = InMemoryModel::new();
        let id = model.insert(Element::new(1, "IfcSpace"));
        model.set_box(id, [0.0, 0.0, 0.0], [4.0, 2.0, 3.0]);

        let element = model.elements_of_type("IfcSpace").remove(0);
        assert_eq!(centroid(&model, &element), Some(Point3::new(2.0, 1.0, 1.5)));
    }

    #[test]
    fn centroid_and_location_fail_independently() {
        let mut model = InMemoryModel::new();
        let id = model.insert(Element::new(1, "IfcDoor"));
        model.set_placement(id, Point3::new(1.0, 2.0, 0.0));

        let element = model.elements_of_type("IfcDoor").remove(0);
        assert_eq!(centroid(&model, &element), None);
        assert_eq!(
            element_location(&model, &element),
            Some(Point3::new(1.0, 2.0, 0.0))
        );
    }

    #[test]
    fn empty_vertex_list_has_no_centroid() {
        assert_eq!(centroid_of(&[]), None);
        assert_eq!(centroid_of(&[1.0, 2.0]), None);
    }
}
