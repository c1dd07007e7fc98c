use super::{Element, PropertySets};
use crate::error::GeometryError;
use crate::geometry::Point3;

/// Entity types that `elements_of_type` also returns for a requested supertype.
const SUBTYPES: &[(&str, &[&str])] = &[
    ("IFCWALL", &["IFCWALLSTANDARDCASE", "IFCWALLELEMENTEDCASE"]),
    ("IFCDOOR", &["IFCDOORSTANDARDCASE"]),
    ("IFCSLAB", &["IFCSLABSTANDARDCASE", "IFCSLABELEMENTEDCASE"]),
    ("IFCWINDOW", &["IFCWINDOWSTANDARDCASE"]),
];

/// Read-only query interface over a building model.
///
/// Geometry and placement lookups may fail for any element; callers treat
/// a failure as "data unavailable", never as a fault.
pub trait ModelQuery {
    /// All elements of `ifc_type` (case-insensitive, subtypes included), in
    /// a stable order.
    fn elements_of_type(&self, ifc_type: &str) -> Vec<Element>;

    /// Property and quantity sets attached to the element. Missing sets are
    /// simply absent from the map.
    fn property_sets(&self, element: &Element) -> PropertySets;

    /// Flattened `[x0, y0, z0, x1, ...]` mesh vertices in metres.
    fn raw_mesh_vertices(&self, element: &Element) -> Result<Vec<f64>, GeometryError>;

    /// Origin of the element's placement, if it has one.
    fn placement(&self, element: &Element) -> Result<Option<Point3>, GeometryError>;

    /// The spatial element containing this element.
    fn container_of(&self, element: &Element) -> Option<Element>;
}

/// Returns true when an entity of type `actual` should be returned for a
/// query on `requested`.
#[must_use]
pub fn type_matches(requested: &str, actual: &str) -> bool {
    if requested.eq_ignore_ascii_case(actual) {
        return true;
    }
    SUBTYPES
        .iter()
        .filter(|(parent, _)| parent.eq_ignore_ascii_case(requested))
        .any(|(_, children)| children.iter().any(|c| c.eq_ignore_ascii_case(actual)))
}
