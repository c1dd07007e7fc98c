use super::Point3;
use crate::model::PropertySets;

const SPACE_QUANTITIES: &str = "Qto_SpaceBaseQuantities";

/// Polygon area by the shoelace formula on the X-Y projection.
///
/// Z is always dropped, so 3-D vertex lists are treated as their planar
/// projection. There is no true-surface mode: a sloped polygon reports its
/// plan footprint, not its surface area. Fewer than three points yields zero;
/// the result is never negative regardless of winding.
#[must_use]
pub fn polygon_area(vertices: &[Point3]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let doubled: f64 = vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();
    doubled.abs() / 2.0
}

/// Floor area from quantity sets: the first numeric "area" quantity in a
/// set named like an area or quantity set.
#[must_use]
pub fn floor_area(psets: &PropertySets) -> Option<f64> {
    psets
        .iter()
        .filter(|(name, _)| name.contains("Area") || name.contains("Quantities"))
        .flat_map(|(_, set)| set.iter())
        .filter(|(key, _)| key.to_lowercase().contains("area"))
        .find_map(|(_, value)| value.as_f64())
}

/// Net floor area: the base quantity set's NetFloorArea, else the first
/// numeric value of a set whose name mentions both "net" and "area".
#[must_use]
pub fn net_floor_area(psets: &PropertySets) -> Option<f64> {
    if let Some(set) = psets.get(SPACE_QUANTITIES) {
        return set.get("NetFloorArea").and_then(|v| v.as_f64());
    }
    psets
        .iter()
        .filter(|(name, _)| {
            let name = name.to_lowercase();
            name.contains("net") && name.contains("area")
        })
        .flat_map(|(_, set)| set.values())
        .find_map(|value| value.as_f64())
}
