use super::{centroid, distance_2d, distance_3d, Point3};
use crate::model::{Element, ModelQuery};

/// Horizontal travel distance from `start` through `waypoints` to `end`.
///
/// Straight segments measured on the X-Y plane only; vertical travel is not
/// counted.
#[must_use]
pub fn travel_distance(start: Point3, end: Point3, waypoints: &[Point3]) -> f64 {
    let route: Vec<Point3> = std::iter::once(start)
        .chain(waypoints.iter().copied())
        .chain(std::iter::once(end))
        .collect();
    route.windows(2).map(|leg| distance_2d(leg[0], leg[1])).sum()
}

/// Closest candidate to `from` by 3-D distance. Ties keep the candidate
/// seen first.
pub fn nearest<T>(from: Point3, candidates: impl IntoIterator<Item = (T, Point3)>) -> Option<(f64, T)> {
    let mut best: Option<(f64, T)> = None;
    for (candidate, point) in candidates {
        let distance = distance_3d(from, point);
        if best.as_ref().map_or(true, |(closest, _)| distance < *closest) {
            best = Some((distance, candidate));
        }
    }
    best
}

/// Nearest element of `target_type` by centroid distance, using a linear
/// scan. Targets without a resolvable centroid are skipped.
pub fn nearest_of_type(
    model: &dyn ModelQuery,
    from: Point3,
    target_type: &str,
) -> Option<(f64, Element)> {
    let targets = model.elements_of_type(target_type);
    nearest(
        from,
        targets.into_iter().filter_map(|target| {
            let point = centroid(model, &target)?;
            Some((target, point))
        }),
    )
}
