use std::f64::consts::FRAC_PI_2;

use crate::geo::distance::{distance_meters, EARTH_RADIUS_M};
use crate::GeoPoint;

/// Position of `point` on a sphere of Earth radius, in Earth-centred
/// Cartesian meters.
pub fn project(point: &GeoPoint) -> [f64; 3] {
    let (lat, lng) = point.to_radians();
    [
        EARTH_RADIUS_M * lat.cos() * lng.cos(),
        EARTH_RADIUS_M * lat.cos() * lng.sin(),
        EARTH_RADIUS_M * lat.sin(),
    ]
}

/// Straight-line length of the chord under a great-circle arc of `arc_m`
/// meters. Arcs longer than half the circumference map to the diameter.
pub fn chord_length(arc_m: f64) -> f64 {
    let half_angle = (arc_m / (2.0 * EARTH_RADIUS_M)).min(FRAC_PI_2);
    2.0 * EARTH_RADIUS_M * half_angle.sin()
}

/// Node in a 3D k-d tree.
#[derive(Debug, Clone)]
pub struct KDNode {
    pub point: [f64; 3],
    pub location: GeoPoint,
    pub index: usize,
    pub axis: usize,
    pub left: Option<Box<KDNode>>,
    pub right: Option<Box<KDNode>>,
}

/// 3D k-d tree over geographic points, answering N-nearest-within-radius
/// queries in great-circle meters.
#[derive(Debug, Clone, Default)]
pub struct KDTree {
    pub root: Option<Box<KDNode>>,
}

impl KDTree {
    pub fn build(locations: &[GeoPoint]) -> Self {
        let points: Vec<[f64; 3]> = locations.iter().map(project).collect();
        let mut indices: Vec<usize> = (0..points.len()).collect();
        let root = Self::build_recursive(locations, &points, &mut indices, 0);
        KDTree { root }
    }

    fn build_recursive(
        locations: &[GeoPoint],
        points: &[[f64; 3]],
        idx: &mut [usize],
        depth: usize,
    ) -> Option<Box<KDNode>> {
        if idx.is_empty() {
            return None;
        }

        let axis = depth % 3;
        idx.sort_by(|&a, &b| points[a][axis].total_cmp(&points[b][axis]));
        let mid = idx.len() / 2;
        let median = idx[mid];
        let (lower, rest) = idx.split_at_mut(mid);

        Some(Box::new(KDNode {
            point: points[median],
            location: locations[median],
            index: median,
            axis,
            left: Self::build_recursive(locations, points, lower, depth + 1),
            right: Self::build_recursive(locations, points, &mut rest[1..], depth + 1),
        }))
    }

    /// Returns up to `n` nearest points within `radius_m` great-circle meters
    /// of `target`, as `(index, distance_m)` ascending by distance.
    pub fn nearest_n_within_radius(
        &self,
        target: &GeoPoint,
        radius_m: f64,
        n: usize,
    ) -> Vec<(usize, f64)> {
        let mut results = Vec::new();
        let query = Query {
            target: *target,
            point: project(target),
            radius_m,
            // slack so chord rounding never prunes a point the haversine check keeps
            bound2: (chord_length(radius_m) * (1.0 + 1e-9) + 1e-6).powi(2),
        };
        Self::search_recursive(&self.root, &query, &mut results);
        results.sort_by(|a, b| a.1.total_cmp(&b.1));
        results.truncate(n);
        results
    }

    fn search_recursive(
        node: &Option<Box<KDNode>>,
        query: &Query,
        results: &mut Vec<(usize, f64)>,
    ) {
        if let Some(noderef) = node {
            let dx = noderef.point[0] - query.point[0];
            let dy = noderef.point[1] - query.point[1];
            let dz = noderef.point[2] - query.point[2];
            if dx * dx + dy * dy + dz * dz <= query.bound2 {
                let d = distance_meters(&query.target, &noderef.location);
                if d <= query.radius_m {
                    results.push((noderef.index, d));
                }
            }

            let axis = noderef.axis;
            let delta = query.point[axis] - noderef.point[axis];
            let (first, second) = if delta < 0.0 {
                (&noderef.left, &noderef.right)
            } else {
                (&noderef.right, &noderef.left)
            };

            Self::search_recursive(first, query, results);
            if delta * delta <= query.bound2 {
                Self::search_recursive(second, query, results);
            }
        }
    }
}

struct Query {
    target: GeoPoint,
    point: [f64; 3],
    radius_m: f64,
    bound2: f64,
}
