use crate::GeoPoint;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two points (haversine).
pub fn distance_meters(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let (phi1, _) = p1.to_radians();
    let (phi2, _) = p2.to_radians();
    let d_phi = (p2.latitude() - p1.latitude()).to_radians();
    let d_lambda = (p2.longitude() - p1.longitude()).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // rounding can push `a` a hair past 1 for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}
