use crate::geo::distance::distance_meters;
use crate::geo::GeoError;
use crate::GeoPoint;

/// True when `target` lies within `radius_m` meters of `user`. The boundary
/// is inclusive.
pub fn is_within_radius(
    user: &GeoPoint,
    target: &GeoPoint,
    radius_m: f64,
) -> Result<bool, GeoError> {
    let radius_m = validate_radius(radius_m)?;
    Ok(distance_meters(user, target) <= radius_m)
}

pub(crate) fn validate_radius(radius_m: f64) -> Result<f64, GeoError> {
    if radius_m.is_finite() && radius_m >= 0.0 {
        Ok(radius_m)
    } else {
        Err(GeoError::InvalidRadius(radius_m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    #[test]
    fn same_point_is_within_zero_radius() {
        let p = pt(51.5074, -0.1278);
        assert!(is_within_radius(&p, &p, 0.0).unwrap());
    }

    #[test]
    fn san_francisco_thresholds() {
        let center = pt(37.7749, -122.4194);
        let target = pt(37.7849, -122.4194);
        assert!(is_within_radius(&center, &target, 1200.0).unwrap());
        assert!(!is_within_radius(&center, &target, 1000.0).unwrap());
    }

    #[test]
    fn boundary_is_inclusive() {
        let a = pt(0.0, 0.0);
        let b = pt(0.0, 0.001);
        let d = distance_meters(&a, &b);
        assert!(is_within_radius(&a, &b, d).unwrap());
        assert!(!is_within_radius(&a, &b, d * (1.0 - 1e-9)).unwrap());
    }

    #[test]
    fn rejects_bad_radius() {
        let p = pt(0.0, 0.0);
        for r in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                is_within_radius(&p, &p, r),
                Err(GeoError::InvalidRadius(_))
            ));
        }
    }
}
