//! Area-uniform random points inside a small disc, for fabricating demo data.
//!
//! Offsets are converted to degrees with a local flat-Earth approximation
//! (111 km per degree of latitude, scaled by `cos(latitude)` for longitude).
//! The approximation degrades with radius and towards the poles, so the
//! sampler only accepts radii up to [`MAX_SAMPLING_RADIUS_M`] around centers
//! with `|latitude| <= MAX_SAMPLING_LATITUDE`.

use std::f64::consts::TAU;

use rand::RngCore;

use crate::geo::radius::validate_radius;
use crate::geo::GeoError;
use crate::GeoPoint;

/// Approximate meters per degree of latitude.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

pub const MAX_SAMPLING_RADIUS_M: f64 = 5_000.0;

pub const MAX_SAMPLING_LATITUDE: f64 = 85.0;

/// Source of uniform draws in `[0, 1)`.
///
/// Every [`RngCore`] is a `RandomSource`; draws go through `try_fill_bytes`
/// so a fallible generator surfaces its error instead of panicking.
pub trait RandomSource {
    fn next_unit(&mut self) -> Result<f64, GeoError>;
}

impl<R: RngCore + ?Sized> RandomSource for R {
    fn next_unit(&mut self) -> Result<f64, GeoError> {
        let mut buf = [0u8; 8];
        self.try_fill_bytes(&mut buf)?;
        // top 53 bits -> [0, 1)
        let bits = u64::from_le_bytes(buf) >> 11;
        Ok(bits as f64 / (1u64 << 53) as f64)
    }
}

/// Draws a point uniformly by area from the disc of `radius_m` meters around
/// `center`.
///
/// The angle pairs `cos` with the latitude offset and `sin` with the
/// longitude offset. The radius is `sqrt(u) * radius_m`; sampling `u * radius_m`
/// directly would crowd points towards the center.
pub fn random_point_in_radius<R: RandomSource + ?Sized>(
    center: &GeoPoint,
    radius_m: f64,
    rng: &mut R,
) -> Result<GeoPoint, GeoError> {
    let radius_m = validate_radius(radius_m)?;
    if radius_m > MAX_SAMPLING_RADIUS_M || center.latitude().abs() > MAX_SAMPLING_LATITUDE {
        return Err(GeoError::SamplingDomain {
            radius_m,
            latitude: center.latitude(),
            max_radius_m: MAX_SAMPLING_RADIUS_M,
            max_latitude: MAX_SAMPLING_LATITUDE,
        });
    }

    let angle = rng.next_unit()? * TAU;
    let r = rng.next_unit()?.sqrt() * radius_m;

    let meters_per_degree_lng = METERS_PER_DEGREE * center.latitude().to_radians().cos();
    let offset_lat = r * angle.cos() / METERS_PER_DEGREE;
    let offset_lng = r * angle.sin() / meters_per_degree_lng;

    GeoPoint::new(
        center.latitude() + offset_lat,
        wrap_longitude(center.longitude() + offset_lng),
    )
}

fn wrap_longitude(lng: f64) -> f64 {
    if lng > 180.0 {
        lng - 360.0
    } else if lng < -180.0 {
        lng + 360.0
    } else {
        lng
    }
}
