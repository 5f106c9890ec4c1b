pub mod capsule;
pub mod data;
pub mod geo;
pub mod spatial;

use serde::{Deserialize, Serialize};

use crate::geo::GeoError;

pub use crate::geo::distance::{distance_meters, EARTH_RADIUS_M};
pub use crate::geo::radius::is_within_radius;
pub use crate::geo::sampler::{random_point_in_radius, RandomSource};

/// Latitude/longitude pair in decimal degrees.
///
/// Coordinates are validated on construction and on deserialization, so a
/// `GeoPoint` is always finite with latitude in [-90, 90] and longitude in
/// [-180, 180].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(GeoError::InvalidCoordinate {
                latitude,
                longitude,
            });
        }
        Ok(GeoPoint {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// (latitude, longitude) in radians.
    pub fn to_radians(&self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

/// Wire shape of a point before validation. Accepts the short `lat`/`lng`
/// keys used by map clients.
#[derive(Deserialize)]
struct RawGeoPoint {
    #[serde(alias = "lat")]
    latitude: f64,
    #[serde(alias = "lng")]
    longitude: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = GeoError;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        GeoPoint::new(raw.latitude, raw.longitude)
    }
}
