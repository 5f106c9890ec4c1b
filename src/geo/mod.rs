pub mod distance;
pub mod radius;
pub mod sampler;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
    #[error("invalid radius: {0} (must be finite and non-negative)")]
    InvalidRadius(f64),
    #[error(
        "sampling outside the flat-Earth domain: radius {radius_m} m at latitude {latitude} \
         (limits: radius <= {max_radius_m} m, |latitude| <= {max_latitude})"
    )]
    SamplingDomain {
        radius_m: f64,
        latitude: f64,
        max_radius_m: f64,
        max_latitude: f64,
    },
    #[error("invalid capsule: {0}")]
    InvalidCapsule(String),
    #[error("random source failed: {0}")]
    RandomSource(#[from] rand::Error),
}
