//! Geographic coordinates to globe-local Cartesian space.
//!
//! The globe texture has its prime meridian at the back of the sphere, so
//! longitude is shifted by 180° before conversion. `y` is the rotation axis.

use nalgebra::Vector3;

pub const GLOBE_RADIUS: f64 = 200.0;
/// Scene units per kilometre of altitude.
pub const ALTITUDE_SCALE: f64 = 0.06;
/// Lift applied to every marker so ground-level objects clear the surface.
pub const MIN_ALTITUDE_OFFSET: f64 = 2.0;

const MAX_MARKER_RADIUS: f64 = 6.0;
const MIN_MARKER_RADIUS: f64 = 2.0;
const MARKER_ALTITUDE_CAP_KM: f64 = 400.0;

pub fn project(longitude_deg: f64, latitude_deg: f64, altitude_km: f64) -> Vector3<f64> {
    let radius = GLOBE_RADIUS + MIN_ALTITUDE_OFFSET + altitude_km.max(0.0) * ALTITUDE_SCALE;
    let phi = (90.0 - latitude_deg).to_radians();
    let theta = (longitude_deg + 180.0).to_radians();
    Vector3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

/// Sphere radius for a marker; lower satellites draw larger.
pub fn marker_radius(altitude_km: Option<f64>) -> f64 {
    let altitude = altitude_km.unwrap_or(0.0).clamp(0.0, MARKER_ALTITUDE_CAP_KM);
    (MAX_MARKER_RADIUS - altitude / 100.0).max(MIN_MARKER_RADIUS)
}
