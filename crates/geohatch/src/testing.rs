//! Test-only geodesy providers.

use nalgebra::Vector3;

use crate::angle::normalize;
use crate::geodesy::{Direct, Geodesy, Inverse};
use crate::geometry::GeoPoint;

/// A flat world where one degree is exactly 1000 m on both axes.
///
/// Bearings are plain compass angles in the (lon, lat) plane, so every
/// projection has an exact closed-form answer.
pub struct FlatEarth;

pub const METERS_PER_DEGREE: f64 = 1000.0;

impl Geodesy for FlatEarth {
    fn direct(&self, origin: &GeoPoint, bearing: f64, distance: f64) -> Direct {
        let rad = bearing.to_radians();
        let point = GeoPoint::new(
            origin.lon + rad.sin() * distance / METERS_PER_DEGREE,
            origin.lat + rad.cos() * distance / METERS_PER_DEGREE,
        );
        Direct { point, final_bearing: normalize(bearing) }
    }

    fn inverse(&self, from: &GeoPoint, to: &GeoPoint) -> Option<Inverse> {
        let dx = (to.lon - from.lon) * METERS_PER_DEGREE;
        let dy = (to.lat - from.lat) * METERS_PER_DEGREE;
        let distance = dx.hypot(dy);
        if distance < 1e-9 {
            return None;
        }
        let bearing = normalize(dx.atan2(dy).to_degrees());
        Some(Inverse { distance, initial_bearing: bearing, final_bearing: bearing })
    }

    fn geodetic_to_cartesian(&self, point: &GeoPoint) -> Vector3<f64> {
        Vector3::new(point.lon, point.lat, 0.0)
    }

    fn cartesian_to_geodetic(&self, cartesian: &Vector3<f64>) -> GeoPoint {
        GeoPoint::new(cartesian.x, cartesian.y)
    }

    fn radii(&self) -> (f64, f64) {
        (METERS_PER_DEGREE, METERS_PER_DEGREE)
    }
}
