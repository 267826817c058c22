//! Ellipsoid geodesy: forward/inverse geodesic solutions and ECEF conversion.
//!
//! The hatching engine never talks to a concrete ellipsoid directly. It is
//! written against the [`Geodesy`] trait, so callers can plug in their own
//! provider (a globe engine's ellipsoid, a mock for tests, ...). [`Ellipsoid`]
//! is the provider that ships with the crate, solving geodesics with
//! Vincenty's formulae.
//!
//! ## Rust Lesson #30: Traits as Seams
//!
//! A trait is a set of methods a type promises to implement, much like a
//! TypeScript `interface`. Functions that take `&G where G: Geodesy` work with
//! ANY provider, and the compiler generates a specialised copy per type
//! (monomorphisation) - no virtual call overhead unless you ask for
//! `&dyn Geodesy`.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::angle::normalize;
use crate::error::Error;
use crate::geometry::GeoPoint;

/// Result of a forward (direct) geodesic solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Direct {
    /// Destination point.
    pub point: GeoPoint,
    /// Bearing of the geodesic at the destination, degrees in `[0, 360)`.
    pub final_bearing: f64,
}

/// Result of an inverse geodesic solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inverse {
    /// Geodesic distance in meters.
    pub distance: f64,
    /// Bearing at the first point, degrees in `[0, 360)`.
    pub initial_bearing: f64,
    /// Bearing at the second point, degrees in `[0, 360)`.
    pub final_bearing: f64,
}

/// Geodesy provider contract used by every hatching component.
///
/// Implementations must be deterministic and round-trip consistent:
/// `direct(p, inverse(p, q).initial_bearing, inverse(p, q).distance)` lands on
/// `q` within geodesy tolerance.
pub trait Geodesy {
    /// Forward solve: travel `distance` meters from `origin` along `bearing` degrees.
    fn direct(&self, origin: &GeoPoint, bearing: f64, distance: f64) -> Direct;

    /// Inverse solve between two points.
    ///
    /// Returns `None` when the points coincide or no solution is found.
    fn inverse(&self, from: &GeoPoint, to: &GeoPoint) -> Option<Inverse>;

    /// Geodetic coordinates to Earth-Centered-Earth-Fixed meters.
    fn geodetic_to_cartesian(&self, point: &GeoPoint) -> Vector3<f64>;

    /// ECEF meters back to geodetic coordinates.
    fn cartesian_to_geodetic(&self, cartesian: &Vector3<f64>) -> GeoPoint;

    /// `(equatorial, polar)` radii in meters.
    fn radii(&self) -> (f64, f64);
}

/// Vincenty iteration limit and convergence threshold (radians).
const MAX_ITERATIONS: usize = 200;
const CONVERGENCE: f64 = 1e-12;

/// An oblate ellipsoid of revolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EllipsoidRadii", into = "EllipsoidRadii")]
pub struct Ellipsoid {
    equatorial_radius: f64,
    polar_radius: f64,
    flattening: f64,
    /// First eccentricity squared
    e2: f64,
    /// Second eccentricity squared
    ep2: f64,
}

/// Serialized form of an [`Ellipsoid`]: just the two radii.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EllipsoidRadii {
    pub equatorial_radius: f64,
    pub polar_radius: f64,
}

impl TryFrom<EllipsoidRadii> for Ellipsoid {
    type Error = Error;

    fn try_from(radii: EllipsoidRadii) -> Result<Self, Self::Error> {
        Ellipsoid::new(radii.equatorial_radius, radii.polar_radius)
    }
}

impl From<Ellipsoid> for EllipsoidRadii {
    fn from(ellipsoid: Ellipsoid) -> Self {
        Self {
            equatorial_radius: ellipsoid.equatorial_radius,
            polar_radius: ellipsoid.polar_radius,
        }
    }
}

impl Ellipsoid {
    /// WGS84, as used by GPS.
    pub const WGS84: Ellipsoid = Ellipsoid::from_flattening(6_378_137.0, 1.0 / 298.257_223_563);

    /// GRS80. Differs from WGS84 by less than a millimeter in polar radius.
    pub const GRS80: Ellipsoid = Ellipsoid::from_flattening(6_378_137.0, 1.0 / 298.257_222_101);

    const fn from_flattening(equatorial_radius: f64, flattening: f64) -> Self {
        let polar_radius = equatorial_radius * (1.0 - flattening);
        let e2 = flattening * (2.0 - flattening);
        Self {
            equatorial_radius,
            polar_radius,
            flattening,
            e2,
            ep2: e2 / (1.0 - e2),
        }
    }

    /// Create an ellipsoid from its radii.
    ///
    /// Requires `equatorial_radius > polar_radius > 0`.
    pub fn new(equatorial_radius: f64, polar_radius: f64) -> Result<Self, Error> {
        let valid = equatorial_radius.is_finite()
            && polar_radius.is_finite()
            && polar_radius > 0.0
            && equatorial_radius > polar_radius;
        if !valid {
            return Err(Error::InvalidEllipsoid {
                equatorial: equatorial_radius,
                polar: polar_radius,
            });
        }

        let flattening = (equatorial_radius - polar_radius) / equatorial_radius;
        Ok(Self::from_flattening(equatorial_radius, flattening))
    }

    /// Look up a well-known ellipsoid by (case-insensitive) name.
    pub fn named(name: &str) -> Result<Self, Error> {
        match name.to_ascii_lowercase().as_str() {
            "wgs84" | "wgs-84" => Ok(Self::WGS84),
            "grs80" | "grs-80" => Ok(Self::GRS80),
            _ => Err(Error::UnknownEllipsoid(name.to_string())),
        }
    }

    pub fn equatorial_radius(&self) -> f64 {
        self.equatorial_radius
    }

    pub fn polar_radius(&self) -> f64 {
        self.polar_radius
    }

    pub fn flattening(&self) -> f64 {
        self.flattening
    }

    /// Coefficients A and B of Vincenty's series for a given u².
    #[inline]
    fn series(u_sq: f64) -> (f64, f64) {
        let a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
        let b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
        (a, b)
    }

    #[inline]
    fn delta_sigma(b: f64, sin_sigma: f64, cos_sigma: f64, cos_2sm: f64) -> f64 {
        b * sin_sigma
            * (cos_2sm
                + b / 4.0
                    * (cos_sigma * (-1.0 + 2.0 * cos_2sm * cos_2sm)
                        - b / 6.0
                            * cos_2sm
                            * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                            * (-3.0 + 4.0 * cos_2sm * cos_2sm)))
    }

    /// Reduced latitude as (sin U, cos U).
    #[inline]
    fn reduced_latitude(&self, lat_degrees: f64) -> (f64, f64) {
        let tan_u = (1.0 - self.flattening) * lat_degrees.to_radians().tan();
        let cos_u = 1.0 / (1.0 + tan_u * tan_u).sqrt();
        (tan_u * cos_u, cos_u)
    }
}

/// Wrap a longitude into `[-180, 180)`.
#[inline]
pub fn wrap_longitude(lon: f64) -> f64 {
    (lon + 540.0).rem_euclid(360.0) - 180.0
}

impl Geodesy for Ellipsoid {
    fn direct(&self, origin: &GeoPoint, bearing: f64, distance: f64) -> Direct {
        let (a, b, f) = (self.equatorial_radius, self.polar_radius, self.flattening);

        let alpha1 = bearing.to_radians();
        let (sin_alpha1, cos_alpha1) = alpha1.sin_cos();
        let (sin_u1, cos_u1) = self.reduced_latitude(origin.lat);
        let tan_u1 = sin_u1 / cos_u1;

        let sigma1 = tan_u1.atan2(cos_alpha1);
        let sin_alpha = cos_u1 * sin_alpha1;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
        let (big_a, big_b) = Self::series(u_sq);

        let mut sigma = distance / (b * big_a);
        for _ in 0..MAX_ITERATIONS {
            let cos_2sm = (2.0 * sigma1 + sigma).cos();
            let (sin_sigma, cos_sigma) = sigma.sin_cos();
            let previous = sigma;
            sigma = distance / (b * big_a) + Self::delta_sigma(big_b, sin_sigma, cos_sigma, cos_2sm);
            if (sigma - previous).abs() < CONVERGENCE {
                break;
            }
        }

        let cos_2sm = (2.0 * sigma1 + sigma).cos();
        let (sin_sigma, cos_sigma) = sigma.sin_cos();
        let x = sin_u1 * sin_sigma - cos_u1 * cos_sigma * cos_alpha1;

        let lat2 = (sin_u1 * cos_sigma + cos_u1 * sin_sigma * cos_alpha1)
            .atan2((1.0 - f) * (sin_alpha * sin_alpha + x * x).sqrt());
        let lambda = (sin_sigma * sin_alpha1).atan2(cos_u1 * cos_sigma - sin_u1 * sin_sigma * cos_alpha1);
        let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
        let l = lambda
            - (1.0 - c) * f * sin_alpha
                * (sigma + c * sin_sigma * (cos_2sm + c * cos_sigma * (-1.0 + 2.0 * cos_2sm * cos_2sm)));

        Direct {
            point: GeoPoint {
                lon: wrap_longitude(origin.lon + l.to_degrees()),
                lat: lat2.to_degrees(),
                height: origin.height,
            },
            final_bearing: normalize(sin_alpha.atan2(-x).to_degrees()),
        }
    }

    fn inverse(&self, from: &GeoPoint, to: &GeoPoint) -> Option<Inverse> {
        let (a, b, f) = (self.equatorial_radius, self.polar_radius, self.flattening);

        let l = (to.lon - from.lon).to_radians();
        let (sin_u1, cos_u1) = self.reduced_latitude(from.lat);
        let (sin_u2, cos_u2) = self.reduced_latitude(to.lat);

        let mut lambda = l;
        let mut converged = false;
        // Loop state needed after convergence.
        let (mut sin_lambda, mut cos_lambda) = (0.0, 0.0);
        let (mut sin_sigma, mut cos_sigma, mut sigma) = (0.0, 0.0, 0.0);
        let (mut cos_sq_alpha, mut cos_2sm) = (0.0, 0.0);

        for _ in 0..MAX_ITERATIONS {
            (sin_lambda, cos_lambda) = lambda.sin_cos();
            let cross = cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda;
            sin_sigma = ((cos_u2 * sin_lambda).powi(2) + cross * cross).sqrt();
            if sin_sigma == 0.0 {
                // Coincident points
                return None;
            }
            cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
            sigma = sin_sigma.atan2(cos_sigma);
            let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
            cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
            // Equatorial line: cos²α = 0
            cos_2sm = if cos_sq_alpha != 0.0 {
                cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
            } else {
                0.0
            };
            let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
            let previous = lambda;
            lambda = l
                + (1.0 - c) * f * sin_alpha
                    * (sigma + c * sin_sigma * (cos_2sm + c * cos_sigma * (-1.0 + 2.0 * cos_2sm * cos_2sm)));
            if (lambda - previous).abs() < CONVERGENCE {
                converged = true;
                break;
            }
        }

        if !converged {
            log::trace!("inverse geodesic did not converge between {from:?} and {to:?}");
            return None;
        }

        let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
        let (big_a, big_b) = Self::series(u_sq);
        let distance = b * big_a * (sigma - Self::delta_sigma(big_b, sin_sigma, cos_sigma, cos_2sm));

        let alpha1 = (cos_u2 * sin_lambda).atan2(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda);
        let alpha2 = (cos_u1 * sin_lambda).atan2(-sin_u1 * cos_u2 + cos_u1 * sin_u2 * cos_lambda);

        Some(Inverse {
            distance,
            initial_bearing: normalize(alpha1.to_degrees()),
            final_bearing: normalize(alpha2.to_degrees()),
        })
    }

    fn geodetic_to_cartesian(&self, point: &GeoPoint) -> Vector3<f64> {
        let (sin_lat, cos_lat) = point.lat.to_radians().sin_cos();
        let (sin_lon, cos_lon) = point.lon.to_radians().sin_cos();
        let height = point.height.unwrap_or(0.0);
        // Prime vertical radius of curvature
        let n = self.equatorial_radius / (1.0 - self.e2 * sin_lat * sin_lat).sqrt();

        Vector3::new(
            (n + height) * cos_lat * cos_lon,
            (n + height) * cos_lat * sin_lon,
            (n * (1.0 - self.e2) + height) * sin_lat,
        )
    }

    /// Bowring's closed form; sub-millimeter for points near the surface.
    fn cartesian_to_geodetic(&self, cartesian: &Vector3<f64>) -> GeoPoint {
        let (a, b) = (self.equatorial_radius, self.polar_radius);
        let (x, y, z) = (cartesian.x, cartesian.y, cartesian.z);

        let lon = y.atan2(x);
        let p = x.hypot(y);
        let theta = (z * a).atan2(p * b);
        let (sin_theta, cos_theta) = theta.sin_cos();
        let lat = (z + self.ep2 * b * sin_theta.powi(3)).atan2(p - self.e2 * a * cos_theta.powi(3));

        let (sin_lat, cos_lat) = lat.sin_cos();
        let n = a / (1.0 - self.e2 * sin_lat * sin_lat).sqrt();
        let height = if cos_lat.abs() > 1e-12 {
            p / cos_lat - n
        } else {
            z.abs() - b
        };

        GeoPoint::with_height(lon.to_degrees(), lat.to_degrees(), height)
    }

    fn radii(&self) -> (f64, f64) {
        (self.equatorial_radius, self.polar_radius)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const WGS84: Ellipsoid = Ellipsoid::WGS84;

    #[test]
    fn wgs84_constants() {
        assert_relative_eq!(WGS84.equatorial_radius(), 6_378_137.0);
        assert_relative_eq!(WGS84.polar_radius(), 6_356_752.314_245_179, epsilon = 1e-3);
    }

    #[test]
    fn rejects_invalid_radii() {
        assert!(Ellipsoid::new(6_378_137.0, 6_378_137.0).is_err());
        assert!(Ellipsoid::new(6_356_752.0, 6_378_137.0).is_err());
        assert!(Ellipsoid::new(1.0, 0.0).is_err());
        assert!(Ellipsoid::new(f64::NAN, 1.0).is_err());
        assert!(Ellipsoid::new(6_378_137.0, 6_356_752.0).is_ok());
    }

    #[test]
    fn named_lookup() {
        assert_eq!(Ellipsoid::named("WGS84").unwrap(), Ellipsoid::WGS84);
        assert_eq!(Ellipsoid::named("grs80").unwrap(), Ellipsoid::GRS80);
        assert!(matches!(Ellipsoid::named("mars"), Err(Error::UnknownEllipsoid(_))));
    }

    #[test]
    fn one_degree_of_longitude_on_equator() {
        let inv = WGS84
            .inverse(&GeoPoint::new(0.0, 0.0), &GeoPoint::new(1.0, 0.0))
            .unwrap();
        // 2πa / 360
        assert_relative_eq!(inv.distance, 111_319.490_793, epsilon = 1e-3);
        assert_relative_eq!(inv.initial_bearing, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn flinders_peak_to_buninyong() {
        // Classic Vincenty reference line (Geoscience Australia).
        let flinders = GeoPoint::new(144.424_867_888_9, -37.951_033_416_7);
        let buninyong = GeoPoint::new(143.926_495_527_8, -37.652_821_138_9);
        let inv = WGS84.inverse(&flinders, &buninyong).unwrap();
        assert_relative_eq!(inv.distance, 54_972.271, epsilon = 1e-2);
        assert_relative_eq!(inv.initial_bearing, 306.868_159, epsilon = 1e-5);
    }

    #[test]
    fn coincident_points_have_no_inverse() {
        let p = GeoPoint::new(12.5, 41.9);
        assert!(WGS84.inverse(&p, &p).is_none());
    }

    #[test]
    fn direct_inverse_round_trip() {
        let origin = GeoPoint::new(10.0, 55.0);
        for &(bearing, distance) in &[(0.0, 1_000.0), (37.0, 25_000.0), (200.0, 480_000.0), (271.0, 3.0)] {
            let dest = WGS84.direct(&origin, bearing, distance).point;
            let inv = WGS84.inverse(&origin, &dest).unwrap();
            assert_relative_eq!(inv.distance, distance, epsilon = 1e-4);
            assert_relative_eq!(inv.initial_bearing, bearing, epsilon = 1e-6);
        }
    }

    #[test]
    fn direct_north_along_meridian() {
        let dest = WGS84.direct(&GeoPoint::new(5.0, 0.0), 0.0, 110_574.389).point;
        assert_relative_eq!(dest.lon, 5.0, epsilon = 1e-9);
        assert_relative_eq!(dest.lat, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn ecef_round_trip() {
        for &(lon, lat) in &[(0.0, 0.0), (-70.65, -33.45), (179.9, 89.5), (45.0, 45.0)] {
            let p = GeoPoint::new(lon, lat);
            let v = WGS84.geodetic_to_cartesian(&p);
            let back = WGS84.cartesian_to_geodetic(&v);
            assert_relative_eq!(back.lon, lon, epsilon = 1e-9);
            assert_relative_eq!(back.lat, lat, epsilon = 1e-9);
            assert!(back.height.unwrap().abs() < 1e-3);
        }
    }

    #[test]
    fn equator_prime_meridian_is_x_axis() {
        let v = WGS84.geodetic_to_cartesian(&GeoPoint::new(0.0, 0.0));
        assert_relative_eq!(v.x, WGS84.equatorial_radius());
        assert_relative_eq!(v.y, 0.0);
        assert_relative_eq!(v.z, 0.0);
    }

    #[test]
    fn wrap_longitude_range() {
        assert_relative_eq!(wrap_longitude(190.0), -170.0);
        assert_relative_eq!(wrap_longitude(-190.0), 170.0);
        assert_relative_eq!(wrap_longitude(180.0), -180.0);
        assert_relative_eq!(wrap_longitude(10.0), 10.0);
    }

    #[test]
    fn ellipsoid_deserializes_from_radii() {
        let json = r#"{"equatorial_radius": 6378137.0, "polar_radius": 6356752.314245179}"#;
        let ellipsoid: Ellipsoid = serde_json::from_str(json).unwrap();
        assert_relative_eq!(ellipsoid.flattening(), WGS84.flattening(), epsilon = 1e-12);

        let bad = r#"{"equatorial_radius": 1.0, "polar_radius": 2.0}"#;
        assert!(serde_json::from_str::<Ellipsoid>(bad).is_err());
    }
}
