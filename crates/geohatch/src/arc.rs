//! Arc membership: is a point on the geodesic segment between two endpoints?

use crate::geodesy::Geodesy;
use crate::geometry::GeoPoint;

/// Tolerance for treating two geodetic points as the same, in degrees.
pub const GEO_TOLERANCE: f64 = 1e-6;

/// Absolute slack on the triangle equality, meters.
pub const ARC_TOLERANCE_M: f64 = 1e-3;

/// Slack proportional to the arc length.
///
/// Intersection candidates come from a plane through the ellipsoid's center,
/// which drifts from the true geodesic as the arc grows. On a chord of a few
/// thousand kilometers that drift shows up as up to a meter of excess in
/// `d(A,C) + d(C,B) - d(A,B)`; on a 100 km polygon edge the allowance is
/// 10 cm.
pub const ARC_RELATIVE_TOLERANCE: f64 = 1e-6;

/// Test whether `point` lies on the geodesic arc from `start` to `end`.
///
/// The geodesic triangle equality `d(A,C) + d(C,B) = d(A,B)` holds on the
/// arc and fails strictly off it, including for points on the same great
/// circle beyond either endpoint.
///
/// - `point` matching either endpoint is on the arc.
/// - A zero-length arc only contains its own endpoint.
/// - A failed inverse solve counts as "not on the arc".
pub fn is_point_on_arc<G: Geodesy + ?Sized>(
    point: &GeoPoint,
    start: &GeoPoint,
    end: &GeoPoint,
    geodesy: &G,
) -> bool {
    if point.approx_eq(start, GEO_TOLERANCE) || point.approx_eq(end, GEO_TOLERANCE) {
        return true;
    }

    if start.approx_eq(end, GEO_TOLERANCE) {
        // Already know point != start
        return false;
    }

    let (Some(to_point), Some(from_point), Some(whole)) = (
        geodesy.inverse(start, point),
        geodesy.inverse(point, end),
        geodesy.inverse(start, end),
    ) else {
        return false;
    };

    let excess = to_point.distance + from_point.distance - whole.distance;
    excess <= ARC_TOLERANCE_M + ARC_RELATIVE_TOLERANCE * whole.distance
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::Ellipsoid;

    const WGS84: Ellipsoid = Ellipsoid::WGS84;

    fn p(lon: f64, lat: f64) -> GeoPoint {
        GeoPoint::new(lon, lat)
    }

    #[test]
    fn start_point_is_always_on_arc() {
        for end in [p(10.0, 0.0), p(-3.0, 40.0), p(120.0, -60.0)] {
            assert!(is_point_on_arc(&p(1.0, 2.0), &p(1.0, 2.0), &end, &WGS84));
        }
    }

    #[test]
    fn end_point_is_on_arc() {
        assert!(is_point_on_arc(&p(10.0, 0.0), &p(0.0, 0.0), &p(10.0, 0.0), &WGS84));
    }

    #[test]
    fn interior_points_on_equator_and_meridian() {
        assert!(is_point_on_arc(&p(5.0, 0.0), &p(0.0, 0.0), &p(10.0, 0.0), &WGS84));
        assert!(is_point_on_arc(&p(7.0, 3.3), &p(7.0, -2.0), &p(7.0, 8.0), &WGS84));
    }

    #[test]
    fn interior_point_from_direct_solve() {
        let start = p(10.0, 55.0);
        let end = WGS84.direct(&start, 37.0, 80_000.0).point;
        let middle = WGS84.direct(&start, 37.0, 31_000.0).point;
        assert!(is_point_on_arc(&middle, &start, &end, &WGS84));
    }

    #[test]
    fn point_beyond_end_is_off_arc() {
        // Same great circle, past B
        assert!(!is_point_on_arc(&p(12.0, 0.0), &p(0.0, 0.0), &p(10.0, 0.0), &WGS84));
        // Same great circle, before A
        assert!(!is_point_on_arc(&p(-0.5, 0.0), &p(0.0, 0.0), &p(10.0, 0.0), &WGS84));
    }

    #[test]
    fn point_off_the_great_circle() {
        assert!(!is_point_on_arc(&p(5.0, 0.1), &p(0.0, 0.0), &p(10.0, 0.0), &WGS84));
    }

    #[test]
    fn zero_length_arc_contains_only_itself() {
        let a = p(4.0, 4.0);
        assert!(is_point_on_arc(&a, &a, &a, &WGS84));
        assert!(!is_point_on_arc(&p(4.0, 4.1), &a, &a, &WGS84));
    }
}
