//! Geodesic segment/segment intersection.
//!
//! This is the HOT PATH of hatching: every chord is tested against every
//! polygon edge. Each arc is treated as the section of the ellipsoid cut by
//! the plane through its endpoints and the ellipsoid's center; two such
//! planes meet in a line through the center, and that line pierces the
//! surface at two antipodal candidates. Arc membership then decides which
//! candidates actually lie on both segments.

use nalgebra::Vector3;

use crate::arc::{is_point_on_arc, GEO_TOLERANCE};
use crate::geodesy::Geodesy;
use crate::geometry::GeoPoint;

/// Relative threshold below which a cross product counts as zero.
///
/// For two ECEF points this is `sin` of the angle between them, so pairs
/// closer than ~2e-4 arc-seconds to coincident or antipodal are degenerate.
pub const CROSS_TOLERANCE: f64 = 1e-9;

/// Unit normal of the plane through the ellipsoid's center, `p` and `q`.
///
/// `None` when the points are (nearly) coincident or antipodal: the plane is
/// not uniquely defined.
pub fn plane_normal(p: &Vector3<f64>, q: &Vector3<f64>) -> Option<Vector3<f64>> {
    let scale = p.norm() * q.norm();
    if scale == 0.0 {
        return None;
    }
    let normal = p.cross(q);
    let length = normal.norm();
    if length <= CROSS_TOLERANCE * scale {
        return None;
    }
    Some(normal / length)
}

/// Push `candidate` unless an existing point matches it within `tolerance` degrees.
///
/// Returns whether the point was added.
pub fn push_unique(points: &mut Vec<GeoPoint>, candidate: GeoPoint, tolerance: f64) -> bool {
    if points.iter().any(|existing| existing.approx_eq(&candidate, tolerance)) {
        return false;
    }
    points.push(candidate);
    true
}

/// Intersect geodesic arc `p1 -> q1` with geodesic arc `p2 -> q2`.
///
/// Returns 0, 1 or 2 points:
/// - crossing arcs give one point;
/// - arcs on the same great circle give the shared endpoints of their
///   overlap (one point when they only touch, none when disjoint);
/// - a degenerate arc (zero length or antipodal endpoints) gives nothing.
pub fn intersect_arcs<G: Geodesy + ?Sized>(
    p1: &GeoPoint,
    q1: &GeoPoint,
    p2: &GeoPoint,
    q2: &GeoPoint,
    geodesy: &G,
) -> Vec<GeoPoint> {
    let p1_cart = geodesy.geodetic_to_cartesian(p1);
    let q1_cart = geodesy.geodetic_to_cartesian(q1);
    let p2_cart = geodesy.geodetic_to_cartesian(p2);
    let q2_cart = geodesy.geodetic_to_cartesian(q2);

    let (Some(n1), Some(n2)) = (
        plane_normal(&p1_cart, &q1_cart),
        plane_normal(&p2_cart, &q2_cart),
    ) else {
        log::trace!("degenerate arc, skipping intersection");
        return Vec::new();
    };

    // Direction of the line where the two planes meet.
    let line = n1.cross(&n2);
    let line_length = line.norm();

    if line_length <= CROSS_TOLERANCE {
        return overlap_endpoints(p1, q1, p2, q2, geodesy);
    }
    let line = line / line_length;

    // ## Rust Lesson #32: Tuples for Related Values
    //
    // `geodesy.radii()` hands back `(equatorial, polar)` in one go, and a
    // `let (a, c) = ...` pattern splits it again. No wrapper struct needed
    // for a pair that never leaves this function.
    let (a, c) = geodesy.radii();
    let denom = (line.x * line.x + line.y * line.y) / (a * a) + (line.z * line.z) / (c * c);
    let t = 1.0 / denom.sqrt();

    let mut intersections = Vec::with_capacity(2);
    for scale in [t, -t] {
        let candidate = geodesy.cartesian_to_geodetic(&(line * scale)).flatten();
        if is_point_on_arc(&candidate, p1, q1, geodesy) && is_point_on_arc(&candidate, p2, q2, geodesy) {
            push_unique(&mut intersections, candidate, GEO_TOLERANCE);
        }
    }

    intersections
}

/// Both arcs lie on one great circle: the overlap is bounded by whichever
/// endpoints fall on the other arc.
fn overlap_endpoints<G: Geodesy + ?Sized>(
    p1: &GeoPoint,
    q1: &GeoPoint,
    p2: &GeoPoint,
    q2: &GeoPoint,
    geodesy: &G,
) -> Vec<GeoPoint> {
    let checks = [(p1, p2, q2), (q1, p2, q2), (p2, p1, q1), (q2, p1, q1)];

    let mut overlap = Vec::with_capacity(2);
    for (point, start, end) in checks {
        if is_point_on_arc(point, start, end, geodesy) {
            push_unique(&mut overlap, point.flatten(), GEO_TOLERANCE);
        }
    }
    overlap
}

// ============================================================================
// TESTS
// ============================================================================
