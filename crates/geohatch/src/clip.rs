//! Polygon containment tests used to keep or drop paired segments.
//!
//! Two models are available:
//!
//! - **Planar** ray casting directly on `(lon, lat)` pairs, treating edges as
//!   straight lines in that plane. Cheap, and accurate while the polygon is
//!   small enough that curvature is negligible at hatching resolution.
//! - **Geodesic** winding number, summing the turn of the bearing from the
//!   test point to each vertex in order. Holds for large rings, but costs one
//!   inverse solve per vertex.
//!
//! Both classify a point lying exactly on an edge as OUTSIDE.

use serde::{Deserialize, Serialize};

use crate::angle::signed_delta;
use crate::arc::is_point_on_arc;
use crate::geodesy::Geodesy;
use crate::geometry::GeoPoint;

/// Determinant tolerance for planar collinearity and bounds checks.
pub const PLANAR_TOLERANCE: f64 = 1e-9;

/// Which containment model decides whether a paired segment is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainmentModel {
    /// Ray casting on raw (lon, lat)
    #[default]
    Planar,
    /// Winding number from geodesic bearings
    Geodesic,
}

impl ContainmentModel {
    /// Parse a model name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "planar" => Some(Self::Planar),
            "geodesic" => Some(Self::Geodesic),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Planar => "planar",
            Self::Geodesic => "geodesic",
        }
    }

    /// Test `point` against `ring` under this model.
    pub fn contains<G: Geodesy + ?Sized>(&self, point: &GeoPoint, ring: &[GeoPoint], geodesy: &G) -> bool {
        match self {
            Self::Planar => point_in_polygon(point, ring),
            Self::Geodesic => point_in_geodesic_polygon(point, ring, geodesy),
        }
    }
}

// ============================================================================
// PLANAR PRIMITIVES
// ============================================================================

/// Turn direction of the ordered triplet `(p, q, r)` in the (lon, lat) plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Collinear,
    Clockwise,
    CounterClockwise,
}

/// Orientation of `(p, q, r)`, collinear within [`PLANAR_TOLERANCE`].
#[inline]
pub fn orientation(p: &GeoPoint, q: &GeoPoint, r: &GeoPoint) -> Orientation {
    let val = (q.lat - p.lat) * (r.lon - q.lon) - (q.lon - p.lon) * (r.lat - q.lat);
    if val.abs() < PLANAR_TOLERANCE {
        Orientation::Collinear
    } else if val > 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::CounterClockwise
    }
}

/// For collinear `p, q, r`: does `q` lie within the bounds of segment `pr`?
#[inline]
pub fn on_segment(p: &GeoPoint, q: &GeoPoint, r: &GeoPoint) -> bool {
    q.lon <= p.lon.max(r.lon) + PLANAR_TOLERANCE
        && q.lon >= p.lon.min(r.lon) - PLANAR_TOLERANCE
        && q.lat <= p.lat.max(r.lat) + PLANAR_TOLERANCE
        && q.lat >= p.lat.min(r.lat) - PLANAR_TOLERANCE
}

// ============================================================================
// POINT IN POLYGON (Ray Casting Algorithm)
// ============================================================================

/// Test if a point is strictly inside a ring using ray casting.
///
/// Casts a ray towards +lon and counts edge crossings.
/// Odd crossings = inside, even = outside. A point on an edge is outside.
pub fn point_in_polygon(point: &GeoPoint, ring: &[GeoPoint]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;

    for i in 0..n {
        let a = &ring[i];
        let b = &ring[(i + 1) % n];

        if orientation(a, b, point) == Orientation::Collinear && on_segment(a, point, b) {
            return false;
        }

        // Half-open in lat so a ray through a vertex is counted once
        let straddles = (a.lat <= point.lat && point.lat < b.lat) || (b.lat <= point.lat && point.lat < a.lat);
        if straddles {
            let t = (point.lat - a.lat) / (b.lat - a.lat);
            let crossing_lon = a.lon + t * (b.lon - a.lon);
            if point.lon < crossing_lon {
                inside = !inside;
            }
        }
    }

    inside
}

// ============================================================================
// GEODESIC WINDING NUMBER
// ============================================================================

/// Test if a point is strictly inside a ring of geodesic edges.
///
/// Walks the ring summing the signed change in bearing from `point` to each
/// successive vertex. Inside, the bearings sweep a full turn (±360°);
/// outside they sweep back to where they started (0°). A point on an edge or
/// vertex is outside.
pub fn point_in_geodesic_polygon<G: Geodesy + ?Sized>(point: &GeoPoint, ring: &[GeoPoint], geodesy: &G) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut bearings = Vec::with_capacity(n);
    for vertex in ring {
        // Coincident with a vertex
        let Some(inv) = geodesy.inverse(point, vertex) else {
            return false;
        };
        bearings.push(inv.initial_bearing);
    }

    let mut winding = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        if is_point_on_arc(point, &ring[i], &ring[j], geodesy) {
            return false;
        }
        winding += signed_delta(bearings[i], bearings[j]);
    }

    winding.abs() > 180.0
}

// ============================================================================
// TESTS
// ============================================================================
