//! Core geographic types for geohatch.
//!
//! Everything here is a small value type: points are `Copy`, polygons own
//! their vertices, and nothing keeps a reference back to a rendering scene.
//! Coordinates are degrees (lon, lat) and meters (height).

use serde::{Deserialize, Serialize};

use crate::geodesy::Geodesy;

/// A point on the ellipsoid.
///
/// `lat` is in `[-90, 90]`; `lon` may be any real and is compared modulo 360.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
    /// Height above the ellipsoid in meters (0 when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// An unclipped full-span candidate hatch line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chord {
    pub start: GeoPoint,
    pub end: GeoPoint,
}

/// A finished hatch line: clipped to the polygon and moved by the offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HatchLine {
    pub start: GeoPoint,
    pub end: GeoPoint,
}

/// Axis-aligned (lon, lat) bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

/// A simple polygon: the outer ring only, implicitly closed.
///
/// Edge `i` runs from vertex `i` to vertex `(i + 1) % n`. The optional
/// fields are metadata carried from the input document; the hatching core
/// only ever reads `outer`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeoPolygon {
    /// Outer ring vertices, without a repeated closing vertex
    pub outer: Vec<GeoPoint>,
    /// Feature id from the source document
    pub id: Option<String>,
    /// Outline color from the feature's `stroke` property
    pub stroke_color: Option<String>,
    /// Per-feature `step` override (meters)
    pub step: Option<f64>,
    /// Per-feature `bearing` override (degrees)
    pub bearing: Option<f64>,
    /// Per-feature `offset` override (meters)
    pub offset: Option<f64>,
}

// ============================================================================
// IMPLEMENTATIONS
// ============================================================================

impl GeoPoint {
    #[inline]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat, height: None }
    }

    #[inline]
    pub fn with_height(lon: f64, lat: f64, height: f64) -> Self {
        Self { lon, lat, height: Some(height) }
    }

    /// Same point with the height dropped.
    #[inline]
    pub fn flatten(&self) -> Self {
        Self::new(self.lon, self.lat)
    }

    /// Compare within `tolerance` degrees on both axes.
    ///
    /// Longitudes are compared on the circle, so 179.9999999 and -180 match.
    /// At the poles every longitude names the same point.
    pub fn approx_eq(&self, other: &GeoPoint, tolerance: f64) -> bool {
        if (self.lat - other.lat).abs() > tolerance {
            return false;
        }
        if 90.0 - self.lat.abs() <= tolerance && 90.0 - other.lat.abs() <= tolerance {
            return true;
        }
        let dlon = (self.lon - other.lon + 180.0).rem_euclid(360.0) - 180.0;
        dlon.abs() <= tolerance
    }

    /// Arithmetic mean of the raw coordinates.
    ///
    /// Planar on purpose: this feeds the planar containment test.
    #[inline]
    pub fn planar_midpoint(&self, other: &GeoPoint) -> GeoPoint {
        GeoPoint::new((self.lon + other.lon) / 2.0, (self.lat + other.lat) / 2.0)
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lon, lat): (f64, f64)) -> Self {
        GeoPoint::new(lon, lat)
    }
}

impl Chord {
    #[inline]
    pub fn new(start: GeoPoint, end: GeoPoint) -> Self {
        Self { start, end }
    }
}

impl HatchLine {
    #[inline]
    pub fn new(start: GeoPoint, end: GeoPoint) -> Self {
        Self { start, end }
    }

    /// Geodesic length in meters (0 for a degenerate line).
    pub fn length<G: Geodesy + ?Sized>(&self, geodesy: &G) -> f64 {
        geodesy
            .inverse(&self.start, &self.end)
            .map_or(0.0, |inv| inv.distance)
    }

    /// Initial bearing from start to end, if the line has a length.
    pub fn bearing<G: Geodesy + ?Sized>(&self, geodesy: &G) -> Option<f64> {
        geodesy
            .inverse(&self.start, &self.end)
            .map(|inv| inv.initial_bearing)
    }
}

impl BoundingBox {
    #[inline]
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    #[inline]
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    /// Grow by `degrees` on every side.
    pub fn expand(&self, degrees: f64) -> BoundingBox {
        BoundingBox {
            min_lon: self.min_lon - degrees,
            min_lat: self.min_lat - degrees,
            max_lon: self.max_lon + degrees,
            max_lat: self.max_lat + degrees,
        }
    }

    /// Union of two boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_lon: self.min_lon.min(other.min_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lon: self.max_lon.max(other.max_lon),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    #[inline]
    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.min_lon..=self.max_lon).contains(&point.lon)
            && (self.min_lat..=self.max_lat).contains(&point.lat)
    }
}

impl GeoPolygon {
    /// Create a polygon with no metadata.
    pub fn new(outer: Vec<GeoPoint>) -> Self {
        Self {
            outer,
            ..Default::default()
        }
    }

    /// Create a polygon with an ID.
    pub fn with_id(outer: Vec<GeoPoint>, id: Option<String>) -> Self {
        Self {
            outer,
            id,
            ..Default::default()
        }
    }

    /// Build from `(lon, lat)` pairs.
    pub fn from_lon_lat(coords: &[(f64, f64)]) -> Self {
        Self::new(coords.iter().map(|&c| GeoPoint::from(c)).collect())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.outer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.outer.is_empty()
    }

    /// At least three vertices - the minimum for a ring with an interior.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.outer.len() >= 3
    }

    /// Iterate the ring's edges, including the closing one.
    pub fn edges(&self) -> impl Iterator<Item = (&GeoPoint, &GeoPoint)> + '_ {
        let n = self.outer.len();
        (0..n).map(move |i| (&self.outer[i], &self.outer[(i + 1) % n]))
    }

    /// Get the bounding box of the raw coordinates.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        if self.outer.is_empty() {
            return None;
        }

        let min_lon = self.outer.iter().map(|p| p.lon).fold(f64::INFINITY, f64::min);
        let min_lat = self.outer.iter().map(|p| p.lat).fold(f64::INFINITY, f64::min);
        let max_lon = self.outer.iter().map(|p| p.lon).fold(f64::NEG_INFINITY, f64::max);
        let max_lat = self.outer.iter().map(|p| p.lat).fold(f64::NEG_INFINITY, f64::max);

        Some(BoundingBox { min_lon, min_lat, max_lon, max_lat })
    }

    /// Signed area in square degrees (shoelace); positive for counter-clockwise.
    pub fn signed_area(&self) -> f64 {
        let n = self.outer.len();
        if n < 3 {
            return 0.0;
        }

        let mut area = 0.0;
        for (a, b) in self.edges() {
            area += a.lon * b.lat - b.lon * a.lat;
        }
        area / 2.0
    }

    #[inline]
    pub fn is_clockwise(&self) -> bool {
        self.signed_area() < 0.0
    }
}

// ============================================================================
// TESTS
// ============================================================================
