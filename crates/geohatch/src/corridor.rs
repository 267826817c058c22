//! Corridor projection: how wide is a polygon across the hatch direction?
//!
//! The hatch lines run along `main_bearing`. Their spacing is measured along
//! the perpendicular "axis" through the polygon's first vertex. Projecting
//! every vertex onto that axis gives the span the sweep must cover.

use crate::angle::{Side, normalize, perpendicular_bearing};
use crate::geodesy::Geodesy;
use crate::geometry::GeoPoint;

/// Extent of a polygon measured along the sweep axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corridor {
    /// Smallest signed projection, meters (never positive)
    pub min_projection: f64,
    /// Largest signed projection, meters (never negative)
    pub max_projection: f64,
    /// Farthest any vertex lies from the axis origin, meters
    pub reach: f64,
    /// Where the axis starts: the polygon's first vertex
    pub axis_origin: GeoPoint,
    /// `main_bearing + 90`, normalized
    pub axis_bearing: f64,
}

impl Corridor {
    /// Total extent across the hatch direction, meters.
    #[inline]
    pub fn width(&self) -> f64 {
        self.max_projection - self.min_projection
    }
}

/// Project `vertices` onto the axis perpendicular to `main_bearing`.
///
/// Each vertex is projected by its geodesic distance from the origin times
/// the cosine of the angle between the axis and the bearing to it. A vertex
/// coincident with the origin projects to 0. The largest of those distances
/// is kept as the corridor's `reach`. Returns `None` for an empty vertex list.
pub fn project_corridor<G: Geodesy + ?Sized>(
    vertices: &[GeoPoint],
    main_bearing: f64,
    geodesy: &G,
) -> Option<Corridor> {
    let (axis_origin, rest) = vertices.split_first()?;
    let axis_bearing = perpendicular_bearing(main_bearing, Side::Right);

    let (min_projection, max_projection, reach) = rest
        .iter()
        .map(|vertex| match geodesy.inverse(axis_origin, vertex) {
            Some(inv) => (
                inv.distance * normalize(inv.initial_bearing - axis_bearing).to_radians().cos(),
                inv.distance,
            ),
            None => (0.0, 0.0),
        })
        .fold((0.0_f64, 0.0_f64, 0.0_f64), |(lo, hi, far), (projected, distance)| {
            (lo.min(projected), hi.max(projected), far.max(distance))
        });

    Some(Corridor {
        min_projection,
        max_projection,
        reach,
        axis_origin: *axis_origin,
        axis_bearing,
    })
}

// ============================================================================
// TESTS
// ============================================================================
