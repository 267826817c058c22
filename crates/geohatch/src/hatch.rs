//! Geodesic hatch line generation.
//!
//! Fills a polygon with parallel geodesic lines: chords are swept across the
//! polygon's corridor, cut against every edge, paired up along each chord and
//! kept where the pair's midpoint falls inside the polygon.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::angle::{normalize, reverse_bearing};
use crate::clip::ContainmentModel;
use crate::corridor::project_corridor;
use crate::geodesy::Geodesy;
use crate::geometry::{Chord, GeoPoint, GeoPolygon, HatchLine};
use crate::intersect::{intersect_arcs, push_unique};
use crate::span::ChordSweep;

/// Two intersection points closer than this (degrees) on one chord are one.
pub const DEDUP_TOLERANCE: f64 = 1e-7;

/// Parameters for one hatching pass.
///
/// ## Rust Lesson #34: serde Defaults
///
/// `#[serde(default)]` on the struct fills any missing field from
/// `Default::default()`, so a config file only has to mention the values it
/// changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HatchingParams {
    /// Spacing between lines along the corridor axis, meters
    pub step: f64,
    /// Direction the lines run, degrees clockwise from north
    pub bearing: f64,
    /// How far each line end is moved inward from the boundary, meters
    pub offset: f64,
    /// How paired segments are tested against the polygon
    pub containment: ContainmentModel,
}

impl Default for HatchingParams {
    fn default() -> Self {
        Self {
            step: 100.0,
            bearing: 0.0,
            offset: 50.0,
            containment: ContainmentModel::Planar,
        }
    }
}

impl HatchingParams {
    /// Apply a polygon's per-feature overrides on top of these parameters.
    pub fn for_polygon(&self, polygon: &GeoPolygon) -> HatchingParams {
        HatchingParams {
            step: polygon.step.unwrap_or(self.step),
            bearing: polygon.bearing.unwrap_or(self.bearing),
            offset: polygon.offset.unwrap_or(self.offset),
            containment: self.containment,
        }
    }

    /// Same parameters rotated a quarter turn.
    pub fn perpendicular(&self) -> HatchingParams {
        HatchingParams {
            bearing: normalize(self.bearing + 90.0),
            ..*self
        }
    }
}

/// Counters describing one hatching pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HatchStats {
    /// Chords swept across the corridor
    pub chords: usize,
    /// Distinct chord/edge intersection points
    pub intersections: usize,
    /// Hatch lines emitted
    pub lines: usize,
    /// Chords with an end inside the polygon, too short to cross it
    pub open_chords: usize,
    /// The sweep hit the chord ceiling
    pub truncated: bool,
}

impl HatchStats {
    /// Add another pass's counters to these.
    pub fn merge(&mut self, other: &HatchStats) {
        self.chords += other.chords;
        self.intersections += other.intersections;
        self.lines += other.lines;
        self.open_chords += other.open_chords;
        self.truncated |= other.truncated;
    }
}

/// Hatch lines together with the counters that produced them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hatching {
    pub lines: Vec<HatchLine>,
    pub stats: HatchStats,
}

// ============================================================================
// HATCHING
// ============================================================================

/// Fill `polygon` with parallel geodesic hatch lines.
///
/// Lines come out in sweep order, and along each chord in order from its
/// forward end. A polygon with fewer than three vertices yields nothing.
pub fn hatch<G: Geodesy + ?Sized>(polygon: &GeoPolygon, params: &HatchingParams, geodesy: &G) -> Vec<HatchLine> {
    hatch_with_stats(polygon, params, geodesy).lines
}

/// [`hatch`], also reporting how much work the pass did.
pub fn hatch_with_stats<G: Geodesy + ?Sized>(
    polygon: &GeoPolygon,
    params: &HatchingParams,
    geodesy: &G,
) -> Hatching {
    if !polygon.is_valid() {
        log::warn!(
            "polygon {} has {} vertices; at least 3 are needed to hatch",
            polygon.id.as_deref().unwrap_or("<unnamed>"),
            polygon.len()
        );
        return Hatching::default();
    }

    let ring = &polygon.outer;
    let bearing = normalize(params.bearing);

    let Some(corridor) = project_corridor(ring, bearing, geodesy) else {
        return Hatching::default();
    };

    let mut sweep = ChordSweep::new(&corridor, bearing, params.step, params.offset, geodesy);
    let mut stats = HatchStats::default();
    let mut lines = Vec::new();

    for chord in sweep.by_ref() {
        stats.chords += 1;

        if params.containment.contains(&chord.start, ring, geodesy)
            || params.containment.contains(&chord.end, ring, geodesy)
        {
            stats.open_chords += 1;
        }

        let points = chord_intersections(&chord, polygon, geodesy);
        stats.intersections += points.len();
        if points.len() < 2 {
            continue;
        }

        // Pair up entry/exit points; an odd trailing point is dropped.
        for pair in points.chunks_exact(2) {
            let (entry, exit) = (&pair[0], &pair[1]);
            let midpoint = entry.planar_midpoint(exit);
            if !params.containment.contains(&midpoint, ring, geodesy) {
                continue;
            }
            lines.push(inset(entry, exit, bearing, params.offset, geodesy));
        }
    }

    stats.truncated = sweep.is_truncated();
    stats.lines = lines.len();

    if stats.open_chords > 0 {
        log::warn!(
            "{}: {} of {} chords end inside the polygon; lines along them are missing",
            polygon.id.as_deref().unwrap_or("polygon"),
            stats.open_chords,
            stats.chords
        );
    }

    log::debug!(
        "hatched {}: {} chords over {:.0} m, {} intersections, {} lines{}",
        polygon.id.as_deref().unwrap_or("polygon"),
        stats.chords,
        corridor.width(),
        stats.intersections,
        stats.lines,
        if stats.truncated { " (truncated)" } else { "" }
    );

    Hatching { lines, stats }
}

/// Two hatching passes: at `params.bearing` and a quarter turn from it.
///
/// The first pass's lines come first.
pub fn crosshatch<G: Geodesy + ?Sized>(polygon: &GeoPolygon, params: &HatchingParams, geodesy: &G) -> Hatching {
    let mut first = hatch_with_stats(polygon, params, geodesy);
    let second = hatch_with_stats(polygon, &params.perpendicular(), geodesy);
    first.lines.extend(second.lines);
    first.stats.merge(&second.stats);
    first
}

/// Every distinct point where `chord` meets the polygon's edges, ordered from the chord's start.
///
/// Points are ordered by straight-line (ECEF) distance from the chord start,
/// which stays monotone along the chord anywhere on the globe, including
/// across the antimeridian and near the poles.
pub fn chord_intersections<G: Geodesy + ?Sized>(chord: &Chord, polygon: &GeoPolygon, geodesy: &G) -> Vec<GeoPoint> {
    let mut points = Vec::new();

    for (edge_start, edge_end) in polygon.edges() {
        for point in intersect_arcs(&chord.start, &chord.end, edge_start, edge_end, geodesy) {
            push_unique(&mut points, point, DEDUP_TOLERANCE);
        }
    }

    let origin = geodesy.geodetic_to_cartesian(&chord.start);
    let mut keyed: Vec<(f64, GeoPoint)> = points
        .into_iter()
        .map(|p| (squared_distance(&origin, &geodesy.geodetic_to_cartesian(&p)), p))
        .collect();
    // Stable, so ties keep discovery order
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    keyed.into_iter().map(|(_, p)| p).collect()
}

#[inline]
fn squared_distance(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    (a - b).norm_squared()
}

/// Move both ends of a kept segment `offset` meters inward along the chord.
///
/// `entry` is the end nearer the chord's forward tip, so it moves backwards
/// and `exit` moves forwards. A negative offset extends the line instead.
fn inset<G: Geodesy + ?Sized>(entry: &GeoPoint, exit: &GeoPoint, bearing: f64, offset: f64, geodesy: &G) -> HatchLine {
    let start = geodesy.direct(entry, reverse_bearing(bearing), offset).point;
    let end = geodesy.direct(exit, bearing, offset).point;
    HatchLine::new(start.flatten(), end.flatten())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::Ellipsoid;
    use crate::geometry::BoundingBox;
    use approx::assert_relative_eq;

    const WGS84: Ellipsoid = Ellipsoid::WGS84;

    fn unit_square() -> GeoPolygon {
        GeoPolygon::from_lon_lat(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)])
    }

    fn u_shape() -> GeoPolygon {
        // Opening north; the notch spans lon 1..2 above lat 1
        GeoPolygon::from_lon_lat(&[
            (0.0, 0.0),
            (3.0, 0.0),
            (3.0, 3.0),
            (2.0, 3.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 3.0),
            (0.0, 3.0),
        ])
    }

    fn params(step: f64, bearing: f64, offset: f64) -> HatchingParams {
        HatchingParams { step, bearing, offset, ..Default::default() }
    }

    fn all_inside(lines: &[HatchLine], bbox: &BoundingBox) -> bool {
        lines
            .iter()
            .all(|l| bbox.contains(&l.start) && bbox.contains(&l.end))
    }

    #[test]
    fn square_hatch_stays_inside() {
        let lines = hatch(&unit_square(), &params(1000.0, 0.0, 50.0), &WGS84);
        assert_eq!(lines.len(), 111);

        let bbox = unit_square().bounding_box().unwrap();
        assert!(all_inside(&lines, &bbox));
    }

    #[test]
    fn line_count_grows_as_step_shrinks() {
        let square = unit_square();
        let counts: Vec<usize> = [2000.0, 1000.0, 500.0]
            .iter()
            .map(|&step| hatch(&square, &params(step, 0.0, 50.0), &WGS84).len())
            .collect();
        assert_eq!(counts, vec![55, 111, 222]);
    }

    #[test]
    fn lines_run_along_the_bearing_and_are_inset() {
        let lines = hatch(&unit_square(), &params(1000.0, 0.0, 50.0), &WGS84);
        let middle = &lines[55];

        // Forward (north) end first
        assert!(middle.start.lat > middle.end.lat);
        assert_relative_eq!(middle.start.lon, middle.end.lon, epsilon = 1e-9);
        assert_relative_eq!(middle.bearing(&WGS84).unwrap(), 180.0, epsilon = 1e-6);

        // One meridian degree, minus 50 m at each end, plus the top edge's bulge
        let length = middle.length(&WGS84);
        assert!(length > 110_474.0 && length < 110_490.0, "length {length}");
        assert_relative_eq!(middle.end.lat, 0.000_452_184_7, epsilon = 1e-9);
    }

    #[test]
    fn zero_offset_reaches_the_boundary() {
        let lines = hatch(&unit_square(), &params(1000.0, 0.0, 0.0), &WGS84);
        let bbox = unit_square().bounding_box().unwrap().expand(1e-4);
        assert!(all_inside(&lines, &bbox));
        assert!(lines.iter().all(|l| l.end.lat.abs() < 1e-9));
    }

    #[test]
    fn oblique_bearing_stays_inside() {
        let lines = hatch(&unit_square(), &params(1000.0, 37.0, 50.0), &WGS84);
        assert!(lines.len() > 100);
        let bbox = unit_square().bounding_box().unwrap();
        assert!(all_inside(&lines, &bbox));
    }

    #[test]
    fn fewer_than_three_vertices_gives_nothing() {
        let p = params(100.0, 0.0, 50.0);
        for coords in [vec![], vec![(0.0, 0.0)], vec![(0.0, 0.0), (1.0, 1.0)]] {
            let hatching = hatch_with_stats(&GeoPolygon::from_lon_lat(&coords), &p, &WGS84);
            assert!(hatching.lines.is_empty());
            assert_eq!(hatching.stats, HatchStats::default());
        }
    }

    #[test]
    fn hatching_is_deterministic() {
        let square = unit_square();
        let p = params(2000.0, 20.0, 50.0);
        assert_eq!(hatch(&square, &p, &WGS84), hatch(&square, &p, &WGS84));
    }

    #[test]
    fn concave_notch_is_skipped() {
        let u = u_shape();
        let lines = hatch(&u, &params(10_000.0, 90.0, 50.0), &WGS84);
        let mids: Vec<GeoPoint> = lines.iter().map(|l| l.start.planar_midpoint(&l.end)).collect();

        let in_notch = mids
            .iter()
            .filter(|m| m.lon > 1.01 && m.lon < 1.99 && m.lat > 1.01)
            .count();
        let west_arm = mids.iter().filter(|m| m.lon < 1.0 && m.lat > 1.05).count();
        let east_arm = mids.iter().filter(|m| m.lon > 2.0 && m.lat > 1.05).count();

        assert_eq!(in_notch, 0);
        assert!(west_arm >= 15, "west arm {west_arm}");
        assert!(east_arm >= 15, "east arm {east_arm}");
    }

    #[test]
    fn geodesic_containment_matches_planar_on_small_polygons() {
        let u = u_shape();
        let planar = params(20_000.0, 90.0, 50.0);
        let geodesic = HatchingParams {
            containment: ContainmentModel::Geodesic,
            ..planar
        };
        assert_eq!(hatch(&u, &planar, &WGS84), hatch(&u, &geodesic, &WGS84));
    }

    #[test]
    fn stats_count_the_work() {
        let hatching = hatch_with_stats(&unit_square(), &params(1000.0, 0.0, 50.0), &WGS84);
        // -50 m, 950 m, ... up to the last position inside the 50 m margin
        assert_eq!(hatching.stats.chords, 112);
        assert_eq!(hatching.stats.lines, hatching.lines.len());
        assert_eq!(hatching.stats.intersections, 2 * hatching.lines.len());
        assert_eq!(hatching.stats.open_chords, 0);
        assert!(!hatching.stats.truncated);
    }

    #[test]
    fn tiny_step_is_truncated() {
        let hatching = hatch_with_stats(&unit_square(), &params(1.0, 0.0, 50.0), &WGS84);
        assert!(hatching.stats.truncated);
        assert_eq!(hatching.stats.chords, crate::span::MAX_CHORDS);
    }

    #[test]
    fn crosshatch_adds_perpendicular_pass() {
        let square = unit_square();
        let p = params(2000.0, 0.0, 50.0);
        let first = hatch(&square, &p, &WGS84);
        let second = hatch(&square, &p.perpendicular(), &WGS84);
        let cross = crosshatch(&square, &p, &WGS84);

        assert_eq!(cross.lines.len(), first.len() + second.len());
        assert_eq!(&cross.lines[..first.len()], first.as_slice());
        assert_eq!(cross.stats.lines, cross.lines.len());
    }

    #[test]
    fn per_polygon_overrides() {
        let mut square = unit_square();
        square.step = Some(2000.0);
        square.bearing = Some(450.0);
        let p = HatchingParams::default().for_polygon(&square);
        assert_eq!(p.step, 2000.0);
        assert_eq!(p.bearing, 450.0);
        assert_eq!(p.offset, 50.0);
        // Bearings fold before use
        assert_eq!(hatch(&square, &p, &WGS84), hatch(&square, &params(2000.0, 90.0, 50.0), &WGS84));
    }

    #[test]
    fn chord_points_are_sorted_from_the_start() {
        let chord = Chord::new(GeoPoint::new(1.5, 10.0), GeoPoint::new(1.5, -10.0));
        let points = chord_intersections(&chord, &u_shape(), &WGS84);
        // Crosses only the notch floor and the bottom edge
        assert_eq!(points.len(), 2);
        assert!(points[0].lat > points[1].lat);
        assert_relative_eq!(points[1].lat, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn continental_squares_are_hatched() {
        for side in [10.0, 20.0, 25.0, 30.0] {
            let square = GeoPolygon::from_lon_lat(&[(0.0, 0.0), (side, 0.0), (side, side), (0.0, side)]);
            let hatching = hatch_with_stats(&square, &params(50_000.0, 0.0, 50.0), &WGS84);
            // Roughly one line per 50 km of the southern edge
            let expected = (side * 111.3 / 50.0) as usize;
            assert!(
                hatching.lines.len() + 2 >= expected && hatching.lines.len() <= expected + 2,
                "side {side}: {} lines, expected ~{expected}",
                hatching.lines.len()
            );
            assert_eq!(hatching.stats.intersections, 2 * hatching.lines.len(), "side {side}");
            assert_eq!(hatching.stats.open_chords, 0, "side {side}");
        }
    }

    #[test]
    fn chords_ending_inside_are_counted() {
        // 120 degrees of latitude: longer than a capped chord can cross
        let band = GeoPolygon::from_lon_lat(&[(0.0, -60.0), (40.0, -60.0), (40.0, 60.0), (0.0, 60.0)]);
        let hatching = hatch_with_stats(&band, &params(100_000.0, 0.0, 50.0), &WGS84);
        assert!(hatching.lines.is_empty());
        assert!(hatching.stats.open_chords > 0);
        assert!(hatching.stats.open_chords <= hatching.stats.chords);
    }

    #[test]
    fn large_ring_starting_mid_edge() {
        let ring = GeoPolygon::from_lon_lat(&[(10.0, 0.0), (20.0, 0.0), (20.0, 25.0), (0.0, 25.0), (0.0, 0.0)]);
        assert!(hatch(&ring, &params(50_000.0, 0.0, 50.0), &WGS84).len() > 40);
        assert!(hatch(&ring, &params(50_000.0, 60.0, 50.0), &WGS84).len() > 60);
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let p: HatchingParams = serde_json::from_str(r#"{"step": 250, "containment": "geodesic"}"#).unwrap();
        assert_eq!(p.step, 250.0);
        assert_eq!(p.offset, 50.0);
        assert_eq!(p.containment, ContainmentModel::Geodesic);
    }
}
