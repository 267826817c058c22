//! # geohatch
//!
//! Parallel geodesic hatching of polygons on an ellipsoid.
//!
//! Give it a polygon in (lon, lat) degrees, a line spacing in meters and a
//! bearing, and it returns hatch lines that follow true geodesics, clipped
//! to the polygon and pulled in from its boundary.
//!
//! ```no_run
//! use geohatch::{Ellipsoid, GeoPolygon, HatchingParams, hatch};
//!
//! let field = GeoPolygon::from_lon_lat(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
//! let params = HatchingParams { step: 500.0, bearing: 30.0, ..Default::default() };
//! let lines = hatch(&field, &params, &Ellipsoid::WGS84);
//! ```
//!
//! Pipeline: [`corridor`] measures the polygon across the hatch direction,
//! [`span`] sweeps candidate chords over it, [`intersect`] cuts each chord
//! against the polygon's edges and [`hatch`] pairs, filters and insets the
//! pieces.

pub mod angle;
pub mod arc;
pub mod clip;
pub mod corridor;
pub mod error;
pub mod geodesy;
pub mod geometry;
pub mod hatch;
pub mod intersect;
pub mod io;
pub mod span;

#[cfg(test)]
mod testing;

// Re-export common types at crate root for convenience.
pub use angle::{Side, normalize, perpendicular_bearing};
pub use clip::{ContainmentModel, point_in_geodesic_polygon, point_in_polygon};
pub use corridor::{Corridor, project_corridor};
pub use error::{Error, Result};
pub use geodesy::{Ellipsoid, EllipsoidRadii, Geodesy};
pub use geometry::{BoundingBox, Chord, GeoPoint, GeoPolygon, HatchLine};
pub use hatch::{HatchStats, Hatching, HatchingParams, crosshatch, hatch, hatch_with_stats};
pub use intersect::intersect_arcs;
pub use io::{lines_to_geojson, polygons_from_geojson};
pub use span::{ChordSweep, MAX_CHORDS};
