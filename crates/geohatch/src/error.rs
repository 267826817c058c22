//! Error type for geohatch.
//!
//! Only the integration surface can fail: loading input documents and
//! constructing an ellipsoid. Geometric edge cases inside the hatching
//! engine never error - a degenerate edge or chord simply contributes
//! nothing to the result.

use thiserror::Error;

/// Errors raised by geohatch.
#[derive(Debug, Error)]
pub enum Error {
    /// Radii violate `equatorial > polar > 0`.
    #[error("invalid ellipsoid radii: equatorial {equatorial} m, polar {polar} m")]
    InvalidEllipsoid { equatorial: f64, polar: f64 },

    #[error("unknown ellipsoid name '{0}' (expected wgs84 or grs80)")]
    UnknownEllipsoid(String),

    #[error("GeoJSON parse error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed but held no Polygon or MultiPolygon geometry.
    #[error("no polygons found in input")]
    NoPolygons,
}

pub type Result<T> = std::result::Result<T, Error>;
