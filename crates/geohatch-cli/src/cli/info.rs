//! Info command: summarise the polygons in a GeoJSON document.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use geohatch::{Ellipsoid, GeoPolygon, Geodesy, HatchingParams, MAX_CHORDS, project_corridor};

use super::common::{HatchArgs, load_polygons};

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// GeoJSON input file ('-' for stdin)
    pub input: PathBuf,

    #[command(flatten)]
    pub hatch: HatchArgs,
}

/// Execute the info command.
pub fn cmd_info(args: &InfoArgs) -> Result<()> {
    let config = args.hatch.resolve()?;
    let ellipsoid = config.ellipsoid.resolve()?;
    let polygons = load_polygons(&args.input)?;

    println!(
        "{} polygon(s), ellipsoid a={} m b={:.4} m",
        polygons.len(),
        ellipsoid.equatorial_radius(),
        ellipsoid.polar_radius()
    );
    for (index, polygon) in polygons.iter().enumerate() {
        let params = config.hatch.for_polygon(polygon);
        println!("{}", describe(index, polygon, &params, &ellipsoid));
    }
    Ok(())
}

/// One summary line for a polygon.
fn describe(index: usize, polygon: &GeoPolygon, params: &HatchingParams, ellipsoid: &Ellipsoid) -> String {
    let name = polygon
        .id
        .clone()
        .unwrap_or_else(|| format!("polygon-{index}"));

    let Some(bbox) = polygon.bounding_box() else {
        return format!("{name}: empty");
    };

    let perimeter: f64 = polygon
        .edges()
        .filter_map(|(a, b)| ellipsoid.inverse(a, b))
        .map(|inv| inv.distance)
        .sum();

    let winding = if polygon.is_clockwise() { "cw" } else { "ccw" };
    let mut line = format!(
        "{name}: {} vertices ({winding}), lon {:.6}..{:.6}, lat {:.6}..{:.6}, perimeter {:.1} m",
        polygon.len(),
        bbox.min_lon,
        bbox.max_lon,
        bbox.min_lat,
        bbox.max_lat,
        perimeter
    );

    if !polygon.is_valid() {
        line.push_str(", too few vertices to hatch");
        return line;
    }

    if let Some(corridor) = project_corridor(&polygon.outer, params.bearing, ellipsoid) {
        let span = corridor.width() + 2.0 * params.offset;
        let chords = if span < 0.0 {
            0
        } else if params.step > 0.0 {
            (span / params.step).floor() as usize + 1
        } else {
            1
        };
        line.push_str(&format!(
            ", corridor {:.1} m at bearing {}, ~{} chords at step {} m",
            corridor.width(),
            params.bearing,
            chords,
            params.step
        ));
        if chords > MAX_CHORDS {
            line.push_str(&format!(" (exceeds the {MAX_CHORDS} chord ceiling)"));
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_a_square() {
        let square = GeoPolygon::with_id(
            GeoPolygon::from_lon_lat(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]).outer,
            Some("sq".to_string()),
        );
        let params = HatchingParams { step: 1000.0, ..Default::default() };
        let text = describe(0, &square, &params, &Ellipsoid::WGS84);
        assert!(text.starts_with("sq: 4 vertices (ccw)"), "{text}");
        assert!(text.contains("corridor 111319.5 m"), "{text}");
        assert!(text.contains("~112 chords"), "{text}");
        assert!(!text.contains("ceiling"));
    }

    #[test]
    fn flags_oversized_sweeps() {
        let square = GeoPolygon::from_lon_lat(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        let params = HatchingParams { step: 10.0, ..Default::default() };
        assert!(describe(3, &square, &params, &Ellipsoid::WGS84).contains("ceiling"));
    }

    #[test]
    fn negative_offset_past_the_width_has_no_chords() {
        let square = GeoPolygon::from_lon_lat(&[(0.0, 0.0), (0.001, 0.0), (0.001, 0.001), (0.0, 0.001)]);
        // ~111 m wide; the sweep range shrinks by 100 m at each side
        let params = HatchingParams { step: 10.0, offset: -100.0, ..Default::default() };
        let text = describe(0, &square, &params, &Ellipsoid::WGS84);
        assert!(text.contains("~0 chords"), "{text}");
    }

    #[test]
    fn degenerate_polygon() {
        let line = GeoPolygon::from_lon_lat(&[(0.0, 0.0), (1.0, 0.0)]);
        let text = describe(1, &line, &HatchingParams::default(), &Ellipsoid::WGS84);
        assert!(text.starts_with("polygon-1: 2 vertices"));
        assert!(text.ends_with("too few vertices to hatch"));
    }
}
