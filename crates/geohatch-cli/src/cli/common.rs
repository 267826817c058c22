//! Common utilities shared across CLI commands.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};

use geohatch::{
    BoundingBox, ContainmentModel, Ellipsoid, GeoPolygon, HatchLine, HatchStats, HatchingParams, crosshatch,
    hatch_with_stats, polygons_from_geojson,
};

use super::config::{EllipsoidSetting, HatchConfig, PreviewStyle};

/// Output format for generated lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// FeatureCollection of LineStrings
    Geojson,
    /// Per-polygon line lists with stats
    Json,
    /// Equirectangular preview
    Svg,
}

/// Hatching options shared by `fill` and `render`.
#[derive(Debug, Clone, Args)]
pub struct HatchArgs {
    /// Line spacing in meters
    #[arg(short, long)]
    pub step: Option<f64>,

    /// Line direction, degrees clockwise from north
    #[arg(short, long, allow_hyphen_values = true)]
    pub bearing: Option<f64>,

    /// Inset from the polygon boundary in meters
    #[arg(short, long, allow_hyphen_values = true)]
    pub offset: Option<f64>,

    /// Add a second pass a quarter turn from the bearing
    #[arg(long)]
    pub crosshatch: bool,

    /// Containment test for paired segments (planar or geodesic)
    #[arg(long, value_parser = parse_containment)]
    pub containment: Option<ContainmentModel>,

    /// Ellipsoid name (wgs84, grs80)
    #[arg(long)]
    pub ellipsoid: Option<String>,

    /// YAML config file; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

fn parse_containment(name: &str) -> std::result::Result<ContainmentModel, String> {
    ContainmentModel::from_name(name).ok_or_else(|| format!("unknown containment model '{name}' (use planar or geodesic)"))
}

impl HatchArgs {
    /// Config file values with command-line flags layered on top.
    pub fn resolve(&self) -> Result<HatchConfig> {
        let mut config = HatchConfig::load_or_default(self.config.as_deref())?;

        if let Some(step) = self.step {
            config.hatch.step = step;
        }
        if let Some(bearing) = self.bearing {
            config.hatch.bearing = bearing;
        }
        if let Some(offset) = self.offset {
            config.hatch.offset = offset;
        }
        if let Some(containment) = self.containment {
            config.hatch.containment = containment;
        }
        if let Some(name) = &self.ellipsoid {
            config.ellipsoid = EllipsoidSetting::Named(name.clone());
        }
        config.crosshatch |= self.crosshatch;

        if !config.hatch.step.is_finite() {
            bail!("step must be a finite number of meters");
        }
        Ok(config)
    }
}

/// Read a GeoJSON document from a file, or stdin for `-`.
pub fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        log::info!("reading GeoJSON from stdin");
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read from stdin")?;
        return Ok(buffer);
    }

    log::info!("loading {}", path.display());
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Read and parse every polygon in the input.
pub fn load_polygons(path: &Path) -> Result<Vec<GeoPolygon>> {
    let source = read_input(path)?;
    polygons_from_geojson(&source).with_context(|| format!("failed to load polygons from {}", path.display()))
}

/// One input polygon and the lines hatched into it.
pub struct HatchedPolygon {
    pub polygon: GeoPolygon,
    pub params: HatchingParams,
    pub lines: Vec<HatchLine>,
    pub stats: HatchStats,
}

/// Hatch every polygon with its per-feature overrides applied.
pub fn hatch_all(polygons: Vec<GeoPolygon>, config: &HatchConfig, ellipsoid: &Ellipsoid) -> Vec<HatchedPolygon> {
    polygons
        .into_iter()
        .map(|polygon| {
            let params = config.hatch.for_polygon(&polygon);
            let hatching = if config.crosshatch {
                crosshatch(&polygon, &params, ellipsoid)
            } else {
                hatch_with_stats(&polygon, &params, ellipsoid)
            };
            HatchedPolygon {
                polygon,
                params,
                lines: hatching.lines,
                stats: hatching.stats,
            }
        })
        .collect()
}

/// Write to a file, or stdout when no path (or `-`) is given.
pub fn write_output(output: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            fs::write(path, output).with_context(|| format!("failed to write {}", path.display()))?;
            log::info!("wrote {}", path.display());
        }
        _ => println!("{output}"),
    }
    Ok(())
}

// ============================================================================
// SVG PREVIEW
// ============================================================================

/// Bounds of every polygon and line, or `None` when there is nothing to draw.
pub fn scene_bounds(hatched: &[HatchedPolygon]) -> Option<BoundingBox> {
    let polygon_boxes = hatched.iter().filter_map(|h| h.polygon.bounding_box());
    let line_boxes = hatched.iter().flat_map(|h| &h.lines).map(|line| BoundingBox {
        min_lon: line.start.lon.min(line.end.lon),
        min_lat: line.start.lat.min(line.end.lat),
        max_lon: line.start.lon.max(line.end.lon),
        max_lat: line.start.lat.max(line.end.lat),
    });
    polygon_boxes.chain(line_boxes).reduce(|a, b| a.union(&b))
}

/// Render polygons and their hatch lines as an SVG document.
///
/// Equirectangular projection: x is longitude, y is negated latitude, and
/// longitude is stretched by `cos(center latitude)` so shapes keep roughly
/// their ground proportions.
pub fn lines_to_svg(hatched: &[HatchedPolygon], style: &PreviewStyle, width: u32, height: u32) -> String {
    let bounds = scene_bounds(hatched).unwrap_or(BoundingBox {
        min_lon: 0.0,
        min_lat: 0.0,
        max_lon: 1.0,
        max_lat: 1.0,
    });

    let aspect = bounds.center().lat.to_radians().cos().max(0.01);
    let padding = 20.0;
    let span_x = (bounds.width() * aspect).max(1e-9);
    let span_y = bounds.height().max(1e-9);
    let scale = ((width as f64 - 2.0 * padding) / span_x).min((height as f64 - 2.0 * padding) / span_y);

    let offset_x = (width as f64 - span_x * scale) / 2.0;
    let offset_y = (height as f64 - span_y * scale) / 2.0;
    let project = |lon: f64, lat: f64| {
        (
            offset_x + (lon - bounds.min_lon) * aspect * scale,
            offset_y + (bounds.max_lat - lat) * scale,
        )
    };

    let mut svg = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">
<rect width="100%" height="100%" fill="white"/>
"#
    );

    for (index, item) in hatched.iter().enumerate() {
        let id = item.polygon.id.clone().unwrap_or_else(|| format!("polygon-{index}"));
        let outline = item.polygon.stroke_color.as_deref().unwrap_or(&style.outline);

        svg.push_str(&format!(r#"<g id="{}">"#, escape_attr(&id)));
        svg.push('\n');

        if item.polygon.len() >= 2 {
            let points: String = item
                .polygon
                .outer
                .iter()
                .map(|p| {
                    let (x, y) = project(p.lon, p.lat);
                    format!("{x:.2},{y:.2}")
                })
                .collect::<Vec<_>>()
                .join(" ");
            svg.push_str(&format!(
                "  <polygon points=\"{}\" stroke=\"{}\" stroke-width=\"{}\" fill=\"none\"/>\n",
                points,
                escape_attr(outline),
                style.stroke_width
            ));
        }

        svg.push_str(&format!(
            "  <g stroke=\"{}\" stroke-width=\"{}\" stroke-linecap=\"round\" fill=\"none\">\n",
            escape_attr(&style.stroke),
            style.stroke_width
        ));
        for line in &item.lines {
            let (x1, y1) = project(line.start.lon, line.start.lat);
            let (x2, y2) = project(line.end.lon, line.end.lat);
            svg.push_str(&format!(
                "    <line x1=\"{x1:.2}\" y1=\"{y1:.2}\" x2=\"{x2:.2}\" y2=\"{y2:.2}\"/>\n"
            ));
        }
        svg.push_str("  </g>\n</g>\n");
    }

    svg.push_str("</svg>\n");
    svg
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// ============================================================================
// TESTS
// ============================================================================
