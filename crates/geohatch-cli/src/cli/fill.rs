//! Fill command implementation.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use geohatch::io::{feature_collection, lines_to_features};
use geohatch::{HatchLine, HatchStats, HatchingParams};

use super::common::{HatchArgs, HatchedPolygon, OutputFormat, hatch_all, lines_to_svg, load_polygons, write_output};

#[derive(Debug, Args)]
pub struct FillArgs {
    /// GeoJSON input file ('-' for stdin)
    pub input: PathBuf,

    #[command(flatten)]
    pub hatch: HatchArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Geojson)]
    pub format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// A polygon's lines in JSON output.
#[derive(Serialize)]
struct JsonShape<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    index: usize,
    params: &'a HatchingParams,
    stats: &'a HatchStats,
    lines: &'a [HatchLine],
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    shapes: Vec<JsonShape<'a>>,
}

/// Execute the fill command.
pub fn cmd_fill(args: &FillArgs) -> Result<()> {
    let config = args.hatch.resolve()?;
    let ellipsoid = config.ellipsoid.resolve()?;
    let polygons = load_polygons(&args.input)?;

    let start = Instant::now();
    let hatched = hatch_all(polygons, &config, &ellipsoid);
    report(&hatched, start);

    let output = match args.format {
        OutputFormat::Geojson => {
            let features = hatched
                .iter()
                .flat_map(|h| lines_to_features(&h.lines, h.polygon.id.as_deref()))
                .collect();
            feature_collection(features).to_string()
        }
        OutputFormat::Json => {
            let shapes = hatched
                .iter()
                .enumerate()
                .map(|(index, h)| JsonShape {
                    id: h.polygon.id.as_deref(),
                    index,
                    params: &h.params,
                    stats: &h.stats,
                    lines: &h.lines,
                })
                .collect();
            serde_json::to_string_pretty(&JsonOutput { shapes })?
        }
        OutputFormat::Svg => lines_to_svg(&hatched, &config.preview, config.preview.width, config.preview.height),
    };

    write_output(&output, args.out.as_deref())
}

fn report(hatched: &[HatchedPolygon], start: Instant) {
    let mut total = HatchStats::default();
    for item in hatched {
        total.merge(&item.stats);
        if item.stats.truncated {
            log::warn!(
                "{}: sweep truncated; raise --step to cover the whole polygon",
                item.polygon.id.as_deref().unwrap_or("polygon")
            );
        }
    }
    log::info!(
        "generated {} lines from {} chords in {} polygon(s) in {:?}",
        total.lines,
        total.chords,
        hatched.len(),
        start.elapsed()
    );
}
