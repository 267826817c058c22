//! Render command: rasterise a hatch preview to PNG.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Args;
use resvg::usvg;
use tiny_skia::Pixmap;

use super::common::{HatchArgs, hatch_all, lines_to_svg, load_polygons};

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// GeoJSON input file ('-' for stdin)
    pub input: PathBuf,

    #[command(flatten)]
    pub hatch: HatchArgs,

    /// PNG file to write
    #[arg(long)]
    pub out: PathBuf,

    /// Image width in pixels (default: from config, else 1600)
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels (default: from config, else 1200)
    #[arg(long)]
    pub height: Option<u32>,
}

/// Execute the render command.
pub fn cmd_render(args: &RenderArgs) -> Result<()> {
    let config = args.hatch.resolve()?;
    let ellipsoid = config.ellipsoid.resolve()?;
    let polygons = load_polygons(&args.input)?;

    let width = args.width.unwrap_or(config.preview.width);
    let height = args.height.unwrap_or(config.preview.height);

    let hatched = hatch_all(polygons, &config, &ellipsoid);
    let svg = lines_to_svg(&hatched, &config.preview, width, height);

    svg_to_png(&svg, width, height, &args.out)?;
    log::info!("wrote {} ({width}x{height})", args.out.display());
    Ok(())
}

/// Rasterise an SVG document onto a white canvas and save it as PNG.
pub fn svg_to_png(svg: &str, width: u32, height: u32, path: &Path) -> Result<()> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &options).context("failed to parse generated SVG")?;

    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| anyhow!("cannot create a {width}x{height} pixmap"))?;
    pixmap.fill(tiny_skia::Color::WHITE);

    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    pixmap
        .save_png(path)
        .with_context(|| format!("failed to write {}", path.display()))
}
