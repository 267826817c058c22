//! geohatch - geodesic hatch fills for GeoJSON polygons
//!
//! Usage:
//!   geohatch fill <input.geojson|-> [options]     Hatch polygons, write GeoJSON/JSON/SVG
//!   geohatch render <input.geojson> --out a.png   Rasterise a hatch preview
//!   geohatch info <input.geojson>                 Summarise polygons and corridors
//!
//! Logging goes to stderr: `-v` for info, `-vv` for debug, or set `RUST_LOG`.

mod cli;

use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

use cli::{FillArgs, InfoArgs, RenderArgs, cmd_fill, cmd_info, cmd_render};

#[derive(Parser)]
#[command(name = "geohatch")]
#[command(about = "Parallel geodesic hatching of polygons on an ellipsoid")]
#[command(version)]
struct Cli {
    /// More log output (repeat for more)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Hatch every polygon in a GeoJSON document
    Fill(FillArgs),
    /// Render polygons and hatch lines to a PNG preview
    Render(RenderArgs),
    /// Print per-polygon vertex and corridor summaries
    Info(InfoArgs),
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Command::Fill(args) => cmd_fill(args),
        Command::Render(args) => cmd_render(args),
        Command::Info(args) => cmd_info(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
