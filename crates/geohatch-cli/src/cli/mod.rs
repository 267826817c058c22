//! CLI command implementations.
//!
//! This module contains the implementations for the CLI subcommands:
//! - `fill` - Hatch GeoJSON polygons and write GeoJSON, JSON or SVG
//! - `render` - Rasterise a hatch preview to PNG
//! - `info` - Summarise polygons and their hatch corridors

pub mod common;
pub mod config;
pub mod fill;
pub mod info;
pub mod render;

pub use fill::{FillArgs, cmd_fill};
pub use info::{InfoArgs, cmd_info};
pub use render::{RenderArgs, cmd_render};
