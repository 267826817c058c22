//! YAML hatching configuration.
//!
//! A config file sets defaults for a run; command-line flags override it,
//! and per-feature GeoJSON properties override both.
//!
//! ```yaml
//! ellipsoid: grs80            # or { equatorial_radius: ..., polar_radius: ... }
//! hatch:
//!   step: 250                 # meters
//!   bearing: 30               # degrees clockwise from north
//!   offset: 20                # meters
//!   containment: geodesic     # or planar
//! crosshatch: true
//! preview:
//!   stroke: "#1f4e79"
//!   outline: "#999999"
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use geohatch::{Ellipsoid, HatchingParams};

/// Complete configuration for a hatching run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HatchConfig {
    pub ellipsoid: EllipsoidSetting,
    pub hatch: HatchingParams,
    pub crosshatch: bool,
    pub preview: PreviewStyle,
}

/// Ellipsoid by well-known name or by explicit radii.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EllipsoidSetting {
    Named(String),
    Custom(Ellipsoid),
}

impl Default for EllipsoidSetting {
    fn default() -> Self {
        EllipsoidSetting::Named("wgs84".to_string())
    }
}

impl EllipsoidSetting {
    pub fn resolve(&self) -> Result<Ellipsoid> {
        match self {
            EllipsoidSetting::Named(name) => Ok(Ellipsoid::named(name)?),
            EllipsoidSetting::Custom(ellipsoid) => Ok(*ellipsoid),
        }
    }
}

/// Colors and size for SVG/PNG previews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewStyle {
    /// Hatch line color
    pub stroke: String,
    /// Polygon outline color, unless the feature sets its own
    pub outline: String,
    /// Line width in output pixels
    pub stroke_width: f64,
    /// Raster width for `render`, pixels
    pub width: u32,
    /// Raster height for `render`, pixels
    pub height: u32,
}

impl Default for PreviewStyle {
    fn default() -> Self {
        Self {
            stroke: "black".to_string(),
            outline: "#cccccc".to_string(),
            stroke_width: 1.0,
            width: 1600,
            height: 1200,
        }
    }
}

impl HatchConfig {
    /// Load a config from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config YAML {}", path.display()))
    }

    /// Load `path` if given, otherwise start from defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                log::info!("loading config {}", path.display());
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use geohatch::ContainmentModel;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config: HatchConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, HatchConfig::default());
        assert_eq!(config.hatch.step, 100.0);
        assert_eq!(config.ellipsoid.resolve().unwrap(), Ellipsoid::WGS84);
    }

    #[test]
    fn partial_hatch_section() {
        let yaml = "hatch:\n  step: 250\n  containment: geodesic\ncrosshatch: true\n";
        let config: HatchConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.hatch.step, 250.0);
        assert_eq!(config.hatch.offset, 50.0);
        assert_eq!(config.hatch.containment, ContainmentModel::Geodesic);
        assert!(config.crosshatch);
    }

    #[test]
    fn ellipsoid_by_name() {
        let config: HatchConfig = serde_yaml::from_str("ellipsoid: GRS80").unwrap();
        assert_eq!(config.ellipsoid.resolve().unwrap(), Ellipsoid::GRS80);

        let config: HatchConfig = serde_yaml::from_str("ellipsoid: mars").unwrap();
        assert!(config.ellipsoid.resolve().is_err());
    }

    #[test]
    fn ellipsoid_by_radii() {
        let yaml = "ellipsoid:\n  equatorial_radius: 6378000\n  polar_radius: 6357000\n";
        let config: HatchConfig = serde_yaml::from_str(yaml).unwrap();
        let ellipsoid = config.ellipsoid.resolve().unwrap();
        assert_eq!(ellipsoid.equatorial_radius(), 6_378_000.0);
        assert_eq!(ellipsoid.polar_radius(), 6_357_000.0);
    }

    #[test]
    fn invalid_radii_are_rejected() {
        let yaml = "ellipsoid:\n  equatorial_radius: 100\n  polar_radius: 200\n";
        assert!(serde_yaml::from_str::<HatchConfig>(yaml).is_err());
    }

    #[test]
    fn load_reads_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hatch.yaml");
        fs::write(&path, "hatch:\n  bearing: 30\n").unwrap();
        let config = HatchConfig::load_or_default(Some(&path)).unwrap();
        assert_eq!(config.hatch.bearing, 30.0);

        assert!(HatchConfig::load(dir.path().join("missing.yaml")).is_err());
    }
}
