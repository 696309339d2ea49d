#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! TOML configuration for the crime grid toolchain.
//!
//! Every key is optional. Missing sections and fields fall back to the
//! values in `default.toml`, which mirror [`Config::default`]:
//!
//! ```toml
//! output_dir = "data/generated"
//!
//! [data]
//! summary = "data/summary.csv"
//! delimiter = ";"
//!
//! [map]
//! width = 700
//! tiles = "dark_carto"
//! bbox = [55.555959, 37.252433, 55.929357, 37.952812]
//!
//! [heatmap]
//! scale = "linear"
//! colormap = "viridis"
//! ```

use std::path::{Path, PathBuf};

use crime_grid_heatmap::Scale;
use crime_grid_models::{BoundingBox, MOSCOW_BOX};
use crime_grid_render::{Colormap, RasterStyle, TileProvider, TileSource};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The defaults as a TOML document.
pub const DEFAULT_TOML: &str = include_str!("../default.toml");

/// Crime-group chapters plotted when none are configured.
pub const DEFAULT_GROUPS: [&str; 4] = [
    "Глава 21. Преступления против собственности",
    "Глава 25. Преступления против здоровья населения и общественной нравственности",
    "Глава 32. Преступления против порядка управления",
    "Глава 16. Преступления против жизни и здоровья",
];

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where generated maps, rasters, and exports are written.
    pub output_dir: PathBuf,
    pub data: DataConfig,
    pub map: MapConfig,
    pub heatmap: HeatmapConfig,
}

/// Input files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    pub summary: PathBuf,
    pub narkota: PathBuf,
    /// Single ASCII character.
    pub delimiter: char,
}

/// Map viewport and background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    /// Figure width in pixels.
    pub width: u32,
    pub tiles: TileProvider,
    /// Overrides `tiles` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_tiles: Option<TileSource>,
    /// `[min_lat, min_lon, max_lat, max_lon]`.
    pub bbox: [f64; 4],
}

/// Heatmap construction and styling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeatmapConfig {
    pub scale: Scale,
    pub colormap: Colormap,
    pub cell_size: u32,
    pub transparent_zero: bool,
    /// Crime groups that get their own heatmap.
    pub groups: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("data/generated"),
            data: DataConfig::default(),
            map: MapConfig::default(),
            heatmap: HeatmapConfig::default(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            summary: PathBuf::from("data/summary.csv"),
            narkota: PathBuf::from("data/narkota.csv"),
            delimiter: ';',
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 700,
            tiles: TileProvider::default(),
            custom_tiles: None,
            bbox: MOSCOW_BOX.to_degrees(),
        }
    }
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        let style = RasterStyle::default();
        Self {
            scale: Scale::default(),
            colormap: style.colormap,
            cell_size: style.cell_size,
            transparent_zero: style.transparent_zero,
            groups: DEFAULT_GROUPS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Config {
    /// Loads and validates the file at `path`, or the defaults when `path`
    /// is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, is not valid
    /// TOML for this schema, or fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            log::debug!("No config file given, using defaults");
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] on parse failure and
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::de::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map.width == 0 {
            return Err(ConfigError::Invalid("map.width must be positive".to_owned()));
        }
        if self.heatmap.cell_size == 0 {
            return Err(ConfigError::Invalid(
                "heatmap.cell_size must be positive".to_owned(),
            ));
        }
        self.bbox()?;
        self.delimiter()?;
        Ok(())
    }

    /// The configured map region.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `map.bbox` is not a valid box.
    pub fn bbox(&self) -> Result<BoundingBox, ConfigError> {
        BoundingBox::from_degrees(self.map.bbox)
            .map_err(|e| ConfigError::Invalid(format!("map.bbox: {e}")))
    }

    /// The input delimiter as a byte.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `data.delimiter` is not ASCII.
    pub fn delimiter(&self) -> Result<u8, ConfigError> {
        u8::try_from(self.data.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "data.delimiter must be a single ASCII character, got '{}'",
                    self.data.delimiter
                ))
            })
    }

    /// Background tiles: `custom_tiles` if set, otherwise the provider's.
    #[must_use]
    pub fn tile_source(&self) -> TileSource {
        self.map
            .custom_tiles
            .clone()
            .unwrap_or_else(|| self.map.tiles.source())
    }

    #[must_use]
    pub const fn raster_style(&self) -> RasterStyle {
        RasterStyle {
            colormap: self.heatmap.colormap,
            cell_size: self.heatmap.cell_size,
            transparent_zero: self.heatmap.transparent_zero,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_toml_matches_default() {
        assert_eq!(Config::from_toml_str(DEFAULT_TOML).unwrap(), Config::default());
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [map]
            tiles = "yandex"

            [heatmap]
            scale = "linear"
            "#,
        )
        .unwrap();

        assert_eq!(config.map.tiles, TileProvider::Yandex);
        assert_eq!(config.map.width, 700);
        assert_eq!(config.heatmap.scale, Scale::Linear);
        assert_eq!(config.heatmap.colormap, Colormap::Inferno);
        assert_eq!(config.heatmap.groups.len(), 4);
        assert_eq!(config.tile_source().y_origin_offset, Some(20_002_108.34));
    }

    #[test]
    fn custom_tiles_override_provider() {
        let config = Config::from_toml_str(
            r#"
            [map.custom_tiles]
            name = "osm"
            url = "https://tile.openstreetmap.org/{z}/{x}/{y}.png"
            "#,
        )
        .unwrap();

        let tiles = config.tile_source();
        assert_eq!(tiles.name, "osm");
        assert!(tiles.y_origin_offset.is_none());
        assert!(tiles.attribution.is_empty());
    }

    #[test]
    fn rejects_invalid_values() {
        for text in [
            "[map]\nwidth = 0",
            "[heatmap]\ncell_size = 0",
            "[map]\nbbox = [56.0, 37.0, 55.0, 38.0]",
            "[map]\nbbox = [-91.0, 37.0, 55.0, 38.0]",
            "[data]\ndelimiter = \"ж\"",
        ] {
            assert!(
                matches!(Config::from_toml_str(text), Err(ConfigError::Invalid(_))),
                "{text}"
            );
        }
    }

    #[test]
    fn rejects_unknown_keys_and_bad_types() {
        assert!(matches!(
            Config::from_toml_str("colour = 1"),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[map]\ntiles = \"osm\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn delimiter_and_bbox_accessors() {
        let config = Config::default();
        assert_eq!(config.delimiter().unwrap(), b';');
        assert_eq!(config.bbox().unwrap(), MOSCOW_BOX);
        assert_eq!(config.raster_style(), RasterStyle::default());
    }

    #[test]
    fn loads_file_or_defaults() {
        assert_eq!(Config::load(None).unwrap(), Config::default());

        let tmp = std::env::temp_dir().join("crime_grid_config_test");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();

        let path = tmp.join("crime_grid.toml");
        std::fs::write(&path, "output_dir = \"out\"\n[data]\ndelimiter = \",\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.delimiter().unwrap(), b',');

        assert!(matches!(
            Config::load(Some(&tmp.join("missing.toml"))),
            Err(ConfigError::Io { .. })
        ));

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
