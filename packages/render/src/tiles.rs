//! Raster tile providers for map backgrounds.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A slippy-map tile template.
///
/// `url` contains `{x}`, `{y}` and `{z}` placeholders. Providers that do
/// not put the tile origin at the standard Web Mercator corner set
/// `y_origin_offset` to the `y` (in metres) of their origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSource {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_origin_offset: Option<f64>,
    #[serde(default)]
    pub attribution: String,
}

/// Built-in tile providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TileProvider {
    #[default]
    LightCarto,
    DarkCarto,
    /// Yandex tiles are offset to the north of the standard origin.
    Yandex,
}

const CARTO_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors &copy; CARTO";

impl TileProvider {
    pub const ALL: &[Self] = &[Self::LightCarto, Self::DarkCarto, Self::Yandex];

    /// Tile template for this provider.
    #[must_use]
    pub fn source(self) -> TileSource {
        match self {
            Self::LightCarto => TileSource {
                name: self.to_string(),
                url: "http://tiles.basemaps.cartocdn.com/light_all/{z}/{x}/{y}@2x.png".to_owned(),
                y_origin_offset: None,
                attribution: CARTO_ATTRIBUTION.to_owned(),
            },
            Self::DarkCarto => TileSource {
                name: self.to_string(),
                url: "http://tiles.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}@2x.png".to_owned(),
                y_origin_offset: None,
                attribution: CARTO_ATTRIBUTION.to_owned(),
            },
            Self::Yandex => TileSource {
                name: self.to_string(),
                url: "https://vec02.maps.yandex.net/tiles?l=map&x={x}&y={y}&z={z}&scale=2"
                    .to_owned(),
                y_origin_offset: Some(20_002_108.34),
                attribution: "&copy; Yandex".to_owned(),
            },
        }
    }
}
