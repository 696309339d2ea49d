//! Tile-map figures: a Web Mercator viewport plus the layers drawn on it.
//!
//! A [`Figure`] is a plain description. [`crate::html::MapPage`] turns one
//! or more of them into an interactive page.

use crime_grid_models::{BoundingBox, Point};
use crime_grid_projection::{InvalidPointError, to_mercator};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

use crate::tiles::TileSource;

/// Interactions enabled on a figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Tool {
    Pan,
    WheelZoom,
}

/// Something drawn on top of the tiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Layer {
    /// A raster stretched over a geographic box.
    Image {
        url: String,
        bounds: BoundingBox,
        opacity: f64,
    },
    /// Circle markers at geographic points.
    Scatter {
        points: Vec<Point>,
        radius: f64,
        color: String,
    },
    /// An inline GeoJSON document.
    #[serde(rename = "geojson")]
    GeoJson { data: serde_json::Value },
}

/// A map viewport with its layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub title: String,
    /// Pixels.
    pub width: u32,
    /// Pixels, derived from the Mercator aspect ratio of `bounds`.
    pub height: u32,
    /// Mercator `x` extent in metres.
    pub x_range: (f64, f64),
    /// Mercator `y` extent in metres.
    pub y_range: (f64, f64),
    /// Geographic extent of the viewport.
    pub bounds: BoundingBox,
    pub tools: Vec<Tool>,
    pub active_scroll: Tool,
    pub axis_visible: bool,
    pub tiles: Option<TileSource>,
    pub layers: Vec<Layer>,
}

/// A blank figure covering `bbox`, `width` pixels wide.
///
/// The height keeps the Mercator aspect ratio of the box. Pan and wheel zoom
/// are enabled with wheel zoom active, and axes are hidden.
///
/// # Errors
///
/// Returns [`InvalidPointError`] if a corner of `bbox` cannot be projected.
pub fn get_figure(bbox: &BoundingBox, width: u32) -> Result<Figure, InvalidPointError> {
    let lower_left = to_mercator(bbox.lower_left)?;
    let upper_right = to_mercator(bbox.upper_right)?;

    let x_range = (lower_left.longitude, upper_right.longitude);
    let y_range = (lower_left.latitude, upper_right.latitude);

    let span_x = x_range.1 - x_range.0;
    let span_y = y_range.1 - y_range.0;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let height = (f64::from(width) / span_x * span_y) as u32;

    Ok(Figure {
        title: String::new(),
        width,
        height,
        x_range,
        y_range,
        bounds: *bbox,
        tools: vec![Tool::Pan, Tool::WheelZoom],
        active_scroll: Tool::WheelZoom,
        axis_visible: false,
        tiles: None,
        layers: Vec::new(),
    })
}

/// [`get_figure`] with `tiles` as the background.
///
/// # Errors
///
/// See [`get_figure`].
pub fn get_map(bbox: &BoundingBox, tiles: TileSource, width: u32) -> Result<Figure, InvalidPointError> {
    let mut figure = get_figure(bbox, width)?;
    figure.add_tile(tiles);
    Ok(figure)
}

impl Figure {
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the background tiles, replacing any previous ones.
    pub fn add_tile(&mut self, tiles: TileSource) {
        self.tiles = Some(tiles);
    }

    pub fn add_image_overlay(&mut self, url: impl Into<String>, bounds: BoundingBox, opacity: f64) {
        self.layers.push(Layer::Image {
            url: url.into(),
            bounds,
            opacity: opacity.clamp(0.0, 1.0),
        });
    }

    pub fn add_scatter(&mut self, points: Vec<Point>, radius: f64, color: impl Into<String>) {
        self.layers.push(Layer::Scatter {
            points,
            radius,
            color: color.into(),
        });
    }

    pub fn add_geojson(&mut self, data: serde_json::Value) {
        self.layers.push(Layer::GeoJson { data });
    }
}

#[cfg(test)]
mod tests {
    use crime_grid_models::MOSCOW_BOX;

    use super::*;
    use crate::tiles::TileProvider;

    #[test]
    fn height_follows_mercator_aspect() {
        let figure = get_figure(&MOSCOW_BOX, 700).unwrap();

        let span_x = figure.x_range.1 - figure.x_range.0;
        let span_y = figure.y_range.1 - figure.y_range.0;
        let expected = 700.0 / span_x * span_y;

        assert_eq!(figure.width, 700);
        assert!((f64::from(figure.height) - expected).abs() < 1.0);
        assert!(figure.height > 0);
    }

    #[test]
    fn square_box_at_equator_is_square() {
        let bbox = BoundingBox::new(Point::new(-1.0, -1.0), Point::new(1.0, 1.0)).unwrap();
        let figure = get_figure(&bbox, 500).unwrap();
        assert!((i64::from(figure.height) - 500).abs() <= 1);
    }

    #[test]
    fn tools_and_axes() {
        let figure = get_figure(&MOSCOW_BOX, 700).unwrap();
        assert_eq!(figure.tools, vec![Tool::Pan, Tool::WheelZoom]);
        assert_eq!(figure.active_scroll, Tool::WheelZoom);
        assert!(!figure.axis_visible);
        assert!(figure.tiles.is_none());
    }

    #[test]
    fn pole_box_fails() {
        let bbox = BoundingBox::new(Point::new(80.0, 0.0), Point::new(90.0, 10.0)).unwrap();
        assert!(get_figure(&bbox, 700).is_err());
    }

    #[test]
    fn add_tile_replaces() {
        let mut figure = get_map(&MOSCOW_BOX, TileProvider::LightCarto.source(), 700).unwrap();
        figure.add_tile(TileProvider::Yandex.source());
        assert_eq!(figure.tiles, Some(TileProvider::Yandex.source()));
    }

    #[test]
    fn layers_serialize_with_type_tag() {
        let mut figure = get_figure(&MOSCOW_BOX, 700).unwrap();
        figure.add_scatter(vec![Point::new(55.7, 37.6)], 3.0, "red");
        figure.add_image_overlay("a.png", MOSCOW_BOX, 2.0);

        let json = serde_json::to_value(&figure.layers).unwrap();
        assert_eq!(json[0]["type"], "scatter");
        assert_eq!(json[1]["type"], "image");
        assert_eq!(json[1]["opacity"], 1.0);
    }
}
