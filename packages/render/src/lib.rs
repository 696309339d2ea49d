#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Rendering for heatmaps and cell maps.
//!
//! * [`raster`] turns a [`crime_grid_heatmap::Heatmap`] into a PNG.
//! * [`figure`] describes tile-map viewports in Web Mercator and the layers
//!   drawn on them.
//! * [`html`] writes those figures into a self-contained Leaflet page.
//! * [`export`] writes per-cell values as `GeoJSON`.

pub mod colormap;
pub mod export;
pub mod figure;
pub mod html;
pub mod raster;
pub mod tiles;

use crime_grid_projection::InvalidPointError;
use thiserror::Error;

pub use colormap::Colormap;
pub use figure::{Figure, Layer, Tool, get_figure, get_map};
pub use html::{MapPage, shorten};
pub use raster::{RasterStyle, render_heatmap, save_png};
pub use tiles::{TileProvider, TileSource};

/// Errors that can occur while rendering or writing output.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Projection(#[from] InvalidPointError),
}
