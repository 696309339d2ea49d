//! Heatmap to RGBA raster conversion.

use std::path::Path;

use crime_grid_heatmap::Heatmap;
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::{RenderError, colormap::Colormap};

/// How heatmap values become pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterStyle {
    pub colormap: Colormap,
    /// Pixel edge length of one grid cell.
    pub cell_size: u32,
    /// Leave zero-valued cells fully transparent so tiles show through.
    pub transparent_zero: bool,
}

impl Default for RasterStyle {
    fn default() -> Self {
        Self {
            colormap: Colormap::default(),
            cell_size: 4,
            transparent_zero: true,
        }
    }
}

/// Draws `heatmap` with row 0 at the top of the image.
///
/// Values are normalized by the heatmap maximum. A `cell_size` of zero is
/// treated as one.
#[must_use]
pub fn render_heatmap(heatmap: &Heatmap, style: &RasterStyle) -> RgbaImage {
    let cell = style.cell_size.max(1);
    let (rows, cols) = heatmap.shape();
    let to_px = |n: usize| u32::try_from(n).unwrap_or(u32::MAX).saturating_mul(cell);

    let mut image = RgbaImage::new(to_px(cols), to_px(rows));
    let max = heatmap.max();

    for (y, row) in heatmap.rows().enumerate() {
        for (x, &value) in row.iter().enumerate() {
            if style.transparent_zero && value <= 0.0 {
                continue;
            }
            let normalized = if max > 0.0 { value / max } else { 0.0 };
            let [r, g, b] = style.colormap.map(normalized);
            let pixel = Rgba([r, g, b, 255]);

            let (x0, y0) = (to_px(x), to_px(y));
            for dy in 0..cell {
                for dx in 0..cell {
                    image.put_pixel(x0 + dx, y0 + dy, pixel);
                }
            }
        }
    }

    image
}

/// Writes `image` as PNG, creating parent directories.
///
/// # Errors
///
/// Returns [`RenderError`] if the directory or file cannot be written.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), RenderError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    image.save_with_format(path, image::ImageFormat::Png)?;
    log::info!("Wrote {}x{} raster to {}", image.width(), image.height(), path.display());
    Ok(())
}
