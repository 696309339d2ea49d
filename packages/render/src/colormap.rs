//! Perceptual colormaps sampled from five control points.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Supported colormaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Colormap {
    #[default]
    Inferno,
    Viridis,
}

type Stop = (f64, f64, f64);

const INFERNO: [Stop; 5] = [
    (0.001_462, 0.000_466, 0.013_866),
    (0.341_500, 0.062_325, 0.429_425),
    (0.735_683, 0.215_906, 0.330_245),
    (0.978_422, 0.557_937, 0.034_931),
    (0.988_362, 0.998_364, 0.644_924),
];

const VIRIDIS: [Stop; 5] = [
    (0.267_004, 0.004_874, 0.329_415),
    (0.229_739, 0.322_361, 0.545_706),
    (0.127_568, 0.566_949, 0.550_556),
    (0.369_214, 0.788_888, 0.382_914),
    (0.993_248, 0.906_157, 0.143_936),
];

impl Colormap {
    const fn stops(self) -> &'static [Stop; 5] {
        match self {
            Self::Inferno => &INFERNO,
            Self::Viridis => &VIRIDIS,
        }
    }

    /// Colour for `value` in `[0, 1]`. Values outside are clamped and `NaN`
    /// maps to the low end.
    #[must_use]
    pub fn map(self, value: f64) -> [u8; 3] {
        let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        let stops = self.stops();

        let scaled = value * 4.0;
        let segment = scaled.floor().min(3.0);
        let t = scaled - segment;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let lower = segment as usize;

        let (r0, g0, b0) = stops[lower];
        let (r1, g1, b1) = stops[lower + 1];
        [
            channel(r0 + t * (r1 - r0)),
            channel(g0 + t * (g1 - g0)),
            channel(b0 + t * (b1 - b0)),
        ]
    }

    /// `#rrggbb` form of [`Self::map`].
    #[must_use]
    pub fn hex(self, value: f64) -> String {
        let [r, g, b] = self.map(value);
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn channel(value: f64) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}
