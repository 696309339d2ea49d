#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Conversion between geographic and Web Mercator coordinates.
//!
//! Tile maps are drawn in Web Mercator (`EPSG:3857`) metres while the
//! incident data is in WGS84 degrees (`EPSG:4326`). Web Mercator treats the
//! earth as a sphere of radius [`EARTH_RADIUS_M`]:
//!
//! * `x = R * lon`
//! * `y = R * atanh(sin(lat))`
//!
//! The poles map to infinity, so points there (or beyond) are rejected with
//! [`InvalidPointError`] rather than producing non-finite coordinates.

use crime_grid_models::{BoundingBox, Point};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Sphere radius used by Web Mercator, in metres.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Half the equatorial circumference: the Mercator `x`/`y` of the
/// antimeridian and of the standard tile origin.
pub const HALF_CIRCUMFERENCE_M: f64 = std::f64::consts::PI * EARTH_RADIUS_M;

/// Coordinate reference systems the projector understands.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Crs {
    /// Geographic latitude/longitude in degrees.
    #[strum(to_string = "EPSG:4326", serialize = "wgs84")]
    #[serde(rename = "EPSG:4326")]
    Wgs84,
    /// Spherical Web Mercator in metres.
    #[strum(to_string = "EPSG:3857", serialize = "mercator")]
    #[serde(rename = "EPSG:3857")]
    WebMercator,
}

/// A point the projection cannot map to finite coordinates.
///
/// Kept separate from other failures so batch callers can skip bad points
/// and carry on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid point {point}: outside the projection's valid domain")]
pub struct InvalidPointError {
    /// The point that failed to convert.
    pub point: Point,
}

/// Converts `point` from `source` to `target`.
///
/// Projected points keep `y` in `latitude` and `x` in `longitude`.
///
/// # Errors
///
/// Returns [`InvalidPointError`] if an input coordinate is not finite, a
/// geographic coordinate is out of range, or the result is not finite.
pub fn convert_point(point: Point, source: Crs, target: Crs) -> Result<Point, InvalidPointError> {
    let invalid = || InvalidPointError { point };

    if !point.latitude.is_finite() || !point.longitude.is_finite() {
        return Err(invalid());
    }
    if source == Crs::Wgs84
        && (point.latitude.abs() > 90.0 || point.longitude.abs() > 180.0)
    {
        return Err(invalid());
    }

    let converted = match (source, target) {
        (Crs::Wgs84, Crs::WebMercator) => Point::new(
            EARTH_RADIUS_M * point.latitude.to_radians().sin().atanh(),
            EARTH_RADIUS_M * point.longitude.to_radians(),
        ),
        (Crs::WebMercator, Crs::Wgs84) => Point::new(
            (point.latitude / EARTH_RADIUS_M).sinh().atan().to_degrees(),
            (point.longitude / EARTH_RADIUS_M).to_degrees(),
        ),
        (Crs::Wgs84, Crs::Wgs84) | (Crs::WebMercator, Crs::WebMercator) => point,
    };

    if converted.latitude.is_finite() && converted.longitude.is_finite() {
        Ok(converted)
    } else {
        log::debug!("{source} -> {target} produced a non-finite result for {point}");
        Err(invalid())
    }
}

/// Converts both corners of `bbox` from `source` to `target`.
///
/// Both projections are monotonic on each axis, so the corners stay
/// ordered.
///
/// # Errors
///
/// Returns [`InvalidPointError`] for the first corner that fails.
pub fn convert_box(
    bbox: &BoundingBox,
    source: Crs,
    target: Crs,
) -> Result<BoundingBox, InvalidPointError> {
    Ok(BoundingBox {
        lower_left: convert_point(bbox.lower_left, source, target)?,
        upper_right: convert_point(bbox.upper_right, source, target)?,
    })
}

/// Shorthand for WGS84 -> Web Mercator.
///
/// # Errors
///
/// See [`convert_point`].
pub fn to_mercator(point: Point) -> Result<Point, InvalidPointError> {
    convert_point(point, Crs::Wgs84, Crs::WebMercator)
}
