#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic primitives and incident record types.
//!
//! Every other crate in the workspace speaks in terms of these types:
//! the loader produces [`SummaryRecord`]s and [`NarkotaRecord`]s, the grid
//! indexer keys on [`Cell`]s, and the projector and renderer work with
//! [`Point`]s and [`BoundingBox`]es.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A latitude/longitude pair.
///
/// Geographic points are WGS84 degrees. A point that has been projected
/// (see `crime_grid_projection`) keeps its northing in `latitude` and its
/// easting in `longitude`.
///
/// Points are totally ordered and hashable so they can serve as grouping
/// keys. `-0.0` and `0.0` compare equal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Point {
    /// Latitude in degrees (or projected `y`).
    pub latitude: f64,
    /// Longitude in degrees (or projected `x`).
    pub longitude: f64,
}

impl Point {
    /// Creates a point from a latitude and a longitude.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns `true` if this point lies strictly inside `bbox`.
    #[must_use]
    pub fn is_inside(&self, bbox: &BoundingBox) -> bool {
        is_inside(self, bbox)
    }
}

/// Adding positive zero folds `-0.0` into `0.0`.
fn canonical(value: f64) -> f64 {
    value + 0.0
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        canonical(self.latitude)
            .total_cmp(&canonical(other.latitude))
            .then_with(|| canonical(self.longitude).total_cmp(&canonical(other.longitude)))
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        canonical(self.latitude).to_bits().hash(state);
        canonical(self.longitude).to_bits().hash(state);
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// A grid cell polygon.
///
/// The first point of the polygon is the cell's *corner*, which identifies
/// the cell on the grid. A cell always has at least one point.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct Cell {
    corner: Point,
    points: Vec<Point>,
}

impl Cell {
    /// Builds a cell from its polygon points. Returns `None` when `points`
    /// is empty.
    #[must_use]
    pub fn new(points: Vec<Point>) -> Option<Self> {
        let corner = *points.first()?;
        Some(Self { corner, points })
    }

    /// The first polygon point, used as the cell's grid identity.
    #[must_use]
    pub const fn corner(&self) -> Point {
        self.corner
    }

    /// All polygon points in their original order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

/// Error returned when building a [`Cell`] from an empty point list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyCellError;

impl std::fmt::Display for EmptyCellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a cell needs at least one point")
    }
}

impl std::error::Error for EmptyCellError {}

impl TryFrom<Vec<Point>> for Cell {
    type Error = EmptyCellError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        Self::new(points).ok_or(EmptyCellError)
    }
}

impl From<Cell> for Vec<Point> {
    fn from(cell: Cell) -> Self {
        cell.points
    }
}

/// A rectangular region given by its lower-left and upper-right corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    /// South-west corner.
    pub lower_left: Point,
    /// North-east corner.
    pub upper_right: Point,
}

impl BoundingBox {
    /// Creates a bounding box, checking that `lower_left` is strictly below
    /// and to the left of `upper_right`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidBoundingBoxError::Inverted`] if the corners are not
    /// ordered on both axes.
    pub fn new(lower_left: Point, upper_right: Point) -> Result<Self, InvalidBoundingBoxError> {
        if lower_left.latitude < upper_right.latitude
            && lower_left.longitude < upper_right.longitude
        {
            Ok(Self {
                lower_left,
                upper_right,
            })
        } else {
            Err(InvalidBoundingBoxError::Inverted {
                lower_left,
                upper_right,
            })
        }
    }

    /// Creates a geographic box from `[min_lat, min_lon, max_lat, max_lon]`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidBoundingBoxError::OutOfRange`] for coordinates
    /// outside -90..90 / -180..180 and [`InvalidBoundingBoxError::Inverted`]
    /// if the corners are not ordered.
    pub fn from_degrees(
        [min_lat, min_lon, max_lat, max_lon]: [f64; 4],
    ) -> Result<Self, InvalidBoundingBoxError> {
        if !(-90.0..=90.0).contains(&min_lat)
            || !(-90.0..=90.0).contains(&max_lat)
            || !(-180.0..=180.0).contains(&min_lon)
            || !(-180.0..=180.0).contains(&max_lon)
        {
            return Err(InvalidBoundingBoxError::OutOfRange(format!(
                "min_lat={min_lat} min_lon={min_lon} max_lat={max_lat} max_lon={max_lon}"
            )));
        }

        Self::new(Point::new(min_lat, min_lon), Point::new(max_lat, max_lon))
    }

    /// `[min_lat, min_lon, max_lat, max_lon]`.
    #[must_use]
    pub const fn to_degrees(&self) -> [f64; 4] {
        [
            self.lower_left.latitude,
            self.lower_left.longitude,
            self.upper_right.latitude,
            self.upper_right.longitude,
        ]
    }

    /// Returns `true` if `point` lies strictly inside this box.
    #[must_use]
    pub fn contains(&self, point: &Point) -> bool {
        is_inside(point, self)
    }

    /// Extent along the longitude (or projected `x`) axis.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper_right.longitude - self.lower_left.longitude
    }

    /// Extent along the latitude (or projected `y`) axis.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.upper_right.latitude - self.lower_left.latitude
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <---> {}", self.lower_left, self.upper_right)
    }
}

/// Parses `"min_lat,min_lon,max_lat,max_lon"` in WGS84 degrees.
impl FromStr for BoundingBox {
    type Err = InvalidBoundingBoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let corners = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| InvalidBoundingBoxError::Malformed(format!("{s}: {e}")))?;

        let [min_lat, min_lon, max_lat, max_lon] = corners[..] else {
            return Err(InvalidBoundingBoxError::Malformed(format!(
                "{s}: expected 4 comma-separated numbers, found {}",
                corners.len()
            )));
        };

        Self::from_degrees([min_lat, min_lon, max_lat, max_lon])
    }
}

/// Error returned when a [`BoundingBox`] cannot be built.
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidBoundingBoxError {
    /// The lower-left corner is not below and left of the upper-right one.
    Inverted {
        /// Offending lower-left corner.
        lower_left: Point,
        /// Offending upper-right corner.
        upper_right: Point,
    },
    /// Coordinates fall outside -90..90 / -180..180.
    OutOfRange(String),
    /// The textual form could not be parsed.
    Malformed(String),
}

impl std::fmt::Display for InvalidBoundingBoxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inverted {
                lower_left,
                upper_right,
            } => write!(
                f,
                "lower-left corner {lower_left} must be below and left of upper-right corner {upper_right}"
            ),
            Self::OutOfRange(detail) => write!(
                f,
                "lat/lon out of range (-90.0 to 90.0 and -180.0 to 180.0): {detail}"
            ),
            Self::Malformed(detail) => write!(f, "malformed bounding box {detail}"),
        }
    }
}

impl std::error::Error for InvalidBoundingBoxError {}

/// Returns `true` iff `point` is strictly within `bbox` on both axes.
///
/// Points on an edge are outside.
#[must_use]
pub fn is_inside(point: &Point, bbox: &BoundingBox) -> bool {
    bbox.lower_left.latitude < point.latitude
        && point.latitude < bbox.upper_right.latitude
        && bbox.lower_left.longitude < point.longitude
        && point.longitude < bbox.upper_right.longitude
}

/// Central Moscow, the region the incident files cover.
pub const MOSCOW_BOX: BoundingBox = BoundingBox {
    lower_left: Point::new(55.555_959, 37.252_433),
    upper_right: Point::new(55.929_357, 37.952_812),
};

/// Anything that may be attached to a grid [`Cell`].
pub trait Located {
    /// The record's cell, or `None` if it has no spatial location.
    fn cell(&self) -> Option<&Cell>;
}

impl Located for Cell {
    fn cell(&self) -> Option<&Cell> {
        Some(self)
    }
}

/// One row of the crime summary file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// Date the incidents were registered.
    pub date: NaiveDate,
    /// Criminal code chapter, whitespace-collapsed.
    pub group: String,
    /// Offence type within the chapter.
    pub kind: String,
    /// Number of victims, if reported.
    pub victims: Option<u32>,
    /// Number of deaths, if reported.
    pub dead: Option<u32>,
    /// Grid cell the incidents belong to.
    pub cell: Option<Cell>,
}

impl Located for SummaryRecord {
    fn cell(&self) -> Option<&Cell> {
        self.cell.as_ref()
    }
}

/// One row of the narcotics file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarkotaRecord {
    /// Date the incidents were registered.
    pub date: NaiveDate,
    /// Attempted sales.
    pub attempted_sale: Option<u32>,
    /// Possession / storage.
    pub storage: Option<u32>,
    /// Completed sales.
    pub sale: Option<u32>,
    /// Everything else.
    pub other: Option<u32>,
    /// Grid cell the incidents belong to.
    pub cell: Option<Cell>,
}

impl NarkotaRecord {
    /// Returns the counter selected by `field`.
    #[must_use]
    pub const fn value(&self, field: NarkotaField) -> Option<u32> {
        match field {
            NarkotaField::AttemptedSale => self.attempted_sale,
            NarkotaField::Storage => self.storage,
            NarkotaField::Sale => self.sale,
            NarkotaField::Other => self.other,
        }
    }
}

impl Located for NarkotaRecord {
    fn cell(&self) -> Option<&Cell> {
        self.cell.as_ref()
    }
}

/// Selects one of the numeric counters of a [`NarkotaRecord`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NarkotaField {
    /// [`NarkotaRecord::attempted_sale`]
    AttemptedSale,
    /// [`NarkotaRecord::storage`]
    Storage,
    /// [`NarkotaRecord::sale`]
    Sale,
    /// [`NarkotaRecord::other`]
    Other,
}

impl NarkotaField {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::AttemptedSale, Self::Storage, Self::Sale, Self::Other]
    }
}
