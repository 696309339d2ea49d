//! Field parsers shared by both record schemas.

use std::sync::LazyLock;

use chrono::NaiveDate;
use crime_grid_models::{Cell, Point};
use regex::Regex;

use crate::LoadError;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").unwrap_or_else(|_| unreachable!()));

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns [`LoadError::Date`] if `value` is not a valid calendar date in
/// that exact format.
pub fn parse_date(value: &str) -> Result<NaiveDate, LoadError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|source| LoadError::Date {
        value: value.to_owned(),
        source,
    })
}

/// Parses a JSON array of `[latitude, longitude]` pairs into a [`Cell`].
///
/// Missing, blank, and `[]` inputs mean the record has no location and
/// yield `None`.
///
/// # Errors
///
/// Returns [`LoadError::Cell`] if the field is not a JSON array of numeric
/// pairs.
pub fn parse_cell(value: Option<&str>) -> Result<Option<Cell>, LoadError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    let pairs: Vec<(f64, f64)> =
        serde_json::from_str(value).map_err(|source| LoadError::Cell {
            value: value.to_owned(),
            source,
        })?;

    Ok(Cell::new(
        pairs
            .into_iter()
            .map(|(latitude, longitude)| Point::new(latitude, longitude))
            .collect(),
    ))
}

/// Replaces every whitespace run with a single space and trims the ends.
#[must_use]
pub fn collapse_whitespace(value: &str) -> String {
    WHITESPACE.replace_all(value.trim(), " ").into_owned()
}

/// Parses an optional non-negative count.
///
/// Empty fields are missing values. Integral floats such as `"3.0"` are
/// accepted because dataframe exports write nullable integer columns that
/// way.
///
/// # Errors
///
/// Returns [`LoadError::Count`] for anything else.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_count(value: &str) -> Result<Option<u32>, LoadError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if let Ok(count) = value.parse::<u32>() {
        return Ok(Some(count));
    }

    match value.parse::<f64>() {
        Ok(float)
            if float.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&float) =>
        {
            Ok(Some(float as u32))
        }
        _ => Err(LoadError::Count {
            value: value.to_owned(),
        }),
    }
}
