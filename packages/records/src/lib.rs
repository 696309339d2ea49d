#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Streaming loader for the incident files.
//!
//! Both input files are `;`-delimited with a header row and a fixed,
//! positional column layout: a row index, a `YYYY-MM-DD` date, a handful of
//! categorical and numeric columns, and finally an optional JSON-encoded
//! cell polygon. [`load_summary`] and [`load_narkota`] validate the header
//! and hand back a [`RecordReader`] that parses one row per iteration.

pub mod parsing;
pub mod progress;
pub mod reader;

use std::fs::File;
use std::path::Path;

use crime_grid_models::{NarkotaRecord, SummaryRecord};
use thiserror::Error;

pub use parsing::{collapse_whitespace, parse_cell, parse_count, parse_date};
pub use reader::{RecordReader, Schema};

/// Delimiter used by both incident files.
pub const DEFAULT_DELIMITER: u8 = b';';

/// Errors that can occur while loading records.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid delimited text.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A date column is not `YYYY-MM-DD`.
    #[error("Invalid date '{value}': {source}")]
    Date {
        /// The raw field.
        value: String,
        /// Underlying parse failure.
        source: chrono::ParseError,
    },

    /// A cell column is not a JSON array of `[lat, lon]` pairs.
    #[error("Invalid cell '{value}': {source}")]
    Cell {
        /// The raw field.
        value: String,
        /// Underlying JSON failure.
        source: serde_json::Error,
    },

    /// A count column is neither empty nor a non-negative integer.
    #[error("Invalid count '{value}'")]
    Count {
        /// The raw field.
        value: String,
    },

    /// The header does not have the schema's column count.
    #[error("{schema} file has {found} columns, expected {expected}")]
    Schema {
        /// Schema name.
        schema: &'static str,
        /// Columns the schema defines.
        expected: usize,
        /// Columns found in the header.
        found: usize,
    },
}

/// Opens a summary file with the default `;` delimiter.
///
/// # Errors
///
/// Returns [`LoadError`] if the file cannot be opened or its header does
/// not match the summary schema.
pub fn load_summary(path: impl AsRef<Path>) -> Result<RecordReader<SummaryRecord, File>, LoadError> {
    RecordReader::open(path.as_ref(), DEFAULT_DELIMITER)
}

/// Opens a narcotics file with the default `;` delimiter.
///
/// # Errors
///
/// Returns [`LoadError`] if the file cannot be opened or its header does
/// not match the narcotics schema.
pub fn load_narkota(path: impl AsRef<Path>) -> Result<RecordReader<NarkotaRecord, File>, LoadError> {
    RecordReader::open(path.as_ref(), DEFAULT_DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_summary_file() {
        let tmp = std::env::temp_dir().join("crime_grid_records_test_summary");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();

        let path = tmp.join("summary.csv");
        std::fs::write(
            &path,
            ";date;group;type;victims;dead;cell\n\
             0;2017-01-05;g;t;;;[[10, 20]]\n\
             1;2017-01-05;g;t;;;[[10, 20]]\n\
             2;2017-01-06;g;t;2;;[[30, 40]]\n",
        )
        .unwrap();

        let records = load_summary(&path)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].victims, Some(2));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = std::env::temp_dir().join("crime_grid_records_test_missing/narkota.csv");
        assert!(matches!(load_narkota(&path), Err(LoadError::Io(_))));
    }
}
