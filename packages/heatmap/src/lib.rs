#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Grid indexing and heatmap aggregation.
//!
//! [`GridIndex`] turns a set of cells into integer grid positions derived
//! from their sorted corner coordinates. [`Heatmap`] lays a per-cell series
//! (usually produced by [`series::count_by_cell`]) out on that grid as a
//! dense array, optionally log-scaled.

pub mod heatmap;
pub mod index;
pub mod series;

pub use heatmap::{Heatmap, Scale};
pub use index::{GridIndex, GridPosition};
pub use series::{count_by_cell, sum_by_cell};
