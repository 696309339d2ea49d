//! Per-cell aggregation of records into heatmap input series.

use std::collections::BTreeMap;

use crime_grid_models::{Cell, Located};

/// Number of records per cell. Records without a cell are skipped.
#[must_use]
pub fn count_by_cell<'a, T, I>(records: I) -> BTreeMap<Cell, f64>
where
    T: Located + 'a,
    I: IntoIterator<Item = &'a T>,
{
    sum_by_cell(records, |_| Some(1.0))
}

/// Sum of `value` per cell.
///
/// Records without a cell are skipped. Records whose `value` is `None`
/// contribute nothing, but their cell still appears in the result.
#[must_use]
pub fn sum_by_cell<'a, T, I, F>(records: I, value: F) -> BTreeMap<Cell, f64>
where
    T: Located + 'a,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> Option<f64>,
{
    let mut series = BTreeMap::new();
    for record in records {
        let Some(cell) = record.cell() else {
            continue;
        };
        let total = series.entry(cell.clone()).or_insert(0.0);
        if let Some(value) = value(record) {
            *total += value;
        }
    }
    series
}
