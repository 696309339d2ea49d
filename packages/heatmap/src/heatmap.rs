//! Dense per-cell value arrays laid out on a [`GridIndex`].

use crime_grid_models::Cell;
use serde::{Deserialize, Serialize};

use crate::index::GridIndex;

/// Transform applied to a heatmap after it is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    /// `v -> ln(v + 1)`, compresses heavy-tailed counts.
    #[default]
    Log,
    /// Values as aggregated.
    Linear,
}

/// A `(height, width)` row-major array. Row 0 is the northernmost row.
#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl Heatmap {
    /// An all-zero heatmap.
    #[must_use]
    pub fn zeros(height: usize, width: usize) -> Self {
        Self {
            width,
            height,
            values: vec![0.0; width * height],
        }
    }

    /// Lays `series` out on `index`.
    ///
    /// Cells missing from the index are skipped. Values of cells that share
    /// a grid position are summed. `scale` is applied after every value is
    /// in place.
    #[must_use]
    pub fn from_series<'a, I>(series: I, index: &GridIndex, scale: Scale) -> Self
    where
        I: IntoIterator<Item = (&'a Cell, f64)>,
    {
        let mut heatmap = Self::zeros(index.height(), index.width());
        let mut skipped = 0_usize;

        for (cell, value) in series {
            let Some(position) = index.position(cell) else {
                skipped += 1;
                continue;
            };
            heatmap.values[position.y * heatmap.width + position.x] += value;
        }

        if skipped > 0 {
            log::debug!("Skipped {skipped} cells missing from the grid index");
        }

        match scale {
            Scale::Log => heatmap.log_scaled(),
            Scale::Linear => heatmap,
        }
    }

    /// Applies `ln(v + 1)` to every value.
    #[must_use]
    pub fn log_scaled(mut self) -> Self {
        for value in &mut self.values {
            *value = value.ln_1p();
        }
        self
    }

    /// `(height, width)`.
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Value at `row`, `col`.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.height && col < self.width {
            self.values.get(row * self.width + col).copied()
        } else {
            None
        }
    }

    /// Rows from north to south.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.width.max(1))
    }

    /// All values in row-major order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Largest value, or `0.0` for an empty heatmap.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use crime_grid_models::Point;

    use super::*;

    fn cell(lat: f64, lon: f64) -> Cell {
        Cell::new(vec![Point::new(lat, lon)]).unwrap()
    }

    #[test]
    fn shape_matches_index() {
        let cells = [cell(1.0, 1.0), cell(2.0, 3.0), cell(3.0, 2.0), cell(3.0, 5.0)];
        let index = GridIndex::build(&cells);
        let heatmap = Heatmap::from_series(cells.iter().map(|c| (c, 1.0)), &index, Scale::Linear);

        assert_eq!(heatmap.shape(), (index.height(), index.width()));
        assert_eq!(heatmap.shape(), (3, 4));
        assert_eq!(heatmap.rows().count(), 3);
        assert!(heatmap.rows().all(|row| row.len() == 4));
    }

    #[test]
    fn log_of_zeros_is_zeros() {
        let heatmap = Heatmap::zeros(3, 4).log_scaled();
        assert!(heatmap.values().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn unpopulated_cells_stay_zero() {
        let a = cell(1.0, 1.0);
        let b = cell(2.0, 2.0);
        let index = GridIndex::build([&a, &b]);

        let heatmap = Heatmap::from_series([(&a, 5.0)], &index, Scale::Log);
        let pos_b = index.position(&b).unwrap();
        assert_eq!(heatmap.get(pos_b.y, pos_b.x), Some(0.0));
    }

    #[test]
    fn skips_unindexed_cells() {
        let a = cell(1.0, 1.0);
        let stray = cell(9.0, 9.0);
        let index = GridIndex::build([&a]);

        let heatmap = Heatmap::from_series([(&a, 2.0), (&stray, 7.0)], &index, Scale::Linear);
        assert_eq!(heatmap.shape(), (1, 1));
        assert_eq!(heatmap.values(), &[2.0]);
    }

    #[test]
    fn sums_cells_sharing_a_position() {
        let a = Cell::new(vec![Point::new(1.0, 1.0), Point::new(1.0, 2.0)]).unwrap();
        let b = Cell::new(vec![Point::new(1.0, 1.0), Point::new(2.0, 1.0)]).unwrap();
        let index = GridIndex::build([&a, &b]);

        let heatmap = Heatmap::from_series([(&a, 2.0), (&b, 3.0)], &index, Scale::Linear);
        assert_eq!(heatmap.values(), &[5.0]);
    }

    #[test]
    fn out_of_bounds_get_is_none() {
        let heatmap = Heatmap::zeros(2, 2);
        assert!(heatmap.get(2, 0).is_none());
        assert!(heatmap.get(0, 2).is_none());
    }

    #[test]
    fn empty_heatmap() {
        let heatmap = Heatmap::from_series(std::iter::empty(), &GridIndex::default(), Scale::Log);
        assert_eq!(heatmap.shape(), (0, 0));
        assert_eq!(heatmap.rows().count(), 0);
        assert!(heatmap.max().abs() < f64::EPSILON);
    }
}
