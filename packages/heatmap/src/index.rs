//! Assigns every cell an integer `(x, y)` grid position.
//!
//! Distinct corner longitudes, sorted ascending, become columns. Distinct
//! corner latitudes, sorted descending, become rows, so `y = 0` is the
//! northernmost row and the grid reads like an image.

use std::collections::{BTreeMap, BTreeSet};

use crime_grid_models::{BoundingBox, Cell, Point};
use serde::{Deserialize, Serialize};

/// Column/row of a cell on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    /// Column, west to east.
    pub x: usize,
    /// Row, north to south.
    pub y: usize,
}

/// Mapping from cells to grid positions.
///
/// Cells that share a corner share a position.
#[derive(Debug, Clone, Default)]
pub struct GridIndex {
    positions: BTreeMap<Cell, GridPosition>,
    width: usize,
    height: usize,
}

impl GridIndex {
    /// Builds the index for `cells`.
    ///
    /// The result only depends on the set of cells, not on their order or
    /// multiplicity.
    #[must_use]
    pub fn build<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = &'a Cell>,
    {
        let cells: BTreeSet<&Cell> = cells.into_iter().collect();

        let latitudes = axis(cells.iter().map(|c| c.corner().latitude), Direction::Descending);
        let longitudes = axis(cells.iter().map(|c| c.corner().longitude), Direction::Ascending);

        let positions = cells
            .into_iter()
            .map(|cell| {
                let corner = cell.corner();
                let position = GridPosition {
                    x: rank(&longitudes, corner.longitude, Direction::Ascending),
                    y: rank(&latitudes, corner.latitude, Direction::Descending),
                };
                (cell.clone(), position)
            })
            .collect::<BTreeMap<_, _>>();

        log::debug!(
            "Indexed {} cells onto a {}x{} grid",
            positions.len(),
            longitudes.len(),
            latitudes.len()
        );

        Self {
            positions,
            width: longitudes.len(),
            height: latitudes.len(),
        }
    }

    /// Grid position of `cell`, if it was indexed.
    #[must_use]
    pub fn position(&self, cell: &Cell) -> Option<GridPosition> {
        self.positions.get(cell).copied()
    }

    /// Number of columns (`max x + 1`).
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of rows (`max y + 1`).
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Number of distinct cells indexed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if no cells were indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Iterates over `(cell, position)` pairs in cell order.
    pub fn iter(&self) -> impl Iterator<Item = (&Cell, GridPosition)> {
        self.positions.iter().map(|(cell, position)| (cell, *position))
    }

    /// Smallest box enclosing every point of every indexed cell.
    ///
    /// An axis on which every point shares one value (single-point cells, a
    /// single row or column) is widened by one grid step: the smallest corner
    /// spacing on that axis, else on the other axis, else
    /// [`SINGLE_CELL_SPAN_DEG`]. `None` only when the index is empty.
    #[must_use]
    pub fn extent(&self) -> Option<BoundingBox> {
        let mut points = self.positions.keys().flat_map(|cell| cell.points().iter());
        let first = *points.next()?;

        let (lower_left, mut upper_right) = points.fold((first, first), |(lo, hi), p| {
            (
                Point::new(lo.latitude.min(p.latitude), lo.longitude.min(p.longitude)),
                Point::new(hi.latitude.max(p.latitude), hi.longitude.max(p.longitude)),
            )
        });

        let lat_step = smallest_step(self.positions.keys().map(|c| c.corner().latitude));
        let lon_step = smallest_step(self.positions.keys().map(|c| c.corner().longitude));

        if upper_right.latitude <= lower_left.latitude {
            upper_right.latitude =
                lower_left.latitude + lat_step.or(lon_step).unwrap_or(SINGLE_CELL_SPAN_DEG);
        }
        if upper_right.longitude <= lower_left.longitude {
            upper_right.longitude =
                lower_left.longitude + lon_step.or(lat_step).unwrap_or(SINGLE_CELL_SPAN_DEG);
        }

        BoundingBox::new(lower_left, upper_right).ok()
    }
}

/// Extent given to a collapsed axis when no corner spacing is known.
pub const SINGLE_CELL_SPAN_DEG: f64 = 0.01;

/// Smallest gap between distinct values, or `None` with fewer than two.
fn smallest_step(values: impl Iterator<Item = f64>) -> Option<f64> {
    axis(values, Direction::Ascending)
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .reduce(f64::min)
}

#[derive(Clone, Copy)]
enum Direction {
    Ascending,
    Descending,
}

/// Adding positive zero folds `-0.0` into `0.0`.
fn canonical(value: f64) -> f64 {
    value + 0.0
}

fn order(a: f64, b: f64, direction: Direction) -> std::cmp::Ordering {
    match direction {
        Direction::Ascending => a.total_cmp(&b),
        Direction::Descending => b.total_cmp(&a),
    }
}

/// Sorted distinct values.
fn axis(values: impl Iterator<Item = f64>, direction: Direction) -> Vec<f64> {
    let mut values: Vec<f64> = values.map(canonical).collect();
    values.sort_by(|a, b| order(*a, *b, direction));
    values.dedup_by(|a, b| order(*a, *b, direction).is_eq());
    values
}

/// Position of `value` within an `axis`. `value` is always present.
fn rank(axis: &[f64], value: f64, direction: Direction) -> usize {
    let value = canonical(value);
    axis.binary_search_by(|probe| order(*probe, value, direction))
        .unwrap_or_else(|i| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(points: &[(f64, f64)]) -> Cell {
        Cell::new(points.iter().map(|&(lat, lon)| Point::new(lat, lon)).collect()).unwrap()
    }

    #[test]
    fn north_is_row_zero_and_west_is_column_zero() {
        let nw = cell(&[(2.0, 0.0)]);
        let ne = cell(&[(2.0, 1.0)]);
        let sw = cell(&[(1.0, 0.0)]);
        let se = cell(&[(1.0, 1.0)]);

        let index = GridIndex::build([&se, &sw, &ne, &nw]);

        assert_eq!(index.position(&nw), Some(GridPosition { x: 0, y: 0 }));
        assert_eq!(index.position(&ne), Some(GridPosition { x: 1, y: 0 }));
        assert_eq!(index.position(&sw), Some(GridPosition { x: 0, y: 1 }));
        assert_eq!(index.position(&se), Some(GridPosition { x: 1, y: 1 }));
        assert_eq!((index.width(), index.height()), (2, 2));
    }

    #[test]
    fn shared_corner_shares_position() {
        let a = cell(&[(10.0, 20.0), (10.0, 21.0)]);
        let b = cell(&[(10.0, 20.0), (11.0, 20.0)]);
        let c = cell(&[(30.0, 40.0)]);

        let index = GridIndex::build([&a, &b, &c]);

        assert_eq!(index.len(), 3);
        assert_eq!(index.position(&a), index.position(&b));
        assert_ne!(index.position(&a), index.position(&c));
        assert_eq!((index.width(), index.height()), (2, 2));
    }

    #[test]
    fn deterministic_across_input_orders() {
        let cells: Vec<Cell> = (0..20)
            .map(|i| {
                let i = f64::from(i);
                cell(&[(55.0 + (i * 7.0) % 5.0, 37.0 + (i * 3.0) % 4.0)])
            })
            .collect();

        let forward = GridIndex::build(&cells);
        let backward = GridIndex::build(cells.iter().rev());
        let doubled = GridIndex::build(cells.iter().chain(cells.iter()));

        let forward: Vec<_> = forward.iter().collect();
        assert_eq!(forward, backward.iter().collect::<Vec<_>>());
        assert_eq!(forward, doubled.iter().collect::<Vec<_>>());
    }

    #[test]
    fn dimensions_match_max_position() {
        let cells = [
            cell(&[(1.0, 1.0)]),
            cell(&[(2.0, 5.0)]),
            cell(&[(3.0, 3.0)]),
            cell(&[(3.0, 7.0)]),
        ];
        let index = GridIndex::build(&cells);

        let max_x = index.iter().map(|(_, p)| p.x).max().unwrap();
        let max_y = index.iter().map(|(_, p)| p.y).max().unwrap();
        assert_eq!(index.width(), max_x + 1);
        assert_eq!(index.height(), max_y + 1);
    }

    #[test]
    fn empty_index() {
        let index = GridIndex::build(std::iter::empty());
        assert!(index.is_empty());
        assert_eq!((index.width(), index.height()), (0, 0));
        assert!(index.extent().is_none());
    }

    #[test]
    fn unknown_cell_has_no_position() {
        let index = GridIndex::build([&cell(&[(1.0, 1.0)])]);
        assert!(index.position(&cell(&[(2.0, 2.0)])).is_none());
    }

    #[test]
    fn extent_of_single_row_is_one_step_tall() {
        let a = cell(&[(55.70, 37.50)]);
        let b = cell(&[(55.70, 37.60)]);
        let extent = GridIndex::build([&a, &b]).extent().unwrap();

        assert_eq!(extent.lower_left, Point::new(55.70, 37.50));
        assert!((extent.upper_right.longitude - 37.60).abs() < 1e-12);
        assert!((extent.height() - 0.10).abs() < 1e-9);
    }

    #[test]
    fn extent_of_lone_point_uses_default_span() {
        let extent = GridIndex::build([&cell(&[(1.0, 2.0)])]).extent().unwrap();
        assert!((extent.height() - SINGLE_CELL_SPAN_DEG).abs() < 1e-12);
        assert!((extent.width() - SINGLE_CELL_SPAN_DEG).abs() < 1e-12);
    }

    #[test]
    fn extent_covers_all_points() {
        let a = cell(&[(1.0, 1.0), (1.0, 2.0), (2.0, 2.0), (2.0, 1.0)]);
        let b = cell(&[(2.0, 2.0), (2.0, 3.0), (3.0, 3.0), (3.0, 2.0)]);
        let extent = GridIndex::build([&a, &b]).extent().unwrap();

        assert_eq!(extent.lower_left, Point::new(1.0, 1.0));
        assert_eq!(extent.upper_right, Point::new(3.0, 3.0));
    }
}
