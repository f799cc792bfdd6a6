use std::fmt;

use super::Coord;

/// A dense row-major matrix addressed by `(row, col)`.
///
/// Backs the maze cells as well as the per-cell solver outputs (policies and value functions),
/// so every one of them shares the same dimensions and indexing.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    data: Box<[T]>,
    rows: usize,
    cols: usize,
}

impl<T: Clone> Grid<T> {
    pub fn new(rows: usize, cols: usize, cell: T) -> Self {
        let data = vec![cell; rows * cols].into_boxed_slice();
        Grid { data, rows, cols }
    }
}

impl<T> Grid<T> {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_in_bounds(&self, coord: Coord) -> bool {
        coord.0 < self.rows && coord.1 < self.cols
    }

    fn ravel_index(&self, coord: Coord) -> usize {
        coord.0 * self.cols + coord.1
    }

    pub fn get(&self, coord: Coord) -> Option<&T> {
        if self.is_in_bounds(coord) {
            Some(&self.data[self.ravel_index(coord)])
        } else {
            None
        }
    }

    pub fn set(&mut self, coord: Coord, cell: T) {
        let idx = self.ravel_index(coord);
        self.data[idx] = cell;
    }

    /// All coordinates in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + use<T> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |row| (0..cols).map(move |col| (row, col)))
    }

    /// Rows as slices, top to bottom.
    pub fn row_slices(&self) -> impl Iterator<Item = &[T]> {
        // chunks() panics on a zero chunk size
        self.data.chunks(self.cols.max(1))
    }

    /// Builds a grid of the same shape by applying `f` to every cell.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            data: self.data.iter().map(f).collect(),
            rows: self.rows,
            cols: self.cols,
        }
    }
}

impl<T> std::ops::Index<Coord> for Grid<T> {
    type Output = T;

    fn index(&self, index: Coord) -> &Self::Output {
        &self.data[self.ravel_index(index)]
    }
}

impl<T> std::ops::IndexMut<Coord> for Grid<T> {
    fn index_mut(&mut self, index: Coord) -> &mut Self::Output {
        let idx = self.ravel_index(index);
        &mut self.data[idx]
    }
}

impl<T: fmt::Display> fmt::Display for Grid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.row_slices() {
            for cell in row {
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
