//! Dense row-major storage shared by tiles, visibility flags and search scratch.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CellCoord;

/// Fixed-size two dimensional container addressed by [`CellCoord`].
///
/// The dimensions are chosen at construction and never change. Checked access
/// goes through [`Grid::get`] and [`Grid::get_mut`]; indexing and
/// [`Grid::set`] treat an out-of-range cell as a programming error and panic.
/// Deserialized grids are checked the same way as [`Grid::from_vec`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawGrid<T>")]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Grid<T> {
    width: u32,
    height: u32,
    cells: Vec<T>,
}

/// Unchecked wire form of a [`Grid`].
#[derive(Deserialize)]
#[serde(rename = "Grid")]
struct RawGrid<T> {
    width: u32,
    height: u32,
    cells: Vec<T>,
}

impl<T> TryFrom<RawGrid<T>> for Grid<T> {
    type Error = GridError;

    fn try_from(raw: RawGrid<T>) -> Result<Self, Self::Error> {
        Self::from_vec(raw.width, raw.height, raw.cells)
    }
}

/// Errors raised when constructing a grid from existing storage.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// The provided buffer does not hold exactly `width * height` values.
    #[error("grid of {width}x{height} needs {expected} cells but {found} were provided")]
    SizeMismatch {
        /// Requested width in cells.
        width: u32,
        /// Requested height in cells.
        height: u32,
        /// Number of cells the dimensions require.
        expected: usize,
        /// Number of cells actually supplied.
        found: usize,
    },
}

impl<T: Clone> Grid<T> {
    /// Creates a grid where every cell holds a clone of `value`.
    #[must_use]
    pub fn new(width: u32, height: u32, value: T) -> Self {
        Self {
            width,
            height,
            cells: vec![value; cell_count(width, height)],
        }
    }

    /// Overwrites every cell with a clone of `value`.
    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }
}

impl<T> Grid<T> {
    /// Creates a grid by evaluating `init` once per cell in row-major order.
    #[must_use]
    pub fn from_fn(width: u32, height: u32, mut init: impl FnMut(CellCoord) -> T) -> Self {
        let mut cells = Vec::with_capacity(cell_count(width, height));
        for row in 0..height {
            for column in 0..width {
                cells.push(init(CellCoord::new(column, row)));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Wraps an existing row-major buffer.
    pub fn from_vec(width: u32, height: u32, cells: Vec<T>) -> Result<Self, GridError> {
        let expected = cell_count(width, height);
        if cells.len() != expected {
            return Err(GridError::SizeMismatch {
                width,
                height,
                expected,
                found: cells.len(),
            });
        }

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the grid holds no cells at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    /// Value stored at the cell, or `None` when the cell is out of range.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<&T> {
        self.offset(cell).and_then(|index| self.cells.get(index))
    }

    /// Mutable access to the value stored at the cell.
    #[must_use]
    pub fn get_mut(&mut self, cell: CellCoord) -> Option<&mut T> {
        self.offset(cell).and_then(|index| self.cells.get_mut(index))
    }

    /// Stores `value` at the cell.
    ///
    /// # Panics
    ///
    /// Panics when the cell lies outside the grid.
    pub fn set(&mut self, cell: CellCoord, value: T) {
        self[cell] = value;
    }

    /// Raw row-major storage.
    #[must_use]
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    /// Iterates over every cell and its value in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &T)> + '_ {
        let width = usize::try_from(self.width).unwrap_or(usize::MAX).max(1);
        self.cells.iter().enumerate().map(move |(offset, value)| {
            let column = u32::try_from(offset % width).unwrap_or(u32::MAX);
            let row = u32::try_from(offset / width).unwrap_or(u32::MAX);
            (CellCoord::new(column, row), value)
        })
    }

    fn offset(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }

        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

impl<T> Index<CellCoord> for Grid<T> {
    type Output = T;

    fn index(&self, cell: CellCoord) -> &T {
        match self.get(cell) {
            Some(value) => value,
            None => panic!(
                "cell ({}, {}) outside {}x{} grid",
                cell.column(),
                cell.row(),
                self.width,
                self.height
            ),
        }
    }
}

impl<T> IndexMut<CellCoord> for Grid<T> {
    fn index_mut(&mut self, cell: CellCoord) -> &mut T {
        let (width, height) = (self.width, self.height);
        match self.get_mut(cell) {
            Some(value) => value,
            None => panic!(
                "cell ({}, {}) outside {}x{} grid",
                cell.column(),
                cell.row(),
                width,
                height
            ),
        }
    }
}

fn cell_count(width: u32, height: u32) -> usize {
    usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(usize::MAX)
}
