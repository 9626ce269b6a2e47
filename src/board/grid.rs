//! Grid geometry and cell-indexed collections

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Map from cell index to a digit in `1..=N`. Partial by design: cells the
/// user has not filled are simply absent.
pub type DigitMap = BTreeMap<usize, u8>;

/// Dimensions of a board grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl GridSize {
    /// Create grid dimensions
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Create square grid dimensions
    pub fn square(side: usize) -> Self {
        Self {
            width: side,
            height: side,
        }
    }

    /// Whether the grid is square (the solver core only handles square grids)
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// Side length `N` of a square grid
    pub fn side(&self) -> usize {
        debug_assert!(self.is_square());
        self.width
    }

    /// Total number of cells
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Convert (row, col) coordinates to a flat cell index
    #[inline]
    pub fn cell_index(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    /// Convert a flat cell index back to (row, col) coordinates
    #[inline]
    pub fn cell_position(&self, index: usize) -> (usize, usize) {
        (index / self.width, index % self.width)
    }

    /// Side length of a box region, if the grid admits a square box layout.
    /// Returns `Some(3)` on 9x9, `Some(2)` on 4x4, `None` on 6x6 or
    /// non-square grids.
    pub fn box_side(&self) -> Option<usize> {
        if !self.is_square() {
            return None;
        }
        let n = self.side();
        let mut b = 1;
        while b * b < n {
            b += 1;
        }
        if b * b == n {
            Some(b)
        } else {
            None
        }
    }

    /// The cells of box `bx` in position order, or no cells when the grid
    /// has no square box layout
    pub fn box_cells(&self, bx: usize) -> Vec<(usize, usize)> {
        match self.box_side() {
            Some(side) => (0..self.side())
                .map(|pos| Self::box_cell_at(bx, pos, side))
                .collect(),
            None => Vec::new(),
        }
    }

    /// The cells occupying position `pos` across every box, or no cells
    /// when the grid has no square box layout
    pub fn box_position_cells(&self, pos: usize) -> Vec<(usize, usize)> {
        match self.box_side() {
            Some(side) => (0..self.side())
                .map(|bx| Self::box_cell_at(bx, pos, side))
                .collect(),
            None => Vec::new(),
        }
    }

    fn box_cell_at(bx: usize, pos: usize, side: usize) -> (usize, usize) {
        let row = bx / side * side + pos / side;
        let col = bx % side * side + pos % side;
        (row, col)
    }

    /// Number of addressable little-killer diagonals: `2N-1` in each of the
    /// two diagonal directions.
    pub fn diagonal_count(&self) -> usize {
        if !self.is_square() || self.width == 0 {
            return 0;
        }
        4 * self.side() - 2
    }

    /// Resolve a diagonal index to its cells, ordered by increasing row.
    ///
    /// Indices `0..2N-1` address the down-right diagonals identified by
    /// `col - row + N - 1`; indices `2N-1..4N-2` address the down-left
    /// diagonals identified by `2N - 1 + row + col`. Out-of-range indices
    /// resolve to no cells.
    pub fn diagonal_cells(&self, diagonal: usize) -> Vec<(usize, usize)> {
        if !self.is_square() {
            return Vec::new();
        }
        let n = self.side();
        let half = 2 * n - 1;
        let mut cells = Vec::new();

        if diagonal < half {
            // col - row == diagonal - (N - 1)
            let shift = diagonal as isize - (n as isize - 1);
            for row in 0..n {
                let col = row as isize + shift;
                if col >= 0 && (col as usize) < n {
                    cells.push((row, col as usize));
                }
            }
        } else if diagonal < 2 * half {
            // row + col == diagonal - (2N - 1)
            let sum = diagonal - half;
            for row in 0..n {
                if sum >= row && sum - row < n {
                    cells.push((row, sum - row));
                }
            }
        }

        cells
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Fixed-capacity set of cell indices, used for warning marks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSet {
    words: Vec<u64>,
    capacity: usize,
}

impl CellSet {
    /// Create an empty set able to hold cell indices `0..capacity`
    pub fn new(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(64)],
            capacity,
        }
    }

    /// Mark a cell
    pub fn insert(&mut self, index: usize) {
        debug_assert!(index < self.capacity);
        self.words[index / 64] |= 1 << (index % 64);
    }

    /// Whether a cell is marked
    pub fn contains(&self, index: usize) -> bool {
        index < self.capacity && self.words[index / 64] & (1 << (index % 64)) != 0
    }

    /// Whether no cell is marked
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Number of marked cells
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterate over marked cell indices in increasing order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.capacity).filter(|&i| self.contains(i))
    }

    /// Unmark every cell
    pub fn clear(&mut self) {
        self.words.fill(0);
    }
}
