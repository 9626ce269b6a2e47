//! Board model: grid geometry, constraint elements, file loading

pub mod elements;
pub mod grid;
pub mod io;

pub use elements::{Board, Element};
pub use grid::{CellSet, DigitMap, GridSize};
pub use io::{load_board_from_file, parse_board_from_str};
