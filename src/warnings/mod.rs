//! Online rule checking for partially filled boards.
//!
//! The evaluator re-runs after every board mutation and rebuilds the warning
//! set from scratch; nothing carries over between evaluations. It shares the
//! constraint semantics with the SAT encoders but never consults the solver.

pub mod rules;

use crate::board::{Board, CellSet, DigitMap, Element};
use crate::config::RuleConfig;

/// Evaluate every local rule with default deltas
pub fn evaluate_warnings(board: &Board, digits: &DigitMap) -> CellSet {
    evaluate_warnings_with(board, digits, &RuleConfig { lockout_delta: None })
}

/// Evaluate every local rule, honoring configured rule parameters.
///
/// Non-square grids have no digit range to check against and produce no
/// warnings; the feasibility gate reports those separately.
pub fn evaluate_warnings_with(board: &Board, digits: &DigitMap, config: &RuleConfig) -> CellSet {
    let capacity = board.grid.cell_count();
    let mut warnings = CellSet::new(capacity);

    if !board.grid.is_square() || board.grid.width == 0 {
        return warnings;
    }

    let n = board.grid.side();
    let german_delta = ((n + 1) >> 1) as i64;
    let dutch_delta = german_delta - 1;
    let lockout_delta = config.lockout_delta.map_or(dutch_delta, i64::from);

    for element in board.elements.values() {
        match element {
            Element::Grid => {
                rules::mark_duplicates(row_groups(board), digits, &mut warnings, capacity);
                rules::mark_duplicates(column_groups(board), digits, &mut warnings, capacity);
            }
            Element::Box => {
                rules::mark_duplicates(box_groups(board), digits, &mut warnings, capacity);
            }
            Element::DisjointGroups(true) => {
                rules::mark_duplicates(position_groups(board), digits, &mut warnings, capacity);
            }
            Element::Thermo(lines) => {
                for cells in lines.values() {
                    rules::thermometer(cells, true, digits, &mut warnings, capacity);
                }
            }
            Element::SlowThermo(lines) => {
                for cells in lines.values() {
                    rules::thermometer(cells, false, digits, &mut warnings, capacity);
                }
            }
            Element::Between(lines) => {
                for cells in lines.values() {
                    rules::between_line(cells, digits, &mut warnings, capacity);
                }
            }
            Element::DoubleArrow(lines) => {
                for cells in lines.values() {
                    rules::double_arrow(cells, digits, &mut warnings, capacity);
                }
            }
            Element::Lockout(lines) => {
                for cells in lines.values() {
                    rules::lockout_line(cells, lockout_delta, digits, &mut warnings, capacity);
                }
            }
            Element::Palindrome(lines) => {
                for cells in lines.values() {
                    rules::palindrome_line(cells, digits, &mut warnings, capacity);
                }
            }
            Element::Whisper(lines) => {
                for cells in lines.values() {
                    rules::whisper_line(cells, german_delta, digits, &mut warnings, capacity);
                }
            }
            Element::DutchWhisper(lines) => {
                for cells in lines.values() {
                    rules::whisper_line(cells, dutch_delta, digits, &mut warnings, capacity);
                }
            }
            Element::Renban(lines) => {
                for cells in lines.values() {
                    rules::renban_line(cells, digits, &mut warnings, capacity);
                }
            }
            Element::LittleKiller(clues) => {
                for (&diagonal, &sum) in clues {
                    let Some(sum) = sum else {
                        continue;
                    };
                    let cells: Vec<usize> = board
                        .grid
                        .diagonal_cells(diagonal)
                        .into_iter()
                        .map(|(row, col)| board.grid.cell_index(row, col))
                        .collect();
                    if !cells.is_empty() {
                        rules::little_killer_sum(&cells, sum, digits, &mut warnings, capacity);
                    }
                }
            }
            _ => {}
        }
    }

    warnings
}

fn row_groups(board: &Board) -> Vec<Vec<usize>> {
    let n = board.grid.side();
    (0..n)
        .map(|row| (0..n).map(|col| board.grid.cell_index(row, col)).collect())
        .collect()
}

fn column_groups(board: &Board) -> Vec<Vec<usize>> {
    let n = board.grid.side();
    (0..n)
        .map(|col| (0..n).map(|row| board.grid.cell_index(row, col)).collect())
        .collect()
}

fn box_groups(board: &Board) -> Vec<Vec<usize>> {
    let n = board.grid.side();
    (0..n)
        .map(|bx| {
            board
                .grid
                .box_cells(bx)
                .into_iter()
                .map(|(row, col)| board.grid.cell_index(row, col))
                .collect()
        })
        .collect()
}

fn position_groups(board: &Board) -> Vec<Vec<usize>> {
    let n = board.grid.side();
    (0..n)
        .map(|pos| {
            board
                .grid
                .box_position_cells(pos)
                .into_iter()
                .map(|(row, col)| board.grid.cell_index(row, col))
                .collect()
        })
        .collect()
}
