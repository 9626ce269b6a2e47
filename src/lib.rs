//! Variant Sudoku SAT Solver
//!
//! This library compiles a board of heterogeneous sudoku constraints into a
//! CNF formula, drives the CaDiCaL solver to enumerate solutions, and checks
//! partially filled boards against each constraint's local rule.

pub mod board;
pub mod config;
pub mod sat;
pub mod utils;
pub mod warnings;

pub use board::{Board, CellSet, DigitMap, Element, GridSize};
pub use config::Settings;
pub use sat::{cant_attempt, solve_board, solve_board_with, CancelToken};
pub use warnings::{evaluate_warnings, evaluate_warnings_with};

use anyhow::Result;

/// Collect up to the configured number of solutions for a board
pub fn enumerate_solutions(board: &Board, settings: &Settings) -> Result<Vec<DigitMap>> {
    let mut solutions = Vec::new();
    sat::solve_board(
        board,
        settings,
        |solution| {
            if let Some(solution) = solution {
                solutions.push(solution.clone());
            }
        },
        &CancelToken::new(),
    )?;
    Ok(solutions)
}
