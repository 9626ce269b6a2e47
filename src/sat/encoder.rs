//! Board solving: feasibility gate, clause loading, solution enumeration

use super::constraints::{Clause, ConstraintCompiler};
use super::solver::{CadicalBackend, CancelToken, SatBackend, SolveStatus};
use super::variables::LiteralMap;
use crate::board::{Board, DigitMap, Element};
use crate::config::Settings;
use anyhow::Result;
use std::time::Duration;

/// Check whether the solver core can handle the board at all.
///
/// Returns a human-readable reason when it cannot, `None` when encoding may
/// proceed. Elements that pass the gate but lack a SAT encoding are skipped
/// later with a warning instead of aborting.
pub fn cant_attempt(board: &Board) -> Option<String> {
    if !board.grid.is_square() {
        return Some("Grid is not square.".to_string());
    }

    for element in board.elements.values() {
        if let Element::Unknown(kind) = element {
            return Some(format!("Unknown constraint type: {kind}."));
        }
    }

    let wants_boxes = board.elements.values().any(|element| {
        matches!(element, Element::Box | Element::DisjointGroups(true))
    });
    if wants_boxes && board.grid.box_side().is_none() {
        return Some(format!(
            "Grid size {} has no square box layout.",
            board.grid.side()
        ));
    }

    None
}

/// Enumerate solutions of a board with the CaDiCaL backend.
///
/// Each solution is delivered through the callback as `Some(digits)`; a
/// final `None` marks normal completion, including the UNSAT case with zero
/// solutions. Returns `Ok(true)` only on such a complete run. A cancelled
/// run stops at the next slice or encoding boundary, suppresses the
/// completion sentinel and returns `Ok(false)`.
pub fn solve_board<F>(
    board: &Board,
    settings: &Settings,
    on_solution: F,
    cancel: &CancelToken,
) -> Result<bool>
where
    F: FnMut(Option<&DigitMap>),
{
    solve_board_with(board, settings, CadicalBackend::new(), on_solution, cancel)
}

/// Enumerate solutions against a caller-supplied backend.
///
/// The backend is owned for the duration of the run and dropped on every
/// exit path, normal or not.
pub fn solve_board_with<B, F>(
    board: &Board,
    settings: &Settings,
    mut backend: B,
    mut on_solution: F,
    cancel: &CancelToken,
) -> Result<bool>
where
    B: SatBackend,
    F: FnMut(Option<&DigitMap>),
{
    if let Some(reason) = cant_attempt(board) {
        anyhow::bail!(reason);
    }

    if cancel.is_cancelled() {
        return Ok(false);
    }

    let Some(compiled) = ConstraintCompiler::new(board).compile(cancel)? else {
        return Ok(false);
    };

    backend.declare_vars(compiled.variable_count);
    let literals = compiled.literals;
    let mut clauses = compiled.clauses;
    for clause in clauses.drain(..) {
        backend.add_clause(&clause)?;
    }
    // The solver holds the only copy now; keep peak memory single-sided
    drop(clauses);

    let slice = Duration::from_millis(settings.solver.slice_ms);
    let mut found = 0;

    while found < settings.solver.max_solutions {
        if cancel.is_cancelled() {
            return Ok(false);
        }

        let verdict = loop {
            match backend.solve_slice(slice, cancel)? {
                SolveStatus::Undetermined => {
                    if cancel.is_cancelled() {
                        return Ok(false);
                    }
                    // Yield between slices so the host can schedule other work
                    std::thread::yield_now();
                }
                verdict => break verdict,
            }
        };

        if verdict == SolveStatus::Unsatisfiable {
            break;
        }

        let solution = decode_model(&backend, &literals)?;
        found += 1;
        on_solution(Some(&solution));

        let blocking = blocking_clause(&backend, &literals);
        if blocking.is_empty() {
            // The model fixed no cell at all; there is nothing to exclude
            break;
        }
        backend.add_clause(&blocking)?;
    }

    on_solution(None);
    Ok(true)
}

/// Read the digit assignment out of a satisfying model
fn decode_model<B: SatBackend>(backend: &B, literals: &LiteralMap) -> Result<DigitMap> {
    let n = literals.side();
    let mut solution = DigitMap::new();

    for row in 0..n {
        for col in 0..n {
            let mut assigned: Option<usize> = None;
            for value in 0..n {
                if backend.model_value(literals.literal(row, col, value)) {
                    if let Some(previous) = assigned {
                        anyhow::bail!(
                            "Solver model assigns digits {} and {} to cell ({}, {})",
                            previous + 1,
                            value + 1,
                            row,
                            col
                        );
                    }
                    assigned = Some(value);
                }
            }
            if let Some(value) = assigned {
                solution.insert(row * n + col, value as u8 + 1);
            }
        }
    }

    Ok(solution)
}

/// Clause excluding exactly the base assignment of the current model
fn blocking_clause<B: SatBackend>(backend: &B, literals: &LiteralMap) -> Clause {
    let n = literals.side();
    let mut blocking = Vec::new();

    for row in 0..n {
        for col in 0..n {
            for value in 0..n {
                let literal = literals.literal(row, col, value);
                if backend.model_value(literal) {
                    blocking.push(-literal);
                }
            }
        }
    }

    Clause::new(blocking)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{CellSet, GridSize};
    use crate::warnings::evaluate_warnings;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn settings(max_solutions: usize) -> Settings {
        let mut settings = Settings::default();
        settings.solver.max_solutions = max_solutions;
        settings
    }

    fn classic_board() -> Board {
        Board::new(GridSize::square(9))
            .with_element("grid", Element::Grid)
            .with_element("box", Element::Box)
    }

    /// A valid completed sudoku from the usual shift construction
    fn pattern_digit(row: usize, col: usize) -> u8 {
        ((3 * row + row / 3 + col) % 9 + 1) as u8
    }

    fn full_givens() -> DigitMap {
        let mut digits = DigitMap::new();
        for row in 0..9 {
            for col in 0..9 {
                digits.insert(row * 9 + col, pattern_digit(row, col));
            }
        }
        digits
    }

    /// Collect every callback event; `None` marks the completion sentinel
    fn run(board: &Board, settings: &Settings) -> (bool, Vec<Option<DigitMap>>) {
        let events = RefCell::new(Vec::new());
        let completed = solve_board(
            board,
            settings,
            |solution| events.borrow_mut().push(solution.cloned()),
            &CancelToken::new(),
        )
        .unwrap();
        (completed, events.into_inner())
    }

    fn assert_valid_sudoku(board: &Board, solution: &DigitMap) {
        assert_eq!(solution.len(), 81);
        assert!(solution.values().all(|&d| (1..=9).contains(&d)));
        let warnings: CellSet = evaluate_warnings(board, solution);
        assert!(warnings.is_empty(), "solution violates a local rule");
    }

    #[test]
    fn test_empty_classic_grid_yields_two_solutions() {
        let board = classic_board();
        let (completed, events) = run(&board, &settings(2));

        assert!(completed);
        assert_eq!(events.len(), 3);
        assert!(events[2].is_none());

        let first = events[0].as_ref().unwrap();
        let second = events[1].as_ref().unwrap();
        assert_valid_sudoku(&board, first);
        assert_valid_sudoku(&board, second);
        assert_ne!(first, second);
    }

    #[test]
    fn test_full_givens_solve_uniquely() {
        let board = classic_board().with_element("g", Element::Givens(full_givens()));
        let (completed, events) = run(&board, &settings(2));

        assert!(completed);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].as_ref().unwrap(), &full_givens());
        assert!(events[1].is_none());
    }

    #[test]
    fn test_contradictory_board_reports_only_completion() {
        // Digit 1 in the corner, but the single-cell diagonal through the
        // corner must sum to 5
        let mut givens = DigitMap::new();
        givens.insert(0, 1);
        let mut clues = BTreeMap::new();
        clues.insert(17usize, Some(5i64)); // down-left diagonal row + col == 0

        let board = classic_board()
            .with_element("g", Element::Givens(givens))
            .with_element("lk", Element::LittleKiller(clues));

        let (completed, events) = run(&board, &settings(2));
        assert!(completed);
        assert_eq!(events, vec![None]);
    }

    #[test]
    fn test_little_killer_sum_holds_in_every_solution() {
        let mut clues = BTreeMap::new();
        clues.insert(19usize, Some(6i64)); // cells (0,2), (1,1), (2,0)

        let board = classic_board().with_element("lk", Element::LittleKiller(clues));
        let (completed, events) = run(&board, &settings(3));

        assert!(completed);
        assert_eq!(events.len(), 4);
        for event in &events[..3] {
            let solution = event.as_ref().unwrap();
            assert_valid_sudoku(&board, solution);
            let diagonal_sum: i64 = [(0usize, 2usize), (1, 1), (2, 0)]
                .iter()
                .map(|&(row, col)| solution[&(row * 9 + col)] as i64)
                .sum();
            assert_eq!(diagonal_sum, 6);
        }
    }

    #[test]
    fn test_non_square_grid_is_rejected() {
        let board = Board::new(GridSize::new(9, 8)).with_element("grid", Element::Grid);
        assert_eq!(cant_attempt(&board), Some("Grid is not square.".to_string()));

        let result = solve_board(&board, &settings(1), |_| {}, &CancelToken::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_element_is_rejected() {
        let board =
            Board::new(GridSize::square(9)).with_element("x", Element::Unknown("fog".to_string()));
        assert_eq!(
            cant_attempt(&board),
            Some("Unknown constraint type: fog.".to_string())
        );
    }

    #[test]
    fn test_boxes_need_a_square_layout() {
        let board = Board::new(GridSize::square(6)).with_element("box", Element::Box);
        assert_eq!(
            cant_attempt(&board),
            Some("Grid size 6 has no square box layout.".to_string())
        );

        // Plain row/column uniqueness is still fine on 6x6
        let board = Board::new(GridSize::square(6)).with_element("grid", Element::Grid);
        assert_eq!(cant_attempt(&board), None);
    }

    /// Scripted backend for exercising the driver's lifecycle contract
    struct MockBackend {
        verdicts: VecDeque<SolveStatus>,
        model_true: Vec<i32>,
        added_clauses: Arc<AtomicUsize>,
        released: Arc<AtomicUsize>,
    }

    impl MockBackend {
        fn new(verdicts: Vec<SolveStatus>, model_true: Vec<i32>) -> Self {
            Self {
                verdicts: verdicts.into(),
                model_true,
                added_clauses: Arc::new(AtomicUsize::new(0)),
                released: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl Drop for MockBackend {
        fn drop(&mut self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl SatBackend for MockBackend {
        fn declare_vars(&mut self, _count: usize) {}

        fn add_clause(&mut self, _clause: &Clause) -> Result<()> {
            self.added_clauses.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn solve_slice(&mut self, _budget: Duration, _cancel: &CancelToken) -> Result<SolveStatus> {
            Ok(self
                .verdicts
                .pop_front()
                .unwrap_or(SolveStatus::Satisfiable))
        }

        fn model_value(&self, var: i32) -> bool {
            self.model_true.contains(&var)
        }

        fn variable_count(&self) -> usize {
            0
        }

        fn clause_count(&self) -> usize {
            self.added_clauses.load(Ordering::SeqCst)
        }
    }

    /// Model that puts digit 1 in every cell
    fn all_ones_model() -> Vec<i32> {
        let literals = LiteralMap::new(9);
        let mut model = Vec::new();
        for row in 0..9 {
            for col in 0..9 {
                model.push(literals.literal(row, col, 0));
            }
        }
        model
    }

    #[test]
    fn test_cancellation_suppresses_sentinel_and_releases_backend() {
        let board = Board::new(GridSize::square(9));
        let backend = MockBackend::new(Vec::new(), all_ones_model());
        let released = backend.released.clone();

        let cancel = CancelToken::new();
        let events = RefCell::new(Vec::new());

        let completed = solve_board_with(
            &board,
            &settings(1000),
            backend,
            |solution| {
                events.borrow_mut().push(solution.cloned());
                cancel.cancel();
            },
            &cancel,
        )
        .unwrap();

        assert!(!completed);
        // One solution was delivered, then the cancel stopped the loop
        // before any further callback, sentinel included
        assert_eq!(events.borrow().len(), 1);
        assert!(events.borrow()[0].is_some());
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancellation_before_encoding_touches_nothing() {
        let board = Board::new(GridSize::square(9)).with_element("grid", Element::Grid);
        let backend = MockBackend::new(Vec::new(), Vec::new());
        let released = backend.released.clone();
        let added = backend.added_clauses.clone();

        let cancel = CancelToken::new();
        cancel.cancel();

        let completed =
            solve_board_with(&board, &settings(1), backend, |_| panic!("no callbacks"), &cancel)
                .unwrap();

        assert!(!completed);
        assert_eq!(added.load(Ordering::SeqCst), 0);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_two_digits_in_one_cell_is_fatal() {
        let literals = LiteralMap::new(9);
        let model = vec![literals.literal(0, 0, 0), literals.literal(0, 0, 1)];

        let board = Board::new(GridSize::square(9));
        let backend = MockBackend::new(vec![SolveStatus::Satisfiable], model);
        let released = backend.released.clone();

        let result = solve_board_with(
            &board,
            &settings(1),
            backend,
            |_| panic!("an invalid model must not reach the callback"),
            &CancelToken::new(),
        );

        assert!(result.is_err());
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsat_emits_one_sentinel() {
        let board = Board::new(GridSize::square(9));
        let backend = MockBackend::new(vec![SolveStatus::Unsatisfiable], Vec::new());

        let events = RefCell::new(Vec::new());
        let completed = solve_board_with(
            &board,
            &settings(5),
            backend,
            |solution| events.borrow_mut().push(solution.cloned()),
            &CancelToken::new(),
        )
        .unwrap();

        assert!(completed);
        assert_eq!(events.into_inner(), vec![None]);
    }

    #[test]
    fn test_undetermined_slices_are_retried() {
        let board = Board::new(GridSize::square(9));
        let backend = MockBackend::new(
            vec![
                SolveStatus::Undetermined,
                SolveStatus::Undetermined,
                SolveStatus::Unsatisfiable,
            ],
            Vec::new(),
        );

        let events = RefCell::new(Vec::new());
        let completed = solve_board_with(
            &board,
            &settings(5),
            backend,
            |solution| events.borrow_mut().push(solution.cloned()),
            &CancelToken::new(),
        )
        .unwrap();

        assert!(completed);
        assert_eq!(events.into_inner(), vec![None]);
    }

    #[test]
    fn test_blocking_clause_follows_each_solution() {
        let board = Board::new(GridSize::square(9)); // compiles to zero clauses
        let backend = MockBackend::new(
            vec![SolveStatus::Satisfiable, SolveStatus::Unsatisfiable],
            all_ones_model(),
        );
        let added = backend.added_clauses.clone();

        let events = RefCell::new(Vec::new());
        let completed = solve_board_with(
            &board,
            &settings(5),
            backend,
            |solution| events.borrow_mut().push(solution.cloned()),
            &CancelToken::new(),
        )
        .unwrap();

        assert!(completed);
        // One solution, then the sentinel
        assert_eq!(events.borrow().len(), 2);
        // The only ingested clause is the blocking clause for that solution
        assert_eq!(added.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_max_solutions_caps_enumeration() {
        let board = classic_board();
        let (completed, events) = run(&board, &settings(1));

        assert!(completed);
        assert_eq!(events.len(), 2);
        assert!(events[0].is_some());
        assert!(events[1].is_none());
    }
}
