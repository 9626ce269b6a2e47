//! Clause representation and per-element constraint encoders

use super::pb;
use super::solver::CancelToken;
use super::variables::LiteralMap;
use crate::board::{Board, Element};
use anyhow::Result;
use std::collections::BTreeMap;

/// A disjunction of signed literals, the unit of CNF handed to the backend.
///
/// Each literal's sign carries its polarity and its magnitude is a variable
/// id from [`LiteralMap`]'s ranges, which is why magnitude 0 never occurs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub literals: Vec<i32>,
}

impl Clause {
    pub fn new(literals: Vec<i32>) -> Self {
        Self { literals }
    }

    /// A single forced literal, as emitted for givens and filled digits
    pub fn unit(literal: i32) -> Self {
        Self {
            literals: vec![literal],
        }
    }

    /// A two-literal clause, the shape of pairwise exclusions and counter
    /// register propagation
    pub fn binary(lit1: i32, lit2: i32) -> Self {
        Self {
            literals: vec![lit1, lit2],
        }
    }

    /// An empty clause is satisfied by nothing; backends reject it
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }
}

/// Result of compiling a board: the clause buffer plus the variable space
/// it was written against.
pub struct CompiledBoard {
    pub clauses: Vec<Clause>,
    pub variable_count: usize,
    pub literals: LiteralMap,
}

/// Compiles the elements of a board snapshot into CNF clauses.
///
/// Callers must run the feasibility gate first: the compiler assumes a
/// square grid. Elements without a SAT encoding are skipped with a logged
/// warning; their semantics surface only through the warning evaluator.
pub struct ConstraintCompiler<'a> {
    board: &'a Board,
    literals: LiteralMap,
    clauses: Vec<Clause>,
    next_var: i32,
}

impl<'a> ConstraintCompiler<'a> {
    /// Create a compiler for the given board
    pub fn new(board: &'a Board) -> Self {
        let literals = LiteralMap::new(board.grid.width);
        let next_var = literals.first_aux_var();

        Self {
            board,
            literals,
            clauses: Vec::new(),
            next_var,
        }
    }

    /// Encode every element. Returns `None` when the token is cancelled
    /// between elements; the partial clause buffer is discarded.
    pub fn compile(mut self, cancel: &CancelToken) -> Result<Option<CompiledBoard>> {
        for (id, element) in &self.board.elements {
            if cancel.is_cancelled() {
                return Ok(None);
            }
            self.encode_element(id, element)?;
        }

        Ok(Some(CompiledBoard {
            clauses: self.clauses,
            variable_count: (self.next_var - 1) as usize,
            literals: self.literals,
        }))
    }

    fn encode_element(&mut self, id: &str, element: &Element) -> Result<()> {
        match element {
            Element::Grid => self.encode_grid(),
            Element::Box => self.encode_boxes()?,
            Element::DisjointGroups(active) => {
                if *active {
                    self.encode_disjoint_groups()?;
                }
            }
            Element::Givens(digits) | Element::Filled(digits) => {
                self.encode_fixed_digits(id, digits)?;
            }
            Element::LittleKiller(clues) => self.encode_little_killer(id, clues),
            _ if element.is_annotation() => {}
            other => {
                eprintln!(
                    "Warning: element '{}' of type '{}' has no SAT encoding and is not enforced",
                    id,
                    other.kind()
                );
            }
        }
        Ok(())
    }

    /// Row, column and cell uniqueness: three exactly-one constraints per
    /// `(a, b)` pair, produced by rotating the index triple through the
    /// literal scheme's three projections.
    fn encode_grid(&mut self) {
        let n = self.literals.side();

        for a in 0..n {
            for b in 0..n {
                let cell: Vec<i32> = (0..n).map(|v| self.literals.literal(a, b, v)).collect();
                let row: Vec<i32> = (0..n).map(|v| self.literals.literal(a, v, b)).collect();
                let col: Vec<i32> = (0..n).map(|v| self.literals.literal(v, a, b)).collect();

                self.exactly_one(&cell);
                self.exactly_one(&row);
                self.exactly_one(&col);
            }
        }
    }

    /// Each box holds each digit exactly once
    fn encode_boxes(&mut self) -> Result<()> {
        let n = self.literals.side();
        if self.board.grid.box_side().is_none() {
            anyhow::bail!("Grid size {} has no square box layout", n);
        }

        for value in 0..n {
            for bx in 0..n {
                let lits: Vec<i32> = self
                    .board
                    .grid
                    .box_cells(bx)
                    .into_iter()
                    .map(|(row, col)| self.literals.literal(row, col, value))
                    .collect();
                self.exactly_one(&lits);
            }
        }

        Ok(())
    }

    /// Cells sharing a position across the boxes hold each digit exactly once
    fn encode_disjoint_groups(&mut self) -> Result<()> {
        let n = self.literals.side();
        if self.board.grid.box_side().is_none() {
            anyhow::bail!("Grid size {} has no square box layout", n);
        }

        for value in 0..n {
            for pos in 0..n {
                let lits: Vec<i32> = self
                    .board
                    .grid
                    .box_position_cells(pos)
                    .into_iter()
                    .map(|(row, col)| self.literals.literal(row, col, value))
                    .collect();
                self.exactly_one(&lits);
            }
        }

        Ok(())
    }

    /// Unit clauses pinning given and filled digits
    fn encode_fixed_digits(&mut self, id: &str, digits: &BTreeMap<usize, u8>) -> Result<()> {
        let n = self.literals.side();

        for (&cell, &digit) in digits {
            if cell >= self.board.grid.cell_count() {
                anyhow::bail!("Element '{}': cell index {} is outside the grid", id, cell);
            }
            if digit == 0 || digit as usize > n {
                anyhow::bail!(
                    "Element '{}': digit {} for cell {} is outside 1..={}",
                    id,
                    digit,
                    cell,
                    n
                );
            }

            let (row, col) = self.board.grid.cell_position(cell);
            let literal = self.literals.literal(row, col, digit as usize - 1);
            self.clauses.push(Clause::unit(literal));
        }

        Ok(())
    }

    /// Equality sums along little-killer diagonals. Clues without a numeric
    /// sum carry no constraint; clues whose diagonal resolves to no cells
    /// are skipped with a warning.
    fn encode_little_killer(&mut self, id: &str, clues: &BTreeMap<usize, Option<i64>>) {
        let n = self.literals.side();

        for (&diagonal, &sum) in clues {
            let Some(sum) = sum else {
                continue;
            };

            let cells = self.board.grid.diagonal_cells(diagonal);
            if cells.is_empty() {
                eprintln!(
                    "Warning: element '{}': diagonal {} does not exist on this grid",
                    id, diagonal
                );
                continue;
            }

            let mut weights = Vec::with_capacity(cells.len() * n);
            let mut lits = Vec::with_capacity(cells.len() * n);
            for &(row, col) in &cells {
                for value in 0..n {
                    weights.push(value as i64 + 1);
                    lits.push(self.literals.literal(row, col, value));
                }
            }

            self.next_var = pb::encode_both(&weights, &lits, sum, sum, &mut self.clauses, self.next_var);
        }
    }

    fn exactly_one(&mut self, lits: &[i32]) {
        self.next_var = pb::encode_exactly_one(lits, &mut self.clauses, self.next_var);
    }
}
