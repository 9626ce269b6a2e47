//! SAT backend integration using CaDiCaL

use super::constraints::Clause;
use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cooperative cancellation token shared between the caller and the solver
/// driver. Cancellation is observed before each element is encoded and at
/// every solver slice boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a fresh, uncancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; the flag never resets
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Verdict of one time-sliced solve call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Satisfiable,
    Unsatisfiable,
    /// The slice budget ran out before a verdict was reached
    Undetermined,
}

/// Narrow interface to a SAT solver.
///
/// The driver owns exactly one backend per solve run and relies on `Drop`
/// for release, so the handle is freed on every exit path. Backends
/// translate signed clause literals into their own representation.
pub trait SatBackend {
    /// Announce the total variable count, base and auxiliary included
    fn declare_vars(&mut self, count: usize);

    /// Ingest one clause
    fn add_clause(&mut self, clause: &Clause) -> Result<()>;

    /// Run the solver for at most `budget`; a cancelled token also ends the
    /// slice early. Returns `Undetermined` when the slice ended without a
    /// verdict.
    fn solve_slice(&mut self, budget: Duration, cancel: &CancelToken) -> Result<SolveStatus>;

    /// Truth value of a variable in the current model. Only meaningful after
    /// `solve_slice` returned `Satisfiable`; unconstrained variables read as
    /// false.
    fn model_value(&self, var: i32) -> bool;

    /// Number of declared variables
    fn variable_count(&self) -> usize;

    /// Number of ingested clauses
    fn clause_count(&self) -> usize;
}

/// Terminate callback handed to CaDiCaL: ends the running solve call once
/// the slice deadline passes or the caller cancels.
#[derive(Debug)]
pub struct SliceControl {
    budget: Duration,
    deadline: Instant,
    cancel: CancelToken,
}

impl cadical::Callbacks for SliceControl {
    fn started(&mut self) {
        self.deadline = Instant::now() + self.budget;
    }

    fn terminate(&mut self) -> bool {
        self.cancel.is_cancelled() || Instant::now() >= self.deadline
    }
}

/// Production backend wrapping the CaDiCaL solver
pub struct CadicalBackend {
    solver: cadical::Solver<SliceControl>,
    variable_count: usize,
    clause_count: usize,
}

impl CadicalBackend {
    /// Create a new CaDiCaL instance
    pub fn new() -> Self {
        Self {
            solver: cadical::Solver::new(),
            variable_count: 0,
            clause_count: 0,
        }
    }
}

impl Default for CadicalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SatBackend for CadicalBackend {
    fn declare_vars(&mut self, count: usize) {
        // CaDiCaL grows its variable table on demand; only record the count
        self.variable_count = count;
    }

    fn add_clause(&mut self, clause: &Clause) -> Result<()> {
        if clause.is_empty() {
            anyhow::bail!("Cannot add empty clause (unsatisfiable)");
        }

        for &literal in &clause.literals {
            let var = literal.unsigned_abs() as usize;
            if var > self.variable_count {
                self.variable_count = var;
            }
        }

        self.solver.add_clause(clause.literals.iter().copied());
        self.clause_count += 1;
        Ok(())
    }

    fn solve_slice(&mut self, budget: Duration, cancel: &CancelToken) -> Result<SolveStatus> {
        self.solver.set_callbacks(Some(SliceControl {
            budget,
            deadline: Instant::now() + budget,
            cancel: cancel.clone(),
        }));

        match self.solver.solve() {
            Some(true) => Ok(SolveStatus::Satisfiable),
            Some(false) => Ok(SolveStatus::Unsatisfiable),
            None => Ok(SolveStatus::Undetermined),
        }
    }

    fn model_value(&self, var: i32) -> bool {
        self.solver.value(var).unwrap_or(false)
    }

    fn variable_count(&self) -> usize {
        self.variable_count
    }

    fn clause_count(&self) -> usize {
        self.clause_count
    }
}
