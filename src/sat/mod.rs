//! SAT solving components: variable numbering, PB encoding, constraint
//! compilation, and the CaDiCaL-backed solution enumerator

pub mod constraints;
pub mod encoder;
pub mod pb;
pub mod solver;
pub mod variables;

pub use constraints::{Clause, CompiledBoard, ConstraintCompiler};
pub use encoder::{cant_attempt, solve_board, solve_board_with};
pub use solver::{CadicalBackend, CancelToken, SatBackend, SolveStatus};
pub use variables::LiteralMap;
