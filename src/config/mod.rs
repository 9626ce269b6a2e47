//! Configuration management for the variant sudoku solver

pub mod settings;

pub use settings::{CliOverrides, OutputFormat, RuleConfig, Settings, SolverConfig};
