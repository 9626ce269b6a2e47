//! Display and output formatting utilities

use crate::board::{CellSet, DigitMap, GridSize};
use crate::config::OutputFormat;
use anyhow::{Context, Result};
use std::path::Path;

/// Format digit maps and warning sets for console output
pub struct SolutionFormatter;

impl SolutionFormatter {
    /// Format a digit map as a grid; empty cells print as dots
    pub fn format_digits(grid: GridSize, digits: &DigitMap) -> String {
        let mut output = String::with_capacity(grid.cell_count() * 2 + grid.height);

        for row in 0..grid.height {
            for col in 0..grid.width {
                if col > 0 {
                    output.push(' ');
                }
                match digits.get(&grid.cell_index(row, col)) {
                    Some(digit) => output.push_str(&digit.to_string()),
                    None => output.push('.'),
                }
            }
            output.push('\n');
        }

        output
    }

    /// Format a digit map with warning cells marked by a trailing `!`
    pub fn format_digits_with_warnings(
        grid: GridSize,
        digits: &DigitMap,
        warnings: &CellSet,
    ) -> String {
        let mut output = String::new();

        for row in 0..grid.height {
            for col in 0..grid.width {
                if col > 0 {
                    output.push(' ');
                }
                let cell = grid.cell_index(row, col);
                match digits.get(&cell) {
                    Some(digit) => output.push_str(&digit.to_string()),
                    None => output.push('.'),
                }
                output.push(if warnings.contains(cell) { '!' } else { ' ' });
            }
            output.push('\n');
        }

        output
    }

    /// Format a summary line for an enumeration run
    pub fn format_run_summary(found: usize, max_solutions: usize, elapsed_secs: f64) -> String {
        let cap = if found >= max_solutions {
            " (limit reached)"
        } else {
            ""
        };
        format!("Found {found} solution(s){cap} in {elapsed_secs:.3}s")
    }

    /// Save solutions to a directory in the requested format
    pub fn save_solutions(
        solutions: &[DigitMap],
        grid: GridSize,
        directory: &Path,
        format: OutputFormat,
    ) -> Result<()> {
        std::fs::create_dir_all(directory)
            .with_context(|| format!("Failed to create directory: {}", directory.display()))?;

        match format {
            OutputFormat::Text => {
                for (i, solution) in solutions.iter().enumerate() {
                    let path = directory.join(format!("solution_{:03}.txt", i + 1));
                    std::fs::write(&path, Self::format_digits(grid, solution))
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                }
            }
            OutputFormat::Json => {
                let path = directory.join("solutions.json");
                let content = serde_json::to_string_pretty(solutions)
                    .context("Failed to serialize solutions")?;
                std::fs::write(&path, content)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
        }

        Ok(())
    }
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    /// Check if terminal supports color
    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err() && (std::env::var("TERM").unwrap_or_default() != "dumb")
    }

    /// Format success message
    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    /// Format error message
    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    /// Format warning message
    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    /// Format info message
    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}
