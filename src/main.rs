//! Main CLI application for the variant sudoku solver

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use variant_sudoku_solver::{
    board::load_board_from_file,
    config::{CliOverrides, Settings},
    sat::{cant_attempt, solve_board, CancelToken},
    utils::{ColorOutput, SolutionFormatter},
    warnings::evaluate_warnings_with,
};

#[derive(Parser)]
#[command(name = "variant_sudoku_solver")]
#[command(about = "SAT-based solver for variant sudoku boards")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enumerate solutions of a board
    Solve {
        /// Board file (YAML)
        board: PathBuf,

        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Maximum solutions to find (overrides config)
        #[arg(short, long)]
        max_solutions: Option<usize>,

        /// Solver slice budget in milliseconds (overrides config)
        #[arg(long)]
        slice_ms: Option<u64>,

        /// Directory to save solutions into
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Check whether the solver can attempt a board
    Check {
        /// Board file (YAML)
        board: PathBuf,
    },

    /// Report rule violations for the digits currently on a board
    Warnings {
        /// Board file (YAML)
        board: PathBuf,

        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            board,
            config,
            max_solutions,
            slice_ms,
            output,
            verbose,
        } => solve_command(board, config, max_solutions, slice_ms, output, verbose),
        Commands::Check { board } => check_command(board),
        Commands::Warnings { board, config } => warnings_command(board, config),
    }
}

fn load_settings(config_path: &PathBuf) -> Result<Settings> {
    if config_path.exists() {
        Settings::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))
    } else {
        Ok(Settings::default())
    }
}

fn solve_command(
    board_path: PathBuf,
    config_path: PathBuf,
    max_solutions: Option<usize>,
    slice_ms: Option<u64>,
    output: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let mut settings = load_settings(&config_path)?;
    settings.merge_with_cli(&CliOverrides {
        max_solutions,
        slice_ms,
    });
    settings.validate().context("Configuration validation failed")?;

    let board = load_board_from_file(&board_path)?;

    if verbose {
        println!("Board: {} ({} elements)", board.grid, board.elements.len());
        println!("Max solutions: {}", settings.solver.max_solutions);
        println!("Slice budget: {}ms", settings.solver.slice_ms);
        println!();
    }

    if let Some(reason) = cant_attempt(&board) {
        println!("{}", ColorOutput::error(&format!("Cannot attempt board: {reason}")));
        anyhow::bail!(reason);
    }

    let start_time = Instant::now();
    let mut solutions = Vec::new();

    solve_board(
        &board,
        &settings,
        |solution| match solution {
            Some(solution) => {
                solutions.push(solution.clone());
                println!(
                    "{}",
                    ColorOutput::info(&format!("Solution {}:", solutions.len()))
                );
                println!("{}", SolutionFormatter::format_digits(board.grid, solution));
            }
            None => {
                if verbose {
                    println!("Enumeration complete");
                }
            }
        },
        &CancelToken::new(),
    )
    .context("Solving failed")?;

    let elapsed = start_time.elapsed().as_secs_f64();
    if solutions.is_empty() {
        println!("{}", ColorOutput::warning("No solutions found"));
    } else {
        println!(
            "{}",
            ColorOutput::success(&SolutionFormatter::format_run_summary(
                solutions.len(),
                settings.solver.max_solutions,
                elapsed,
            ))
        );
    }

    if let Some(directory) = output {
        SolutionFormatter::save_solutions(
            &solutions,
            board.grid,
            &directory,
            settings.output.format,
        )
        .context("Failed to save solutions")?;
        println!("Solutions saved to {}", directory.display());
    }

    Ok(())
}

fn check_command(board_path: PathBuf) -> Result<()> {
    let board = load_board_from_file(&board_path)?;

    match cant_attempt(&board) {
        Some(reason) => {
            println!("{}", ColorOutput::error(&format!("Cannot attempt: {reason}")));
        }
        None => {
            println!("{}", ColorOutput::success("Board can be attempted"));
        }
    }

    Ok(())
}

fn warnings_command(board_path: PathBuf, config_path: PathBuf) -> Result<()> {
    let settings = load_settings(&config_path)?;
    let board = load_board_from_file(&board_path)?;
    let digits = board.digit_map();

    let warnings = evaluate_warnings_with(&board, &digits, &settings.rules);

    println!(
        "{}",
        SolutionFormatter::format_digits_with_warnings(board.grid, &digits, &warnings)
    );

    if warnings.is_empty() {
        println!("{}", ColorOutput::success("No rule violations"));
    } else {
        let cells: Vec<String> = warnings
            .iter()
            .map(|cell| {
                let (row, col) = board.grid.cell_position(cell);
                format!("({row}, {col})")
            })
            .collect();
        println!(
            "{}",
            ColorOutput::warning(&format!(
                "{} cell(s) violate a rule: {}",
                warnings.len(),
                cells.join(", ")
            ))
        );
    }

    Ok(())
}
