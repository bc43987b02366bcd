//! Grid puzzle solver CLI.
//!
//! Commands:
//! - solve: solve a challenge collection and write a submission file
//! - evaluate: solve against known answers and report accuracy
//! - classify: print each puzzle's statistics, match rates and category

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use gridsolve::bench::runner::{run_collection, write_submission};
use gridsolve::core::config::check_expand_factor;
use gridsolve::core::SolverConfig;
use gridsolve::perception::grid::{grid_to_string, load_challenges, Puzzle};
use gridsolve::reasoning::classifier::Classifier;
use gridsolve::synthesis::dsl::TransformLibrary;
use gridsolve::synthesis::enumerate::match_transforms;
use gridsolve::synthesis::heuristics::analyze_puzzle;

#[derive(Parser)]
#[command(name = "gridsolve")]
#[command(version)]
#[command(about = "Classify grid puzzles and predict their test outputs")]
struct Cli {
    /// JSON config file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scale factor for the expand transformation
    #[arg(long)]
    expand_factor: Option<usize>,

    /// Only process the first N puzzles
    #[arg(long)]
    max_puzzles: Option<usize>,

    /// Solve puzzles one at a time
    #[arg(long)]
    serial: bool,

    /// Leave unsolved puzzles out of the submission instead of using the color swap
    #[arg(long)]
    no_fallback: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a challenge collection and write the submission
    Solve {
        /// Challenge collection (id -> puzzle)
        challenges: PathBuf,

        /// Output file for the submission
        #[arg(long, default_value = "submission.json")]
        output: PathBuf,

        /// Print per-puzzle detail
        #[arg(long)]
        detail: bool,
    },

    /// Solve against known test outputs and report accuracy
    Evaluate {
        /// Challenge collection (id -> puzzle)
        challenges: PathBuf,

        /// Expected outputs (id -> grid or id -> [grid])
        #[arg(long)]
        solutions: Option<PathBuf>,

        /// Write the full report as JSON
        #[arg(long)]
        report: Option<PathBuf>,

        /// Print per-puzzle detail
        #[arg(long)]
        detail: bool,
    },

    /// Print analysis and classification for each puzzle
    Classify {
        /// Challenge collection (id -> puzzle)
        challenges: PathBuf,

        /// Number of puzzles to show
        #[arg(long, default_value = "5")]
        limit: usize,

        /// Also print the grids
        #[arg(long)]
        grids: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    let config = resolve_config(&cli)?;

    match cli.command {
        Commands::Solve { challenges, output, detail } => {
            let (outcome, report) = run_collection(&challenges, None, &config)?;
            write_submission(&output, &outcome.submission)?;
            if detail { report.print_detail() } else { report.print_summary() }
        }

        Commands::Evaluate { challenges, solutions, report: report_path, detail } => {
            let (_, report) = run_collection(&challenges, solutions.as_deref(), &config)?;
            if detail { report.print_detail() } else { report.print_summary() }
            if let Some(path) = report_path {
                std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
                println!("\nReport written to {}", path.display());
            }
        }

        Commands::Classify { challenges, limit, grids } => {
            let collection = load_challenges(&challenges)?;
            let library = TransformLibrary::with_expand_factor(config.expand_factor);
            for puzzle in collection.puzzles.iter().take(limit) {
                print_puzzle(puzzle, &library, grids);
            }
            for (id, err) in &collection.rejected {
                println!("\nPuzzle {}: rejected ({})", id, err);
            }
        }
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<SolverConfig> {
    let mut config = match &cli.config {
        Some(path) => SolverConfig::load(path)?,
        None => SolverConfig::default(),
    };
    if let Some(f) = cli.expand_factor {
        check_expand_factor(f)?;
        config.expand_factor = f;
    }
    if cli.max_puzzles.is_some() {
        config.max_puzzles = cli.max_puzzles;
    }
    if cli.serial {
        config.parallel = false;
    }
    if cli.no_fallback {
        config.fallback_swap = false;
    }
    Ok(config)
}

fn print_puzzle(puzzle: &Puzzle, library: &TransformLibrary, grids: bool) {
    println!("\nPuzzle {}:", puzzle.id);
    let stats = analyze_puzzle(puzzle);
    println!("  training examples: {}", stats.train_count);
    if let Some(t) = &stats.train {
        println!("  input shapes: {:?}", t.input_shapes);
        println!("  output shapes: {:?}", t.output_shapes);
        println!("  consistent shapes: {}", t.consistent_shapes);
        println!("  input colors: {:?}", t.input_colors);
        println!("  output colors: {:?}", t.output_colors);
        if !t.new_colors.is_empty() {
            println!("  created colors: {:?}", t.new_colors);
        }
        if !t.removed_colors.is_empty() {
            println!("  removed colors: {:?}", t.removed_colors);
        }
    }
    match &stats.test {
        Some(test) => println!("  test input: {:?} colors {:?}", test.shape, test.colors),
        None => println!("  no test input"),
    }

    if let Ok(Some(scores)) = match_transforms(puzzle, library) {
        let rates: Vec<String> = scores.iter()
            .filter(|s| s.matched > 0)
            .map(|s| format!("{}={:.2}", s.transform, s.rate()))
            .collect();
        if !rates.is_empty() {
            println!("  match rates: {}", rates.join(", "));
        }
    }
    println!("  verdict: {}", Classifier::new(library).classify(puzzle));

    if grids {
        for (i, ex) in puzzle.train.iter().enumerate() {
            println!("  train {} input:\n{}", i + 1, indent(&grid_to_string(&ex.input)));
            println!("  train {} output:\n{}", i + 1, indent(&grid_to_string(&ex.output)));
        }
        if let Some(g) = &puzzle.test_input {
            println!("  test input:\n{}", indent(&grid_to_string(g)));
        }
    }
}

fn indent(s: &str) -> String {
    s.lines().map(|l| format!("    {}", l)).collect::<Vec<_>>().join("\n")
}
