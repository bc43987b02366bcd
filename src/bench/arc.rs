// Batch driver: solve every puzzle of a collection independently and
// guarantee a submission entry wherever a test input exists.
//
// Puzzles share nothing, so they are solved on the rayon pool when the
// config allows it. Identical puzzles are solved once and the prediction
// copied, which keeps re-solving idempotent by construction.

use std::collections::BTreeMap;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::core::{Classification, SolverConfig};
use crate::perception::grid::Puzzle;
use crate::reasoning::classifier::Classifier;
use crate::reasoning::solver::{SolveOutcome, Solver, Strategy};
use crate::synthesis::dsl::{Grid, Transform, TransformLibrary};
use crate::synthesis::fingerprint::group_identical;

/// The color swap substituted when the solver yields nothing.
pub const FALLBACK_TRANSFORM: Transform = Transform::InvertColors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionSource {
    Transformation,
    Default,
    Fallback,
    Failed,
}

impl PredictionSource {
    pub fn name(self) -> &'static str {
        match self {
            PredictionSource::Transformation => "transformation",
            PredictionSource::Default => "default",
            PredictionSource::Fallback => "fallback",
            PredictionSource::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PuzzleReport {
    pub puzzle_id: String,
    pub classification: Classification,
    pub source: PredictionSource,
    pub strategy: Option<Strategy>,
    pub prediction: Option<Grid>,
    /// Only known when the puzzle carries its expected test output.
    pub correct: Option<bool>,
    pub elapsed_us: u64,
}

#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub reports: Vec<PuzzleReport>,
    pub submission: BTreeMap<String, Grid>,
}

pub fn fallback_prediction(puzzle: &Puzzle) -> Option<Grid> {
    let input = puzzle.test_input.as_ref()?;
    FALLBACK_TRANSFORM.try_apply(input).ok()
}

pub fn solve_puzzle(solver: &Solver<'_>, puzzle: &Puzzle, config: &SolverConfig) -> PuzzleReport {
    let start = Instant::now();
    let (classification, source, strategy, prediction) = match solver.solve(puzzle) {
        SolveOutcome::Solved(s) => {
            let source = match s.strategy {
                Strategy::Replay { .. } => PredictionSource::Transformation,
                Strategy::Default { .. } => PredictionSource::Default,
            };
            (s.classification, source, Some(s.strategy), Some(s.grid))
        }
        SolveOutcome::NoSolution => {
            let classification = Classifier::new(solver.library()).classify(puzzle);
            let fallback = if config.fallback_swap { fallback_prediction(puzzle) } else { None };
            match fallback {
                Some(grid) => {
                    warn!(puzzle = %puzzle.id, "solver produced nothing, using fallback swap");
                    (classification, PredictionSource::Fallback, None, Some(grid))
                }
                None => {
                    warn!(puzzle = %puzzle.id, "no prediction for puzzle");
                    (classification, PredictionSource::Failed, None, None)
                }
            }
        }
    };

    let correct = puzzle.test_output.as_ref().map(|expected| prediction.as_ref() == Some(expected));
    PuzzleReport {
        puzzle_id: puzzle.id.clone(),
        classification,
        source,
        strategy,
        prediction,
        correct,
        elapsed_us: start.elapsed().as_micros() as u64,
    }
}

/// Solve a collection in input order. A failure on one puzzle only
/// affects that puzzle's report.
pub fn solve_collection(puzzles: &[Puzzle], config: &SolverConfig) -> BatchOutcome {
    let puzzles = match config.max_puzzles {
        Some(max) => &puzzles[..max.min(puzzles.len())],
        None => puzzles,
    };
    let library = TransformLibrary::with_expand_factor(config.expand_factor);
    let solver = Solver::new(&library);

    let groups: Vec<Vec<usize>> = if config.memoize {
        group_identical(puzzles)
    } else {
        (0..puzzles.len()).map(|i| vec![i]).collect()
    };
    debug!(puzzles = puzzles.len(), distinct = groups.len(), "solving collection");

    let solve_rep = |group: &Vec<usize>| solve_puzzle(&solver, &puzzles[group[0]], config);
    let rep_reports: Vec<PuzzleReport> = if config.parallel {
        groups.par_iter().map(solve_rep).collect()
    } else {
        groups.iter().map(solve_rep).collect()
    };

    let mut slots: Vec<Option<PuzzleReport>> = vec![None; puzzles.len()];
    for (group, report) in groups.iter().zip(rep_reports) {
        for &i in group {
            let puzzle = &puzzles[i];
            let mut copy = report.clone();
            copy.puzzle_id = puzzle.id.clone();
            copy.correct = puzzle.test_output.as_ref()
                .map(|expected| copy.prediction.as_ref() == Some(expected));
            slots[i] = Some(copy);
        }
    }

    let reports: Vec<PuzzleReport> = slots.into_iter().flatten().collect();
    let submission = reports.iter()
        .filter_map(|r| r.prediction.clone().map(|g| (r.puzzle_id.clone(), g)))
        .collect();
    BatchOutcome { reports, submission }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Category;
    use crate::perception::grid::TrainExample;

    fn flip_puzzle(id: &str) -> Puzzle {
        Puzzle::new(vec![
            TrainExample::new(vec![vec![1, 2]], vec![vec![2, 1]]),
            TrainExample::new(vec![vec![3, 0, 4]], vec![vec![4, 0, 3]]),
        ], Some(vec![vec![5, 6, 0]])).with_id(id)
    }

    fn serial() -> SolverConfig {
        SolverConfig { parallel: false, ..SolverConfig::default() }
    }

    #[test]
    fn replayed_prediction_lands_in_submission() {
        let puzzles = vec![flip_puzzle("a").with_test_output(vec![vec![0, 6, 5]])];
        let out = solve_collection(&puzzles, &serial());
        assert_eq!(out.reports.len(), 1);
        let r = &out.reports[0];
        assert_eq!(r.source, PredictionSource::Transformation);
        assert_eq!(r.classification.category, Category::Transformation);
        assert_eq!(r.correct, Some(true));
        assert_eq!(out.submission["a"], vec![vec![0, 6, 5]]);
    }

    #[test]
    fn missing_test_input_fails_without_entry() {
        let puzzles = vec![
            Puzzle::new(vec![TrainExample::new(vec![vec![1]], vec![vec![1]])], None).with_id("x"),
            flip_puzzle("y"),
        ];
        let out = solve_collection(&puzzles, &serial());
        assert_eq!(out.reports[0].source, PredictionSource::Failed);
        assert_eq!(out.reports[0].prediction, None);
        assert!(!out.submission.contains_key("x"));
        assert!(out.submission.contains_key("y"));
    }

    #[test]
    fn ragged_test_input_gets_no_fallback() {
        let p = Puzzle::new(vec![TrainExample::new(vec![vec![1]], vec![vec![1]])], Some(vec![vec![0, 1], vec![1]]))
            .with_id("r");
        let report = solve_puzzle(&Solver::new(&TransformLibrary::standard()), &p, &serial());
        assert_eq!(report.source, PredictionSource::Failed);
    }

    #[test]
    fn fallback_swaps_zero_and_one() {
        let p = Puzzle::new(vec![], Some(vec![vec![0, 1, 2]]));
        assert_eq!(fallback_prediction(&p), Some(vec![vec![1, 0, 2]]));
        assert_eq!(fallback_prediction(&Puzzle::default()), None);
    }

    #[test]
    fn parallel_and_memoized_runs_agree_with_serial() {
        let puzzles = vec![
            flip_puzzle("a"),
            Puzzle::new(vec![TrainExample::new(vec![vec![0]], vec![vec![7]])], Some(vec![vec![3, 3]])).with_id("b"),
            flip_puzzle("c"),
        ];
        let plain = solve_collection(&puzzles, &SolverConfig { memoize: false, ..serial() });
        let fast = solve_collection(&puzzles, &SolverConfig::default());
        assert_eq!(plain.submission, fast.submission);
        let ids: Vec<&str> = fast.reports.iter().map(|r| r.puzzle_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(fast.submission["a"], fast.submission["c"]);
    }

    #[test]
    fn max_puzzles_truncates() {
        let puzzles = vec![flip_puzzle("a"), flip_puzzle("b")];
        let out = solve_collection(&puzzles, &SolverConfig { max_puzzles: Some(1), ..serial() });
        assert_eq!(out.reports.len(), 1);
    }

    #[test]
    fn huge_expand_factor_does_not_abort_batch() {
        let puzzles = vec![
            Puzzle::new(vec![TrainExample::new(vec![vec![0]], vec![vec![2]])], Some(vec![vec![3]])).with_id("tiny"),
        ];
        let config = SolverConfig { expand_factor: usize::MAX, ..serial() };
        let out = solve_collection(&puzzles, &config);
        assert_eq!(out.reports.len(), 1);
        assert_eq!(out.submission["tiny"], vec![vec![3]]);
    }

    #[test]
    fn empty_library_falls_back_to_color_swap() {
        let library = TransformLibrary::from_entries(Vec::new());
        let p = Puzzle::new(vec![TrainExample::new(vec![vec![1]], vec![vec![1]])], Some(vec![vec![0, 1], vec![2, 0]]))
            .with_id("bare")
            .with_test_output(vec![vec![1, 0], vec![2, 1]]);
        let report = solve_puzzle(&Solver::new(&library), &p, &serial());
        assert_eq!(report.source, PredictionSource::Fallback);
        assert_eq!(report.strategy, None);
        assert_eq!(report.prediction, Some(vec![vec![1, 0], vec![2, 1]]));
        assert_eq!(report.correct, Some(true));

        let no_swap = SolverConfig { fallback_swap: false, ..serial() };
        assert_eq!(solve_puzzle(&Solver::new(&library), &p, &no_swap).source, PredictionSource::Failed);
    }
}
