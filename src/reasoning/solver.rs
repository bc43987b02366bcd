// Strategy dispatch for a single puzzle.
//
// A perfect transformation match is replayed on the test input. Anything
// else, including a classification that failed on malformed training
// data, goes to the default strategy: run every transformation on the
// test input and keep the candidate whose color set best overlaps the
// input's. The overlap score is a weak proxy (it ignores shape and cell
// positions), so a default answer is a guess, not a derivation.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, warn};

use super::classifier::Classifier;
use crate::core::{Category, Classification, Result, SolveError};
use crate::perception::grid::Puzzle;
use crate::synthesis::dsl::{Grid, Transform, TransformLibrary, color_set};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Strategy {
    Replay { transform: Transform },
    Default { transform: Transform, score: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub grid: Grid,
    pub classification: Classification,
    pub strategy: Strategy,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    Solved(Solution),
    NoSolution,
}

impl SolveOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, SolveOutcome::Solved(_))
    }

    pub fn grid(&self) -> Option<&Grid> {
        match self {
            SolveOutcome::Solved(s) => Some(&s.grid),
            SolveOutcome::NoSolution => None,
        }
    }

    pub fn into_grid(self) -> Option<Grid> {
        match self {
            SolveOutcome::Solved(s) => Some(s.grid),
            SolveOutcome::NoSolution => None,
        }
    }
}

/// Stateless apart from the borrowed library; safe to share across threads.
#[derive(Debug, Clone)]
pub struct Solver<'a> {
    library: &'a TransformLibrary,
    classifier: Classifier<'a>,
}

impl<'a> Solver<'a> {
    pub fn new(library: &'a TransformLibrary) -> Self {
        Self { library, classifier: Classifier::new(library) }
    }

    pub fn library(&self) -> &TransformLibrary {
        self.library
    }

    pub fn solve(&self, puzzle: &Puzzle) -> SolveOutcome {
        let Some(test_input) = puzzle.test_input.as_ref() else {
            debug!(puzzle = %puzzle.id, "no test input");
            return SolveOutcome::NoSolution;
        };

        let classification = match self.classifier.try_classify(puzzle) {
            Ok(c) => c,
            Err(e) => {
                warn!(puzzle = %puzzle.id, error = %e, "classification failed, using default strategy");
                Classification::unknown()
            }
        };

        if let (Category::Transformation, Some(t)) = (classification.category, classification.subtype) {
            match self.replay(t, test_input) {
                Ok((transform, grid)) => {
                    debug!(puzzle = %puzzle.id, transform = %transform, "replaying matched transformation");
                    return SolveOutcome::Solved(Solution {
                        grid,
                        classification,
                        strategy: Strategy::Replay { transform },
                    });
                }
                Err(e) => {
                    warn!(puzzle = %puzzle.id, error = %e, "replay failed, using default strategy");
                }
            }
        }

        match self.solve_default(test_input) {
            Some((transform, grid, score)) => {
                debug!(puzzle = %puzzle.id, transform = %transform, score, "default strategy");
                SolveOutcome::Solved(Solution {
                    grid,
                    classification,
                    strategy: Strategy::Default { transform, score },
                })
            }
            None => SolveOutcome::NoSolution,
        }
    }

    fn replay(&self, t: Transform, test_input: &Grid) -> Result<(Transform, Grid)> {
        let transform = self.library.get(t.name())
            .ok_or_else(|| SolveError::UnknownTransform(t.name().to_string()))?;
        Ok((transform, transform.try_apply(test_input)?))
    }

    /// Best candidate by color overlap; the first of equal scores is kept.
    /// `None` only if no transformation accepts the test input.
    pub fn solve_default(&self, test_input: &Grid) -> Option<(Transform, Grid, f64)> {
        let input_colors = color_set(test_input);
        let mut best: Option<(Transform, Grid, f64)> = None;
        for &t in self.library.list() {
            let candidate = match t.try_apply(test_input) {
                Ok(g) => g,
                Err(_) => continue,
            };
            let score = color_overlap(&input_colors, &color_set(&candidate));
            let better = match &best {
                Some((_, _, best_score)) => score > *best_score,
                None => true,
            };
            if better {
                best = Some((t, candidate, score));
            }
        }
        best
    }
}

/// |a ∩ b| / max(|a|, |b|)
pub fn color_overlap(a: &BTreeSet<u8>, b: &BTreeSet<u8>) -> f64 {
    let denom = a.len().max(b.len());
    if denom == 0 { return 0.0; }
    a.intersection(b).count() as f64 / denom as f64
}

pub fn solve(puzzle: &Puzzle, library: &TransformLibrary) -> SolveOutcome {
    Solver::new(library).solve(puzzle)
}
