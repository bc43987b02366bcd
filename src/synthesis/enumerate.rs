use serde::Serialize;

use super::dsl::{Grid, Transform, TransformLibrary};
use crate::core::{Result, SolveError};
use crate::perception::grid::{Puzzle, TrainExample};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransformScore {
    pub transform: Transform,
    pub matched: usize,
    pub total: usize,
}

impl TransformScore {
    pub fn rate(&self) -> f64 {
        if self.total == 0 { 0.0 } else { self.matched as f64 / self.total as f64 }
    }

    pub fn is_perfect(&self) -> bool {
        self.total > 0 && self.matched == self.total
    }
}

/// Match rate per library entry, kept in library order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchScores {
    scores: Vec<TransformScore>,
}

impl MatchScores {
    pub fn iter(&self) -> impl Iterator<Item = &TransformScore> {
        self.scores.iter()
    }

    pub fn rate(&self, name: &str) -> Option<f64> {
        self.scores.iter().find(|s| s.transform.name() == name).map(|s| s.rate())
    }

    /// First transformation (in library order) reproducing every example.
    pub fn first_perfect(&self) -> Option<Transform> {
        self.scores.iter().find(|s| s.is_perfect()).map(|s| s.transform)
    }

    /// Highest rate; ties keep the earliest entry.
    pub fn best(&self) -> Option<&TransformScore> {
        self.scores.iter().fold(None, |best: Option<&TransformScore>, s| match best {
            Some(b) if s.matched <= b.matched => Some(b),
            _ => Some(s),
        })
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Score every library transformation against every training example.
/// `Ok(None)` when the puzzle has no training examples; `Err` when a
/// training input is not a well-formed grid.
pub fn match_transforms(puzzle: &Puzzle, library: &TransformLibrary) -> Result<Option<MatchScores>> {
    if puzzle.train.is_empty() {
        return Ok(None);
    }
    let total = puzzle.train.len();
    let mut scores = Vec::with_capacity(library.len());
    for &t in library.list() {
        let matched = count_matches(&t, &puzzle.train)?;
        scores.push(TransformScore { transform: t, matched, total });
    }
    Ok(Some(MatchScores { scores }))
}

fn count_matches(t: &Transform, examples: &[TrainExample]) -> Result<usize> {
    let mut matched = 0;
    for ex in examples {
        if reproduces(t, &ex.input, &ex.output)? {
            matched += 1;
        }
    }
    Ok(matched)
}

/// Exact shape-and-value equality; no partial credit. An `expand` too
/// large for the input simply does not match.
fn reproduces(t: &Transform, input: &Grid, expected: &Grid) -> Result<bool> {
    match t.try_apply(input) {
        Ok(grid) => Ok(grid == *expected),
        Err(SolveError::InvalidFactor(_)) => Ok(false),
        Err(e) => Err(e),
    }
}
