// Puzzle classification: a perfect transformation match dominates;
// otherwise the structural statistics go through the fixed rule list.

use tracing::{debug, warn};

use super::rules::RuleList;
use crate::core::{Classification, Result};
use crate::perception::grid::Puzzle;
use crate::synthesis::dsl::TransformLibrary;
use crate::synthesis::enumerate::match_transforms;
use crate::synthesis::heuristics::analyze_puzzle;

#[derive(Debug, Clone)]
pub struct Classifier<'a> {
    library: &'a TransformLibrary,
    rules: RuleList,
}

impl<'a> Classifier<'a> {
    pub fn new(library: &'a TransformLibrary) -> Self {
        Self { library, rules: RuleList::standard() }
    }

    pub fn with_rules(mut self, rules: RuleList) -> Self {
        self.rules = rules;
        self
    }

    /// Fails only when matching hits a malformed training grid.
    pub fn try_classify(&self, puzzle: &Puzzle) -> Result<Classification> {
        if let Some(scores) = match_transforms(puzzle, self.library)? {
            if let Some(t) = scores.first_perfect() {
                debug!(puzzle = %puzzle.id, transform = %t, "perfect transformation match");
                return Ok(Classification::transformation(t));
            }
        }
        let stats = analyze_puzzle(puzzle);
        let verdict = self.rules.evaluate(&stats);
        debug!(puzzle = %puzzle.id, verdict = %verdict, "classified by statistics");
        Ok(verdict)
    }

    /// Never fails: a malformed puzzle classifies as unknown.
    pub fn classify(&self, puzzle: &Puzzle) -> Classification {
        self.try_classify(puzzle).unwrap_or_else(|e| {
            warn!(puzzle = %puzzle.id, error = %e, "classification failed");
            Classification::unknown()
        })
    }
}

pub fn classify(puzzle: &Puzzle, library: &TransformLibrary) -> Classification {
    Classifier::new(library).classify(puzzle)
}
