use std::fmt;

use crate::core::{Category, Classification};
use crate::synthesis::heuristics::{PuzzleStatistics, TrainStatistics};

/// One (predicate, outcome) pair of the fallback cascade.
#[derive(Clone)]
pub struct Rule {
    pub category: Category,
    pub confidence: f64,
    pub holds: fn(&TrainStatistics) -> bool,
}

impl Rule {
    pub fn new(category: Category, confidence: f64, holds: fn(&TrainStatistics) -> bool) -> Self {
        Self { category, confidence, holds }
    }

    pub fn outcome(&self) -> Classification {
        Classification::heuristic(self.category, self.confidence)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("category", &self.category)
            .field("confidence", &self.confidence)
            .finish_non_exhaustive()
    }
}

/// Ordered rules, first match wins.
#[derive(Debug, Clone)]
pub struct RuleList {
    rules: Vec<Rule>,
}

impl RuleList {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn standard() -> Self {
        let mut list = Self::new();
        list.push(Rule::new(Category::SizeChange, 0.7, |s| s.any_shape_change()));
        list.push(Rule::new(Category::ValueCreation, 0.8, |s| !s.new_colors.is_empty()));
        list.push(Rule::new(Category::ValueRemoval, 0.8, |s| !s.removed_colors.is_empty()));
        list.push(Rule::new(Category::PatternManipulation, 0.6, |s| s.consistent_shapes));
        list
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn first_match(&self, stats: &TrainStatistics) -> Option<&Rule> {
        self.rules.iter().find(|r| (r.holds)(stats))
    }

    /// Unknown with zero confidence when there are no training statistics
    /// or no rule holds.
    pub fn evaluate(&self, stats: &PuzzleStatistics) -> Classification {
        stats.train.as_ref()
            .and_then(|t| self.first_match(t))
            .map(Rule::outcome)
            .unwrap_or_else(Classification::unknown)
    }
}

impl Default for RuleList {
    fn default() -> Self {
        Self::standard()
    }
}
