//! Batch solving configuration.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::synthesis::dsl::{DEFAULT_EXPAND_FACTOR, MAX_EXPAND_FACTOR};

/// Knobs for the batch driver. Every field has a default, so a config
/// file only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Scale factor of the `expand` entry in the scan set, 1..=30
    pub expand_factor: usize,

    /// Substitute the 0/1 color swap of the test input when the solver
    /// produces nothing
    pub fallback_swap: bool,

    /// Solve puzzles on the rayon thread pool
    pub parallel: bool,

    /// Only solve the first N puzzles (by id)
    pub max_puzzles: Option<usize>,

    /// Reuse predictions for byte-identical puzzles within a batch
    pub memoize: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            expand_factor: DEFAULT_EXPAND_FACTOR,
            fallback_swap: true,
            parallel: true,
            max_puzzles: None,
            memoize: true,
        }
    }
}

impl SolverConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("cannot parse config {}", path.display()))?;
        check_expand_factor(config.expand_factor)?;
        Ok(config)
    }
}

pub fn check_expand_factor(factor: usize) -> anyhow::Result<()> {
    anyhow::ensure!(
        (1..=MAX_EXPAND_FACTOR).contains(&factor),
        "expand_factor must be between 1 and {}, got {}",
        MAX_EXPAND_FACTOR,
        factor
    );
    Ok(())
}
