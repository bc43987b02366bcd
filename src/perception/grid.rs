use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::{Serialize, Deserialize};

use crate::core::{Result, SolveError};
use crate::synthesis::dsl::{Grid, validate_grid};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainExample {
    pub input: Grid,
    pub output: Grid,
}

impl TrainExample {
    pub fn new(input: Grid, output: Grid) -> Self {
        Self { input, output }
    }
}

/// One puzzle: training pairs plus the held-out test input. `test_output`
/// is only present when evaluating against known answers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Puzzle {
    pub id: String,
    pub train: Vec<TrainExample>,
    pub test_input: Option<Grid>,
    pub test_output: Option<Grid>,
}

impl Puzzle {
    pub fn new(train: Vec<TrainExample>, test_input: Option<Grid>) -> Self {
        Self { id: String::new(), train, test_input, test_output: None }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_test_output(mut self, output: Grid) -> Self {
        self.test_output = Some(output);
        self
    }

    /// Every grid the puzzle carries must be non-empty, rectangular and in range.
    pub fn validate(&self) -> Result<()> {
        for ex in &self.train {
            validate_grid(&ex.input)?;
            validate_grid(&ex.output)?;
        }
        self.validate_test()
    }

    /// Only the test grids. Bad training data is left for the solver, which
    /// falls back to its default strategy on it.
    pub fn validate_test(&self) -> Result<()> {
        if let Some(g) = &self.test_input {
            validate_grid(g)?;
        }
        if let Some(g) = &self.test_output {
            validate_grid(g)?;
        }
        Ok(())
    }
}

// --- On-disk record shapes ---

#[derive(Debug, Deserialize)]
struct RawPuzzle {
    #[serde(default)]
    train: Vec<TrainExample>,
    #[serde(default)]
    test: Option<RawTest>,
}

/// The notebook form carries a single test object, the dataset files an array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTest {
    One(RawTestCase),
    Many(Vec<RawTestCase>),
}

#[derive(Debug, Default, Deserialize)]
struct RawTestCase {
    #[serde(default)]
    input: Option<Grid>,
    #[serde(default)]
    output: Option<Grid>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSolution {
    One(Grid),
    Many(Vec<Grid>),
}

impl RawPuzzle {
    fn into_puzzle(self, id: String) -> Puzzle {
        let case = match self.test {
            Some(RawTest::One(case)) => case,
            Some(RawTest::Many(cases)) => cases.into_iter().next().unwrap_or_default(),
            None => RawTestCase::default(),
        };
        Puzzle { id, train: self.train, test_input: case.input, test_output: case.output }
    }
}

/// Puzzles whose test grids failed validation are returned separately
/// so one bad record never aborts a batch.
#[derive(Debug, Default)]
pub struct Collection {
    pub puzzles: Vec<Puzzle>,
    pub rejected: Vec<(String, SolveError)>,
}

pub fn parse_challenges(json: &str) -> anyhow::Result<Collection> {
    let raw: BTreeMap<String, RawPuzzle> = serde_json::from_str(json)
        .context("challenge collection is not an id -> puzzle object")?;
    let mut collection = Collection::default();
    for (id, record) in raw {
        let puzzle = record.into_puzzle(id);
        match puzzle.validate_test() {
            Ok(()) => collection.puzzles.push(puzzle),
            Err(e) => {
                tracing::warn!(puzzle = %puzzle.id, error = %e, "rejecting malformed puzzle");
                collection.rejected.push((puzzle.id, e));
            }
        }
    }
    Ok(collection)
}

pub fn load_challenges(path: &Path) -> anyhow::Result<Collection> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    parse_challenges(&content).with_context(|| format!("cannot parse {}", path.display()))
}

/// Solutions map an id to a grid, or to a list of grids (first one used).
pub fn parse_solutions(json: &str) -> anyhow::Result<BTreeMap<String, Grid>> {
    let raw: BTreeMap<String, RawSolution> = serde_json::from_str(json)
        .context("solutions file is not an id -> grid object")?;
    Ok(raw.into_iter()
        .filter_map(|(id, sol)| match sol {
            RawSolution::One(g) => Some((id, g)),
            RawSolution::Many(gs) => gs.into_iter().next().map(|g| (id, g)),
        })
        .collect())
}

pub fn load_solutions(path: &Path) -> anyhow::Result<BTreeMap<String, Grid>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    parse_solutions(&content).with_context(|| format!("cannot parse {}", path.display()))
}

/// Returns how many puzzles received an expected output.
pub fn attach_solutions(puzzles: &mut [Puzzle], solutions: &BTreeMap<String, Grid>) -> usize {
    let mut attached = 0;
    for p in puzzles.iter_mut() {
        if let Some(g) = solutions.get(&p.id) {
            p.test_output = Some(g.clone());
            attached += 1;
        }
    }
    attached
}

pub fn grid_to_string(grid: &Grid) -> String {
    grid.iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}
