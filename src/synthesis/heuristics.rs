// Structural statistics over a puzzle's training examples.
//
// Everything here is a snapshot: recomputed on every call, never mutated
// after construction. Color deltas are taken over the union of all
// examples, not per example, so a color that appears in some output and
// some (other) input is neither created nor removed.

use std::collections::BTreeSet;

use serde::Serialize;

use super::dsl::{Grid, grid_dimensions, color_set};
use crate::perception::grid::Puzzle;

/// (height, width)
pub type Shape = (usize, usize);

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PuzzleStatistics {
    pub train_count: usize,
    /// Absent when the puzzle has no training examples.
    pub train: Option<TrainStatistics>,
    /// Absent without a test input, or without training examples.
    pub test: Option<TestStatistics>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainStatistics {
    pub input_shapes: Vec<Shape>,
    pub output_shapes: Vec<Shape>,
    pub consistent_shapes: bool,
    pub shape_changes: Vec<bool>,
    pub input_colors: BTreeSet<u8>,
    pub output_colors: BTreeSet<u8>,
    pub new_colors: BTreeSet<u8>,
    pub removed_colors: BTreeSet<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestStatistics {
    pub shape: Shape,
    pub colors: BTreeSet<u8>,
}

impl PuzzleStatistics {
    pub fn is_empty(&self) -> bool {
        self.train.is_none()
    }
}

impl TrainStatistics {
    pub fn any_shape_change(&self) -> bool {
        self.shape_changes.iter().any(|&c| c)
    }

    pub fn distinct_input_shapes(&self) -> BTreeSet<Shape> {
        self.input_shapes.iter().copied().collect()
    }

    pub fn distinct_output_shapes(&self) -> BTreeSet<Shape> {
        self.output_shapes.iter().copied().collect()
    }
}

pub fn analyze_puzzle(puzzle: &Puzzle) -> PuzzleStatistics {
    let train_count = puzzle.train.len();
    if train_count == 0 {
        return PuzzleStatistics::default();
    }

    let input_shapes: Vec<Shape> = puzzle.train.iter().map(|ex| grid_dimensions(&ex.input)).collect();
    let output_shapes: Vec<Shape> = puzzle.train.iter().map(|ex| grid_dimensions(&ex.output)).collect();
    let shape_changes = input_shapes.iter().zip(&output_shapes).map(|(i, o)| i != o).collect();

    let input_colors = union_colors(puzzle.train.iter().map(|ex| &ex.input));
    let output_colors = union_colors(puzzle.train.iter().map(|ex| &ex.output));
    let new_colors = output_colors.difference(&input_colors).copied().collect();
    let removed_colors = input_colors.difference(&output_colors).copied().collect();

    let mut train = TrainStatistics {
        input_shapes,
        output_shapes,
        consistent_shapes: false,
        shape_changes,
        input_colors,
        output_colors,
        new_colors,
        removed_colors,
    };
    train.consistent_shapes = train.distinct_input_shapes().len() == 1
        && train.distinct_output_shapes().len() == 1;

    let test = puzzle.test_input.as_ref().map(|g| TestStatistics {
        shape: grid_dimensions(g),
        colors: color_set(g),
    });

    PuzzleStatistics { train_count, train: Some(train), test }
}

fn union_colors<'a>(grids: impl Iterator<Item = &'a Grid>) -> BTreeSet<u8> {
    grids.flat_map(|g| color_set(g)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perception::grid::TrainExample;

    fn colors(v: &[u8]) -> BTreeSet<u8> {
        v.iter().copied().collect()
    }

    #[test]
    fn empty_training_gives_empty_record() {
        let p = Puzzle::new(vec![], Some(vec![vec![1]]));
        let stats = analyze_puzzle(&p);
        assert!(stats.is_empty());
        assert_eq!(stats.train_count, 0);
        assert!(stats.test.is_none());
    }

    #[test]
    fn shapes_and_consistency() {
        let p = Puzzle::new(vec![
            TrainExample::new(vec![vec![1, 2]], vec![vec![1, 2], vec![1, 2]]),
            TrainExample::new(vec![vec![3, 4]], vec![vec![3, 4], vec![3, 4]]),
        ], Some(vec![vec![5, 6, 7]]));
        let stats = analyze_puzzle(&p);
        let train = stats.train.as_ref().unwrap();
        assert_eq!(train.input_shapes, vec![(1, 2), (1, 2)]);
        assert_eq!(train.output_shapes, vec![(2, 2), (2, 2)]);
        assert!(train.consistent_shapes);
        assert_eq!(train.shape_changes, vec![true, true]);
        assert!(train.any_shape_change());
        let test = stats.test.unwrap();
        assert_eq!(test.shape, (1, 3));
        assert_eq!(test.colors, colors(&[5, 6, 7]));
    }

    #[test]
    fn inconsistent_shapes_detected() {
        let p = Puzzle::new(vec![
            TrainExample::new(vec![vec![1]], vec![vec![1]]),
            TrainExample::new(vec![vec![1, 1]], vec![vec![1, 1]]),
        ], None);
        let train = analyze_puzzle(&p).train.unwrap();
        assert!(!train.consistent_shapes);
        assert!(!train.any_shape_change());
        assert_eq!(train.distinct_input_shapes().len(), 2);
    }

    #[test]
    fn color_deltas_use_union_across_examples() {
        // Color 3 is created in example 1 but is an input color of example 2,
        // so overall it is neither new nor removed.
        let p = Puzzle::new(vec![
            TrainExample::new(vec![vec![0, 1]], vec![vec![0, 3]]),
            TrainExample::new(vec![vec![3, 2]], vec![vec![3, 4]]),
        ], None);
        let train = analyze_puzzle(&p).train.unwrap();
        assert_eq!(train.input_colors, colors(&[0, 1, 2, 3]));
        assert_eq!(train.output_colors, colors(&[0, 3, 4]));
        assert_eq!(train.new_colors, colors(&[4]));
        assert_eq!(train.removed_colors, colors(&[1, 2]));
    }
}
