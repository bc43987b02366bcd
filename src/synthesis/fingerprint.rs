// Grid and puzzle fingerprints via a position-mixed FNV hash.
//
// Used by the batch driver to find byte-identical puzzles and solve each
// distinct one once. A fingerprint only buckets candidates; membership is
// always confirmed with a full content comparison, so a hash collision can
// never hand one puzzle another puzzle's prediction.

use rustc_hash::FxHashMap;

use super::dsl::Grid;
use crate::perception::grid::Puzzle;

const MIX_A: u64 = 0x517cc1b727220a95;
const MIX_B: u64 = 0x6c62272e07bb0142;
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

pub fn grid_fingerprint(grid: &Grid) -> u64 {
    let mut h = FNV_OFFSET;
    for (r, row) in grid.iter().enumerate() {
        for (c, &val) in row.iter().enumerate() {
            let cell = (r as u64).wrapping_mul(MIX_A)
                ^ (c as u64).wrapping_mul(MIX_B)
                ^ (val as u64);
            h = h.wrapping_mul(FNV_PRIME) ^ cell;
        }
        // Row boundaries, so [[1,2]] and [[1],[2]] differ.
        h = h.wrapping_mul(FNV_PRIME) ^ (row.len() as u64).rotate_left(32);
    }
    h
}

/// Covers training pairs and test input. Ignores the id and the expected
/// test output, neither of which influences a prediction.
pub fn puzzle_fingerprint(puzzle: &Puzzle) -> u64 {
    let mut h = FNV_OFFSET ^ puzzle.train.len() as u64;
    for ex in &puzzle.train {
        h = h.wrapping_mul(FNV_PRIME) ^ grid_fingerprint(&ex.input);
        h = h.wrapping_mul(FNV_PRIME) ^ grid_fingerprint(&ex.output).rotate_left(17);
    }
    match &puzzle.test_input {
        Some(g) => h.wrapping_mul(FNV_PRIME) ^ grid_fingerprint(g).rotate_left(31),
        None => h.wrapping_mul(FNV_PRIME),
    }
}

pub fn same_content(a: &Puzzle, b: &Puzzle) -> bool {
    a.train == b.train && a.test_input == b.test_input
}

/// Groups indices of puzzles with identical content. Groups are ordered by
/// first occurrence and the first index of each group is its representative.
pub fn group_identical(puzzles: &[Puzzle]) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut buckets: FxHashMap<u64, Vec<usize>> = FxHashMap::default();

    for (i, p) in puzzles.iter().enumerate() {
        let candidates = buckets.entry(puzzle_fingerprint(p)).or_default();
        let found = candidates.iter().copied().find(|&g| same_content(&puzzles[groups[g][0]], p));
        match found {
            Some(g) => groups[g].push(i),
            None => {
                candidates.push(groups.len());
                groups.push(vec![i]);
            }
        }
    }
    groups
}
