use std::collections::BTreeSet;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::core::{Result, SolveError};

pub type Grid = Vec<Vec<u8>>;

pub const MAX_COLOR: u8 = 9;
pub const DEFAULT_EXPAND_FACTOR: usize = 2;
/// Largest height or width a transformation may produce.
pub const MAX_GRID_SIDE: usize = 30;
pub const MAX_EXPAND_FACTOR: usize = MAX_GRID_SIDE;

/// A single named grid-to-grid function from the fixed catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    Identity,
    FlipH,
    FlipV,
    Rotate90,
    Rotate180,
    Rotate270,
    InvertColors,
    ReplaceColor(u8, u8),
    Expand(usize),
}

impl Transform {
    pub fn name(&self) -> &'static str {
        match self {
            Transform::Identity => "identity",
            Transform::FlipH => "flip_horizontal",
            Transform::FlipV => "flip_vertical",
            Transform::Rotate90 => "rotate_90",
            Transform::Rotate180 => "rotate_180",
            Transform::Rotate270 => "rotate_270",
            Transform::InvertColors => "invert_colors",
            Transform::ReplaceColor(_, _) => "replace_color",
            Transform::Expand(_) => "expand",
        }
    }

    /// Apply to a well-formed grid. Callers holding unvalidated grids
    /// should go through [`Transform::try_apply`].
    pub fn apply(&self, grid: &Grid) -> Grid {
        match self {
            Transform::Identity => grid.clone(),
            Transform::FlipH => flip_h(grid),
            Transform::FlipV => flip_v(grid),
            Transform::Rotate90 => rotate_cw(grid),
            Transform::Rotate180 => rotate_180(grid),
            Transform::Rotate270 => rotate_ccw(grid),
            Transform::InvertColors => swap_colors(grid, 0, 1),
            Transform::ReplaceColor(from, to) => replace_color(grid, *from, *to),
            Transform::Expand(f) => expand(grid, *f),
        }
    }

    /// Like [`Transform::apply`], but rejects malformed grids, colors out
    /// of range, and an `expand` whose result would be empty or wider or
    /// taller than [`MAX_GRID_SIDE`].
    pub fn try_apply(&self, grid: &Grid) -> Result<Grid> {
        let (height, width) = validate_grid(grid)?;
        match *self {
            Transform::Expand(f) => {
                let fits = |side: usize| side.checked_mul(f).is_some_and(|n| n <= MAX_GRID_SIDE);
                if f == 0 || !fits(height) || !fits(width) {
                    return Err(SolveError::InvalidFactor(f));
                }
            }
            Transform::ReplaceColor(from, to) => {
                for c in [from, to] {
                    if c > MAX_COLOR { return Err(SolveError::ColorOutOfRange(c)); }
                }
            }
            _ => {}
        }
        Ok(self.apply(grid))
    }

    /// The default scan set, in tie-break order. `ReplaceColor` is
    /// parameterized and never scanned.
    pub fn scan_set(expand_factor: usize) -> Vec<Transform> {
        vec![
            Transform::Identity,
            Transform::FlipH,
            Transform::FlipV,
            Transform::Rotate90,
            Transform::Rotate180,
            Transform::Rotate270,
            Transform::InvertColors,
            Transform::Expand(expand_factor),
        ]
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reports name a transformation, not its parameters.
impl Serialize for Transform {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Fixed, ordered catalog of transformations. Order is the tie-break:
/// earlier entries win.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformLibrary {
    entries: Vec<Transform>,
}

impl TransformLibrary {
    pub fn standard() -> Self {
        Self::with_expand_factor(DEFAULT_EXPAND_FACTOR)
    }

    pub fn with_expand_factor(factor: usize) -> Self {
        Self { entries: Transform::scan_set(factor) }
    }

    /// A custom catalog; `entries` order is the tie-break.
    pub fn from_entries(entries: Vec<Transform>) -> Self {
        Self { entries }
    }

    pub fn list(&self) -> &[Transform] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<Transform> {
        self.entries.iter().copied().find(|t| t.name() == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TransformLibrary {
    fn default() -> Self {
        Self::standard()
    }
}

// --- Grid helpers ---

/// Checks the grid is non-empty, rectangular and uses colors 0..=9.
/// Returns (height, width).
pub fn validate_grid(grid: &Grid) -> Result<(usize, usize)> {
    let width = grid.first().map(|row| row.len()).unwrap_or(0);
    if width == 0 { return Err(SolveError::EmptyGrid); }
    for (row, cells) in grid.iter().enumerate() {
        if cells.len() != width {
            return Err(SolveError::RaggedGrid { row, expected: width, found: cells.len() });
        }
        if let Some(&c) = cells.iter().find(|&&c| c > MAX_COLOR) {
            return Err(SolveError::ColorOutOfRange(c));
        }
    }
    Ok((grid.len(), width))
}

pub fn grid_dimensions(grid: &Grid) -> (usize, usize) {
    if grid.is_empty() { (0, 0) } else { (grid.len(), grid[0].len()) }
}

pub fn color_set(grid: &Grid) -> BTreeSet<u8> {
    grid.iter().flat_map(|row| row.iter().copied()).collect()
}

// --- Internal transformation implementations ---

fn rotate_cw(g: &Grid) -> Grid {
    if g.is_empty() { return g.clone(); }
    let rows = g.len();
    let cols = g[0].len();
    (0..cols).map(|c| (0..rows).rev().map(|r| g[r][c]).collect()).collect()
}

fn rotate_ccw(g: &Grid) -> Grid {
    if g.is_empty() { return g.clone(); }
    let rows = g.len();
    let cols = g[0].len();
    (0..cols).rev().map(|c| (0..rows).map(|r| g[r][c]).collect()).collect()
}

fn rotate_180(g: &Grid) -> Grid {
    g.iter().rev().map(|row| row.iter().rev().copied().collect()).collect()
}

fn flip_h(g: &Grid) -> Grid {
    g.iter().map(|row| row.iter().rev().copied().collect()).collect()
}

fn flip_v(g: &Grid) -> Grid {
    g.iter().rev().cloned().collect()
}

fn swap_colors(g: &Grid, a: u8, b: u8) -> Grid {
    g.iter().map(|row| {
        row.iter().map(|&c| if c == a { b } else if c == b { a } else { c }).collect()
    }).collect()
}

fn replace_color(g: &Grid, from: u8, to: u8) -> Grid {
    g.iter().map(|row| row.iter().map(|&c| if c == from { to } else { c }).collect()).collect()
}

fn expand(g: &Grid, factor: usize) -> Grid {
    if factor == 0 { return g.clone(); }
    let mut result = Vec::with_capacity(g.len() * factor);
    for row in g {
        let scaled: Vec<u8> = row.iter().flat_map(|&c| std::iter::repeat(c).take(factor)).collect();
        for _ in 0..factor {
            result.push(scaled.clone());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Grid {
        vec![vec![1, 2, 3], vec![4, 5, 6]]
    }

    #[test]
    fn identity_is_equal_copy() {
        let g = sample();
        assert_eq!(Transform::Identity.apply(&g), g);
    }

    #[test]
    fn flips_mirror_and_are_involutions() {
        let g = sample();
        assert_eq!(Transform::FlipH.apply(&g), vec![vec![3, 2, 1], vec![6, 5, 4]]);
        assert_eq!(Transform::FlipV.apply(&g), vec![vec![4, 5, 6], vec![1, 2, 3]]);
        assert_eq!(Transform::FlipH.apply(&Transform::FlipH.apply(&g)), g);
        assert_eq!(Transform::FlipV.apply(&Transform::FlipV.apply(&g)), g);
    }

    #[test]
    fn rotate_90_is_clockwise() {
        let g = sample();
        // 2x3 -> 3x2
        assert_eq!(Transform::Rotate90.apply(&g), vec![vec![4, 1], vec![5, 2], vec![6, 3]]);
        assert_eq!(Transform::Rotate270.apply(&g), vec![vec![3, 6], vec![2, 5], vec![1, 4]]);
        assert_eq!(Transform::Rotate180.apply(&g), vec![vec![6, 5, 4], vec![3, 2, 1]]);
    }

    #[test]
    fn rotations_cycle_back() {
        let g = sample();
        let mut r = g.clone();
        for _ in 0..4 {
            r = Transform::Rotate90.apply(&r);
        }
        assert_eq!(r, g);
        assert_eq!(Transform::Rotate180.apply(&Transform::Rotate180.apply(&g)), g);
        assert_eq!(Transform::Rotate270.apply(&Transform::Rotate90.apply(&g)), g);
    }

    #[test]
    fn invert_swaps_zero_and_one_only() {
        let g = vec![vec![0, 1, 2], vec![1, 0, 9]];
        assert_eq!(Transform::InvertColors.apply(&g), vec![vec![1, 0, 2], vec![0, 1, 9]]);
        let binary = vec![vec![0, 1], vec![1, 1]];
        let twice = Transform::InvertColors.apply(&Transform::InvertColors.apply(&binary));
        assert_eq!(twice, binary);
    }

    #[test]
    fn replace_color_is_total_substitution() {
        let g = vec![vec![3, 0, 3], vec![1, 3, 2]];
        assert_eq!(Transform::ReplaceColor(3, 7).apply(&g), vec![vec![7, 0, 7], vec![1, 7, 2]]);
    }

    #[test]
    fn expand_produces_constant_blocks() {
        let g = sample();
        for k in 1..=3 {
            let e = Transform::Expand(k).apply(&g);
            assert_eq!(grid_dimensions(&e), (2 * k, 3 * k));
            for (r, row) in e.iter().enumerate() {
                for (c, &v) in row.iter().enumerate() {
                    assert_eq!(v, g[r / k][c / k]);
                }
            }
        }
    }

    #[test]
    fn scan_set_order_and_lookup() {
        let lib = TransformLibrary::standard();
        let names: Vec<&str> = lib.list().iter().map(|t| t.name()).collect();
        assert_eq!(names, vec![
            "identity", "flip_horizontal", "flip_vertical", "rotate_90",
            "rotate_180", "rotate_270", "invert_colors", "expand",
        ]);
        assert_eq!(lib.get("expand"), Some(Transform::Expand(2)));
        assert_eq!(lib.get("replace_color"), None);
    }

    #[test]
    fn try_apply_rejects_degenerate_grids() {
        let ragged = vec![vec![1, 2], vec![3]];
        assert_eq!(
            Transform::FlipH.try_apply(&ragged),
            Err(SolveError::RaggedGrid { row: 1, expected: 2, found: 1 })
        );
        assert_eq!(Transform::Identity.try_apply(&Vec::new()), Err(SolveError::EmptyGrid));
        assert_eq!(Transform::Identity.try_apply(&vec![vec![12]]), Err(SolveError::ColorOutOfRange(12)));
        assert_eq!(Transform::Expand(0).try_apply(&sample()), Err(SolveError::InvalidFactor(0)));
    }

    #[test]
    fn try_apply_caps_expanded_size() {
        let cell = vec![vec![3]];
        assert_eq!(Transform::Expand(usize::MAX).try_apply(&cell), Err(SolveError::InvalidFactor(usize::MAX)));
        assert_eq!(Transform::Expand(31).try_apply(&cell), Err(SolveError::InvalidFactor(31)));
        assert_eq!(Transform::Expand(30).try_apply(&cell).unwrap().len(), 30);

        // 2x3 grows to 20x30 at factor 10, but 22x33 at 11.
        assert_eq!(grid_dimensions(&Transform::Expand(10).try_apply(&sample()).unwrap()), (20, 30));
        assert_eq!(Transform::Expand(11).try_apply(&sample()), Err(SolveError::InvalidFactor(11)));
    }

    #[test]
    fn color_set_is_sorted_and_unique() {
        let g = vec![vec![5, 0, 5], vec![2, 0, 9]];
        assert_eq!(color_set(&g).into_iter().collect::<Vec<_>>(), vec![0, 2, 5, 9]);
    }

    #[test]
    fn serializes_as_bare_name() {
        assert_eq!(serde_json::to_string(&Transform::Expand(2)).unwrap(), r#""expand""#);
        assert_eq!(serde_json::to_string(&Transform::ReplaceColor(1, 2)).unwrap(), r#""replace_color""#);
    }
}
