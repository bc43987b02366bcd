use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("grid has no cells")]
    EmptyGrid,
    #[error("ragged grid: row {row} has {found} cells, expected {expected}")]
    RaggedGrid { row: usize, expected: usize, found: usize },
    #[error("color {0} out of range 0..=9")]
    ColorOutOfRange(u8),
    #[error("invalid scale factor: {0}")]
    InvalidFactor(usize),
    #[error("unknown transformation: {0}")]
    UnknownTransform(String),
}

pub type Result<T> = std::result::Result<T, SolveError>;
