pub mod config;
pub mod error;
pub mod types;

pub use config::SolverConfig;
pub use error::{Result, SolveError};
pub use types::{Category, Classification};
