pub mod classifier;
pub mod rules;
pub mod solver;
