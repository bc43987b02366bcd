pub mod dsl;
pub mod enumerate;
pub mod fingerprint;
pub mod heuristics;
