pub mod core;
pub mod synthesis;
pub mod reasoning;
pub mod perception;
pub mod bench;
