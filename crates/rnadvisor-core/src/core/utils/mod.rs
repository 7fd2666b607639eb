pub mod geometry;
pub mod stats;
