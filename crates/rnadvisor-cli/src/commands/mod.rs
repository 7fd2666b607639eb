pub mod metrics;
pub mod score;
