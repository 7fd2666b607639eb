//! # Workflows Module
//!
//! High-level entry points that run a complete scoring pass, from input validation to the final
//! report tables.
//!
//! - **Scoring Workflow** ([`score`]) - Validates the inputs, builds the requested plugins,
//!   dispatches them over every candidate and aggregates the results.

pub mod score;
