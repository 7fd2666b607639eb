//! # Core Module
//!
//! Fundamental building blocks shared by the scoring plugins and the orchestration engine.
//!
//! - **Structure Representation** ([`models`]) - Atoms, residues and structures, plus the
//!   immutable candidate/reference inputs of a run
//! - **File I/O** ([`io`]) - PDB parsing, structure validation and CSV report persistence
//! - **Numerics** ([`utils`]) - Superposition geometry and NaN-tolerant statistics

pub mod io;
pub mod models;
pub mod utils;
