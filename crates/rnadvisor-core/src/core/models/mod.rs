//! # Core Models Module
//!
//! Data structures describing the structures being scored and the tables produced from them.
//!
//! - [`structure`] - Atom, residue and structure representation parsed from PDB files
//! - [`inputs`] - Validated candidate and reference inputs of a scoring run
//! - [`table`] - Rectangular score tables as consumed by report sinks

pub mod inputs;
pub mod structure;
pub mod table;
