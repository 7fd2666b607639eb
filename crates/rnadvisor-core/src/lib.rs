//! # RNAdvisor Core Library
//!
//! Orchestration engine for assessing predicted RNA 3D structures against a single reference
//! structure with a collection of heterogeneous scoring methods.
//!
//! ## Architectural Philosophy
//!
//! The library is layered, and the orchestration logic carries no scoring mathematics:
//!
//! - **[`core`]: The Foundation.** Stateless structure models, a minimal PDB reader,
//!   NaN-tolerant statistics, superposition geometry and report persistence.
//!
//! - **[`plugins`]: The Scoring Methods.** A uniform [`plugins::MetricPlugin`] contract and one
//!   implementation per metric. Most plugins wrap an external binary; a handful are computed
//!   in-process.
//!
//! - **[`engine`]: The Logic Core.** The closed metric registry with its group aliases, the
//!   dispatch loop with per-invocation failure isolation and timing capture, and the aggregator
//!   that turns raw results into sorted report tables with optional summary rows.
//!
//! - **[`workflows`]: The Public API.** [`workflows::score::compute_scores`] ties everything
//!   together for a single scoring run.

pub mod core;
pub mod engine;
pub mod plugins;
pub mod workflows;
