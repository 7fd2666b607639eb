//! # Engine Module
//!
//! Orchestrates a scoring run: resolving the requested metrics, dispatching every plugin against
//! every candidate and aggregating the raw results into report tables.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Tool locations, tuning parameters and run settings
//! - **Registry** ([`registry`]) - The closed set of metrics, their group aliases and constructors
//! - **Dispatch** ([`dispatch`]) - Candidate by plugin loop with failure isolation and timing
//! - **Aggregation** ([`aggregate`]) - Report tables, summary rows and sorting
//! - **Progress Monitoring** ([`progress`]) - Progress events for front-ends
//! - **Error Handling** ([`error`]) - Engine-level error types
//!
//! Data flows one way: the registry resolves names, dispatch produces raw maps, the aggregator
//! turns them into tables. No state outlives a run.

pub mod aggregate;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod progress;
pub mod registry;
