//! Provides input/output functionality for structure files and score reports.
//!
//! Structure files are only parsed by the plugins that compute metrics in-process; every
//! other plugin hands file paths to its external tool untouched.

pub mod pdb;
pub mod report;
pub mod validator;
