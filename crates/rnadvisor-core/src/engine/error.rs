use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::report::ReportError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid reference structure: '{path}' does not exist or is not an accepted structure file")]
    InvalidReference { path: String },

    #[error("No valid candidate structure to score (checked {checked} path(s))")]
    NoCandidates { checked: usize },

    #[error("Scratch directory error for '{path}': {source}")]
    Scratch {
        path: String,
        source: std::io::Error,
    },

    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Report error: {source}")]
    Report {
        #[from]
        source: ReportError,
    },
}
