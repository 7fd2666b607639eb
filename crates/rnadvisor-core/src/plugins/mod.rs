//! # Scoring Plugins
//!
//! Every scoring method is a [`MetricPlugin`]: a unit that scores one candidate structure against
//! the reference and reports one or more named sub-metrics together with the time spent on each.
//!
//! ## Failure model
//!
//! Plugins distinguish two kinds of failure:
//!
//! - **Sub-metric failure.** The computation ran but could not produce a number (tool crashed,
//!   output could not be parsed, ratio undefined). The sub-metric is reported as `NaN` and the
//!   other sub-metrics of the same call are unaffected.
//! - **Inapplicability.** The plugin cannot score this input at all, for example because the
//!   structure file cannot be parsed. [`compute`](MetricPlugin::compute) returns a
//!   [`PluginSkip`] and the dispatcher omits the plugin's contribution for that candidate.
//!
//! ## Catalogue
//!
//! - [`rna_assessment`] - RMSD, P-VALUE, INF and DI computed in-process
//! - [`annotation`] - MC-Annotate output parsing used by INF
//! - [`clash`] - Inter-chain clash fraction computed in-process
//! - [`zhanggroup`] - TM-score and GDT-TS from US-align and TMscore
//! - [`mcq4structures`] - MCQ and LCS-TA from the MCQ4Structures command line tools
//! - [`openstructure`] - lDDT, TM-score and QS-score from OpenStructure
//! - [`voronota`] - CAD-score
//! - [`energies`] - DFIRE, RASP, rsRNASP and cgRNASP statistical potentials
//! - [`barnaba`] - RMSD, eRMSD and eSCORE from barnaba
//! - [`tb_mcq`] - TorsionBERT-predicted MCQ

pub mod annotation;
pub mod barnaba;
pub mod clash;
pub mod energies;
pub mod external;
pub mod mcq4structures;
pub mod openstructure;
pub mod rna_assessment;
pub mod tb_mcq;
pub mod voronota;
pub mod zhanggroup;

use crate::core::io::pdb::PdbFile;
use crate::core::models::structure::Structure;
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;

/// The inputs of a single plugin call.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub candidate: &'a Path,
    pub reference: &'a Path,
    /// A directory reserved for this call; no other call writes into it.
    pub scratch_dir: &'a Path,
}

/// One scored sub-metric and the time attributed to it.
#[derive(Debug, Clone, PartialEq)]
pub struct SubMetricScore {
    pub name: String,
    pub value: f64,
    pub elapsed: Duration,
}

/// Ordered sub-metric scores produced by one plugin call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricScores {
    entries: Vec<SubMetricScore>,
}

impl MetricScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(name: &str, value: f64, elapsed: Duration) -> Self {
        let mut scores = Self::new();
        scores.push(name, value, elapsed);
        scores
    }

    /// Scores whose values all come from one call and therefore share its duration.
    pub fn from_shared_call(names: &[&str], values: &[f64], elapsed: Duration) -> Self {
        let mut scores = Self::new();
        for (i, name) in names.iter().enumerate() {
            scores.push(name, values.get(i).copied().unwrap_or(f64::NAN), elapsed);
        }
        scores
    }

    /// All `names` set to NaN, as reported when the producing call failed.
    pub fn failed(names: &[&str], elapsed: Duration) -> Self {
        Self::from_shared_call(names, &[], elapsed)
    }

    pub fn push(&mut self, name: &str, value: f64, elapsed: Duration) {
        self.entries.push(SubMetricScore {
            name: name.to_string(),
            value,
            elapsed,
        });
    }

    pub fn extend(&mut self, other: MetricScores) {
        self.entries.extend(other.entries);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubMetricScore> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for MetricScores {
    type Item = SubMetricScore;
    type IntoIter = std::vec::IntoIter<SubMetricScore>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Why a plugin declined to score an input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginSkip {
    #[error("structure '{path}' could not be read: {reason}")]
    UnreadableStructure { path: String, reason: String },
    #[error("{0}")]
    NotApplicable(String),
}

impl PluginSkip {
    pub fn unreadable(path: &Path, reason: impl ToString) -> Self {
        Self::UnreadableStructure {
            path: path.to_string_lossy().to_string(),
            reason: reason.to_string(),
        }
    }
}

/// A scoring method.
///
/// Plugins are built once per run from the run's tool configuration and then reused for every
/// candidate, possibly from several threads at once.
pub trait MetricPlugin: Send + Sync {
    /// The registry name of the plugin, used in diagnostics.
    fn name(&self) -> &'static str;

    fn compute(&self, invocation: &Invocation<'_>) -> Result<MetricScores, PluginSkip>;
}

/// Parses a structure file, turning any failure into an inapplicability of the caller.
pub(crate) fn read_structure(path: &Path) -> Result<Structure, PluginSkip> {
    PdbFile::read_from_path(path).map_err(|e| PluginSkip::unreadable(path, e))
}

/// Runs `f` and returns its result together with the elapsed wall-clock time.
pub fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let value = f();
    (value, start.elapsed())
}
