//! Torsion-angle metrics from the MCQ4Structures command line tools.

use super::external::{ExternalTool, ToolError, score_call};
use super::{Invocation, MetricPlugin, MetricScores, PluginSkip};
use std::ffi::{OsStr, OsString};
use std::path::Path;

/// Mean of Circular Quantities over the backbone and glycosidic torsion angles, from `mcq-local`.
#[derive(Debug, Clone)]
pub struct McqPlugin {
    tool: ExternalTool,
    mode: u8,
}

impl McqPlugin {
    /// `mode` selects how residues violating geometry constraints are treated: 0 relaxed,
    /// 1 compare without violations, 2 compare everything.
    pub fn new(mcq_local: &Path, mode: u8) -> Self {
        Self {
            tool: ExternalTool::new(mcq_local),
            mode,
        }
    }

    fn arguments(&self, invocation: &Invocation<'_>) -> Vec<OsString> {
        vec![
            "-r".into(),
            self.mode.to_string().into(),
            "-t".into(),
            invocation.reference.into(),
            "-d".into(),
            invocation.scratch_dir.into(),
            invocation.candidate.into(),
        ]
    }
}

impl MetricPlugin for McqPlugin {
    fn name(&self) -> &'static str {
        "MCQ"
    }

    fn compute(&self, invocation: &Invocation<'_>) -> Result<MetricScores, PluginSkip> {
        Ok(score_call(self.name(), &["MCQ"], || {
            let output = self.tool.run(self.arguments(invocation))?;
            Ok(vec![self.tool.last_token(&output)?])
        }))
    }
}

/// Longest Continuous Segment in Torsion Angle space, from `mcq-lcs`.
#[derive(Debug, Clone)]
pub struct LcsTaPlugin {
    tool: ExternalTool,
    threshold: u32,
}

impl LcsTaPlugin {
    pub fn new(mcq_lcs: &Path, threshold: u32) -> Self {
        Self {
            tool: ExternalTool::new(mcq_lcs),
            threshold,
        }
    }

    fn field<'a>(&self, output: &'a str, marker: &str, index: usize) -> Result<&'a str, ToolError> {
        output
            .lines()
            .find(|l| l.contains(marker))
            .and_then(|l| l.split_whitespace().nth(index))
            .ok_or_else(|| self.tool.parse_error(format!("no '{}' value", marker)))
    }

    /// Reads the coverage percentage and the segment length in residues.
    pub fn parse(&self, output: &str) -> Result<Vec<f64>, ToolError> {
        let coverage = self.field(output, "Coverage", 1)?;
        let residues = self.field(output, "Number of residues", 3)?;
        Ok(vec![
            self.tool.parse_float(coverage.trim_end_matches('%'))?,
            self.tool.parse_float(residues)?,
        ])
    }
}

impl MetricPlugin for LcsTaPlugin {
    fn name(&self) -> &'static str {
        "LCS-TA"
    }

    fn compute(&self, invocation: &Invocation<'_>) -> Result<MetricScores, PluginSkip> {
        let names = ["LCS-TA-COVERAGE", "LCS-TA-RESIDUES"];
        Ok(score_call(self.name(), &names, || {
            let threshold = self.threshold.to_string();
            let output = self.tool.run([
                OsStr::new("-t"),
                invocation.reference.as_os_str(),
                invocation.candidate.as_os_str(),
                OsStr::new("-v"),
                OsStr::new(&threshold),
            ])?;
            self.parse(&output)
        }))
    }
}
