//! Reference-based scores from OpenStructure's `compare-structures` action.

use super::external::{ExternalTool, ToolError, score_call};
use super::{Invocation, MetricPlugin, MetricScores, PluginSkip};
use std::ffi::OsStr;
use std::path::Path;

const REPORT_FILE: &str = "out.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OstScore {
    Lddt,
    TmScore,
    QsScore,
}

impl OstScore {
    fn plugin_name(self) -> &'static str {
        match self {
            OstScore::Lddt => "lDDT",
            OstScore::TmScore => "TM-SCORE (OST)",
            OstScore::QsScore => "QS-SCORE",
        }
    }

    fn column(self) -> &'static str {
        match self {
            OstScore::Lddt => "lDDT",
            OstScore::TmScore => "TM-score (OST)",
            OstScore::QsScore => "QS-score",
        }
    }

    fn flag(self) -> &'static str {
        match self {
            OstScore::Lddt => "--lddt",
            OstScore::TmScore => "--tm-score",
            OstScore::QsScore => "--qs-score",
        }
    }

    fn json_key(self) -> &'static str {
        match self {
            OstScore::Lddt => "lddt",
            OstScore::TmScore => "tm_score",
            OstScore::QsScore => "qs_global",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OstPlugin {
    tool: ExternalTool,
    score: OstScore,
}

impl OstPlugin {
    pub fn new(ost: &Path, score: OstScore) -> Self {
        Self {
            tool: ExternalTool::new(ost),
            score,
        }
    }

    pub fn lddt(ost: &Path) -> Self {
        Self::new(ost, OstScore::Lddt)
    }

    pub fn tm_score(ost: &Path) -> Self {
        Self::new(ost, OstScore::TmScore)
    }

    pub fn qs_score(ost: &Path) -> Self {
        Self::new(ost, OstScore::QsScore)
    }

    /// Extracts the score from the JSON report; a missing or null key is NaN.
    pub fn parse_report(&self, report: &str) -> Result<f64, ToolError> {
        let json: serde_json::Value = serde_json::from_str(report)
            .map_err(|e| self.tool.parse_error(format!("invalid JSON report: {}", e)))?;
        Ok(json
            .get(self.score.json_key())
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(f64::NAN))
    }

    fn run(&self, invocation: &Invocation<'_>) -> Result<f64, ToolError> {
        let report_path = invocation.scratch_dir.join(REPORT_FILE);
        self.tool.run([
            OsStr::new("compare-structures"),
            OsStr::new("-r"),
            invocation.reference.as_os_str(),
            OsStr::new("-m"),
            invocation.candidate.as_os_str(),
            OsStr::new("-o"),
            report_path.as_os_str(),
            OsStr::new(self.score.flag()),
        ])?;
        let report =
            std::fs::read_to_string(&report_path).map_err(|e| ToolError::OutputFile {
                path: report_path.to_string_lossy().to_string(),
                source: e,
            })?;
        self.parse_report(&report)
    }
}

impl MetricPlugin for OstPlugin {
    fn name(&self) -> &'static str {
        self.score.plugin_name()
    }

    fn compute(&self, invocation: &Invocation<'_>) -> Result<MetricScores, PluginSkip> {
        Ok(score_call(self.name(), &[self.score.column()], || {
            Ok(vec![self.run(invocation)?])
        }))
    }
}
