use super::external::{ExternalTool, ToolError, score_call};
use super::{Invocation, MetricPlugin, MetricScores, PluginSkip};
use std::ffi::OsStr;
use std::path::Path;

/// Contact Area Difference score from `voronota-cadscore`.
#[derive(Debug, Clone)]
pub struct CadPlugin {
    tool: ExternalTool,
}

impl CadPlugin {
    pub fn new(cad_score: &Path) -> Self {
        Self {
            tool: ExternalTool::new(cad_score),
        }
    }

    /// The score is the fifth field of the summary line. A score of exactly zero means the tool
    /// found no comparable contacts and is reported as NaN.
    pub fn parse(&self, output: &str) -> Result<f64, ToolError> {
        let token = output
            .lines()
            .find_map(|l| l.split_whitespace().nth(4))
            .ok_or_else(|| self.tool.parse_error("summary line has fewer than five fields"))?;
        let score = self.tool.parse_float(token)?;
        Ok(if score == 0.0 { f64::NAN } else { score })
    }
}

impl MetricPlugin for CadPlugin {
    fn name(&self) -> &'static str {
        "CAD"
    }

    fn compute(&self, invocation: &Invocation<'_>) -> Result<MetricScores, PluginSkip> {
        Ok(score_call(self.name(), &["CAD"], || {
            let output = self.tool.run([
                OsStr::new("--input-target"),
                invocation.reference.as_os_str(),
                OsStr::new("--input-model"),
                invocation.candidate.as_os_str(),
            ])?;
            Ok(vec![self.parse(&output)?])
        }))
    }
}
