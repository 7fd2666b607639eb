use super::external::{ExternalTool, score_call};
use super::{Invocation, MetricPlugin, MetricScores, PluginSkip};
use std::path::Path;

/// MCQ between the candidate's torsion angles and those predicted from its sequence by
/// RNA-TorsionBERT.
///
/// The prediction runs in a separate scoring program that receives the candidate path and prints
/// the score as its last token.
#[derive(Debug, Clone)]
pub struct TbMcqPlugin {
    tool: ExternalTool,
}

impl TbMcqPlugin {
    pub fn new(program: &Path) -> Self {
        Self {
            tool: ExternalTool::new(program),
        }
    }
}

impl MetricPlugin for TbMcqPlugin {
    fn name(&self) -> &'static str {
        "TB-MCQ"
    }

    fn compute(&self, invocation: &Invocation<'_>) -> Result<MetricScores, PluginSkip> {
        Ok(score_call(self.name(), &["TB-MCQ"], || {
            let output = self.tool.run([invocation.candidate])?;
            Ok(vec![self.tool.last_token(&output)?])
        }))
    }
}
