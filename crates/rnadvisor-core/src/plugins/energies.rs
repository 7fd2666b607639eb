//! Statistical potentials scoring the candidate alone: DFIRE, RASP, rsRNASP and cgRNASP.
//!
//! The reference structure is never read by these plugins.

use super::external::{ExternalTool, score_call};
use super::{Invocation, MetricPlugin, MetricScores, PluginSkip};
use std::ffi::OsStr;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct DfirePlugin {
    tool: ExternalTool,
}

impl DfirePlugin {
    pub fn new(dfire: &Path) -> Self {
        Self {
            tool: ExternalTool::new(dfire),
        }
    }
}

impl MetricPlugin for DfirePlugin {
    fn name(&self) -> &'static str {
        "DFIRE"
    }

    fn compute(&self, invocation: &Invocation<'_>) -> Result<MetricScores, PluginSkip> {
        Ok(score_call(self.name(), &["DFIRE"], || {
            let output = self.tool.run([invocation.candidate])?;
            Ok(vec![self.tool.last_token(&output)?])
        }))
    }
}

/// Energy, contact count and normalized energy from `rasp_fd`.
#[derive(Debug, Clone)]
pub struct RaspPlugin {
    tool: ExternalTool,
}

impl RaspPlugin {
    pub fn new(rasp: &Path) -> Self {
        Self {
            tool: ExternalTool::new(rasp),
        }
    }
}

impl MetricPlugin for RaspPlugin {
    fn name(&self) -> &'static str {
        "RASP"
    }

    fn compute(&self, invocation: &Invocation<'_>) -> Result<MetricScores, PluginSkip> {
        let names = ["RASP-ENERGY", "RASP-NB-CONTACTS", "RASP-NORMALIZED-ENERGY"];
        Ok(score_call(self.name(), &names, || {
            let output = self.tool.run([
                OsStr::new("-e"),
                OsStr::new("all"),
                OsStr::new("-p"),
                invocation.candidate.as_os_str(),
            ])?;
            self.tool.leading_tokens(&output, names.len())
        }))
    }
}

#[derive(Debug, Clone)]
pub struct RsRnaspPlugin {
    tool: ExternalTool,
}

impl RsRnaspPlugin {
    pub fn new(rs_rnasp: &Path) -> Self {
        Self {
            tool: ExternalTool::new(rs_rnasp),
        }
    }
}

impl MetricPlugin for RsRnaspPlugin {
    fn name(&self) -> &'static str {
        "rsRNASP"
    }

    fn compute(&self, invocation: &Invocation<'_>) -> Result<MetricScores, PluginSkip> {
        Ok(score_call(self.name(), &["rsRNASP"], || {
            // The whole output is the energy.
            let output = self.tool.run([invocation.candidate])?;
            Ok(vec![self.tool.parse_float(&output)?])
        }))
    }
}

/// The three coarse-grained cgRNASP variants, each a separate binary with its own timing.
#[derive(Debug, Clone)]
pub struct CgRnaspPlugin {
    variants: Vec<(&'static str, ExternalTool)>,
}

const CG_RNASP_VARIANTS: [(&str, &str); 3] = [
    ("cgRNASP", "cgRNASP_bin"),
    ("cgRNASP-C", "cgRNASP-C_bin"),
    ("cgRNASP-PC", "cgRNASP-PC_bin"),
];

impl CgRnaspPlugin {
    pub fn new(bin_dir: &Path) -> Self {
        let variants = CG_RNASP_VARIANTS
            .iter()
            .map(|(name, binary)| (*name, ExternalTool::new(bin_dir.join(binary))))
            .collect();
        Self { variants }
    }
}

impl MetricPlugin for CgRnaspPlugin {
    fn name(&self) -> &'static str {
        "CGRNASP"
    }

    fn compute(&self, invocation: &Invocation<'_>) -> Result<MetricScores, PluginSkip> {
        let mut scores = MetricScores::new();
        for (name, tool) in &self.variants {
            scores.extend(score_call(name, &[*name], || {
                let output = tool.run([invocation.candidate])?;
                Ok(vec![tool.last_token(&output)?])
            }));
        }
        Ok(scores)
    }
}
