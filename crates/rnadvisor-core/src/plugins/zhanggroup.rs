//! TM-score and GDT-TS from the Zhang-group structure comparison programs.

use super::external::{ExternalTool, ToolError, score_call};
use super::{Invocation, MetricPlugin, MetricScores, PluginSkip, read_structure};
use std::ffi::OsStr;
use std::path::Path;

const GDT_TS_SUB_METRICS: [&str; 5] = ["GDT-TS", "GDT-TS@1", "GDT-TS@2", "GDT-TS@4", "GDT-TS@8"];

fn ensure_readable(invocation: &Invocation<'_>) -> Result<(), PluginSkip> {
    read_structure(invocation.candidate)?;
    read_structure(invocation.reference)?;
    Ok(())
}

/// TM-score normalized by the reference, as reported by US-align.
#[derive(Debug, Clone)]
pub struct TmScorePlugin {
    tool: ExternalTool,
}

impl TmScorePlugin {
    pub fn new(us_align: &Path) -> Self {
        Self {
            tool: ExternalTool::new(us_align),
        }
    }

    /// US-align prints one `TM-score=` line per normalization; the second one uses the length of
    /// the reference.
    pub fn parse(&self, output: &str) -> Result<f64, ToolError> {
        let line = output
            .lines()
            .map(str::trim)
            .filter(|l| l.starts_with("TM-score="))
            .nth(1)
            .ok_or_else(|| self.tool.parse_error("no reference-normalized TM-score line"))?;
        let token = line
            .split_whitespace()
            .nth(1)
            .ok_or_else(|| self.tool.parse_error(format!("malformed line '{}'", line)))?;
        self.tool.parse_float(token)
    }
}

impl MetricPlugin for TmScorePlugin {
    fn name(&self) -> &'static str {
        "TM-SCORE"
    }

    fn compute(&self, invocation: &Invocation<'_>) -> Result<MetricScores, PluginSkip> {
        ensure_readable(invocation)?;
        Ok(score_call(self.name(), &["TM-score"], || {
            let output = self.tool.run([
                OsStr::new("-mol"),
                OsStr::new("RNA"),
                invocation.candidate.as_os_str(),
                invocation.reference.as_os_str(),
            ])?;
            Ok(vec![self.parse(&output)?])
        }))
    }
}

/// GDT-TS and its per-cutoff fractions, as reported by TMscore.
#[derive(Debug, Clone)]
pub struct GdtTsPlugin {
    tool: ExternalTool,
}

impl GdtTsPlugin {
    pub fn new(tm_score: &Path) -> Self {
        Self {
            tool: ExternalTool::new(tm_score),
        }
    }

    /// Reads a line such as
    /// `GDT-TS-score= 0.2468 %(d<1)=0.1071 %(d<2)=0.1786 %(d<4)=0.2500 %(d<8)=0.4516`.
    pub fn parse(&self, output: &str) -> Result<Vec<f64>, ToolError> {
        let line = output
            .lines()
            .find(|l| l.contains("GDT-TS"))
            .ok_or_else(|| self.tool.parse_error("no GDT-TS line"))?;
        let total = line
            .split_whitespace()
            .nth(1)
            .ok_or_else(|| self.tool.parse_error(format!("malformed line '{}'", line)))?;

        let mut values = vec![self.tool.parse_float(total)?];
        for cutoff in line.split('%').skip(1) {
            let (_, value) = cutoff
                .split_once('=')
                .ok_or_else(|| self.tool.parse_error(format!("malformed cutoff '{}'", cutoff)))?;
            values.push(self.tool.parse_float(value)?);
        }
        if values.len() != GDT_TS_SUB_METRICS.len() {
            return Err(self.tool.parse_error(format!(
                "expected {} GDT-TS values, found {}",
                GDT_TS_SUB_METRICS.len(),
                values.len()
            )));
        }
        Ok(values)
    }
}

impl MetricPlugin for GdtTsPlugin {
    fn name(&self) -> &'static str {
        "GDT-TS"
    }

    fn compute(&self, invocation: &Invocation<'_>) -> Result<MetricScores, PluginSkip> {
        ensure_readable(invocation)?;
        Ok(score_call(self.name(), &GDT_TS_SUB_METRICS, || {
            let output = self.tool.run([invocation.candidate, invocation.reference])?;
            self.parse(&output)
        }))
    }
}
