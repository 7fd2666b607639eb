use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid tool settings: {0}")]
    InvalidTools(#[source] toml::de::Error),
}

/// Which of the two published fits of the RMSD/length relation the P-VALUE metric uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum PValueSign {
    /// Fit without base-pair constraints.
    #[default]
    #[serde(rename = "-")]
    Minus,
    /// Fit with base-pair constraints.
    #[serde(rename = "+")]
    Plus,
}

/// Locations of the external scoring tools and their tuning parameters.
///
/// Every field has a default, so a configuration file only needs to name what differs from the
/// standard `lib/` layout. Tools without a `lib/` default are looked up through `PATH`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ToolConfig {
    pub mc_annotate: PathBuf,
    pub tm_score: PathBuf,
    pub us_align: PathBuf,
    pub mcq_local: PathBuf,
    pub mcq_lcs: PathBuf,
    /// Angle selection mode passed to `mcq-local -r`.
    pub mcq_mode: u8,
    /// Angular threshold, in degrees, passed to `mcq-lcs -v`.
    pub lcs_threshold: u32,
    pub cad_score: PathBuf,
    pub ost: PathBuf,
    pub rasp: PathBuf,
    pub dfire: PathBuf,
    pub rs_rnasp: PathBuf,
    /// Directory holding the three cgRNASP binaries.
    pub cg_rnasp_dir: PathBuf,
    pub barnaba: PathBuf,
    /// Program printing the TB-MCQ score of one structure.
    ///
    /// It is run with the candidate PDB path as its only argument and must print the score as the
    /// last whitespace-separated token of its standard output. A non-zero exit status or a last
    /// token that is not a number leaves TB-MCQ as NaN for that candidate.
    pub tb_mcq: PathBuf,
    pub p_value_sign: PValueSign,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            mc_annotate: PathBuf::from("lib/rna_assessment/MC-Annotate"),
            tm_score: PathBuf::from("lib/zhanggroup/TMscore"),
            us_align: PathBuf::from("lib/zhanggroup/USalign"),
            mcq_local: PathBuf::from("lib/mcq4structures/mcq-cli/mcq-local"),
            mcq_lcs: PathBuf::from("lib/mcq4structures/mcq-cli/mcq-lcs"),
            mcq_mode: 2,
            lcs_threshold: 25,
            cad_score: PathBuf::from("voronota-cadscore"),
            ost: PathBuf::from("ost"),
            rasp: PathBuf::from("lib/rasp/bin/rasp_fd"),
            dfire: PathBuf::from("lib/dfire/bin/DFIRE_RNA"),
            rs_rnasp: PathBuf::from("lib/rs_rnasp/rsRNASP"),
            cg_rnasp_dir: PathBuf::from("lib/cgRNASP/bin"),
            barnaba: PathBuf::from("barnaba"),
            tb_mcq: PathBuf::from("tb_mcq"),
            p_value_sign: PValueSign::Minus,
        }
    }
}

impl ToolConfig {
    /// Reads a tool settings file as a raw table, so it can be layered over other sources before
    /// [`ToolConfig::from_table`] validates the result.
    pub fn read_overrides(path: &Path) -> Result<toml::Table, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    /// Builds the settings from kebab-case keys; missing keys keep their defaults.
    pub fn from_table(table: toml::Table) -> Result<Self, ConfigError> {
        toml::Value::Table(table)
            .try_into()
            .map_err(ConfigError::InvalidTools)
    }
}

/// Settings of a single scoring run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    /// Selection tokens: metric names and group aliases, in request order.
    pub metrics: Vec<String>,
    pub sort_by: Option<String>,
    pub include_summary: bool,
    pub tools: ToolConfig,
    /// Parent directory for the run's scratch area; the system temp dir when unset.
    pub scratch_root: Option<PathBuf>,
}

#[derive(Default)]
pub struct ScoringConfigBuilder {
    metrics: Option<Vec<String>>,
    sort_by: Option<String>,
    include_summary: Option<bool>,
    tools: Option<ToolConfig>,
    scratch_root: Option<PathBuf>,
}

impl ScoringConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metrics = Some(tokens.into_iter().map(Into::into).collect());
        self
    }
    /// Splits a comma-separated selection such as `"RMSD,ENERGIES"`.
    pub fn metrics_str(self, selection: &str) -> Self {
        self.metrics(
            selection
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty()),
        )
    }
    pub fn sort_by(mut self, column: Option<String>) -> Self {
        self.sort_by = column;
        self
    }
    pub fn include_summary(mut self, include: bool) -> Self {
        self.include_summary = Some(include);
        self
    }
    pub fn tools(mut self, tools: ToolConfig) -> Self {
        self.tools = Some(tools);
        self
    }
    pub fn scratch_root(mut self, root: PathBuf) -> Self {
        self.scratch_root = Some(root);
        self
    }

    pub fn build(self) -> Result<ScoringConfig, ConfigError> {
        Ok(ScoringConfig {
            metrics: self.metrics.ok_or(ConfigError::MissingParameter("metrics"))?,
            sort_by: self.sort_by,
            include_summary: self.include_summary.unwrap_or(false),
            tools: self.tools.unwrap_or_default(),
            scratch_root: self.scratch_root,
        })
    }
}
