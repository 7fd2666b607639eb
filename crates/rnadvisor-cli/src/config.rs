use crate::cli::{DEFAULT_METRICS, DEFAULT_SORT_BY, ScoreArgs};
use crate::error::{CliError, Result};
use rnadvisor::engine::config::{ScoringConfig, ScoringConfigBuilder, ToolConfig};
use rnadvisor::engine::error::EngineError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialScoringSection {
    metrics: Option<String>,
    #[serde(rename = "sort-by")]
    sort_by: Option<String>,
    summary: Option<bool>,
    #[serde(rename = "scratch-dir")]
    scratch_dir: Option<PathBuf>,
}

/// The `[scoring]` and `[tools]` sections of a configuration file, before CLI overrides.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialScoringConfig {
    scoring: Option<PartialScoringSection>,
    tools: Option<toml::Table>,
}

impl PartialScoringConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
        toml::from_str(&content).map_err(|e| CliError::ConfigFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn merge_with_cli(mut self, args: &ScoreArgs) -> Result<ScoringConfig> {
        self.apply_set_values(&args.set_values)?;

        let scoring = self.scoring.take().unwrap_or_default();
        let mut tools_table = self.tools.take().unwrap_or_default();
        if let Some(tools_path) = &args.tools {
            debug!("Loading tool locations from file: {:?}", tools_path);
            let overrides = ToolConfig::read_overrides(tools_path).map_err(EngineError::from)?;
            tools_table.extend(overrides);
        }
        let tools = ToolConfig::from_table(tools_table)
            .map_err(|e| CliError::Config(format!("Invalid [tools] section: {}", e)))?;

        let metrics = args
            .metrics
            .as_deref()
            .or(scoring.metrics.as_deref())
            .unwrap_or(DEFAULT_METRICS);
        let sort_by = args
            .sort_by
            .clone()
            .or(scoring.sort_by)
            .unwrap_or_else(|| DEFAULT_SORT_BY.to_string());

        let mut builder = ScoringConfigBuilder::new()
            .metrics_str(metrics)
            .sort_by(Some(sort_by))
            .include_summary(args.summary || scoring.summary.unwrap_or(false))
            .tools(tools);
        if let Some(scratch) = args.scratch_dir.clone().or(scoring.scratch_dir) {
            builder = builder.scratch_root(scratch);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            if let Some(tool_key) = key.strip_prefix("tools.") {
                let value = value_str
                    .parse::<i64>()
                    .map(toml::Value::Integer)
                    .unwrap_or_else(|_| toml::Value::String(value_str.to_string()));
                self.tools
                    .get_or_insert_with(Default::default)
                    .insert(tool_key.to_string(), value);
                continue;
            }

            let scoring = self.scoring.get_or_insert_with(Default::default);
            match key {
                "scoring.metrics" => scoring.metrics = Some(value_str.to_string()),
                "scoring.sort-by" => scoring.sort_by = Some(value_str.to_string()),
                "scoring.summary" => {
                    scoring.summary = Some(value_str.parse().map_err(|_| {
                        CliError::Config(format!(
                            "Invalid boolean value for {}: {}",
                            key, value_str
                        ))
                    })?);
                }
                "scoring.scratch-dir" => scoring.scratch_dir = Some(PathBuf::from(value_str)),
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}
