use crate::core::io::validator::{PdbExtensionValidator, StructureValidator};
use crate::core::models::inputs::Reference;
use crate::core::models::table::ScoreTable;
use crate::engine::aggregate::{build_score_table, build_timing_table, log_total_times};
use crate::engine::config::ScoringConfig;
use crate::engine::dispatch::{dispatch, select_candidates};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::registry::{build_plugins, resolve};
use crate::plugins::MetricPlugin;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{info, instrument, warn};

/// The two tables produced by a scoring run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreReport {
    /// Candidates by sub-metric, sorted and with summary rows when requested.
    pub scores: ScoreTable,
    /// Candidates by timed sub-metric, in seconds.
    pub timings: ScoreTable,
}

fn scratch_area(root: Option<&Path>) -> Result<TempDir, EngineError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("rnadvisor-");
    let created = match root {
        Some(root) => std::fs::create_dir_all(root)
            .and_then(|_| builder.tempdir_in(root))
            .map_err(|e| (root.to_path_buf(), e)),
        None => builder
            .tempdir()
            .map_err(|e| (std::env::temp_dir(), e)),
    };
    created.map_err(|(path, source)| EngineError::Scratch {
        path: path.to_string_lossy().to_string(),
        source,
    })
}

/// Scores `candidate_paths` against `reference` with the metrics selected in `config`.
///
/// Invalid candidates are skipped with a warning. The run fails only when the reference is not a
/// valid structure file or when no candidate is left to score.
#[instrument(skip_all, name = "scoring_workflow")]
pub fn compute_scores(
    candidate_paths: &[PathBuf],
    reference: &Path,
    config: &ScoringConfig,
    reporter: &ProgressReporter,
) -> Result<ScoreReport, EngineError> {
    let kinds = resolve(&config.metrics);
    if kinds.is_empty() {
        warn!("No known metric in the selection, the report will be empty");
    }
    info!(
        metrics = %kinds.iter().map(|k| k.name()).collect::<Vec<_>>().join(","),
        "Resolved metric selection."
    );
    let plugins = build_plugins(&kinds, &config.tools);
    score_with_plugins(
        candidate_paths,
        reference,
        &plugins,
        config,
        &PdbExtensionValidator,
        reporter,
    )
}

/// Runs an already-built plugin list; [`compute_scores`] is the usual entry point.
pub fn score_with_plugins(
    candidate_paths: &[PathBuf],
    reference: &Path,
    plugins: &[Box<dyn MetricPlugin>],
    config: &ScoringConfig,
    validator: &dyn StructureValidator,
    reporter: &ProgressReporter,
) -> Result<ScoreReport, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Validating Inputs",
    });
    if !validator.is_valid_structure(reference) {
        return Err(EngineError::InvalidReference {
            path: reference.to_string_lossy().to_string(),
        });
    }
    let reference = Reference::new(reference);
    let candidates = select_candidates(candidate_paths, validator);
    if candidates.is_empty() {
        return Err(EngineError::NoCandidates {
            checked: candidate_paths.len(),
        });
    }
    let rejected = candidate_paths.len() - candidates.len();
    info!(accepted = candidates.len(), rejected, "Candidates selected.");
    if rejected > 0 {
        reporter.report(Progress::Message(format!(
            "{} of {} candidate(s) skipped as invalid structure files",
            rejected,
            candidate_paths.len()
        )));
    }
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart { name: "Scoring" });
    let scratch = scratch_area(config.scratch_root.as_deref())?;
    let outcome = dispatch(&candidates, &reference, plugins, scratch.path(), reporter)?;
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart {
        name: "Aggregating Results",
    });
    let scores = build_score_table(&outcome, config.sort_by.as_deref(), config.include_summary);
    let timings = build_timing_table(&outcome);
    log_total_times(&outcome.timings);
    reporter.report(Progress::PhaseFinish);

    info!(
        rows = scores.rows().len(),
        columns = scores.columns().len(),
        "Scoring complete."
    );
    Ok(ScoreReport { scores, timings })
}
