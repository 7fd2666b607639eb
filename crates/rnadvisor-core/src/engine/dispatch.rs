use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use crate::core::io::validator::StructureValidator;
use crate::core::models::inputs::{Candidate, Reference};
use crate::core::utils::stats::round_to;
use crate::plugins::{Invocation, MetricPlugin, MetricScores, PluginSkip};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Sub-metrics reported at full precision; every other value is rounded to 3 decimals.
const UNROUNDED_METRICS: &[&str] = &["P-VALUE"];
const REPORT_DECIMALS: i32 = 3;

/// Raw scores: candidate id to (sub-metric to value).
///
/// Candidates are kept in the order their first entry was inserted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    candidates: Vec<String>,
    values: HashMap<String, HashMap<String, f64>>,
}

impl ResultTable {
    pub fn insert(&mut self, candidate: &str, metric: &str, value: f64) {
        if !self.values.contains_key(candidate) {
            self.candidates.push(candidate.to_string());
        }
        self.values
            .entry(candidate.to_string())
            .or_default()
            .insert(metric.to_string(), value);
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn get(&self, candidate: &str, metric: &str) -> Option<f64> {
        self.values.get(candidate)?.get(metric).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Per-metric durations, one entry per timed invocation in merge order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimingTable {
    metrics: Vec<String>,
    entries: HashMap<String, Vec<(String, Duration)>>,
}

impl TimingTable {
    pub fn record(&mut self, metric: &str, candidate: &str, elapsed: Duration) {
        if !self.entries.contains_key(metric) {
            self.metrics.push(metric.to_string());
        }
        self.entries
            .entry(metric.to_string())
            .or_default()
            .push((candidate.to_string(), elapsed));
    }

    /// Metrics in the order they were first timed.
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    pub fn entries(&self, metric: &str) -> &[(String, Duration)] {
        self.entries.get(metric).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn duration(&self, metric: &str, candidate: &str) -> Option<Duration> {
        self.entries(metric)
            .iter()
            .find(|(c, _)| c == candidate)
            .map(|(_, d)| *d)
    }

    pub fn total(&self, metric: &str) -> Duration {
        self.entries(metric).iter().map(|(_, d)| *d).sum()
    }
}

/// Everything the dispatch loop produces for the aggregator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchOutcome {
    pub results: ResultTable,
    pub timings: TimingTable,
    /// Sub-metric names: plugin construction order, then emission order within a plugin.
    pub columns: Vec<String>,
}

/// Keeps the candidates accepted by `validator`, logging every rejected path.
///
/// Identifiers are unique within the result: a base name already taken by an earlier candidate
/// gets a `#<n>` suffix, `n` counting its occurrences.
pub fn select_candidates(paths: &[PathBuf], validator: &dyn StructureValidator) -> Vec<Candidate> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    paths
        .iter()
        .filter(|path| {
            let valid = validator.is_valid_structure(path);
            if !valid {
                warn!(path = %path.display(), "Candidate is not a valid structure file, skipping it");
            }
            valid
        })
        .map(|path| {
            let candidate = Candidate::from_path(path.clone());
            let count = seen.entry(candidate.id().to_string()).or_insert(0);
            *count += 1;
            if *count == 1 {
                return candidate;
            }
            let id = format!("{}#{}", candidate.id(), count);
            warn!(
                path = %path.display(),
                id = %id,
                "Candidate name is already used by another candidate, renaming it"
            );
            Candidate::with_id(id, path.clone())
        })
        .collect()
}

struct Task {
    candidate: usize,
    plugin: usize,
}

struct TaskOutcome {
    candidate: usize,
    plugin: usize,
    result: Result<MetricScores, PluginSkip>,
}

fn task_scratch_dir(root: &Path, task: &Task) -> Result<PathBuf, EngineError> {
    let dir = root.join(format!("c{}-p{}", task.candidate, task.plugin));
    std::fs::create_dir_all(&dir).map_err(|e| EngineError::Scratch {
        path: dir.to_string_lossy().to_string(),
        source: e,
    })?;
    Ok(dir)
}

fn run_task(
    task: &Task,
    candidates: &[Candidate],
    reference: &Reference,
    plugins: &[Box<dyn MetricPlugin>],
    scratch_root: &Path,
    reporter: &ProgressReporter,
) -> Result<TaskOutcome, EngineError> {
    let candidate = &candidates[task.candidate];
    let plugin = &plugins[task.plugin];
    let scratch_dir = task_scratch_dir(scratch_root, task)?;

    debug!(candidate = candidate.id(), metric = plugin.name(), "Computing");
    let result = plugin.compute(&Invocation {
        candidate: candidate.path(),
        reference: reference.path(),
        scratch_dir: &scratch_dir,
    });
    reporter.report(Progress::TaskIncrement);

    Ok(TaskOutcome {
        candidate: task.candidate,
        plugin: task.plugin,
        result,
    })
}

fn normalize(metric: &str, value: f64) -> f64 {
    if !value.is_finite() {
        f64::NAN
    } else if UNROUNDED_METRICS.contains(&metric) {
        value
    } else {
        round_to(value, REPORT_DECIMALS)
    }
}

/// Runs every plugin against every candidate and merges the results.
///
/// Tasks are merged in candidate-then-plugin order whichever way they were executed, so the
/// outcome does not depend on scheduling. Each task gets its own directory under
/// `scratch_root`.
#[instrument(skip_all, name = "dispatch")]
pub fn dispatch(
    candidates: &[Candidate],
    reference: &Reference,
    plugins: &[Box<dyn MetricPlugin>],
    scratch_root: &Path,
    reporter: &ProgressReporter,
) -> Result<DispatchOutcome, EngineError> {
    let tasks: Vec<Task> = (0..candidates.len())
        .flat_map(|c| (0..plugins.len()).map(move |p| Task { candidate: c, plugin: p }))
        .collect();

    info!(
        candidates = candidates.len(),
        metrics = plugins.len(),
        "Dispatching scoring tasks."
    );
    reporter.report(Progress::TaskStart {
        total_steps: tasks.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = tasks.iter();

    #[cfg(feature = "parallel")]
    let iterator = tasks.par_iter();

    let outcomes: Vec<TaskOutcome> = iterator
        .map(|task| run_task(task, candidates, reference, plugins, scratch_root, reporter))
        .collect::<Result<_, _>>()?;

    reporter.report(Progress::TaskFinish);

    let mut outcome = DispatchOutcome::default();
    let mut plugin_columns: Vec<Vec<String>> = vec![Vec::new(); plugins.len()];

    for task in outcomes {
        let candidate = candidates[task.candidate].id();
        let plugin = &plugins[task.plugin];
        let scores = match task.result {
            Ok(scores) => scores,
            Err(skip) => {
                warn!(
                    candidate,
                    metric = plugin.name(),
                    reason = %skip,
                    "Metric not applicable, skipping it for this candidate"
                );
                continue;
            }
        };

        for score in scores {
            let value = normalize(&score.name, score.value);
            if value.is_nan() {
                debug!(candidate, metric = %score.name, "Sub-metric has no value");
            }
            let columns = &mut plugin_columns[task.plugin];
            if !columns.contains(&score.name) {
                columns.push(score.name.clone());
            }
            outcome.results.insert(candidate, &score.name, value);
            outcome.timings.record(&score.name, candidate, score.elapsed);
        }
    }

    for column in plugin_columns.into_iter().flatten() {
        if !outcome.columns.contains(&column) {
            outcome.columns.push(column);
        }
    }
    Ok(outcome)
}

#[cfg(test)]
pub(crate) mod test_plugins {
    use crate::plugins::{Invocation, MetricPlugin, MetricScores, PluginSkip};
    use std::collections::HashMap;
    use std::path::Path;
    use std::time::Duration;

    /// Returns canned scores keyed by candidate file name.
    pub struct CannedPlugin {
        pub name: &'static str,
        pub scores: HashMap<&'static str, Vec<(&'static str, f64)>>,
        pub skip: Vec<&'static str>,
    }

    impl CannedPlugin {
        pub fn new(name: &'static str) -> Self {
            Self {
                name,
                scores: HashMap::new(),
                skip: Vec::new(),
            }
        }

        pub fn with(mut self, candidate: &'static str, values: &[(&'static str, f64)]) -> Self {
            self.scores.insert(candidate, values.to_vec());
            self
        }

        pub fn skipping(mut self, candidate: &'static str) -> Self {
            self.skip.push(candidate);
            self
        }
    }

    fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    impl MetricPlugin for CannedPlugin {
        fn name(&self) -> &'static str {
            self.name
        }

        fn compute(&self, invocation: &Invocation<'_>) -> Result<MetricScores, PluginSkip> {
            let id = file_name(invocation.candidate);
            if self.skip.iter().any(|s| *s == id) {
                return Err(PluginSkip::NotApplicable("canned skip".into()));
            }
            let mut scores = MetricScores::new();
            match self.scores.get(id.as_str()) {
                Some(values) => {
                    for (name, value) in values {
                        scores.push(name, *value, Duration::from_millis(10));
                    }
                }
                None => scores.push(self.name, f64::NAN, Duration::from_millis(10)),
            }
            Ok(scores)
        }
    }
}
