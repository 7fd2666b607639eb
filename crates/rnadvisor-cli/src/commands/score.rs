use crate::cli::{DEFAULT_RESULT_PATH, DEFAULT_TIME_PATH, ScoreArgs};
use crate::config::PartialScoringConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use rnadvisor::{
    core::io::report::{CsvReportSink, ReportSink},
    core::models::table::ScoreTable,
    engine::{error::EngineError, progress::ProgressReporter},
    workflows,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const RESULT_TIMESTAMP_FORMAT: &str = "%d_%m_%Y_%H:%M:%S";

pub async fn run(args: ScoreArgs) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialScoringConfig::from_file(path)?,
        None => PartialScoringConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args)?;

    let candidates = discover_candidates(&args.pred)?;
    info!(
        "Found {} candidate structure(s) under {:?}",
        candidates.len(),
        &args.pred
    );

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Scoring {} candidate(s) against {}...",
        candidates.len(),
        args.native.display()
    );
    info!("Invoking the core scoring workflow...");

    let report = tokio::task::block_in_place(|| {
        workflows::score::compute_scores(&candidates, &args.native, &config, &reporter)
    })?;

    let result_path = resolve_result_path(
        args.result
            .as_deref()
            .unwrap_or(Path::new(DEFAULT_RESULT_PATH)),
    );
    let time_path = args
        .time
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TIME_PATH));

    let sink = CsvReportSink;
    sink.save_table(&report.scores, Some(&result_path), "scores")
        .map_err(EngineError::from)?;
    sink.save_table(&report.timings, Some(&time_path), "timings")
        .map_err(EngineError::from)?;

    print_summary(&report.scores);
    println!("✓ Scores written to: {}", result_path.display());
    println!("  Timings written to: {}", time_path.display());
    Ok(())
}

/// Lists the structures to score: every `.pdb` file of a directory in name order, or a single file.
fn discover_candidates(pred: &Path) -> Result<Vec<PathBuf>> {
    if pred.is_dir() {
        let mut candidates = std::fs::read_dir(pred)
            .and_then(|entries| {
                entries
                    .map(|entry| entry.map(|e| e.path()))
                    .collect::<std::io::Result<Vec<_>>>()
            })
            .map_err(|e| CliError::io(pred, e))?
            .into_iter()
            .filter(|p| p.is_file() && is_pdb(p))
            .collect::<Vec<_>>();
        candidates.sort();
        if candidates.is_empty() {
            warn!("No .pdb file found in {:?}", pred);
        }
        Ok(candidates)
    } else if pred.is_file() {
        Ok(vec![pred.to_path_buf()])
    } else {
        Err(CliError::PredictionsNotFound {
            path: pred.to_path_buf(),
        })
    }
}

fn is_pdb(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdb"))
}

/// A `.csv` path is used as is; anything else is a directory receiving a timestamped file.
fn resolve_result_path(result: &Path) -> PathBuf {
    let is_csv = result
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        if result.exists() {
            debug!("Result file {:?} already exists and will be overwritten", result);
        }
        return result.to_path_buf();
    }
    let stamp = chrono::Local::now().format(RESULT_TIMESTAMP_FORMAT);
    result.join(format!("scores_{}.csv", stamp))
}

fn print_summary(scores: &ScoreTable) {
    if scores.columns().is_empty() {
        println!("Warning: no metric produced a value.");
        return;
    }
    println!("  {} row(s) x {} column(s)", scores.rows().len(), scores.columns().len());
    if let Some(best) = scores.rows().first() {
        let cells = scores
            .columns()
            .iter()
            .zip(&best.values)
            .map(|(c, v)| format!("{}={:.3}", c, v))
            .collect::<Vec<_>>()
            .join(", ");
        println!("  First row {}: {}", best.label, cells);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fmt::Write;
    use std::fs;
    use tempfile::tempdir;

    fn write_pdb(path: &Path, residues: usize) {
        let mut content = String::new();
        let mut serial = 1;
        for r in 0..residues {
            for (a, name) in ["P", "C4'", "N1"].iter().enumerate() {
                let x = r as f64 * 3.1 + a as f64;
                let y = (r as f64 * 0.7).sin() * 4.0 - a as f64 * 0.5;
                let z = r as f64 * 1.9 + a as f64 * 0.8;
                writeln!(
                    content,
                    "ATOM  {:>5} {:<4} {:>3} A{:>4}    {:>8.3}{:>8.3}{:>8.3}  1.00  0.00          {:>2}",
                    serial,
                    format!(" {}", name),
                    "G",
                    r + 1,
                    x,
                    y,
                    z,
                    &name[..1]
                )
                .unwrap();
                serial += 1;
            }
        }
        content.push_str("END\n");
        fs::write(path, content).unwrap();
    }

    fn score_args(argv: &[&str]) -> ScoreArgs {
        let mut full = vec!["rnadvisor", "score"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Score(args) => args,
            Commands::Metrics => panic!("Expected 'score' subcommand"),
        }
    }

    #[test]
    fn directory_candidates_are_pdb_files_in_name_order() {
        let dir = tempdir().unwrap();
        for name in ["b.pdb", "a.PDB", "notes.txt", "c.cif"] {
            fs::write(dir.path().join(name), "END\n").unwrap();
        }
        fs::create_dir(dir.path().join("nested.pdb")).unwrap();

        let found = discover_candidates(dir.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.PDB", "b.pdb"]);
    }

    #[test]
    fn single_file_is_its_own_candidate_and_missing_path_fails() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("model.pdb");
        fs::write(&file, "END\n").unwrap();

        assert_eq!(discover_candidates(&file).unwrap(), vec![file]);
        assert!(matches!(
            discover_candidates(&dir.path().join("ghost")),
            Err(CliError::PredictionsNotFound { path }) if path.ends_with("ghost")
        ));
    }

    #[test]
    fn csv_result_path_is_kept() {
        assert_eq!(
            resolve_result_path(Path::new("out/scores.csv")),
            PathBuf::from("out/scores.csv")
        );
    }

    #[test]
    fn directory_result_path_gets_a_timestamped_file() {
        let resolved = resolve_result_path(Path::new("results"));
        assert_eq!(resolved.parent(), Some(Path::new("results")));
        let name = resolved.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("scores_"));
        assert!(name.ends_with(".csv"));
        // scores_dd_mm_YYYY_HH:MM:SS.csv
        assert_eq!(name.len(), "scores_".len() + 19 + ".csv".len());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn score_command_writes_both_reports() {
        let dir = tempdir().unwrap();
        let preds = dir.path().join("preds");
        fs::create_dir(&preds).unwrap();
        write_pdb(&preds.join("model_1.pdb"), 6);
        write_pdb(&preds.join("model_2.pdb"), 6);
        let native = dir.path().join("native.pdb");
        write_pdb(&native, 6);
        let result = dir.path().join("out").join("scores.csv");
        let time = dir.path().join("time.csv");

        let args = score_args(&[
            "-p",
            preds.to_str().unwrap(),
            "-n",
            native.to_str().unwrap(),
            "-r",
            result.to_str().unwrap(),
            "-t",
            time.to_str().unwrap(),
            "-m",
            "RMSD,CLASH",
            "--summary",
            "--scratch-dir",
            dir.path().join("scratch").to_str().unwrap(),
        ]);
        run(args).await.unwrap();

        let scores = fs::read_to_string(&result).unwrap();
        let lines: Vec<_> = scores.lines().collect();
        assert_eq!(lines[0], ",RMSD,CLASH");
        assert_eq!(lines.len(), 1 + 2 + 3);
        assert!(lines[1].starts_with("model_1.pdb,0"));
        assert!(lines[3].starts_with("Min,"));

        let timings = fs::read_to_string(&time).unwrap();
        assert!(timings.starts_with(",RMSD,CLASH"));
        assert_eq!(timings.lines().count(), 3);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn invalid_native_is_fatal() {
        let dir = tempdir().unwrap();
        let model = dir.path().join("model.pdb");
        write_pdb(&model, 4);
        let native = dir.path().join("native.txt");
        fs::write(&native, "END\n").unwrap();

        let args = score_args(&[
            "-p",
            model.to_str().unwrap(),
            "-n",
            native.to_str().unwrap(),
            "-m",
            "CLASH",
        ]);
        let result = run(args).await;
        assert!(matches!(
            result,
            Err(CliError::Core(EngineError::InvalidReference { .. }))
        ));
    }
}
