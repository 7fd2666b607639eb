use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

pub const DEFAULT_METRICS: &str = "RMSD,P-VALUE,INF,DI,MCQ,TM-SCORE,CAD";
pub const DEFAULT_SORT_BY: &str = "RMSD";
pub const DEFAULT_RESULT_PATH: &str = "results";
pub const DEFAULT_TIME_PATH: &str = "time.csv";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "RNAdvisor CLI - Scores predicted RNA 3D structures against a reference with a wide range of metrics and statistical potentials.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used to run scoring tasks in parallel.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score predicted structures against a native structure.
    Score(ScoreArgs),
    /// List every available metric together with the groups it belongs to.
    Metrics,
}

/// Arguments for the `score` subcommand.
#[derive(Args, Debug)]
pub struct ScoreArgs {
    // --- Inputs ---
    /// A predicted structure (.pdb) or a directory of predicted structures.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub pred: PathBuf,

    /// The native (reference) structure in .pdb format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub native: PathBuf,

    // --- Outputs ---
    /// Where to save the scores: a .csv file, or a directory receiving a timestamped file.
    #[arg(short, long, value_name = "PATH")]
    pub result: Option<PathBuf>,

    /// Where to save the per-metric computation times as .csv.
    #[arg(short, long, value_name = "PATH")]
    pub time: Option<PathBuf>,

    // --- Scoring ---
    /// Comma-separated metrics to compute. Accepts metric names and the ALL, METRICS and
    /// ENERGIES groups (e.g., 'RMSD,ENERGIES').
    #[arg(short, long, value_name = "LIST")]
    pub metrics: Option<String>,

    /// Column used to sort the candidates in ascending order.
    #[arg(short, long, value_name = "METRIC")]
    pub sort_by: Option<String>,

    /// Append Min, Max and Mean rows to the scores.
    #[arg(long)]
    pub summary: bool,

    /// Parent directory for the scratch files written by external tools.
    #[arg(long, value_name = "PATH")]
    pub scratch_dir: Option<PathBuf>,

    // --- Configuration ---
    /// Path to a configuration file in TOML format with [scoring] and [tools] sections.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to a TOML file with tool locations, overriding the [tools] section of the config.
    #[arg(long, value_name = "PATH")]
    pub tools: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S tools.mcq-mode=1
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
