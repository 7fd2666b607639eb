use indicatif::{ProgressBar, ProgressState, ProgressStyle};
use rnadvisor::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

struct ScoringDisplay {
    pb: ProgressBar,
    phase: &'static str,
    /// Notices sent by the scoring run, such as skipped candidates.
    notices: Vec<String>,
}

/// Shows the scoring phases on stderr: a spinner per phase and a bar over the
/// candidate x metric runs of the scoring phase.
#[derive(Clone)]
pub struct CliProgressHandler {
    display: Arc<Mutex<ScoringDisplay>>,
}

fn phase_icon(phase: &str) -> &'static str {
    match phase {
        "Validating Inputs" => "🔍",
        "Scoring" => "🧬",
        "Aggregating Results" => "📊",
        _ => "•",
    }
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0)
            .with_style(Self::spinner_style())
            .with_message("Preparing scoring run...");
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        pb.finish_and_clear();

        Self {
            display: Arc::new(Mutex::new(ScoringDisplay {
                pb,
                phase: "",
                notices: Vec::new(),
            })),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let display = self.display.clone();

        Box::new(move |progress: Progress| {
            let Ok(mut display) = display.lock() else {
                warn!("Progress display mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart { name } => {
                    display.phase = name;
                    let pb = &display.pb;
                    pb.reset();
                    pb.set_length(0);
                    pb.set_style(Self::spinner_style());
                    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb.set_message(format!("{} {}", phase_icon(name), name));
                }
                Progress::PhaseFinish => {
                    let pb = &display.pb;
                    pb.disable_steady_tick();
                    pb.finish_with_message(format!("✓ {}", display.phase));
                }
                Progress::TaskStart { total_steps } => {
                    let pb = &display.pb;
                    pb.disable_steady_tick();
                    pb.reset();
                    pb.set_length(total_steps);
                    pb.set_position(0);
                    pb.set_style(Self::runs_style());
                    pb.set_message(display.phase.to_string());
                }
                Progress::TaskIncrement => display.pb.inc(1),
                Progress::TaskFinish => {
                    let pb = &display.pb;
                    let length = pb.length().unwrap_or(0);
                    if pb.position() < length {
                        pb.set_position(length);
                    }
                    pb.finish();
                }
                Progress::Message(msg) => {
                    display.pb.println(format!("  ⚠ {}", msg));
                    display.notices.push(msg);
                }
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn runs_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{msg:<10} [{bar:40.cyan/blue}] {pos}/{len} metric runs ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .with_key(
            "eta",
            |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
            },
        )
        .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
