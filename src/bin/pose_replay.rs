// pose_replay - deterministic keypoint replay harness
//
// Feeds a recorded JSON frame script through a workout session and prints
// the per-frame analysis results plus a final summary. Useful for tuning
// thresholds against captured detector output without a camera in the loop.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use fitness_coach::clock::MonotonicClock;
use fitness_coach::config::AppConfig;
use fitness_coach::pose::KeypointFrame;
use fitness_coach::session::{ExerciseMode, WorkoutSession};
use fitness_coach::testing::fixtures::FrameScript;

#[derive(Parser, Debug)]
#[command(
    name = "pose_replay",
    about = "Replay a recorded keypoint script through the rep-counting engine"
)]
struct Cli {
    /// Path to the JSON frame script
    #[arg(long)]
    script: PathBuf,

    /// Override the script's exercise mode
    #[arg(long)]
    mode: Option<String>,

    /// Path to a JSON configuration file with exercise thresholds
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print every frame's result instead of just transitions
    #[arg(long)]
    verbose: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let script = FrameScript::load(&cli.script)?;
    let mode_name = cli.mode.unwrap_or_else(|| script.mode.clone());
    let mode = ExerciseMode::parse_or_default(&mode_name);

    let config = cli
        .config
        .as_ref()
        .map(AppConfig::load_from_file)
        .unwrap_or_default();

    let mut session = WorkoutSession::new(mode, config.exercises, Arc::new(MonotonicClock::new()));

    println!(
        "Replaying {} frames in {} mode",
        script.frames.len(),
        mode.as_str()
    );

    let mut last_count = 0;
    for (index, rows) in script.frames.iter().enumerate() {
        let frame = match rows {
            Some(rows) => Some(
                KeypointFrame::from_rows(rows)
                    .with_context(|| format!("frame {} is malformed", index))?,
            ),
            None => None,
        };

        let (count, state) = session.update(frame.as_ref());

        if cli.verbose || count != last_count {
            println!("frame {:4}: count={} state={}", index, count, state.label());
        }
        last_count = count;
    }

    let status = session.status();
    println!(
        "Done: {} reps over {} frames (final state: {})",
        status.count, status.frame_count, status.state
    );

    Ok(ExitCode::SUCCESS)
}
