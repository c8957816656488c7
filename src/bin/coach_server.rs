// coach_server - HTTP serving binary for the fitness coach engine
//
// Hosts the frame-analysis API. Clients stream detected keypoint frames to
// /analyze_frame and receive the current workout state back.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use fitness_coach::clock::MonotonicClock;
use fitness_coach::config::AppConfig;
use fitness_coach::http::{run_http_server, CoachHttpState};
use fitness_coach::session::ExerciseMode;

/// Debug mode controlling log verbosity and frame persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DebugMode {
    /// Verbose logging with per-frame debug records on disk
    Debug,
    /// Verbose logging, no frame persistence
    DebugNoSave,
    /// Minimal logging
    NonDebug,
}

impl DebugMode {
    fn description(&self) -> &'static str {
        match self {
            DebugMode::Debug => "Debug Mode (with frame saving)",
            DebugMode::DebugNoSave => "Debug Mode (without frame saving)",
            DebugMode::NonDebug => "Non-Debug Mode (minimal logging)",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "coach_server", about = "Fitness coach frame-analysis API server")]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address (overrides the config file)
    #[arg(long)]
    listen: Option<String>,

    /// Debug mode setting
    #[arg(long, value_enum, default_value = "debug-no-save")]
    mode: DebugMode,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.mode {
        DebugMode::NonDebug => tracing::Level::WARN,
        _ => tracing::Level::INFO,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    tracing::info!("Starting in: {}", cli.mode.description());

    let mut config = cli
        .config
        .as_ref()
        .map(AppConfig::load_from_file)
        .unwrap_or_else(AppConfig::load);

    config.debug.save_frames = cli.mode == DebugMode::Debug;
    if let Some(listen) = cli.listen {
        config.server.listen_addr = listen;
    }

    let addr: SocketAddr = config
        .server
        .listen_addr
        .parse()
        .with_context(|| format!("invalid listen address '{}'", config.server.listen_addr))?;

    tracing::info!("Supported exercise modes: {:?}", ExerciseMode::SUPPORTED);

    let state = CoachHttpState::new(&config, Arc::new(MonotonicClock::new()));

    tracing::info!("Listening on {}", addr);
    run_http_server(state, addr).await
}
