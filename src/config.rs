//! Configuration management for exercise tuning parameters
//!
//! This module provides runtime configuration loading from JSON files,
//! enabling threshold tuning without recompilation. Every counter receives
//! its configuration by value at construction, so concurrent sessions can
//! never interfere with each other's tuning.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::smoothing::SmoothingPolicy;

/// Which state-machine transition increments the rep count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountTrigger {
    /// Count when arriving at the raised phase, but only after a descent
    /// was observed first (push-up, squat).
    RaiseAfterDescent,
    /// Count when the limb extends back out, unconditionally (arm-curl:
    /// the raised phase is the curl, the rep completes at extension).
    Extension,
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub exercises: ExerciseConfig,
    pub debug: DebugConfig,
    pub server: ServerConfig,
}

/// Per-exercise counter parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseConfig {
    pub pushup: AngleCounterConfig,
    pub squat: AngleCounterConfig,
    pub armcurl: AngleCounterConfig,
    pub pullup: MotionCounterConfig,
}

impl Default for ExerciseConfig {
    fn default() -> Self {
        Self {
            pushup: AngleCounterConfig::pushup(),
            squat: AngleCounterConfig::squat(),
            armcurl: AngleCounterConfig::armcurl(),
            pullup: MotionCounterConfig::default(),
        }
    }
}

/// Angle-threshold state machine parameters (push-up, squat, arm-curl)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AngleCounterConfig {
    /// Angle above which the raised/extended phase is entered (degrees)
    pub up_threshold: f32,
    /// Angle below which the lowered/flexed phase is entered (degrees)
    pub down_threshold: f32,
    /// Smoothing window capacity in samples
    pub window: usize,
    pub smoothing: SmoothingPolicy,
    /// Minimum mean triple confidence for a usable measurement
    pub min_confidence: f32,
    /// Frames a phase must persist before the next transition is accepted
    pub min_dwell_frames: u64,
    pub count_on: CountTrigger,
}

impl AngleCounterConfig {
    /// Elbow-angle push-up counter parameters.
    pub fn pushup() -> Self {
        Self {
            up_threshold: 135.0,
            down_threshold: 105.0,
            window: 3,
            smoothing: SmoothingPolicy::LastTwoMean,
            min_confidence: 0.3,
            min_dwell_frames: 2,
            count_on: CountTrigger::RaiseAfterDescent,
        }
    }

    /// Knee-angle squat counter parameters.
    pub fn squat() -> Self {
        Self {
            up_threshold: 170.0,
            down_threshold: 140.0,
            window: 3,
            smoothing: SmoothingPolicy::LastTwoMean,
            min_confidence: 0.3,
            min_dwell_frames: 2,
            count_on: CountTrigger::RaiseAfterDescent,
        }
    }

    /// Elbow-angle arm-curl counter parameters.
    ///
    /// The deeper full-window mean trades latency for stability, so no
    /// dwell gating is needed on top of it.
    pub fn armcurl() -> Self {
        Self {
            up_threshold: 90.0,
            down_threshold: 120.0,
            window: 5,
            smoothing: SmoothingPolicy::FullWindowMean,
            min_confidence: 0.5,
            min_dwell_frames: 0,
            count_on: CountTrigger::Extension,
        }
    }
}

/// Displacement-direction state machine parameters (pull-up/chin-up)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionCounterConfig {
    /// Minimum confidence required on all four tracked joints
    pub min_confidence: f32,
    /// Minimum pixel movement over the trend span to register a direction
    pub movement_threshold: f32,
    /// Consecutive supporting frames before a direction is confirmed
    pub min_consecutive_frames: f32,
    /// Minimum displacement range between DOWN and UP for a valid rep (pixels)
    pub min_movement_range: f32,
    /// Minimum wall-clock interval between counted reps (seconds)
    pub rep_cooldown_secs: f64,
    /// Capacity of the raw displacement history
    pub position_history: usize,
    /// Capacity of the confirmed direction-change log
    pub change_log_capacity: usize,
    /// Samples spanned by the movement trend
    pub trend_span: usize,
}

impl Default for MotionCounterConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.3,
            movement_threshold: 4.0,
            min_consecutive_frames: 3.0,
            min_movement_range: 15.0,
            rep_cooldown_secs: 0.5,
            position_history: 30,
            change_log_capacity: 10,
            trend_span: 5,
        }
    }
}

/// Debug frame persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Persist per-frame debug records to disk
    pub save_frames: bool,
    /// Directory receiving debug frame records
    pub debug_dir: PathBuf,
    /// Log a per-frame summary every N frames (0 disables)
    pub log_every_n_frames: u64,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            save_frames: false,
            debug_dir: PathBuf::from("debug_frames"),
            log_every_n_frames: 10,
        }
    }
}

/// HTTP service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address for the HTTP service
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8000".to_string(),
        }
    }
}

impl Default for AppConfig {
    /// Default configuration values (fallback if config file not found)
    fn default() -> Self {
        Self {
            exercises: ExerciseConfig::default(),
            debug: DebugConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// Loaded configuration; falls back to defaults (with a warning) if the
    /// file is missing or invalid.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the default asset path.
    pub fn load() -> Self {
        Self::load_from_file("assets/coach_config.json")
    }
}
