// Workout session - routes keypoint frames to the active exercise counter
//
// A session owns exactly one counter at a time, built by a factory keyed on
// the exercise mode. Switching modes is destructive: the old counter is
// dropped with all its state, matching a user walking from one station to
// the next. Unknown mode strings never fail; they fall back to the chin-up
// variant with a warning.

use std::fmt;
use std::sync::Arc;

use log::{info, warn};
use serde::Serialize;

use crate::analysis::{
    AngleExerciseCounter, ExerciseCounter, ExerciseState, MotionExerciseCounter,
};
use crate::clock::Clock;
use crate::config::ExerciseConfig;
use crate::pose::{JointTriple, KeypointFrame};

pub mod store;

pub use store::SessionStore;

/// Supported exercise modes.
///
/// `Chinup` and `Pullup` are aliases for the same motion-based counter; they
/// remain distinct values so the client's chosen name round-trips in status
/// payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseMode {
    Chinup,
    Pullup,
    Pushup,
    Squat,
    Armcurl,
}

impl ExerciseMode {
    /// Mode names accepted on the wire.
    pub const SUPPORTED: &'static [&'static str] =
        &["chinup", "pullup", "pushup", "squat", "armcurl"];

    pub fn try_parse(value: &str) -> Option<Self> {
        match value {
            "chinup" => Some(ExerciseMode::Chinup),
            "pullup" => Some(ExerciseMode::Pullup),
            "pushup" => Some(ExerciseMode::Pushup),
            "squat" => Some(ExerciseMode::Squat),
            "armcurl" => Some(ExerciseMode::Armcurl),
            _ => None,
        }
    }

    /// Parse a mode string, falling back to the chin-up variant.
    ///
    /// Unknown modes are a client mistake, not a reason to drop frames:
    /// log and keep going with the default counter.
    pub fn parse_or_default(value: &str) -> Self {
        Self::try_parse(value).unwrap_or_else(|| {
            warn!("Unknown exercise mode '{}', defaulting to chinup", value);
            ExerciseMode::Chinup
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseMode::Chinup => "chinup",
            ExerciseMode::Pullup => "pullup",
            ExerciseMode::Pushup => "pushup",
            ExerciseMode::Squat => "squat",
            ExerciseMode::Armcurl => "armcurl",
        }
    }

    /// True for modes whose counter reports position labels rather than
    /// joint angles.
    pub fn is_motion_based(&self) -> bool {
        matches!(self, ExerciseMode::Chinup | ExerciseMode::Pullup)
    }
}

impl fmt::Display for ExerciseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the counter for an exercise mode from per-exercise configuration.
pub fn build_counter(
    mode: ExerciseMode,
    config: &ExerciseConfig,
    clock: Arc<dyn Clock>,
) -> Box<dyn ExerciseCounter> {
    match mode {
        ExerciseMode::Chinup | ExerciseMode::Pullup => Box::new(MotionExerciseCounter::new(
            config.pullup.clone(),
            clock,
        )),
        ExerciseMode::Pushup => Box::new(AngleExerciseCounter::new(
            "push-up",
            JointTriple::LEFT_ELBOW,
            JointTriple::RIGHT_ELBOW,
            config.pushup.clone(),
        )),
        ExerciseMode::Squat => Box::new(AngleExerciseCounter::new(
            "squat",
            JointTriple::LEFT_KNEE,
            JointTriple::RIGHT_KNEE,
            config.squat.clone(),
        )),
        ExerciseMode::Armcurl => Box::new(AngleExerciseCounter::new(
            "arm-curl",
            JointTriple::LEFT_ELBOW,
            JointTriple::RIGHT_ELBOW,
            config.armcurl.clone(),
        )),
    }
}

/// Diagnostic snapshot of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub mode: String,
    pub count: u32,
    pub frame_count: u64,
    pub state: String,
}

/// One client's workout stream.
///
/// All updates for a session must arrive in order on one logical thread of
/// control; the counters carry no internal synchronization. Independent
/// sessions are fully isolated.
pub struct WorkoutSession {
    mode: ExerciseMode,
    counter: Box<dyn ExerciseCounter>,
    /// Frames routed through this session since creation or mode switch
    frame_count: u64,
    exercises: ExerciseConfig,
    clock: Arc<dyn Clock>,
}

impl WorkoutSession {
    pub fn new(mode: ExerciseMode, exercises: ExerciseConfig, clock: Arc<dyn Clock>) -> Self {
        let counter = build_counter(mode, &exercises, clock.clone());
        info!("WorkoutSession initialized with mode: {}", mode);
        Self {
            mode,
            counter,
            frame_count: 0,
            exercises,
            clock,
        }
    }

    pub fn mode(&self) -> ExerciseMode {
        self.mode
    }

    pub fn count(&self) -> u32 {
        self.counter.count()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Process one frame through the active counter.
    pub fn update(&mut self, frame: Option<&KeypointFrame>) -> (u32, ExerciseState) {
        self.frame_count += 1;
        self.counter.analyze(frame)
    }

    /// Switch exercise modes, discarding the current counter's state.
    ///
    /// No state migrates across a switch: smoothing windows, phase, and
    /// count all start fresh.
    pub fn switch_mode(&mut self, new_mode: ExerciseMode) {
        if new_mode == self.mode {
            return;
        }
        self.mode = new_mode;
        self.counter = build_counter(new_mode, &self.exercises, self.clock.clone());
        self.frame_count = 0;
        info!("Switched to {} mode", new_mode);
    }

    /// Reset the active counter and the session frame count.
    pub fn reset(&mut self) {
        self.counter.reset();
        self.frame_count = 0;
        info!("Reset {} counter", self.mode);
    }

    pub fn status(&self) -> SessionStatus {
        let counter = self.counter.status();
        SessionStatus {
            mode: self.mode.as_str().to_string(),
            count: counter.count,
            frame_count: self.frame_count,
            state: counter.state,
        }
    }
}
