// Analysis module - per-exercise repetition counting state machines
//
// This module converts noisy per-frame keypoint observations into smoothed
// measurements, discrete movement phases, and monotonically increasing rep
// counts. Two counter families share the `ExerciseCounter` capability
// interface:
//
// - AngleExerciseCounter: joint-angle thresholds with hysteresis and
//   minimum-dwell gating (push-up, squat, arm-curl)
// - MotionExerciseCounter: vertical-displacement direction tracking with
//   consecutive-frame confirmation and rep cooldown (pull-up/chin-up)
//
// Counters are plain single-threaded state machines: one session owns one
// counter and feeds it frames strictly in arrival order.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod angle_counter;
pub mod geometry;
pub mod motion_counter;
pub mod smoothing;

pub use angle_counter::{AngleExerciseCounter, AngleMeasurement, Phase, Side};
pub use motion_counter::{Direction, MotionExerciseCounter};
pub use smoothing::{SignalSmoother, SmoothingPolicy};

/// Human-facing movement position reported by the motion counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// No frames analyzed yet
    Neutral,
    /// Position history still warming up (< 5 samples)
    Starting,
    /// No confirmed movement direction
    Stable,
    PullingUp,
    LoweringDown,
    /// Required joints below the confidence floor this frame
    LowConfidence,
    /// No person detected this frame
    NoPerson,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Neutral => "neutral",
            Position::Starting => "starting",
            Position::Stable => "stable",
            Position::PullingUp => "pulling_up",
            Position::LoweringDown => "lowering_down",
            Position::LowConfidence => "low_confidence",
            Position::NoPerson => "no_person",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-frame exercise state returned alongside the rep count.
///
/// Angle-based counters report the smoothed joint angle; the motion counter
/// reports a position label. `Pending` covers every frame that produced no
/// usable measurement: no person, confidence below the floor, degenerate
/// geometry, or a smoothing window still priming.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExerciseState {
    Pending,
    /// Smoothed joint angle in degrees
    Angle(f32),
    Position(Position),
}

impl ExerciseState {
    pub fn angle(&self) -> Option<f32> {
        match self {
            ExerciseState::Angle(angle) => Some(*angle),
            _ => None,
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            ExerciseState::Position(position) => Some(*position),
            _ => None,
        }
    }

    /// Compact label for status snapshots and debug records.
    pub fn label(&self) -> String {
        match self {
            ExerciseState::Pending => "pending".to_string(),
            ExerciseState::Angle(angle) => format!("{:.1}", angle),
            ExerciseState::Position(position) => position.as_str().to_string(),
        }
    }
}

/// Diagnostic snapshot of a counter.
#[derive(Debug, Clone, Serialize)]
pub struct CounterStatus {
    pub count: u32,
    pub frame_count: u64,
    pub state: String,
}

/// Capability interface shared by all exercise counters.
///
/// `analyze` consumes one keypoint frame (or `None` when no person was
/// detected) and returns the current rep count plus the per-frame state.
/// The count never decreases except through `reset`.
pub trait ExerciseCounter: Send {
    fn analyze(&mut self, frame: Option<&crate::pose::KeypointFrame>) -> (u32, ExerciseState);

    /// Reset count, phase, and all history windows to initial state.
    fn reset(&mut self);

    fn status(&self) -> CounterStatus;

    fn count(&self) -> u32;
}
